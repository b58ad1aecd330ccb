use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path as AxumPath, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use standard_error::{StandardError, Status};

use crate::pkg::internal::adaptors::resumes::mutators::ResumeMutator;
use crate::pkg::internal::adaptors::resumes::selectors::ResumeSelector;
use crate::pkg::internal::adaptors::resumes::spec::ResumeEntry;
use crate::pkg::internal::auth::User;
use crate::pkg::internal::extract::{MIME_DOC, MIME_DOCX, MIME_PDF, SUPPORTED_MIME_TYPES};
use crate::pkg::internal::ingest::SubmittedDocument;
use crate::pkg::internal::storage::ObjectStore;
use crate::pkg::server::state::AppState;
use crate::prelude::Result;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Serialize)]
pub struct UploadResponse {
    pub data: ResumeEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
}

fn mime_for_extension(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "pdf" => MIME_PDF,
        "doc" => MIME_DOC,
        "docx" => MIME_DOCX,
        _ => "application/octet-stream",
    }
    .to_string()
}

pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut submitted: Option<SubmittedDocument> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StandardError::new(&format!("ERR-RESUME-000: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let mime_type = match field.content_type() {
                    Some(content_type) => content_type.to_string(),
                    None => mime_for_extension(&file_name),
                };
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| StandardError::new(&format!("ERR-RESUME-000: {}", e)))?;
                if !SUPPORTED_MIME_TYPES.contains(&mime_type.as_str()) {
                    return Err(StandardError::new(
                        "ERR-RESUME-002: Invalid file type. Only PDF and Word documents are allowed",
                    )
                    .code(StatusCode::BAD_REQUEST));
                }
                if data.len() > MAX_UPLOAD_BYTES {
                    return Err(StandardError::new(
                        "ERR-RESUME-003: File too large. Maximum size is 5MB",
                    )
                    .code(StatusCode::BAD_REQUEST));
                }
                submitted = Some(SubmittedDocument {
                    size: data.len() as i64,
                    data: data.into(),
                    mime_type,
                    file_name,
                });
            }
            _ => {
                let _ = field
                    .bytes()
                    .await
                    .map_err(|e| StandardError::new(&format!("ERR-RESUME-000: {}", e)))?;
            }
        }
    }

    let doc = submitted.ok_or_else(|| {
        StandardError::new(
            "ERR-RESUME-001: No file uploaded. Please select a PDF or Word document",
        )
        .code(StatusCode::BAD_REQUEST)
    })?;

    let outcome = state.ingest.run(&user.user_id, doc).await?;
    let tips = (!outcome.tips.is_empty()).then_some(outcome.tips);
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            data: outcome.record,
            tips,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<Vec<ResumeEntry>>> {
    let mut tx = state.db_pool.begin().await?;
    let resumes = ResumeSelector::new(&mut tx)
        .get_for_owner(&user.user_id)
        .await?;
    Ok(Json(resumes))
}

pub async fn set_primary(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    AxumPath(resume_id): AxumPath<i32>,
) -> Result<Json<ResumeEntry>> {
    let mut tx = state.db_pool.begin().await?;
    let updated = ResumeMutator::new(&mut tx)
        .set_primary(&user.user_id, resume_id)
        .await?;
    let resume = match updated {
        Some(resume) => resume,
        None => {
            return Err(StandardError::new("ERR-RESUME-404: Resume not found")
                .code(StatusCode::NOT_FOUND));
        }
    };
    tx.commit().await?;
    tracing::info!("resume {} set primary for user {}", resume.id, &user.user_id);
    Ok(Json(resume))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    AxumPath(resume_id): AxumPath<i32>,
) -> Result<impl IntoResponse> {
    let mut tx = state.db_pool.begin().await?;
    let deleted = ResumeMutator::new(&mut tx)
        .delete(&user.user_id, resume_id)
        .await?;
    let resume = match deleted {
        Some(resume) => resume,
        None => {
            return Err(StandardError::new("ERR-RESUME-404: Resume not found")
                .code(StatusCode::NOT_FOUND));
        }
    };
    tx.commit().await?;

    // the row is gone; losing the blob delete leaves an orphan object, not
    // a dangling record
    match state.storage.handle_for_url(&resume.file_url) {
        Some(handle) => {
            if let Err(err) = state.storage.delete(&handle).await {
                tracing::warn!("failed to delete object {}: {}", &handle, err);
            }
        }
        None => {
            tracing::warn!("no deletion handle recoverable from {}", &resume.file_url);
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
