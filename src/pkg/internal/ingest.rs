use std::sync::Arc;

use axum::http::StatusCode;
use sqlx::PgPool;
use standard_error::{Interpolate, StandardError, Status};

use crate::pkg::internal::adaptors::resumes::mutators::{CreateResumeData, ResumeMutator};
use crate::pkg::internal::adaptors::resumes::spec::ResumeEntry;
use crate::pkg::internal::analyze::{AnalysisOutcome, ResumeAnalyzer};
use crate::pkg::internal::extract::extract_document;
use crate::pkg::internal::storage::ObjectStore;
use crate::pkg::internal::validate::validate_resume;
use crate::prelude::Result;

/// A candidate-submitted document as it arrives from the upload handler.
/// Lives for exactly one pipeline run.
#[derive(Debug, Clone)]
pub struct SubmittedDocument {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    pub size: i64,
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub record: ResumeEntry,
    pub tips: Vec<String>,
}

/// Persistence seam for the pipeline's final stage.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, resume: CreateResumeData) -> Result<ResumeEntry>;
}

#[derive(Debug, Clone)]
pub struct PgResumeStore {
    pool: Arc<PgPool>,
}

impl PgResumeStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgResumeStore { pool }
    }
}

#[async_trait::async_trait]
impl RecordStore for PgResumeStore {
    async fn create(&self, resume: CreateResumeData) -> Result<ResumeEntry> {
        let mut tx = self.pool.begin().await?;
        let entry = ResumeMutator::new(&mut tx).create(resume).await?;
        tx.commit().await?;
        Ok(entry)
    }
}

/// Sequences one ingestion run: extract, validate, upload, analyze,
/// persist. Holds the only code path allowed to delete a freshly uploaded
/// blob, the compensating cleanup for a failed persist.
#[derive(Debug, Clone)]
pub struct IngestPipeline<S: ObjectStore, R: RecordStore> {
    storage: S,
    records: R,
    analyzer: ResumeAnalyzer,
}

impl<S: ObjectStore, R: RecordStore> IngestPipeline<S, R> {
    pub fn new(storage: S, records: R, analyzer: ResumeAnalyzer) -> Self {
        IngestPipeline {
            storage,
            records,
            analyzer,
        }
    }

    pub async fn run(&self, user_id: &str, doc: SubmittedDocument) -> Result<IngestOutcome> {
        let SubmittedDocument {
            data,
            mime_type,
            file_name,
            size,
        } = doc;

        let extraction = extract_document(&data, &mime_type);
        if let Some(reason) = extraction.error {
            tracing::info!("rejecting {}: {}", &file_name, &reason);
            return Err(StandardError::new(&format!("ERR-RESUME-004: {}", reason))
                .code(StatusCode::BAD_REQUEST));
        }
        tracing::debug!(
            "extracted {} words from {} ({} bytes)",
            extraction.word_count,
            &file_name,
            size
        );

        let verdict = validate_resume(&extraction.text);
        if !verdict.is_valid {
            tracing::debug!("resume sections incomplete: {:?}", &verdict.sections);
        }

        let upload = self.storage.put(data, &file_name, "resumes").await?;
        tracing::debug!("uploaded {} to {}", &file_name, &upload.url);

        let outcome = self.analyzer.analyze(&extraction.text).await;
        match &outcome {
            AnalysisOutcome::Disabled => {
                tracing::warn!("ai analysis disabled, storing default report");
            }
            AnalysisOutcome::CallFailed(reason) => {
                tracing::warn!("ai analysis failed, storing fallback report: {}", reason);
            }
            AnalysisOutcome::ParseFailed => {
                tracing::warn!("ai response unparseable, storing fallback report");
            }
            AnalysisOutcome::Ok(_) => {}
        }
        let analysis = outcome.into_report();

        let resume = CreateResumeData {
            user_id: user_id.to_string(),
            file_name,
            file_url: upload.url.clone(),
            file_size: size,
            mime_type,
            parsed_content: extraction.text,
            analysis,
        };
        match self.records.create(resume).await {
            Ok(record) => {
                tracing::info!("resume {} filed for user {}", record.id, user_id);
                Ok(IngestOutcome {
                    record,
                    tips: verdict.warnings,
                })
            }
            Err(err) => {
                self.compensate(&upload.handle).await;
                Err(StandardError::new("ERR-RESUME-006: Failed to save resume record")
                    .code(StatusCode::INTERNAL_SERVER_ERROR)
                    .interpolate_err(err.to_string()))
            }
        }
    }

    /// Undoes this run's upload after a persistence failure. A failed
    /// cleanup is logged, not surfaced: the persistence error is the one
    /// the caller must see.
    async fn compensate(&self, handle: &str) {
        tracing::error!("persistence failed, removing uploaded object {}", handle);
        if let Err(err) = self.storage.delete(handle).await {
            tracing::error!("compensating delete of {} failed: {}", handle, err);
        }
    }
}
