use sqlx::types::Json;
use sqlx::PgConnection;

use crate::pkg::internal::adaptors::resumes::spec::ResumeEntry;
use crate::pkg::internal::analyze::AnalysisReport;
use crate::prelude::Result;

const RETURNING: &str = "RETURNING id, user_id, file_name, file_url, file_size, mime_type, \
     parsed_content, ai_analysis, strength_score, ats_score, suggestions, is_primary, created_at";

#[derive(Debug, Clone)]
pub struct CreateResumeData {
    pub user_id: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub mime_type: String,
    pub parsed_content: String,
    pub analysis: AnalysisReport,
}

pub struct ResumeMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ResumeMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ResumeMutator { pool }
    }

    pub async fn create(&mut self, resume: CreateResumeData) -> Result<ResumeEntry> {
        let suggestions = resume.analysis.improvements.clone();
        let row = sqlx::query_as::<_, ResumeEntry>(&format!(
            r#"
            INSERT INTO resumes (user_id, file_name, file_url, file_size, mime_type,
                                 parsed_content, ai_analysis, strength_score, ats_score,
                                 suggestions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            {}
            "#,
            RETURNING
        ))
        .bind(&resume.user_id)
        .bind(&resume.file_name)
        .bind(&resume.file_url)
        .bind(resume.file_size)
        .bind(&resume.mime_type)
        .bind(&resume.parsed_content)
        .bind(Json(&resume.analysis))
        .bind(resume.analysis.strength_score)
        .bind(resume.analysis.ats_score)
        .bind(&suggestions)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Clears the primary flag on all of the owner's resumes, then sets it
    /// on the given one. Must run inside the caller's transaction so there
    /// is never a window with zero or two primaries.
    pub async fn set_primary(
        &mut self,
        user_id: &str,
        resume_id: i32,
    ) -> Result<Option<ResumeEntry>> {
        sqlx::query("UPDATE resumes SET is_primary = FALSE WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.pool)
            .await?;
        let row = sqlx::query_as::<_, ResumeEntry>(&format!(
            "UPDATE resumes SET is_primary = TRUE WHERE id = $1 AND user_id = $2 {}",
            RETURNING
        ))
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&mut self, user_id: &str, resume_id: i32) -> Result<Option<ResumeEntry>> {
        let row = sqlx::query_as::<_, ResumeEntry>(&format!(
            "DELETE FROM resumes WHERE id = $1 AND user_id = $2 {}",
            RETURNING
        ))
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
