use sqlx::PgConnection;

use crate::pkg::internal::adaptors::resumes::spec::ResumeEntry;
use crate::prelude::Result;

const COLUMNS: &str = "id, user_id, file_name, file_url, file_size, mime_type, parsed_content, \
     ai_analysis, strength_score, ats_score, suggestions, is_primary, created_at";

pub struct ResumeSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ResumeSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ResumeSelector { pool }
    }

    pub async fn get_for_owner(&mut self, user_id: &str) -> Result<Vec<ResumeEntry>> {
        let rows = sqlx::query_as::<_, ResumeEntry>(&format!(
            "SELECT {} FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id_for_owner(
        &mut self,
        user_id: &str,
        resume_id: i32,
    ) -> Result<Option<ResumeEntry>> {
        let row = sqlx::query_as::<_, ResumeEntry>(&format!(
            "SELECT {} FROM resumes WHERE id = $1 AND user_id = $2",
            COLUMNS
        ))
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
