use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::pkg::internal::analyze::AnalysisReport;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeEntry {
    pub id: i32,
    pub user_id: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub mime_type: String,
    pub parsed_content: String,
    pub ai_analysis: Json<AnalysisReport>,
    pub strength_score: i32,
    pub ats_score: i32,
    pub suggestions: Vec<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}
