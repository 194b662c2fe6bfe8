use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: i32,
    pub candidate_id: i32,
    pub job_id: Option<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub interviewer: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
