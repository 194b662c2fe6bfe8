use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A candidate record. `resume_text` and `parsed_json` stay NULL until the
/// background resume processing pipeline fills them in — clients may observe
/// the row in that state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub resume_text: Option<String>,
    pub parsed_json: Option<Value>,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}
