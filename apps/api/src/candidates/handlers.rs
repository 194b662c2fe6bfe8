use std::path::PathBuf;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::candidates::store;
use crate::errors::AppError;
use crate::models::CandidateRow;
use crate::resume::process_resume_background;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub candidate_id: i32,
}

/// POST /api/v1/candidates
///
/// Multipart form: `name` (required), `email`, `phone`, `file` (required).
/// The candidate row is created immediately; text extraction and field
/// parsing run as a fire-and-forget background task, so the row may be
/// observed before `resume_text`/`parsed_json` populate.
pub async fn handle_upload_candidate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut name: Option<String> = None;
    let mut email: Option<String> = None;
    let mut phone: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "name" => name = Some(read_text(field).await?),
            "email" => email = Some(read_text(field).await?),
            "phone" => phone = Some(read_text(field).await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Upload(e.to_string()))?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("'name' field is required".to_string()))?;
    let (file_name, contents) =
        file.ok_or_else(|| AppError::Upload("No file uploaded".to_string()))?;

    info!("Uploading candidate: {name}, file: {file_name}");

    let candidate =
        store::create_candidate(&state.db, &name, email.as_deref(), phone.as_deref()).await?;
    info!("Candidate created with ID: {}", candidate.id);

    // Store under a fresh UUID, keeping only the original extension.
    let ext = std::path::Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    let file_path = PathBuf::from(&state.config.upload_dir).join(format!("{}{ext}", Uuid::new_v4()));
    tokio::fs::write(&file_path, &contents)
        .await
        .map_err(|e| AppError::Upload(format!("Could not save file: {e}")))?;
    info!("File saved: {}", file_path.display());

    tokio::spawn(process_resume_background(
        state.db.clone(),
        state.executor.clone(),
        candidate.id,
        file_path,
    ));

    Ok(Json(UploadResponse {
        status: "uploaded",
        candidate_id: candidate.id,
    }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Upload(e.to_string()))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<CandidateRow>>, AppError> {
    let items = store::list_candidates(&state.db, params.skip, params.limit).await?;
    Ok(Json(items))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
) -> Result<Json<CandidateRow>, AppError> {
    let candidate = store::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;
    Ok(Json(candidate))
}

/// Minimal ranking input for candidates whose background parse has not
/// landed yet: summary from raw text, everything else empty.
pub fn ranking_input(candidate: &CandidateRow) -> Value {
    candidate.parsed_json.clone().unwrap_or_else(|| {
        let summary: String = candidate
            .resume_text
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(1000)
            .collect();
        json!({
            "summary": summary,
            "skills": [],
            "experience": [],
            "education": [],
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate(parsed: Option<Value>, resume: Option<&str>) -> CandidateRow {
        CandidateRow {
            id: 1,
            name: "Ada".to_string(),
            email: None,
            phone: None,
            resume_text: resume.map(str::to_string),
            parsed_json: parsed,
            score: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ranking_input_prefers_parsed_json() {
        let parsed = json!({"skills": ["rust"]});
        let input = ranking_input(&candidate(Some(parsed.clone()), Some("raw")));
        assert_eq!(input, parsed);
    }

    #[test]
    fn test_ranking_input_builds_minimal_record_from_resume_text() {
        let input = ranking_input(&candidate(None, Some("raw resume text")));
        assert_eq!(input["summary"], json!("raw resume text"));
        assert_eq!(input["skills"], json!([]));
    }

    #[test]
    fn test_ranking_input_summary_capped_at_1000_chars() {
        let long = "r".repeat(2000);
        let input = ranking_input(&candidate(None, Some(&long)));
        assert_eq!(input["summary"].as_str().unwrap().len(), 1000);
    }
}
