use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::CandidateRow;

pub async fn create_candidate(
    db: &PgPool,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<CandidateRow, AppError> {
    let row = sqlx::query_as(
        "INSERT INTO candidates (name, email, phone, created_at)
         VALUES ($1, $2, $3, NOW())
         RETURNING *",
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn get_candidate(db: &PgPool, candidate_id: i32) -> Result<Option<CandidateRow>, AppError> {
    let row = sqlx::query_as("SELECT * FROM candidates WHERE id = $1")
        .bind(candidate_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn list_candidates(
    db: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<CandidateRow>, AppError> {
    let rows = sqlx::query_as(
        "SELECT * FROM candidates ORDER BY created_at DESC OFFSET $1 LIMIT $2",
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Filled in by the background resume pipeline once text extraction and
/// field parsing complete.
pub async fn update_resume_and_parsed(
    db: &PgPool,
    candidate_id: i32,
    resume_text: &str,
    parsed_json: &Value,
) -> Result<(), AppError> {
    sqlx::query("UPDATE candidates SET resume_text = $1, parsed_json = $2 WHERE id = $3")
        .bind(resume_text)
        .bind(parsed_json)
        .bind(candidate_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_score(db: &PgPool, candidate_id: i32, score: f64) -> Result<(), AppError> {
    sqlx::query("UPDATE candidates SET score = $1 WHERE id = $2")
        .bind(score)
        .bind(candidate_id)
        .execute(db)
        .await?;
    Ok(())
}
