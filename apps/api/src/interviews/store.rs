use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::InterviewRow;

pub struct NewInterview<'a> {
    pub candidate_id: i32,
    pub job_id: Option<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub interviewer: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InterviewFilter {
    pub candidate_id: Option<i32>,
    pub job_id: Option<i32>,
    pub upcoming_only: bool,
}

pub async fn create_interview(
    db: &PgPool,
    new: NewInterview<'_>,
) -> Result<InterviewRow, AppError> {
    let row = sqlx::query_as(
        "INSERT INTO interviews (candidate_id, job_id, scheduled_at, interviewer, notes, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW())
         RETURNING *",
    )
    .bind(new.candidate_id)
    .bind(new.job_id)
    .bind(new.scheduled_at)
    .bind(new.interviewer)
    .bind(new.notes)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn get_interview(
    db: &PgPool,
    interview_id: i32,
) -> Result<Option<InterviewRow>, AppError> {
    let row = sqlx::query_as("SELECT * FROM interviews WHERE id = $1")
        .bind(interview_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn list_interviews(
    db: &PgPool,
    filter: InterviewFilter,
    skip: i64,
    limit: i64,
) -> Result<Vec<InterviewRow>, AppError> {
    let rows = sqlx::query_as(
        "SELECT * FROM interviews
         WHERE ($1::int IS NULL OR candidate_id = $1)
           AND ($2::int IS NULL OR job_id = $2)
           AND (NOT $3 OR scheduled_at > NOW())
         ORDER BY scheduled_at DESC NULLS LAST
         OFFSET $4 LIMIT $5",
    )
    .bind(filter.candidate_id)
    .bind(filter.job_id)
    .bind(filter.upcoming_only)
    .bind(skip)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Partial update: only the supplied fields change.
pub async fn update_interview(
    db: &PgPool,
    interview_id: i32,
    scheduled_at: Option<DateTime<Utc>>,
    interviewer: Option<&str>,
    notes: Option<&str>,
    job_id: Option<i32>,
) -> Result<Option<InterviewRow>, AppError> {
    let row = sqlx::query_as(
        "UPDATE interviews SET
             scheduled_at = COALESCE($1, scheduled_at),
             interviewer = COALESCE($2, interviewer),
             notes = COALESCE($3, notes),
             job_id = COALESCE($4, job_id)
         WHERE id = $5
         RETURNING *",
    )
    .bind(scheduled_at)
    .bind(interviewer)
    .bind(notes)
    .bind(job_id)
    .bind(interview_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn update_interview_notes(
    db: &PgPool,
    interview_id: i32,
    notes: &str,
) -> Result<Option<InterviewRow>, AppError> {
    let row = sqlx::query_as("UPDATE interviews SET notes = $1 WHERE id = $2 RETURNING *")
        .bind(notes)
        .bind(interview_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn delete_interview(db: &PgPool, interview_id: i32) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
        .bind(interview_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
