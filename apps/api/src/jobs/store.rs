use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::JobRow;

pub async fn create_job(
    db: &PgPool,
    title: &str,
    description: Option<&str>,
) -> Result<JobRow, AppError> {
    let row = sqlx::query_as(
        "INSERT INTO jobs (title, description, created_at)
         VALUES ($1, $2, NOW())
         RETURNING *",
    )
    .bind(title)
    .bind(description)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn get_job(db: &PgPool, job_id: i32) -> Result<Option<JobRow>, AppError> {
    let row = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn list_jobs(db: &PgPool, skip: i64, limit: i64) -> Result<Vec<JobRow>, AppError> {
    let rows = sqlx::query_as("SELECT * FROM jobs ORDER BY created_at DESC OFFSET $1 LIMIT $2")
        .bind(skip)
        .bind(limit)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
