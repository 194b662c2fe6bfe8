use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::candidates::store as candidates;
use crate::errors::AppError;
use crate::interviews::store::{self, InterviewFilter, NewInterview};
use crate::jobs::store as jobs;
use crate::models::InterviewRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateInterviewRequest {
    pub candidate_id: i32,
    pub job_id: Option<i32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub interviewer: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateInterviewRequest {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub interviewer: Option<String>,
    pub notes: Option<String>,
    pub job_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub candidate_id: Option<i32>,
    pub job_id: Option<i32>,
    #[serde(default)]
    pub upcoming_only: bool,
}

fn default_limit() -> i64 {
    100
}

/// POST /api/v1/interviews
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(req): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    if let Some(scheduled_at) = req.scheduled_at {
        if scheduled_at < Utc::now() {
            return Err(AppError::Validation(
                "Interview time must be in the future".to_string(),
            ));
        }
    }

    candidates::get_candidate(&state.db, req.candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", req.candidate_id)))?;

    if let Some(job_id) = req.job_id {
        jobs::get_job(&state.db, job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    }

    let interview = store::create_interview(
        &state.db,
        NewInterview {
            candidate_id: req.candidate_id,
            job_id: req.job_id,
            scheduled_at: req.scheduled_at,
            interviewer: req.interviewer.as_deref(),
            notes: req.notes.as_deref(),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(interview)))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    let interviews = store::list_interviews(
        &state.db,
        InterviewFilter {
            candidate_id: params.candidate_id,
            job_id: params.job_id,
            upcoming_only: params.upcoming_only,
        },
        params.skip,
        params.limit,
    )
    .await?;
    Ok(Json(interviews))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<i32>,
) -> Result<Json<InterviewRow>, AppError> {
    let interview = store::get_interview(&state.db, interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;
    Ok(Json(interview))
}

/// PUT /api/v1/interviews/:id
pub async fn handle_update_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<i32>,
    Json(req): Json<UpdateInterviewRequest>,
) -> Result<Json<InterviewRow>, AppError> {
    if let Some(job_id) = req.job_id {
        jobs::get_job(&state.db, job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    }

    let updated = store::update_interview(
        &state.db,
        interview_id,
        req.scheduled_at,
        req.interviewer.as_deref(),
        req.notes.as_deref(),
        req.job_id,
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;

    Ok(Json(updated))
}

/// PUT /api/v1/interviews/:id/notes
pub async fn handle_update_notes(
    State(state): State<AppState>,
    Path(interview_id): Path<i32>,
    Json(req): Json<NotesRequest>,
) -> Result<Json<InterviewRow>, AppError> {
    let updated = store::update_interview_notes(&state.db, interview_id, &req.notes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let deleted = store::delete_interview(&state.db, interview_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!(
            "Interview {interview_id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/candidates/:id/interviews
pub async fn handle_candidate_interviews(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    candidates::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let interviews = store::list_interviews(
        &state.db,
        InterviewFilter {
            candidate_id: Some(candidate_id),
            ..Default::default()
        },
        0,
        100,
    )
    .await?;
    Ok(Json(interviews))
}

/// GET /api/v1/jobs/:id/interviews
pub async fn handle_job_interviews(
    State(state): State<AppState>,
    Path(job_id): Path<i32>,
) -> Result<Json<Vec<InterviewRow>>, AppError> {
    jobs::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let interviews = store::list_interviews(
        &state.db,
        InterviewFilter {
            job_id: Some(job_id),
            ..Default::default()
        },
        0,
        100,
    )
    .await?;
    Ok(Json(interviews))
}
