pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::ai::handlers as ai;
use crate::candidates::handlers as candidates;
use crate::interviews::handlers as interviews;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidates
        .route(
            "/api/v1/candidates",
            post(candidates::handle_upload_candidate).get(candidates::handle_list_candidates),
        )
        .route(
            "/api/v1/candidates/:id",
            get(candidates::handle_get_candidate),
        )
        .route(
            "/api/v1/candidates/:id/interviews",
            get(interviews::handle_candidate_interviews),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route(
            "/api/v1/jobs/:id/interviews",
            get(interviews::handle_job_interviews),
        )
        // Interviews
        .route(
            "/api/v1/interviews",
            post(interviews::handle_create_interview).get(interviews::handle_list_interviews),
        )
        .route(
            "/api/v1/interviews/:id",
            get(interviews::handle_get_interview)
                .put(interviews::handle_update_interview)
                .delete(interviews::handle_delete_interview),
        )
        .route(
            "/api/v1/interviews/:id/notes",
            put(interviews::handle_update_notes),
        )
        // AI operations
        .route(
            "/api/v1/jobs/:job_id/rank/:candidate_id",
            post(ai::handle_rank_candidate),
        )
        .route(
            "/api/v1/ai/generate-questions",
            post(ai::handle_generate_questions),
        )
        .route(
            "/api/v1/ai/question-templates/:level",
            get(ai::handle_question_templates),
        )
        .route(
            "/api/v1/ai/interviews/:id/analyze-feedback",
            post(ai::handle_analyze_feedback),
        )
        .route(
            "/api/v1/ai/candidates/:id/feedback-summary",
            get(ai::handle_feedback_summary),
        )
        .route(
            "/api/v1/candidates/:id/optimize-resume",
            post(ai::handle_optimize_resume),
        )
        .with_state(state)
}
