//! HTTP surface for the AI-backed operations: ranking, question generation,
//! feedback analysis, and resume optimization. Every handler resolves its
//! database context first, then delegates to the task layer; model failures
//! never surface as HTTP errors because the executor always falls back.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::feedback::{
    analyze_interview_feedback, summarize_multiple_interviews, AnalyzeFeedbackTask,
};
use crate::ai::optimizer::{analyze_resume_for_ats, generate_keyword_suggestions, AtsAnalysisTask};
use crate::ai::questions::{
    categorize, fallback_bank, generate_interview_questions, ExperienceLevel,
    GenerateQuestionsTask,
};
use crate::ai::ranking::rank_candidate_for_job;
use crate::candidates::handlers::ranking_input;
use crate::candidates::store as candidates;
use crate::errors::AppError;
use crate::interviews::store::{self as interviews, InterviewFilter};
use crate::jobs::store as jobs;
use crate::models::CandidateRow;
use crate::state::AppState;

/// POST /api/v1/jobs/:job_id/rank/:candidate_id
///
/// Scores one candidate against one job and persists the score.
pub async fn handle_rank_candidate(
    State(state): State<AppState>,
    Path((job_id, candidate_id)): Path<(i32, i32)>,
) -> Result<Json<Value>, AppError> {
    let job = jobs::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    let candidate = candidates::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let description = job.description.unwrap_or_default();
    if description.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Job {job_id} has no description to rank against"
        )));
    }

    let result =
        rank_candidate_for_job(&state.executor, ranking_input(&candidate), &description).await;

    let score = result.fields["score"].as_i64().unwrap_or(0) as f64;
    candidates::update_score(&state.db, candidate_id, score).await?;

    Ok(Json(json!({
        "candidate_id": candidate_id,
        "job_id": job_id,
        "score": score,
        "details": Value::Object(result.into_tagged_fields()),
    })))
}

#[derive(Deserialize)]
pub struct GenerateQuestionsRequest {
    pub job_id: i32,
    pub candidate_id: i32,
    #[serde(default = "default_question_count")]
    pub count: usize,
    pub difficulty: Option<String>,
    pub question_types: Option<Vec<String>>,
}

fn default_question_count() -> usize {
    10
}

/// POST /api/v1/ai/generate-questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Json(req): Json<GenerateQuestionsRequest>,
) -> Result<Json<Value>, AppError> {
    if req.count == 0 || req.count > 20 {
        return Err(AppError::Validation(
            "'count' must be between 1 and 20".to_string(),
        ));
    }

    let job = jobs::get_job(&state.db, req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;
    let candidate = candidates::get_candidate(&state.db, req.candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", req.candidate_id)))?;

    let level = match &req.difficulty {
        Some(difficulty) => ExperienceLevel::from_difficulty(difficulty).ok_or_else(|| {
            AppError::Validation(format!(
                "unknown difficulty '{difficulty}', expected easy|medium|hard"
            ))
        })?,
        None => level_from_parsed(&candidate),
    };

    let question_types = req.question_types.unwrap_or_else(|| {
        vec![
            "technical".to_string(),
            "behavioral".to_string(),
            "situational".to_string(),
        ]
    });

    let task = GenerateQuestionsTask {
        job_description: job.description.unwrap_or_default(),
        resume_text: candidate.resume_text.clone().unwrap_or_default(),
        skills: skills_from_parsed(&candidate),
        level,
        count: req.count,
        question_types,
    };

    let mut out = generate_interview_questions(&state.executor, task).await;
    out.insert("candidate_id".to_string(), json!(req.candidate_id));
    out.insert("job_id".to_string(), json!(req.job_id));
    Ok(Json(Value::Object(out)))
}

/// GET /api/v1/ai/question-templates/:level
///
/// Serves the static question bank for a tier, without touching the model.
pub async fn handle_question_templates(
    Path(level): Path<String>,
) -> Result<Json<Value>, AppError> {
    let level = ExperienceLevel::parse(&level).ok_or_else(|| {
        AppError::Validation(format!(
            "unknown experience level '{level}', expected junior|mid|senior"
        ))
    })?;

    let questions = fallback_bank(level, 5);
    Ok(Json(json!({
        "experience_level": level.as_str(),
        "total_questions": questions.len(),
        "categorized": categorize(&questions),
        "questions": questions,
    })))
}

#[derive(Deserialize)]
pub struct AnalyzeFeedbackRequest {
    pub interview_notes: String,
}

/// POST /api/v1/ai/interviews/:id/analyze-feedback
///
/// Stores the submitted notes on the interview, then analyzes them in the
/// context of the candidate's resume and the job description.
pub async fn handle_analyze_feedback(
    State(state): State<AppState>,
    Path(interview_id): Path<i32>,
    Json(req): Json<AnalyzeFeedbackRequest>,
) -> Result<Json<Value>, AppError> {
    if req.interview_notes.trim().is_empty() {
        return Err(AppError::Validation(
            "'interview_notes' must not be empty".to_string(),
        ));
    }

    let interview = interviews::get_interview(&state.db, interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;
    let candidate = candidates::get_candidate(&state.db, interview.candidate_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Candidate {} not found", interview.candidate_id))
        })?;

    let job = match interview.job_id {
        Some(job_id) => jobs::get_job(&state.db, job_id).await?,
        None => None,
    };
    let job_title = job
        .as_ref()
        .map(|j| j.title.clone())
        .unwrap_or_else(|| "the position".to_string());

    interviews::update_interview_notes(&state.db, interview_id, &req.interview_notes).await?;

    let task = AnalyzeFeedbackTask {
        interview_notes: req.interview_notes,
        candidate_name: candidate.name.clone(),
        job_title,
        candidate_resume: candidate.resume_text.clone(),
        job_description: job.and_then(|j| j.description),
    };
    let result = analyze_interview_feedback(&state.executor, task).await;

    let mut out = result.into_tagged_fields();
    out.insert("interview_id".to_string(), json!(interview_id));
    out.insert("candidate_id".to_string(), json!(candidate.id));
    Ok(Json(Value::Object(out)))
}

/// GET /api/v1/ai/candidates/:id/feedback-summary
///
/// Consolidates notes from every interview round the candidate has had.
pub async fn handle_feedback_summary(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let candidate = candidates::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let rounds: Vec<String> = interviews::list_interviews(
        &state.db,
        InterviewFilter {
            candidate_id: Some(candidate_id),
            ..Default::default()
        },
        0,
        100,
    )
    .await?
    .into_iter()
    .filter_map(|i| i.notes)
    .filter(|notes| !notes.trim().is_empty())
    .collect();

    if rounds.is_empty() {
        return Err(AppError::Validation(format!(
            "Candidate {candidate_id} has no interviews with notes"
        )));
    }

    let result =
        summarize_multiple_interviews(&state.executor, &rounds, &candidate.name, "the position")
            .await;

    let mut out = result.into_tagged_fields();
    out.insert("candidate_id".to_string(), json!(candidate_id));
    out.insert("interviews_analyzed".to_string(), json!(rounds.len()));
    Ok(Json(Value::Object(out)))
}

#[derive(Deserialize, Default)]
pub struct OptimizeResumeRequest {
    pub target_job_title: Option<String>,
    pub job_description: Option<String>,
}

/// POST /api/v1/candidates/:id/optimize-resume
///
/// ATS compatibility analysis of the candidate's stored resume, plus keyword
/// gap suggestions when a job description is supplied.
pub async fn handle_optimize_resume(
    State(state): State<AppState>,
    Path(candidate_id): Path<i32>,
    Json(req): Json<OptimizeResumeRequest>,
) -> Result<Json<Value>, AppError> {
    let candidate = candidates::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let resume_text = resume_text_for(&candidate).ok_or_else(|| {
        AppError::Validation(format!(
            "Candidate {candidate_id} has no resume on file"
        ))
    })?;

    let keyword_suggestions = match &req.job_description {
        Some(jd) if !jd.trim().is_empty() => {
            generate_keyword_suggestions(&state.executor, jd, &resume_text).await
        }
        _ => vec![],
    };

    let task = AtsAnalysisTask {
        resume_text,
        candidate_name: candidate.name.clone(),
        target_job_title: req.target_job_title,
        job_description: req.job_description,
    };
    let result = analyze_resume_for_ats(&state.executor, task).await;

    let mut out = result.into_tagged_fields();
    out.insert("candidate_id".to_string(), json!(candidate_id));
    out.insert(
        "keyword_suggestions".to_string(),
        Value::Array(keyword_suggestions),
    );
    Ok(Json(Value::Object(out)))
}

/// Prefers the raw extracted resume text; renders a plain-text resume from
/// the parsed record when only structured data survived.
fn resume_text_for(candidate: &CandidateRow) -> Option<String> {
    if let Some(text) = &candidate.resume_text {
        if !text.trim().is_empty() {
            return Some(text.clone());
        }
    }
    candidate.parsed_json.as_ref().map(render_parsed_resume)
}

fn render_parsed_resume(parsed: &Value) -> String {
    let mut sections = vec![];

    if let Some(summary) = parsed.get("summary").and_then(Value::as_str) {
        if !summary.is_empty() {
            sections.push(format!("Summary:\n{summary}"));
        }
    }
    if let Some(skills) = parsed.get("skills").and_then(Value::as_array) {
        let names: Vec<&str> = skills.iter().filter_map(Value::as_str).collect();
        if !names.is_empty() {
            sections.push(format!("Skills: {}", names.join(", ")));
        }
    }
    for (key, heading) in [("experience", "Experience"), ("education", "Education")] {
        if let Some(entries) = parsed.get(key).and_then(Value::as_array) {
            let lines: Vec<String> = entries
                .iter()
                .map(|entry| match entry {
                    Value::Object(fields) => fields
                        .values()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => other.to_string(),
                })
                .filter(|line| !line.is_empty())
                .collect();
            if !lines.is_empty() {
                sections.push(format!("{heading}:\n{}", lines.join("\n")));
            }
        }
    }

    sections.join("\n\n")
}

/// Tier inference from parsed resume data. Prefers an explicit
/// `years_of_experience` field, then the number of experience entries.
fn level_from_parsed(candidate: &CandidateRow) -> ExperienceLevel {
    let Some(parsed) = &candidate.parsed_json else {
        return ExperienceLevel::Mid;
    };
    if let Some(years) = parsed.get("years_of_experience").and_then(Value::as_i64) {
        return ExperienceLevel::from_years(years);
    }
    if let Some(entries) = parsed.get("experience").and_then(Value::as_array) {
        return ExperienceLevel::from_years(entries.len() as i64 * 2);
    }
    ExperienceLevel::Mid
}

fn skills_from_parsed(candidate: &CandidateRow) -> Vec<String> {
    candidate
        .parsed_json
        .as_ref()
        .and_then(|p| p.get("skills"))
        .and_then(Value::as_array)
        .map(|skills| {
            skills
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate(parsed: Option<Value>, resume_text: Option<&str>) -> CandidateRow {
        CandidateRow {
            id: 1,
            name: "Ada".to_string(),
            email: None,
            phone: None,
            resume_text: resume_text.map(str::to_string),
            parsed_json: parsed,
            score: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_resume_text_prefers_raw_text() {
        let c = candidate(Some(json!({"summary": "parsed"})), Some("raw resume"));
        assert_eq!(resume_text_for(&c).unwrap(), "raw resume");
    }

    #[test]
    fn test_resume_text_renders_parsed_when_raw_missing() {
        let c = candidate(
            Some(json!({
                "summary": "Engineer",
                "skills": ["rust", "sql"],
                "experience": [{"title": "Dev", "company": "Acme"}],
            })),
            None,
        );
        let text = resume_text_for(&c).unwrap();
        assert!(text.contains("Summary:\nEngineer"));
        assert!(text.contains("Skills: rust, sql"));
        assert!(text.contains("Dev, Acme"));
    }

    #[test]
    fn test_resume_text_none_when_nothing_stored() {
        let c = candidate(None, Some("   "));
        assert!(resume_text_for(&c).is_none());
    }

    #[test]
    fn test_level_from_explicit_years() {
        let c = candidate(Some(json!({"years_of_experience": 8})), None);
        assert_eq!(level_from_parsed(&c), ExperienceLevel::Senior);
    }

    #[test]
    fn test_level_defaults_to_mid_without_parsed_data() {
        let c = candidate(None, None);
        assert_eq!(level_from_parsed(&c), ExperienceLevel::Mid);
    }

    #[test]
    fn test_skills_from_parsed_filters_non_strings() {
        let c = candidate(Some(json!({"skills": ["rust", 7, "sql"]})), None);
        assert_eq!(skills_from_parsed(&c), vec!["rust", "sql"]);
    }

    #[test]
    fn test_question_count_defaults_to_ten() {
        let req: GenerateQuestionsRequest =
            serde_json::from_value(json!({"job_id": 1, "candidate_id": 2})).unwrap();
        assert_eq!(req.count, 10);
    }
}
