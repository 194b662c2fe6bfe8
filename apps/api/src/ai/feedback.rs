//! Interview feedback analysis task.
//!
//! The fallback replaces the model with keyword-count sentiment over the
//! notes: recommendation flips to hire/no-hire only when one polarity leads
//! by more than two hits, and confidence is a linear function of the margin.

use serde_json::{json, Map, Value};

use crate::ai::executor::{AiTask, ModelParams, TaskExecutor, TaskResult};
use crate::ai::prompts::{context_block, JSON_ONLY_NOTE};
use crate::ai::schema::{truncate_chars, FieldSpec};

const FEEDBACK_SYSTEM: &str = "You are an experienced hiring manager and HR professional. \
    Analyze interview feedback objectively and provide actionable insights. \
    Always respond with valid JSON only.";

const CONTEXT_BUDGET: usize = 500;
const COMBINED_NOTES_BUDGET: usize = 2000;

const FEEDBACK_SCHEMA: &[FieldSpec] = &[
    FieldSpec::str_list("strengths", 10, 300),
    FieldSpec::str_list("weaknesses", 10, 300),
    FieldSpec::str("recommendation", 20),
    FieldSpec::int("confidence_score", 0, 0, 100),
    FieldSpec::str("reasoning", 1000),
    FieldSpec::str_list("next_steps", 5, 300),
    FieldSpec::str("overall_assessment", 1000),
    FieldSpec::int("technical_skills_rating", 3, 1, 5),
    FieldSpec::int("communication_skills_rating", 3, 1, 5),
    FieldSpec::int("culture_fit_rating", 3, 1, 5),
];

const POSITIVE_KEYWORDS: &[&str] = &[
    "excellent",
    "great",
    "strong",
    "impressive",
    "skilled",
    "knowledgeable",
    "experienced",
    "professional",
    "confident",
    "good communication",
    "team player",
    "problem solver",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "weak",
    "lacking",
    "inexperienced",
    "poor",
    "struggled",
    "unclear",
    "unprepared",
    "not suitable",
    "concerns",
    "red flag",
];

pub struct AnalyzeFeedbackTask {
    pub interview_notes: String,
    pub candidate_name: String,
    pub job_title: String,
    pub candidate_resume: Option<String>,
    pub job_description: Option<String>,
}

impl AiTask for AnalyzeFeedbackTask {
    fn name(&self) -> &'static str {
        "analyze_feedback"
    }

    fn system_prompt(&self) -> &'static str {
        FEEDBACK_SYSTEM
    }

    fn params(&self) -> ModelParams {
        // Low temperature for consistent analysis.
        ModelParams {
            temperature: 0.3,
            max_tokens: 1000,
        }
    }

    fn schema(&self) -> &'static [FieldSpec] {
        FEEDBACK_SCHEMA
    }

    fn build_prompt(&self) -> String {
        let job_ctx = context_block(
            "Job Requirements",
            self.job_description.as_deref(),
            CONTEXT_BUDGET,
        );
        let resume_ctx = context_block(
            "Candidate Background",
            self.candidate_resume.as_deref(),
            CONTEXT_BUDGET,
        );
        format!(
            "Job Title: {job_title}\nCandidate: {candidate}\n{job_ctx}{resume_ctx}\n\
             Interview Notes/Feedback:\n{notes}\n\n\
             Analyze the interview feedback above and provide a comprehensive assessment. Extract:\n\
             1. Key strengths: specific positive attributes, skills, or behaviors demonstrated\n\
             2. Areas of concern/weaknesses: gaps, red flags, or areas needing improvement\n\
             3. Hiring recommendation: hire, maybe, or no-hire\n\
             4. Confidence level in the recommendation (0-100)\n\
             5. Brief reasoning for the recommendation\n\
             6. Suggested next steps\n\n\
             Format your response as JSON with this exact structure:\n\
             {{\n  \"strengths\": [\"...\"],\n  \"weaknesses\": [\"...\"],\n  \
             \"recommendation\": \"hire|maybe|no-hire\",\n  \"confidence_score\": 85,\n  \
             \"reasoning\": \"...\",\n  \"next_steps\": [\"...\"],\n  \
             \"overall_assessment\": \"...\",\n  \"technical_skills_rating\": 4,\n  \
             \"communication_skills_rating\": 5,\n  \"culture_fit_rating\": 4\n}}\n\n\
             {JSON_ONLY_NOTE}",
            job_title = self.job_title,
            candidate = self.candidate_name,
            notes = self.interview_notes,
        )
    }

    fn fallback(&self, _reason: &str) -> Map<String, Value> {
        keyword_sentiment_analysis(
            &self.interview_notes,
            &self.candidate_name,
            &self.job_title,
        )
    }
}

/// Deterministic keyword-count sentiment over interview notes.
pub fn keyword_sentiment_analysis(
    notes: &str,
    candidate_name: &str,
    job_title: &str,
) -> Map<String, Value> {
    let notes_lower = notes.to_lowercase();

    let positive = POSITIVE_KEYWORDS
        .iter()
        .filter(|kw| notes_lower.contains(*kw))
        .count() as i64;
    let negative = NEGATIVE_KEYWORDS
        .iter()
        .filter(|kw| notes_lower.contains(*kw))
        .count() as i64;

    let (recommendation, confidence) = if positive > negative + 2 {
        ("hire", (75 + positive * 5).min(95))
    } else if negative > positive + 2 {
        ("no-hire", (70 + negative * 5).min(90))
    } else {
        ("maybe", 60)
    };

    let strengths = if positive > 0 {
        json!([
            "Positive indicators found in interview feedback",
            "Candidate showed engagement during interview"
        ])
    } else {
        json!(["Limited positive feedback available"])
    };

    let weaknesses = if negative > 0 {
        json!([
            "Some concerns noted in feedback",
            "Further evaluation may be needed"
        ])
    } else {
        json!(["No major concerns identified"])
    };

    let next_step = match recommendation {
        "hire" => "Proceed with hiring process",
        "no-hire" => "Send rejection notice",
        _ => "Consider second interview",
    };

    let mut map = Map::new();
    map.insert("strengths".to_string(), strengths);
    map.insert("weaknesses".to_string(), weaknesses);
    map.insert("recommendation".to_string(), json!(recommendation));
    map.insert("confidence_score".to_string(), json!(confidence));
    map.insert(
        "reasoning".to_string(),
        json!(format!(
            "Based on keyword analysis of interview notes. Found {positive} positive and {negative} negative indicators."
        )),
    );
    map.insert(
        "next_steps".to_string(),
        json!(["Review detailed interview notes", next_step]),
    );
    map.insert(
        "overall_assessment".to_string(),
        json!(format!(
            "Analysis based on available interview notes for {candidate_name} applying for {job_title}. AI-powered analysis unavailable."
        )),
    );
    map.insert("technical_skills_rating".to_string(), json!(3));
    map.insert("communication_skills_rating".to_string(), json!(3));
    map.insert("culture_fit_rating".to_string(), json!(3));
    map
}

/// Analyzes one interview round.
pub async fn analyze_interview_feedback(
    executor: &TaskExecutor,
    task: AnalyzeFeedbackTask,
) -> TaskResult {
    executor.execute(&task).await
}

/// Consolidates feedback across multiple interview rounds. The rounds are
/// joined with a separator and analyzed as one document; the fallback is the
/// same keyword heuristic over the combined notes.
pub async fn summarize_multiple_interviews(
    executor: &TaskExecutor,
    rounds: &[String],
    candidate_name: &str,
    job_title: &str,
) -> TaskResult {
    let combined = rounds.join("\n\n=== Interview Round Separator ===\n\n");
    let task = AnalyzeFeedbackTask {
        interview_notes: truncate_chars(&combined, COMBINED_NOTES_BUDGET),
        candidate_name: candidate_name.to_string(),
        job_title: job_title.to_string(),
        candidate_resume: None,
        job_description: None,
    };
    executor.execute(&task).await
}
