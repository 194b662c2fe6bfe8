//! Candidate-to-job ranking task.

use serde_json::{json, Map, Value};

use crate::ai::executor::{AiTask, ModelParams, TaskExecutor, TaskResult};
use crate::ai::prompts::JSON_ONLY_NOTE;
use crate::ai::schema::{truncate_chars, FieldSpec};

const RANKING_SYSTEM: &str = "You are a hiring assistant. Compare candidates to job \
    descriptions objectively. Always respond with valid JSON only.";

/// Parsed candidate JSON is embedded verbatim; very long profiles are
/// truncated to bound token cost.
const CANDIDATE_BUDGET: usize = 3000;
const JOB_BUDGET: usize = 2000;

const RANKING_SCHEMA: &[FieldSpec] = &[
    FieldSpec::int("score", 0, 0, 100),
    FieldSpec::str_list("top_matches", 3, 200),
    FieldSpec::str_list("concerns", 3, 200),
    FieldSpec::str("reason", 500),
];

pub struct RankCandidateTask {
    pub candidate_parsed: Value,
    pub job_description: String,
}

impl AiTask for RankCandidateTask {
    fn name(&self) -> &'static str {
        "rank_candidate"
    }

    fn system_prompt(&self) -> &'static str {
        RANKING_SYSTEM
    }

    fn params(&self) -> ModelParams {
        // Determinism valued over creativity for scoring.
        ModelParams {
            temperature: 0.0,
            max_tokens: 300,
        }
    }

    fn schema(&self) -> &'static [FieldSpec] {
        RANKING_SCHEMA
    }

    fn build_prompt(&self) -> String {
        let candidate = truncate_chars(&self.candidate_parsed.to_string(), CANDIDATE_BUDGET);
        let job = truncate_chars(&self.job_description, JOB_BUDGET);
        format!(
            "Compare this candidate to the job description.\n\
             Return ONLY valid JSON with these keys:\n\
             - score: integer 0-100 (higher is better)\n\
             - top_matches: list of up to 3 short strings describing best matches\n\
             - concerns: list of up to 3 short strings describing gaps\n\
             - reason: one short sentence explaining the score\n\n\
             Candidate parsed JSON (truncated if long):\n{candidate}\n\n\
             Job description:\n\"\"\"{job}\"\"\"\n\n\
             {JSON_ONLY_NOTE}"
        )
    }

    fn fallback(&self, reason: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("score".to_string(), json!(0));
        map.insert("top_matches".to_string(), json!([]));
        map.insert(
            "concerns".to_string(),
            json!(["could not get AI ranking"]),
        );
        map.insert("reason".to_string(), json!(format!("error: {reason}")));
        map
    }
}

/// Ranks a candidate against a job description. Always returns a usable
/// result; callers check `is_fallback` before trusting the score.
pub async fn rank_candidate_for_job(
    executor: &TaskExecutor,
    candidate_parsed: Value,
    job_description: &str,
) -> TaskResult {
    executor
        .execute(&RankCandidateTask {
            candidate_parsed,
            job_description: job_description.to_string(),
        })
        .await
}
