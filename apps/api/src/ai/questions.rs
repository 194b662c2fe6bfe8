//! Interview question generation task.
//!
//! The model answers with a bare JSON array of question objects; `adapt`
//! wraps it under a `questions` key so normalization stays a schema fold.
//! The fallback is a static bank of five canned questions per experience
//! tier, sliced to the requested count.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::ai::executor::{AiTask, ModelParams, TaskExecutor};
use crate::ai::prompts::JSON_ONLY_NOTE;
use crate::ai::schema::{truncate_chars, FieldSpec};

const QUESTIONS_SYSTEM: &str = "You are an expert technical recruiter who generates \
    insightful interview questions. Always respond with valid JSON only.";

const RESUME_BUDGET: usize = 1500;
const MAX_QUESTIONS: usize = 20;

const QUESTIONS_SCHEMA: &[FieldSpec] = &[FieldSpec::object_list("questions", MAX_QUESTIONS)];

/// Experience tier a candidate is interviewed at. Also selects the canned
/// fallback bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "junior" => Some(ExperienceLevel::Junior),
            "mid" => Some(ExperienceLevel::Mid),
            "senior" => Some(ExperienceLevel::Senior),
            _ => None,
        }
    }

    /// Maps a requested difficulty onto a tier: easy/medium/hard.
    pub fn from_difficulty(difficulty: &str) -> Option<Self> {
        match difficulty.to_lowercase().as_str() {
            "easy" => Some(ExperienceLevel::Junior),
            "medium" => Some(ExperienceLevel::Mid),
            "hard" => Some(ExperienceLevel::Senior),
            _ => None,
        }
    }

    /// Infers a tier from years of experience in parsed resume data:
    /// <2 junior, >5 senior, otherwise mid.
    pub fn from_years(years: i64) -> Self {
        if years < 2 {
            ExperienceLevel::Junior
        } else if years > 5 {
            ExperienceLevel::Senior
        } else {
            ExperienceLevel::Mid
        }
    }
}

pub struct GenerateQuestionsTask {
    pub job_description: String,
    pub resume_text: String,
    pub skills: Vec<String>,
    pub level: ExperienceLevel,
    pub count: usize,
    pub question_types: Vec<String>,
}

impl AiTask for GenerateQuestionsTask {
    fn name(&self) -> &'static str {
        "generate_questions"
    }

    fn system_prompt(&self) -> &'static str {
        QUESTIONS_SYSTEM
    }

    fn params(&self) -> ModelParams {
        // Generative task: variety in questions is a feature.
        ModelParams {
            temperature: 0.7,
            max_tokens: 1500,
        }
    }

    fn schema(&self) -> &'static [FieldSpec] {
        QUESTIONS_SCHEMA
    }

    fn build_prompt(&self) -> String {
        let skills = if self.skills.is_empty() {
            "Not specified".to_string()
        } else {
            self.skills.join(", ")
        };
        let types = self.question_types.join(", ");
        let resume = truncate_chars(&self.resume_text, RESUME_BUDGET);
        format!(
            "Generate exactly {count} interview questions for a candidate.\n\n\
             Job Description:\n{job}\n\n\
             Candidate Skills: {skills}\n\
             Experience Level: {level}\n\
             Question Types Needed: {types}\n\n\
             Candidate Resume Summary:\n{resume}\n\n\
             The questions must:\n\
             1. Be relevant to the job requirements\n\
             2. Match the candidate's experience level\n\
             3. Include a mix of: {types}\n\
             4. Test both technical skills and problem-solving ability\n\
             5. Be specific and actionable (not generic)\n\n\
             Format your response as a JSON array with this structure:\n\
             [\n  {{\n    \"question\": \"The interview question text\",\n    \
             \"type\": \"technical|behavioral|situational|culture-fit\",\n    \
             \"difficulty\": \"easy|medium|hard\",\n    \
             \"category\": \"specific skill or topic\",\n    \
             \"follow_up\": \"optional follow-up question\"\n  }}\n]\n\n\
             {JSON_ONLY_NOTE}",
            count = self.count,
            job = self.job_description,
            level = self.level.as_str(),
        )
    }

    fn adapt(&self, value: Value) -> Value {
        match value {
            Value::Array(items) => json!({ "questions": items }),
            other => other,
        }
    }

    fn fallback(&self, _reason: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "questions".to_string(),
            Value::Array(fallback_bank(self.level, self.count)),
        );
        map
    }
}

/// Generates questions and assembles the caller-facing payload:
/// total count, flat list, per-type categorization, tier, and provenance.
pub async fn generate_interview_questions(
    executor: &TaskExecutor,
    task: GenerateQuestionsTask,
) -> Map<String, Value> {
    let level = task.level;
    let result = executor.execute(&task).await;

    let questions = result.fields["questions"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    let mut out = Map::new();
    out.insert("total_questions".to_string(), json!(questions.len()));
    out.insert("categorized".to_string(), categorize(&questions));
    out.insert("questions".to_string(), Value::Array(questions));
    out.insert("experience_level".to_string(), json!(level.as_str()));
    out.insert("model_used".to_string(), json!(result.model_used));
    out
}

/// Buckets questions by their `type` field. Unknown or missing types land in
/// `technical`.
pub fn categorize(questions: &[Value]) -> Value {
    let mut technical = vec![];
    let mut behavioral = vec![];
    let mut situational = vec![];
    let mut culture_fit = vec![];

    for q in questions {
        let q_type = q
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("technical")
            .to_lowercase()
            .replace('-', "_");
        match q_type.as_str() {
            "behavioral" => behavioral.push(q.clone()),
            "situational" => situational.push(q.clone()),
            "culture_fit" => culture_fit.push(q.clone()),
            _ => technical.push(q.clone()),
        }
    }

    json!({
        "technical": technical,
        "behavioral": behavioral,
        "situational": situational,
        "culture_fit": culture_fit,
    })
}

/// Static per-tier question bank used when the model is unavailable.
pub fn fallback_bank(level: ExperienceLevel, count: usize) -> Vec<Value> {
    let bank: &[(&str, &str, &str, &str)] = match level {
        ExperienceLevel::Junior => &[
            (
                "Tell me about a challenging project you worked on and how you approached it.",
                "behavioral",
                "easy",
                "Problem Solving",
            ),
            (
                "How do you stay updated with new technologies and best practices?",
                "behavioral",
                "easy",
                "Learning & Development",
            ),
            (
                "Describe a time when you had to debug a difficult issue. What was your approach?",
                "technical",
                "medium",
                "Debugging",
            ),
            (
                "How do you handle working on multiple tasks with tight deadlines?",
                "behavioral",
                "easy",
                "Time Management",
            ),
            (
                "What interests you most about this role and our company?",
                "culture_fit",
                "easy",
                "Motivation",
            ),
        ],
        ExperienceLevel::Mid => &[
            (
                "Describe your experience with design patterns. Which ones do you use most frequently?",
                "technical",
                "medium",
                "Architecture",
            ),
            (
                "Tell me about a time you had to make a technical trade-off decision.",
                "behavioral",
                "medium",
                "Decision Making",
            ),
            (
                "How do you approach code reviews? What do you look for?",
                "technical",
                "medium",
                "Code Quality",
            ),
            (
                "Describe a situation where you had to mentor a junior developer.",
                "behavioral",
                "medium",
                "Leadership",
            ),
            (
                "How do you balance technical debt with feature development?",
                "situational",
                "medium",
                "Project Management",
            ),
        ],
        ExperienceLevel::Senior => &[
            (
                "How do you approach system design for high-scale applications?",
                "technical",
                "hard",
                "System Design",
            ),
            (
                "Describe a situation where you influenced the technical direction of a project.",
                "behavioral",
                "hard",
                "Leadership",
            ),
            (
                "How do you evaluate and introduce new technologies to a team?",
                "situational",
                "hard",
                "Technology Leadership",
            ),
            (
                "Tell me about a time you had to resolve a conflict between team members.",
                "behavioral",
                "hard",
                "Conflict Resolution",
            ),
            (
                "How do you ensure code quality and maintainability in a large codebase?",
                "technical",
                "hard",
                "Code Quality",
            ),
        ],
    };

    bank.iter()
        .take(count)
        .map(|(question, q_type, difficulty, category)| {
            json!({
                "question": question,
                "type": q_type,
                "difficulty": difficulty,
                "category": category,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(level: ExperienceLevel, count: usize) -> GenerateQuestionsTask {
        GenerateQuestionsTask {
            job_description: "Backend engineer, Rust and Postgres".to_string(),
            resume_text: "Five years building services".to_string(),
            skills: vec!["rust".to_string(), "sql".to_string()],
            level,
            count,
            question_types: vec!["technical".to_string(), "behavioral".to_string()],
        }
    }

    #[test]
    fn test_prompt_mentions_count_level_and_skills() {
        let prompt = task(ExperienceLevel::Senior, 7).build_prompt();
        assert!(prompt.contains("exactly 7 interview questions"));
        assert!(prompt.contains("Experience Level: senior"));
        assert!(prompt.contains("rust, sql"));
    }

    #[test]
    fn test_adapt_wraps_bare_array() {
        let t = task(ExperienceLevel::Mid, 5);
        let adapted = t.adapt(json!([{"question": "q"}]));
        assert!(adapted["questions"].is_array());
    }

    #[test]
    fn test_adapt_leaves_objects_alone() {
        let t = task(ExperienceLevel::Mid, 5);
        let adapted = t.adapt(json!({"questions": [{"question": "q"}]}));
        assert_eq!(adapted["questions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_fallback_bank_sliced_to_requested_count() {
        assert_eq!(fallback_bank(ExperienceLevel::Junior, 3).len(), 3);
        assert_eq!(fallback_bank(ExperienceLevel::Mid, 5).len(), 5);
        // Bank holds 5 per tier; larger requests get everything available.
        assert_eq!(fallback_bank(ExperienceLevel::Senior, 10).len(), 5);
    }

    #[test]
    fn test_fallback_bank_differs_per_tier() {
        let junior = fallback_bank(ExperienceLevel::Junior, 5);
        let senior = fallback_bank(ExperienceLevel::Senior, 5);
        assert_ne!(junior[0]["question"], senior[0]["question"]);
        assert_eq!(senior[0]["difficulty"], json!("hard"));
    }

    #[test]
    fn test_categorize_buckets_by_type() {
        let questions = vec![
            json!({"question": "a", "type": "technical"}),
            json!({"question": "b", "type": "behavioral"}),
            json!({"question": "c", "type": "culture-fit"}),
            json!({"question": "d"}),
        ];
        let cat = categorize(&questions);
        assert_eq!(cat["technical"].as_array().unwrap().len(), 2); // "a" + untyped "d"
        assert_eq!(cat["behavioral"].as_array().unwrap().len(), 1);
        assert_eq!(cat["culture_fit"].as_array().unwrap().len(), 1);
        assert_eq!(cat["situational"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_experience_level_from_difficulty() {
        assert_eq!(
            ExperienceLevel::from_difficulty("easy"),
            Some(ExperienceLevel::Junior)
        );
        assert_eq!(
            ExperienceLevel::from_difficulty("HARD"),
            Some(ExperienceLevel::Senior)
        );
        assert_eq!(ExperienceLevel::from_difficulty("extreme"), None);
    }

    #[test]
    fn test_experience_level_from_years() {
        assert_eq!(ExperienceLevel::from_years(0), ExperienceLevel::Junior);
        assert_eq!(ExperienceLevel::from_years(3), ExperienceLevel::Mid);
        assert_eq!(ExperienceLevel::from_years(9), ExperienceLevel::Senior);
    }

    #[test]
    fn test_experience_level_parse() {
        assert_eq!(ExperienceLevel::parse("Senior"), Some(ExperienceLevel::Senior));
        assert_eq!(ExperienceLevel::parse("principal"), None);
    }
}
