//! Resume ATS optimization tasks: the full compatibility analysis and the
//! narrower missing-keyword suggestion task.
//!
//! The ATS fallback scores section presence and keyword hits: base 50, plus
//! contact +10, summary +5, skills +10, experience +10, education +5, plus
//! min(tech_hits*2, 10) and min(soft_hits*1, 10), capped at 95.

use serde_json::{json, Map, Value};

use crate::ai::executor::{AiTask, ModelParams, TaskExecutor, TaskResult};
use crate::ai::prompts::{context_block, JSON_ONLY_NOTE};
use crate::ai::schema::{truncate_chars, FieldSpec};

const ATS_SYSTEM: &str = "You are an expert resume reviewer and ATS specialist. \
    Provide actionable, specific feedback to improve resume quality and ATS \
    compatibility. Always respond with valid JSON only.";

const KEYWORDS_SYSTEM: &str = "You are an expert at keyword extraction for ATS \
    optimization. Identify the most important missing keywords. \
    Always respond with valid JSON only.";

const RESUME_BUDGET: usize = 3000;
const JOB_BUDGET: usize = 800;
const KEYWORD_INPUT_BUDGET: usize = 1500;

const ATS_SCHEMA: &[FieldSpec] = &[
    FieldSpec::int("ats_score", 0, 0, 100),
    FieldSpec::object("score_breakdown"),
    FieldSpec::str_list("missing_keywords", 10, 100),
    FieldSpec::object_list("recommended_keywords", 10),
    FieldSpec::str_list("formatting_issues", 10, 300),
    FieldSpec::object_list("improvement_suggestions", 10),
    FieldSpec::str_list("strengths", 10, 300),
    FieldSpec::object_list("section_recommendations", 10),
    FieldSpec::str("overall_feedback", 1000),
];

const KEYWORDS_SCHEMA: &[FieldSpec] = &[FieldSpec::object_list("keywords", 10)];

const TECHNICAL_KEYWORDS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "node.js",
    "aws",
    "docker",
    "kubernetes",
    "sql",
    "git",
    "agile",
    "ci/cd",
    "api",
    "microservices",
];

const SOFT_SKILLS: &[&str] = &[
    "leadership",
    "communication",
    "teamwork",
    "problem-solving",
    "project management",
    "analytical",
    "creative",
];

pub struct AtsAnalysisTask {
    pub resume_text: String,
    pub candidate_name: String,
    pub target_job_title: Option<String>,
    pub job_description: Option<String>,
}

impl AiTask for AtsAnalysisTask {
    fn name(&self) -> &'static str {
        "ats_analysis"
    }

    fn system_prompt(&self) -> &'static str {
        ATS_SYSTEM
    }

    fn params(&self) -> ModelParams {
        ModelParams {
            temperature: 0.4,
            max_tokens: 1500,
        }
    }

    fn schema(&self) -> &'static [FieldSpec] {
        ATS_SCHEMA
    }

    fn build_prompt(&self) -> String {
        let target = self
            .target_job_title
            .as_deref()
            .map(|t| format!("Target Position: {t}\n"))
            .unwrap_or_default();
        let job_ctx = context_block(
            "Target Job Description",
            self.job_description.as_deref(),
            JOB_BUDGET,
        );
        let resume = truncate_chars(&self.resume_text, RESUME_BUDGET);
        format!(
            "Candidate: {name}\n{target}{job_ctx}\n\
             Resume Text:\n{resume}\n\n\
             Analyze this resume for ATS (Applicant Tracking System) compatibility and \
             provide comprehensive feedback: an overall 0-100 score with a breakdown, \
             missing keywords, formatting issues, specific improvement suggestions, \
             existing strengths, and section organization recommendations.\n\n\
             Return a JSON object with this exact structure:\n\
             {{\n  \"ats_score\": 75,\n  \
             \"score_breakdown\": {{\"keyword_optimization\": 80, \"formatting\": 70, \
             \"structure\": 75, \"completeness\": 80, \"relevance\": 70}},\n  \
             \"missing_keywords\": [\"...\"],\n  \
             \"recommended_keywords\": [{{\"keyword\": \"...\", \"category\": \"...\", \
             \"priority\": \"high|medium|low\", \"reason\": \"...\"}}],\n  \
             \"formatting_issues\": [\"...\"],\n  \
             \"improvement_suggestions\": [{{\"category\": \"...\", \"suggestion\": \"...\", \
             \"impact\": \"high|medium|low\", \"priority\": 1}}],\n  \
             \"strengths\": [\"...\"],\n  \
             \"section_recommendations\": [{{\"section\": \"...\", \"recommendation\": \"...\", \
             \"priority\": \"high|medium|low\"}}],\n  \
             \"overall_feedback\": \"...\"\n}}\n\n\
             {JSON_ONLY_NOTE}",
            name = self.candidate_name,
        )
    }

    fn fallback(&self, _reason: &str) -> Map<String, Value> {
        heuristic_ats_analysis(&self.resume_text)
    }
}

/// Deterministic section/keyword scoring used when the model is unavailable.
pub fn heuristic_ats_analysis(resume_text: &str) -> Map<String, Value> {
    let resume_lower = resume_text.to_lowercase();
    let word_count = resume_text.split_whitespace().count();

    let has_summary = ["summary", "objective", "profile"]
        .iter()
        .any(|w| resume_lower.contains(w));
    let has_skills = resume_lower.contains("skill");
    let has_experience = ["experience", "employment", "work history"]
        .iter()
        .any(|w| resume_lower.contains(w));
    let has_education = resume_lower.contains("education");
    let has_contact = ["email", "@", "phone", "linkedin"]
        .iter()
        .any(|w| resume_lower.contains(w));

    let tech_matches = TECHNICAL_KEYWORDS
        .iter()
        .filter(|kw| resume_lower.contains(*kw))
        .count() as i64;
    let soft_matches = SOFT_SKILLS
        .iter()
        .filter(|kw| resume_lower.contains(*kw))
        .count() as i64;

    let mut score: i64 = 50;
    if has_contact {
        score += 10;
    }
    if has_summary {
        score += 5;
    }
    if has_skills {
        score += 10;
    }
    if has_experience {
        score += 10;
    }
    if has_education {
        score += 5;
    }
    score += (tech_matches * 2).min(10);
    score += soft_matches.min(10);
    let ats_score = score.min(95);

    let mut missing_sections: Vec<&str> = vec![];
    if !has_summary {
        missing_sections.push("Professional summary or objective");
    }
    if !has_skills {
        missing_sections.push("Dedicated skills section");
    }

    let missing_keywords: Vec<&str> = TECHNICAL_KEYWORDS
        .iter()
        .take(5)
        .filter(|kw| !resume_lower.contains(*kw))
        .copied()
        .collect();

    let recommended_keywords: Vec<Value> = TECHNICAL_KEYWORDS
        .iter()
        .take(3)
        .filter(|kw| !resume_lower.contains(*kw))
        .map(|kw| {
            json!({
                "keyword": kw,
                "category": "Technical Skill",
                "priority": "medium",
                "reason": "Common industry requirement",
            })
        })
        .collect();

    let mut improvement_suggestions: Vec<Value> = missing_sections
        .iter()
        .map(|section| {
            json!({
                "category": "Structure",
                "suggestion": section,
                "impact": "high",
                "priority": 1,
            })
        })
        .collect();
    improvement_suggestions.push(json!({
        "category": "Content",
        "suggestion": "Add quantifiable achievements to experience",
        "impact": "medium",
        "priority": 2,
    }));

    let strengths = if tech_matches > 0 {
        json!([
            format!("Resume length is appropriate ({word_count} words)"),
            "Contains relevant keywords",
        ])
    } else {
        json!(["Resume structure detected"])
    };

    let section_recommendations: Vec<Value> = if missing_sections.is_empty() {
        vec![
            json!({
                "section": "Experience",
                "recommendation": "Consider adding measurable achievements",
                "priority": "medium",
            }),
            json!({
                "section": "Contact",
                "recommendation": "Update contact information",
                "priority": "low",
            }),
        ]
    } else {
        missing_sections
            .iter()
            .map(|section| {
                json!({
                    "section": section,
                    "recommendation": format!("Add {section} section to improve ATS compatibility"),
                    "priority": "high",
                })
            })
            .collect()
    };

    let mut map = Map::new();
    map.insert("ats_score".to_string(), json!(ats_score));
    map.insert(
        "score_breakdown".to_string(),
        json!({
            "keyword_optimization": (tech_matches * 10).min(80),
            "formatting": 70,
            "structure": if has_experience { 75 } else { 50 },
            "completeness": if has_contact { 80 } else { 60 },
            "relevance": 65,
        }),
    );
    map.insert("missing_keywords".to_string(), json!(missing_keywords));
    map.insert(
        "recommended_keywords".to_string(),
        Value::Array(recommended_keywords),
    );
    map.insert(
        "formatting_issues".to_string(),
        json!([
            "Ensure consistent formatting throughout",
            "Use standard section headers",
            "Keep formatting simple for ATS compatibility",
        ]),
    );
    map.insert(
        "improvement_suggestions".to_string(),
        Value::Array(improvement_suggestions),
    );
    map.insert("strengths".to_string(), strengths);
    map.insert(
        "section_recommendations".to_string(),
        Value::Array(section_recommendations),
    );
    map.insert(
        "overall_feedback".to_string(),
        json!(format!(
            "Resume has a baseline ATS score of {ats_score}/100. Focus on adding missing \
             sections and relevant keywords to improve compatibility with applicant \
             tracking systems."
        )),
    );
    map
}

/// Runs the full ATS compatibility analysis.
pub async fn analyze_resume_for_ats(
    executor: &TaskExecutor,
    task: AtsAnalysisTask,
) -> TaskResult {
    executor.execute(&task).await
}

/// Keyword-gap extraction: which job-description keywords are missing from
/// the resume. Fallback is an empty list — no invented keywords.
pub struct KeywordSuggestionTask {
    pub job_description: String,
    pub resume_text: String,
}

impl AiTask for KeywordSuggestionTask {
    fn name(&self) -> &'static str {
        "keyword_suggestions"
    }

    fn system_prompt(&self) -> &'static str {
        KEYWORDS_SYSTEM
    }

    fn params(&self) -> ModelParams {
        ModelParams {
            temperature: 0.3,
            max_tokens: 800,
        }
    }

    fn schema(&self) -> &'static [FieldSpec] {
        KEYWORDS_SCHEMA
    }

    fn build_prompt(&self) -> String {
        let job = truncate_chars(&self.job_description, KEYWORD_INPUT_BUDGET);
        let resume = truncate_chars(&self.resume_text, KEYWORD_INPUT_BUDGET);
        format!(
            "Compare this job description with the candidate's resume and identify \
             missing keywords.\n\n\
             Job Description:\n{job}\n\n\
             Current Resume:\n{resume}\n\n\
             Identify the top 10 most important keywords/skills from the job description \
             that are missing or underrepresented in the resume.\n\n\
             Return a JSON array:\n\
             [{{\"keyword\": \"...\", \"category\": \"Technical Skill|Soft Skill|Tool|Certification\", \
             \"priority\": \"high|medium|low\", \"reason\": \"...\", \"context\": \"...\"}}]\n\n\
             {JSON_ONLY_NOTE}"
        )
    }

    fn adapt(&self, value: Value) -> Value {
        match value {
            Value::Array(items) => json!({ "keywords": items }),
            other => other,
        }
    }

    fn fallback(&self, _reason: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("keywords".to_string(), json!([]));
        map
    }
}

/// Suggests missing keywords for a resume against a job description.
pub async fn generate_keyword_suggestions(
    executor: &TaskExecutor,
    job_description: &str,
    resume_text: &str,
) -> Vec<Value> {
    let result = executor
        .execute(&KeywordSuggestionTask {
            job_description: job_description.to_string(),
            resume_text: resume_text.to_string(),
        })
        .await;
    result.fields["keywords"].as_array().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::schema::normalize;

    const FULL_RESUME: &str = "Summary: seasoned engineer.\n\
        Skills: python, docker, kubernetes.\n\
        Experience: eight years at Acme.\n\
        Education: BSc Computer Science.\n\
        Contact: ada@example.com";

    #[test]
    fn test_complete_resume_scores_at_least_85() {
        // All five sections plus "@" plus 3 technical keywords:
        // 50 + 10 + 5 + 10 + 10 + 5 + 6 = 96, capped at 95.
        let result = heuristic_ats_analysis(FULL_RESUME);
        let score = result["ats_score"].as_i64().unwrap();
        assert!(score >= 85, "expected >= 85, got {score}");
        assert!(score <= 95);
    }

    #[test]
    fn test_score_capped_at_95() {
        let loaded = format!("{FULL_RESUME}\nleadership communication teamwork analytical \
            java javascript react aws sql git agile api microservices node.js ci/cd");
        let result = heuristic_ats_analysis(&loaded);
        assert_eq!(result["ats_score"], json!(95));
    }

    #[test]
    fn test_bare_resume_scores_base_50() {
        let result = heuristic_ats_analysis("just some text with nothing recognizable");
        assert_eq!(result["ats_score"], json!(50));
    }

    #[test]
    fn test_missing_sections_drive_suggestions() {
        let result = heuristic_ats_analysis("Experience: ten years. Contact: a@b.c");
        let suggestions = result["improvement_suggestions"].as_array().unwrap();
        let texts: Vec<&str> = suggestions
            .iter()
            .filter_map(|s| s["suggestion"].as_str())
            .collect();
        assert!(texts.iter().any(|t| t.contains("summary")));
        assert!(texts.iter().any(|t| t.contains("skills")));
    }

    #[test]
    fn test_missing_keywords_exclude_present_ones() {
        let result = heuristic_ats_analysis("python and javascript everywhere");
        let missing = result["missing_keywords"].as_array().unwrap();
        assert!(!missing.iter().any(|k| k == "python"));
        assert!(!missing.iter().any(|k| k == "javascript"));
    }

    #[test]
    fn test_heuristic_is_deterministic() {
        assert_eq!(
            heuristic_ats_analysis(FULL_RESUME),
            heuristic_ats_analysis(FULL_RESUME)
        );
    }

    #[test]
    fn test_fallback_conforms_to_schema() {
        let task = AtsAnalysisTask {
            resume_text: FULL_RESUME.to_string(),
            candidate_name: "Ada".to_string(),
            target_job_title: None,
            job_description: None,
        };
        let fields = normalize(task.schema(), Value::Object(task.fallback("down")));
        for spec in ATS_SCHEMA {
            assert!(fields.contains_key(spec.name), "{}", spec.name);
        }
    }

    #[test]
    fn test_ats_prompt_includes_resume_and_target() {
        let task = AtsAnalysisTask {
            resume_text: "my resume body".to_string(),
            candidate_name: "Ada".to_string(),
            target_job_title: Some("Platform Engineer".to_string()),
            job_description: Some("Kubernetes all day".to_string()),
        };
        let prompt = task.build_prompt();
        assert!(prompt.contains("my resume body"));
        assert!(prompt.contains("Target Position: Platform Engineer"));
        assert!(prompt.contains("Kubernetes all day"));
    }

    #[test]
    fn test_keyword_task_wraps_array_and_falls_back_empty() {
        let task = KeywordSuggestionTask {
            job_description: "jd".to_string(),
            resume_text: "resume".to_string(),
        };
        let adapted = task.adapt(json!([{"keyword": "rust"}]));
        assert!(adapted["keywords"].is_array());
        let fields = normalize(task.schema(), Value::Object(task.fallback("down")));
        assert_eq!(fields["keywords"], json!([]));
    }
}
