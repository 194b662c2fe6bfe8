//! Structured field extraction from raw resume text.
//!
//! The fallback never invents data: it returns an empty structured record
//! with only a whitespace-normalized summary taken from the raw text.

use serde_json::{json, Map, Value};

use crate::ai::executor::{AiTask, ModelParams, TaskExecutor, TaskResult};
use crate::ai::prompts::JSON_ONLY_NOTE;
use crate::ai::schema::{truncate_chars, FieldSpec};

const EXTRACTION_SYSTEM: &str = "You are an expert resume parser. Extract structured \
    information from resumes and return valid JSON only.";

/// Resumes longer than this are cut before prompting to save tokens.
const RESUME_BUDGET: usize = 6000;
/// Inputs shorter than this carry no extractable structure; skip the model.
const MIN_RESUME_CHARS: usize = 50;
const FALLBACK_SUMMARY_CHARS: usize = 500;

const EXTRACTION_SCHEMA: &[FieldSpec] = &[
    FieldSpec::object("contact"),
    FieldSpec::str("summary", 1000),
    FieldSpec::str_list("skills", 50, 100),
    FieldSpec::object_list("experience", 20),
    FieldSpec::object_list("education", 10),
    FieldSpec::str_list("certifications", 20, 200),
    FieldSpec::str_list("languages", 10, 50),
    FieldSpec::object_list("projects", 15),
];

pub struct ExtractResumeFieldsTask {
    pub resume_text: String,
}

impl AiTask for ExtractResumeFieldsTask {
    fn name(&self) -> &'static str {
        "extract_resume_fields"
    }

    fn system_prompt(&self) -> &'static str {
        EXTRACTION_SYSTEM
    }

    fn params(&self) -> ModelParams {
        // Fact extraction: zero temperature.
        ModelParams {
            temperature: 0.0,
            max_tokens: 1500,
        }
    }

    fn schema(&self) -> &'static [FieldSpec] {
        EXTRACTION_SCHEMA
    }

    fn build_prompt(&self) -> String {
        let mut resume = truncate_chars(&self.resume_text, RESUME_BUDGET);
        if self.resume_text.chars().count() > RESUME_BUDGET {
            resume.push_str("\n...[truncated]");
        }
        format!(
            "Extract structured information from the following resume and return ONLY \
             valid JSON with this exact structure:\n\n\
             {{\n  \"contact\": {{\"name\": \"string or null\", \"email\": \"string or null\", \
             \"phone\": \"string or null\", \"location\": \"string or null\", \
             \"linkedin\": \"string or null\", \"github\": \"string or null\", \
             \"portfolio\": \"string or null\"}},\n  \
             \"summary\": \"brief professional summary (2-3 sentences) or null\",\n  \
             \"skills\": [\"skill1\", \"skill2\"],\n  \
             \"experience\": [{{\"title\": \"...\", \"company\": \"...\", \"location\": \"...\", \
             \"start_date\": \"YYYY-MM or YYYY or null\", \"end_date\": \"YYYY-MM or YYYY or 'Present' or null\", \
             \"duration\": \"...\", \"responsibilities\": [\"...\"]}}],\n  \
             \"education\": [{{\"degree\": \"...\", \"institution\": \"...\", \"location\": \"...\", \
             \"graduation_date\": \"...\", \"gpa\": \"...\", \"field_of_study\": \"...\"}}],\n  \
             \"certifications\": [\"cert1\"],\n  \
             \"languages\": [\"language1\"],\n  \
             \"projects\": [{{\"name\": \"...\", \"description\": \"...\", \
             \"technologies\": [\"...\"], \"url\": \"...\"}}]\n}}\n\n\
             Resume text:\n\"\"\"\n{resume}\n\"\"\"\n\n\
             {JSON_ONLY_NOTE}"
        )
    }

    fn fallback(&self, _reason: &str) -> Map<String, Value> {
        empty_record_with_summary(&self.resume_text)
    }
}

/// Empty structured record carrying only a raw-text summary — no invented
/// contact details, skills, or history.
pub fn empty_record_with_summary(resume_text: &str) -> Map<String, Value> {
    let normalized: String = resume_text.split_whitespace().collect::<Vec<_>>().join(" ");
    let summary = if normalized.chars().count() > FALLBACK_SUMMARY_CHARS {
        let cut = truncate_chars(&normalized, FALLBACK_SUMMARY_CHARS);
        // Break on a word boundary rather than mid-word.
        let trimmed = cut.rsplit_once(' ').map(|(head, _)| head).unwrap_or(&cut);
        format!("{trimmed}...")
    } else {
        normalized
    };

    let mut map = Map::new();
    map.insert("contact".to_string(), json!({}));
    map.insert("summary".to_string(), json!(summary));
    map.insert("skills".to_string(), json!([]));
    map.insert("experience".to_string(), json!([]));
    map.insert("education".to_string(), json!([]));
    map.insert("certifications".to_string(), json!([]));
    map.insert("languages".to_string(), json!([]));
    map.insert("projects".to_string(), json!([]));
    map
}

/// Parses resume text into the structured record. Inputs too short to carry
/// structure go straight to the fallback without a model call.
pub async fn parse_resume_text(executor: &TaskExecutor, resume_text: &str) -> TaskResult {
    let task = ExtractResumeFieldsTask {
        resume_text: resume_text.to_string(),
    };
    if resume_text.trim().chars().count() < MIN_RESUME_CHARS {
        return executor.fallback_only(&task, "resume text too short to parse");
    }
    executor.execute(&task).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::schema::normalize;

    #[test]
    fn test_fallback_record_has_every_field_empty_except_summary() {
        let record = empty_record_with_summary("Jane Doe, systems engineer since 2015.");
        assert_eq!(record["contact"], json!({}));
        assert_eq!(record["skills"], json!([]));
        assert_eq!(record["experience"], json!([]));
        assert_eq!(record["projects"], json!([]));
        assert_eq!(
            record["summary"],
            json!("Jane Doe, systems engineer since 2015.")
        );
    }

    #[test]
    fn test_fallback_summary_normalizes_whitespace() {
        let record = empty_record_with_summary("line one\r\nline   two\n\nline three");
        assert_eq!(record["summary"], json!("line one line two line three"));
    }

    #[test]
    fn test_fallback_summary_cut_on_word_boundary_with_ellipsis() {
        let text = "word ".repeat(200);
        let record = empty_record_with_summary(&text);
        let summary = record["summary"].as_str().unwrap();
        assert!(summary.ends_with("word..."));
        assert!(summary.chars().count() <= FALLBACK_SUMMARY_CHARS + 3);
    }

    #[test]
    fn test_prompt_marks_truncated_resumes() {
        let long_task = ExtractResumeFieldsTask {
            resume_text: "r".repeat(RESUME_BUDGET + 100),
        };
        assert!(long_task.build_prompt().contains("...[truncated]"));

        let short_task = ExtractResumeFieldsTask {
            resume_text: "short resume".to_string(),
        };
        assert!(!short_task.build_prompt().contains("...[truncated]"));
    }

    #[test]
    fn test_fallback_conforms_to_schema() {
        let task = ExtractResumeFieldsTask {
            resume_text: "text".to_string(),
        };
        let fields = normalize(task.schema(), Value::Object(task.fallback("down")));
        for spec in EXTRACTION_SCHEMA {
            assert!(fields.contains_key(spec.name), "{}", spec.name);
        }
    }

    #[test]
    fn test_extraction_temperature_is_zero() {
        let task = ExtractResumeFieldsTask {
            resume_text: "text".to_string(),
        };
        assert_eq!(task.params().temperature, 0.0);
    }
}
