//! Resume text extraction and the background processing pipeline.
//!
//! Text extraction never errors: any failure yields an empty string and a
//! log line. The background job has no retry and no ordering guarantee
//! relative to reads — clients may see a candidate before its parsed fields
//! populate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::ai::resume_fields::parse_resume_text;
use crate::ai::TaskExecutor;
use crate::candidates::store;

/// Extracts plain text from an uploaded resume file. PDF via `pdf-extract`;
/// anything else is read as lossy UTF-8.
pub fn extract_text(path: &Path) -> String {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        match pdf_extract::extract_text(path) {
            Ok(text) => return text,
            Err(e) => {
                warn!("PDF text extraction failed for {}: {e}", path.display());
                return String::new();
            }
        }
    }

    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Could not read uploaded file {}: {e}", path.display());
            String::new()
        }
    }
}

/// Fire-and-forget resume processing: extract text, parse fields through the
/// executor, persist. Failures are logged and dropped — there is no retry
/// and nothing for a caller to await.
pub async fn process_resume_background(
    db: PgPool,
    executor: Arc<TaskExecutor>,
    candidate_id: i32,
    file_path: PathBuf,
) {
    info!("Background processing resume for candidate {candidate_id}");

    // Blocking file + PDF work off the async runtime.
    let text = match tokio::task::spawn_blocking(move || extract_text(&file_path)).await {
        Ok(text) => text,
        Err(e) => {
            error!("Resume extraction task panicked for candidate {candidate_id}: {e}");
            return;
        }
    };

    if text.trim().is_empty() {
        warn!("No text extracted from resume for candidate {candidate_id}");
    }

    let result = parse_resume_text(&executor, &text).await;
    if result.is_fallback() {
        warn!("Resume parsing for candidate {candidate_id} used the fallback record");
    }
    let parsed = Value::Object(result.fields);

    if let Err(e) = store::update_resume_and_parsed(&db, candidate_id, &text, &parsed).await {
        error!("Failed to persist parsed resume for candidate {candidate_id}: {e}");
        return;
    }
    info!("Successfully processed resume for candidate {candidate_id}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_text_file_reads_lossy() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Jane Doe\nRust engineer").unwrap();
        let text = extract_text(file.path());
        assert!(text.contains("Rust engineer"));
    }

    #[test]
    fn test_invalid_utf8_does_not_panic() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(&[0xff, 0xfe, b'h', b'i']).unwrap();
        let text = extract_text(file.path());
        assert!(text.contains("hi"));
    }

    #[test]
    fn test_missing_file_yields_empty_string() {
        let text = extract_text(Path::new("/nonexistent/resume.txt"));
        assert!(text.is_empty());
    }

    #[test]
    fn test_corrupt_pdf_yields_empty_string() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        write!(file, "not actually a pdf").unwrap();
        let text = extract_text(file.path());
        assert!(text.is_empty());
    }
}
