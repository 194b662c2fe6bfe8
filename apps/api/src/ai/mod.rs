//! AI layer — one resilient task executor instantiated by five tasks:
//! candidate ranking, interview question generation, feedback analysis,
//! resume ATS optimization, and resume field extraction.

pub mod executor;
pub mod extract;
pub mod feedback;
pub mod handlers;
pub mod optimizer;
pub mod prompts;
pub mod questions;
pub mod ranking;
pub mod resume_fields;
pub mod retry;
pub mod schema;

pub use executor::{TaskExecutor, TaskResult};
