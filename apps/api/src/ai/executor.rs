//! AI Task Executor — one resilience pipeline reused by every AI-backed
//! feature: render prompt → call model with bounded retries → tolerant JSON
//! extraction → schema normalization → deterministic fallback on any failure.
//!
//! CONTRACT: `execute` never fails. Every call returns a map containing
//! exactly the task's declared schema fields, tagged with whether the model
//! or the fallback produced it. Transport/API errors are retried per policy;
//! unparseable model output falls back immediately without retry.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ai::extract::extract_json;
use crate::ai::retry::{RetryPolicy, Sleep};
use crate::ai::schema::{normalize, FieldSpec};
use crate::llm_client::{ChatMessage, ChatModel, ChatRequest};

/// Model sampling parameters for one task. Near-zero temperature for
/// extraction/scoring tasks, higher for generative ones.
#[derive(Debug, Clone, Copy)]
pub struct ModelParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// One AI-backed operation: prompt, expected schema, and a deterministic
/// model-free substitute. Implementations are immutable per call.
pub trait AiTask: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn system_prompt(&self) -> &'static str;

    fn params(&self) -> ModelParams;

    fn schema(&self) -> &'static [FieldSpec];

    /// Renders the user prompt, truncating long free-text context fields to
    /// the task's character budget.
    fn build_prompt(&self) -> String;

    /// Hook to reshape the extracted JSON before normalization, e.g. tasks
    /// whose models answer with a bare array wrap it into an object here.
    fn adapt(&self, value: Value) -> Value {
        value
    }

    /// Deterministic schema-conformant result computed without the model.
    /// `reason` is the failure description that triggered the fallback.
    fn fallback(&self, reason: &str) -> Map<String, Value>;
}

/// Which path produced a result. Exposed to callers as `model_used` so
/// downstream consumers can indicate confidence.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSource {
    Model,
    Fallback { reason: String },
}

/// A schema-valid result of one executor invocation.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub fields: Map<String, Value>,
    pub source: ResultSource,
    /// Model name for model-backed results, `"fallback"` otherwise.
    pub model_used: String,
}

impl TaskResult {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ResultSource::Fallback { .. })
    }

    /// Consumes the result into its field map with `model_used` attached —
    /// the shape handlers return to clients.
    pub fn into_tagged_fields(self) -> Map<String, Value> {
        let mut fields = self.fields;
        fields.insert("model_used".to_string(), Value::String(self.model_used));
        fields
    }
}

/// Executes AI tasks against an injected chat model. No shared mutable
/// state — concurrent invocations are fully independent.
pub struct TaskExecutor {
    chat: Arc<dyn ChatModel>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleep>,
}

impl TaskExecutor {
    pub fn new(chat: Arc<dyn ChatModel>, policy: RetryPolicy, sleeper: Arc<dyn Sleep>) -> Self {
        Self {
            chat,
            policy,
            sleeper,
        }
    }

    /// Runs one task to completion. Never returns an error: any failure path
    /// ends in the task's deterministic fallback.
    pub async fn execute(&self, task: &dyn AiTask) -> TaskResult {
        let prompt = task.build_prompt();
        let params = task.params();

        let mut last_error = String::new();

        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                let delay = self.policy.backoff(attempt - 1);
                warn!(
                    "task '{}' attempt {} failed ({last_error}), retrying after {}ms",
                    task.name(),
                    attempt,
                    delay.as_millis()
                );
                self.sleeper.sleep(delay).await;
            }

            let request = ChatRequest {
                messages: vec![
                    ChatMessage::system(task.system_prompt()),
                    ChatMessage::user(prompt.clone()),
                ],
                temperature: params.temperature,
                max_tokens: params.max_tokens,
            };

            let text = match self.chat.complete(request).await {
                Ok(text) => text,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            debug!("task '{}' model response: {:.200}", task.name(), text);

            // Malformed output is not retried — the model answered, it just
            // answered badly. Fall back immediately.
            return match extract_json(&text) {
                Some(value) => {
                    let fields = normalize(task.schema(), task.adapt(value));
                    TaskResult {
                        fields,
                        source: ResultSource::Model,
                        model_used: self.chat.model_name().to_string(),
                    }
                }
                None => self.fall_back(task, "model returned unparseable output"),
            };
        }

        self.fall_back(task, &last_error)
    }

    /// Produces the task's fallback without touching the model. Used when a
    /// precondition (e.g. input too short) makes a call pointless.
    pub fn fallback_only(&self, task: &dyn AiTask, reason: &str) -> TaskResult {
        self.fall_back(task, reason)
    }

    fn fall_back(&self, task: &dyn AiTask, reason: &str) -> TaskResult {
        warn!("task '{}' falling back: {reason}", task.name());
        // Fallbacks are normalized too, so the schema invariant holds even if
        // a heuristic drifts out of spec.
        let fields = normalize(task.schema(), Value::Object(task.fallback(reason)));
        TaskResult {
            fields,
            source: ResultSource::Fallback {
                reason: reason.to_string(),
            },
            model_used: "fallback".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted chat model: pops one canned outcome per call.
    struct ScriptedChat {
        script: Mutex<Vec<Result<String, LlmError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedChat {
        fn new(script: Vec<Result<String, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedChat {
        async fn complete(&self, _request: ChatRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            script.remove(0)
        }

        fn model_name(&self) -> &str {
            "test-model"
        }
    }

    struct NoSleep {
        slept: Mutex<Vec<Duration>>,
    }

    impl NoSleep {
        fn new() -> Self {
            Self {
                slept: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl Sleep for NoSleep {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    struct ScoreTask;

    const SCORE_SCHEMA: &[FieldSpec] = &[
        FieldSpec::int("score", 0, 0, 100),
        FieldSpec::str("reason", 500),
        FieldSpec::str_list("skills", 50, 100),
    ];

    impl AiTask for ScoreTask {
        fn name(&self) -> &'static str {
            "score"
        }

        fn system_prompt(&self) -> &'static str {
            "Respond with valid JSON only."
        }

        fn params(&self) -> ModelParams {
            ModelParams {
                temperature: 0.0,
                max_tokens: 300,
            }
        }

        fn schema(&self) -> &'static [FieldSpec] {
            SCORE_SCHEMA
        }

        fn build_prompt(&self) -> String {
            "score this".to_string()
        }

        fn fallback(&self, reason: &str) -> Map<String, Value> {
            let mut map = Map::new();
            map.insert("score".to_string(), json!(0));
            map.insert("reason".to_string(), json!(format!("error: {reason}")));
            map.insert("skills".to_string(), json!([]));
            map
        }
    }

    fn executor(chat: Arc<ScriptedChat>, sleeper: Arc<NoSleep>) -> TaskExecutor {
        TaskExecutor::new(chat, RetryPolicy { max_retries: 2 }, sleeper)
    }

    #[tokio::test]
    async fn test_valid_model_json_returns_model_result() {
        let chat = Arc::new(ScriptedChat::new(vec![Ok(
            r#"{"score": 82, "reason": "fit", "skills": ["rust"]}"#.to_string(),
        )]));
        let exec = executor(chat.clone(), Arc::new(NoSleep::new()));

        let result = exec.execute(&ScoreTask).await;
        assert_eq!(result.source, ResultSource::Model);
        assert_eq!(result.model_used, "test-model");
        assert_eq!(result.fields["score"], json!(82));
        assert_eq!(result.fields["skills"], json!(["rust"]));
        assert_eq!(chat.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fenced_json_normalizes_same_as_bare() {
        let bare = Arc::new(ScriptedChat::new(vec![Ok(
            r#"{"score": 82, "reason": "fit", "skills": []}"#.to_string(),
        )]));
        let fenced = Arc::new(ScriptedChat::new(vec![Ok(
            "Sure! ```json\n{\"score\": 82, \"reason\": \"fit\", \"skills\": []}\n```".to_string(),
        )]));

        let from_bare = executor(bare, Arc::new(NoSleep::new()))
            .execute(&ScoreTask)
            .await;
        let from_fenced = executor(fenced, Arc::new(NoSleep::new()))
            .execute(&ScoreTask)
            .await;

        assert_eq!(from_bare.fields, from_fenced.fields);
        assert_eq!(from_fenced.fields["score"], json!(82));
    }

    #[tokio::test]
    async fn test_all_schema_fields_present_even_for_sparse_output() {
        let chat = Arc::new(ScriptedChat::new(vec![Ok(r#"{"score": 10}"#.to_string())]));
        let exec = executor(chat, Arc::new(NoSleep::new()));

        let result = exec.execute(&ScoreTask).await;
        for field in SCORE_SCHEMA {
            assert!(result.fields.contains_key(field.name), "{}", field.name);
        }
        assert_eq!(result.fields["reason"], json!(""));
    }

    #[tokio::test]
    async fn test_transport_failure_retries_then_falls_back() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Err(LlmError::Api {
                status: 429,
                message: "rate limited".to_string(),
            }),
            Err(LlmError::Api {
                status: 500,
                message: "server error".to_string(),
            }),
            Err(LlmError::EmptyContent),
        ]));
        let sleeper = Arc::new(NoSleep::new());
        let exec = executor(chat.clone(), sleeper.clone());

        let result = exec.execute(&ScoreTask).await;
        assert!(result.is_fallback());
        assert_eq!(result.model_used, "fallback");
        assert_eq!(result.fields["score"], json!(0));
        // 1 initial attempt + 2 retries
        assert_eq!(chat.call_count(), 3);
        // Linear backoff: 1s then 2.5s
        let slept = sleeper.slept.lock().unwrap().clone();
        assert_eq!(
            slept,
            vec![Duration::from_millis(1_000), Duration::from_millis(2_500)]
        );
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_on_retry() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Err(LlmError::Api {
                status: 503,
                message: "unavailable".to_string(),
            }),
            Ok(r#"{"score": 55, "reason": "ok", "skills": []}"#.to_string()),
        ]));
        let exec = executor(chat.clone(), Arc::new(NoSleep::new()));

        let result = exec.execute(&ScoreTask).await;
        assert_eq!(result.source, ResultSource::Model);
        assert_eq!(result.fields["score"], json!(55));
        assert_eq!(chat.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_output_falls_back_without_retry() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Ok("I am sorry, I cannot produce JSON today.".to_string()),
            Ok(r#"{"score": 99, "reason": "", "skills": []}"#.to_string()),
        ]));
        let exec = executor(chat.clone(), Arc::new(NoSleep::new()));

        let result = exec.execute(&ScoreTask).await;
        assert!(result.is_fallback());
        // The second, valid scripted response was never requested.
        assert_eq!(chat.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fallback_is_deterministic_across_runs() {
        let failing = || {
            Arc::new(ScriptedChat::new(vec![
                Err(LlmError::EmptyContent),
                Err(LlmError::EmptyContent),
                Err(LlmError::EmptyContent),
            ]))
        };

        let first = executor(failing(), Arc::new(NoSleep::new()))
            .execute(&ScoreTask)
            .await;
        let second = executor(failing(), Arc::new(NoSleep::new()))
            .execute(&ScoreTask)
            .await;

        assert_eq!(first.fields, second.fields);
        assert!(first.is_fallback());
    }

    #[tokio::test]
    async fn test_fallback_reason_embeds_error_text() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Err(LlmError::EmptyContent),
            Err(LlmError::EmptyContent),
            Err(LlmError::EmptyContent),
        ]));
        let exec = executor(chat, Arc::new(NoSleep::new()));

        let result = exec.execute(&ScoreTask).await;
        let reason = result.fields["reason"].as_str().unwrap();
        assert!(reason.contains("empty content"));
    }

    #[tokio::test]
    async fn test_into_tagged_fields_attaches_model_used() {
        let chat = Arc::new(ScriptedChat::new(vec![Ok(
            r#"{"score": 1, "reason": "", "skills": []}"#.to_string(),
        )]));
        let exec = executor(chat, Arc::new(NoSleep::new()));

        let tagged = exec.execute(&ScoreTask).await.into_tagged_fields();
        assert_eq!(tagged["model_used"], json!("test-model"));
        assert_eq!(tagged["score"], json!(1));
    }
}
