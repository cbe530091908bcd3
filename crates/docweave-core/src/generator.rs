//! Documentation text generators
//!
//! A [`DocGenerator`] turns one snippet into one line of documentation text.
//! The engine never assumes anything about where the text comes from:
//!
//! - [`OpenAiGenerator`]: chat-completion endpoint over HTTP
//! - [`ScriptedGenerator`]: fixed answers keyed by qualified path, for tests and dry runs
//!
//! Retries are applied by [`generate_with_retry`], not by the generators.

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use docweave_snippet::CodeSnippet;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

/// Longest response body kept in a status error
const MAX_ERROR_BODY: usize = 512;

/// Source of documentation text
#[async_trait]
pub trait DocGenerator: Send + Sync {
    /// Produce documentation text for one snippet
    ///
    /// # Errors
    /// Returns `GenerationError` if no text could be produced; transient
    /// failures are retried by the caller
    async fn generate(&self, snippet: &CodeSnippet) -> Result<String, GenerationError>;

    /// Generator name for logs
    fn name(&self) -> &str;
}

/// Generate with a retry budget
///
/// # Errors
/// Returns the permanent error as is, or `GenerationError::Exhausted` once
/// every attempt failed transiently
pub async fn generate_with_retry(
    generator: &dyn DocGenerator,
    snippet: &CodeSnippet,
    policy: &RetryPolicy,
) -> Result<String, GenerationError> {
    let result = policy
        .run(
            |attempt| {
                debug!(snippet = %snippet.qualified_path(), attempt, "Generating documentation");
                generator.generate(snippet)
            },
            GenerationError::is_transient,
        )
        .await;

    match result {
        Ok(text) => Ok(text),
        Err((err, attempts)) if err.is_transient() => Err(GenerationError::Exhausted {
            attempts,
            last: Box::new(err),
        }),
        Err((err, _)) => Err(err),
    }
}

/// Prompt asking for a single-line imperative docstring
#[must_use]
pub fn build_prompt(snippet: &CodeSnippet) -> String {
    format!(
        "Write a very short, concise single-line docstring for the {kind} below.\n\
         \n\
         The docstring describes the purpose of the code and must not be generic; \
         \"Create a FooBar object\" is too generic.\n\
         The docstring is in the imperative mood.\n\
         \n\
         Return the docstring in a json dict where the key is the line number and the value is the description.\n\
         \n\
         INPUT CODE:\n\
         ```\n\
         {code}\n\
         ```\n\
         \n\
         DOCSTRING (as json dict):\n",
        kind = snippet.kind(),
        code = snippet.dedented_text().trim_end(),
    )
}

/// Extract documentation text from a chat-completion response
///
/// Accepts a JSON dict answer, optionally wrapped in a code fence, and falls
/// back to the plain message text. A dict answer yields the value under its
/// lowest numeric key (the model numbers its answers), else under the first
/// key in sorted order.
///
/// # Errors
/// Returns `GenerationError::InvalidResponse` if the response has no message
/// content or the content is empty
pub fn parse_completion(response: &serde_json::Value) -> Result<String, GenerationError> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| GenerationError::InvalidResponse("missing message content".into()))?;

    let stripped = strip_fence(content);
    let text = match serde_json::from_str::<serde_json::Value>(stripped) {
        Ok(serde_json::Value::Object(map)) => match map
            .into_iter()
            .min_by_key(|(key, _)| key.parse::<u64>().map_or((1, 0), |number| (0, number)))
        {
            Some((_, serde_json::Value::String(value))) => value,
            Some((_, value)) => value.to_string(),
            None => String::new(),
        },
        Ok(serde_json::Value::String(value)) => value,
        _ => stripped.to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::InvalidResponse("empty documentation text".into()));
    }
    Ok(text.to_string())
}

fn strip_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line
    let inner = inner.split_once('\n').map_or("", |(_, rest)| rest);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Chat-completion generator
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    config: GeneratorConfig,
    api_key: String,
    client: Client,
}

impl OpenAiGenerator {
    /// Create generator with an explicit key
    ///
    /// # Errors
    /// Returns `GenerationError::Transport` if the HTTP client cannot be built
    pub fn new(config: GeneratorConfig, api_key: impl Into<String>) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }

    /// Create generator reading the key from the configured environment variable
    ///
    /// # Errors
    /// Returns `GenerationError::MissingApiKey` if the variable is unset or empty
    pub fn from_env(config: GeneratorConfig) -> Result<Self, GenerationError> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| GenerationError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, key)
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn payload(&self, snippet: &CodeSnippet) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stop": ["INPUT CODE"],
            "messages": [
                { "role": "user", "content": build_prompt(snippet) }
            ]
        })
    }
}

#[async_trait]
impl DocGenerator for OpenAiGenerator {
    async fn generate(&self, snippet: &CodeSnippet) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(snippet))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        let text = parse_completion(&value)?;
        info!(snippet = %snippet.qualified_path(), docstring = %text, "Got docstring");
        Ok(text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Generator answering from a fixed script
///
/// Answers are queued per qualified path and consumed in order; the last
/// answer for a path is repeated once the queue would run dry.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    answers: Mutex<HashMap<String, VecDeque<Result<String, GenerationError>>>>,
    fallback: Option<String>,
}

impl ScriptedGenerator {
    /// Create empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `text` for the definition at `qualified_path`
    #[must_use]
    pub fn with_answer(self, qualified_path: &str, text: impl Into<String>) -> Self {
        self.push(qualified_path, Ok(text.into()));
        self
    }

    /// Fail with `error` for the next request on `qualified_path`
    #[must_use]
    pub fn with_failure(self, qualified_path: &str, error: GenerationError) -> Self {
        self.push(qualified_path, Err(error));
        self
    }

    /// Answer every unscripted path with `Document {qualified path}.`
    #[must_use]
    pub fn with_fallback(mut self, prefix: impl Into<String>) -> Self {
        self.fallback = Some(prefix.into());
        self
    }

    fn push(&self, qualified_path: &str, answer: Result<String, GenerationError>) {
        self.answers
            .lock()
            .entry(qualified_path.to_string())
            .or_default()
            .push_back(answer);
    }
}

#[async_trait]
impl DocGenerator for ScriptedGenerator {
    async fn generate(&self, snippet: &CodeSnippet) -> Result<String, GenerationError> {
        let key = snippet.qualified_path().to_string();
        let mut answers = self.answers.lock();
        if let Some(queue) = answers.get_mut(&key) {
            if queue.len() > 1 {
                if let Some(answer) = queue.pop_front() {
                    return answer;
                }
            }
            if let Some(answer) = queue.front() {
                return answer.clone();
            }
        }
        match &self.fallback {
            Some(prefix) if key.is_empty() => Ok(format!("{prefix} module.")),
            Some(prefix) => Ok(format!("{prefix} {key}.")),
            None => Err(GenerationError::Unscripted(key)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
