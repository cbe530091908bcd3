//! Engine configuration
//!
//! Loaded from `docweave.toml` (every key optional) and then adjusted with
//! the `with_*` builders, which is how command-line flags take precedence.
//!
//! ```toml
//! concurrency = 10
//! existing_doc_policy = "skip"
//! test_layout = "replace-root"
//! extensions = ["py"]
//!
//! [retry]
//! max_attempts = 3
//!
//! [generator]
//! model = "gpt-4o-mini"
//! ```

use crate::error::EngineError;
use crate::retry::RetryPolicy;
use docweave_rewrite::ExistingDocPolicy;
use docweave_snippet::TestLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "docweave.toml";

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum concurrent generation requests
    pub concurrency: usize,
    /// Retry budget per generation request
    pub retry: RetryConfig,
    /// Behavior for targets that already carry documentation
    pub existing_doc_policy: ExistingDocPolicy,
    /// Mapping of source modules onto the `tests` package
    pub test_layout: TestLayout,
    /// File extensions considered source, without the dot
    pub extensions: Vec<String>,
    /// Project root; discovered from the target path when unset
    pub project_root: Option<PathBuf>,
    /// Documentation text generator settings
    pub generator: GeneratorConfig,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns `EngineError::Config` if the text is not a valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let config: Self = toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    /// - `EngineError::Io` if the file cannot be read
    /// - `EngineError::ConfigFile` if it is not valid TOML for this structure
    /// - `EngineError::Config` if a value is out of range
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let config: Self = toml::from_str(&text).map_err(|source| EngineError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `docweave.toml` in `dir` if present, else defaults
    ///
    /// # Errors
    /// See [`EngineConfig::load`]
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, EngineError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `EngineError::Config` naming the first invalid key
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.concurrency == 0 {
            return Err(EngineError::Config("concurrency must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(EngineError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.extensions.is_empty() {
            return Err(EngineError::Config("extensions must not be empty".into()));
        }
        Ok(())
    }

    /// With concurrency limit
    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// With existing-documentation policy
    #[inline]
    #[must_use]
    pub fn with_existing_doc_policy(mut self, policy: ExistingDocPolicy) -> Self {
        self.existing_doc_policy = policy;
        self
    }

    /// With test layout
    #[inline]
    #[must_use]
    pub fn with_test_layout(mut self, layout: TestLayout) -> Self {
        self.test_layout = layout;
        self
    }

    /// With explicit project root
    #[inline]
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// With retry settings
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Retry policy built from the retry settings
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            retry: RetryConfig::default(),
            existing_doc_policy: ExistingDocPolicy::default(),
            test_layout: TestLayout::default(),
            extensions: vec!["py".to_string()],
            project_root: None,
            generator: GeneratorConfig::default(),
        }
    }
}

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Attempts per request, the first included
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

/// Text generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Chat completion endpoint
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    /// Per-request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            max_tokens: 2_000,
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.existing_doc_policy, ExistingDocPolicy::Skip);
        assert_eq!(config.test_layout, TestLayout::ReplaceRoot);
        assert_eq!(config.extensions, vec!["py"]);
        assert_eq!(config.generator.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn parses_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
concurrency = 4
existing_doc_policy = "replace"
test_layout = "prefix-root"

[retry]
max_attempts = 5

[generator]
model = "local"
"#,
        )
        .unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.existing_doc_policy, ExistingDocPolicy::Replace);
        assert_eq!(config.test_layout, TestLayout::PrefixRoot);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 500);
        assert_eq!(config.generator.model, "local");
        assert_eq!(config.generator.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(EngineConfig::from_toml_str("threads = 3").is_err());
        assert!(EngineConfig::from_toml_str("concurrency = 0").is_err());
        assert!(EngineConfig::from_toml_str("[retry]\nmax_attempts = 0").is_err());
    }

    #[test]
    fn builders_override() {
        let config = EngineConfig::new()
            .with_concurrency(0)
            .with_existing_doc_policy(ExistingDocPolicy::Replace)
            .with_project_root("/proj");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.project_root.as_deref(), Some(Path::new("/proj")));
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(EngineConfig::discover(None, dir.path()).unwrap(), EngineConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "concurrency = 2\n").unwrap();
        assert_eq!(EngineConfig::discover(None, dir.path()).unwrap().concurrency, 2);
    }
}
