//! Configuration for the analysis proxy.
//!
//! All service behaviour is controlled through [`ServiceConfig`], built via
//! its [`ServiceConfigBuilder`] or read from the environment with
//! [`ServiceConfig::from_env`]. Keeping every knob in one struct makes it
//! trivial to share across handler tasks behind an `Arc` and to point the
//! whole client at a stub server in tests by overriding `api_base_url`.
//!
//! The config is constructed once at process startup and injected into the
//! router state; nothing in the library reads the environment after that.

use crate::error::AnalyzeError;
use crate::task::TaskType;
use std::fmt;

/// Production agent handling summarization requests.
const DEFAULT_SUMMARY_AGENT_ID: &str = "ag:ab291cb7:20250507:untitled-agent:64806fa7";
/// Production agent handling explanation requests.
const DEFAULT_EXPLAIN_AGENT_ID: &str = "ag:ab291cb7:20250510:explain:9b572715";

/// Configuration for the Mistral-backed analysis service.
///
/// Built via [`ServiceConfig::builder()`] or [`ServiceConfig::from_env()`].
///
/// # Example
/// ```rust
/// use studybetter::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .api_key("sk-test")
///     .max_tokens(2000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Mistral bearer credential. `None` is allowed at construction time;
    /// the analyze sequence reports the absence as a per-request 500, so a
    /// server can boot (and serve exports) without a key.
    pub api_key: Option<String>,

    /// Base URL of the Mistral API. Default: `https://api.mistral.ai`.
    ///
    /// Injectable so tests can target a local stub; never read from the
    /// request.
    pub api_base_url: String,

    /// Agent receiving `summarize` requests.
    pub summary_agent_id: String,

    /// Agent receiving `explain` requests.
    pub explain_agent_id: String,

    /// Maximum tokens the agent may generate per completion. Default: 4000.
    pub max_tokens: u32,

    /// Per-upstream-call timeout in seconds. Default: 120.
    ///
    /// Covers each of the four Mistral calls independently; the analyze
    /// sequence itself has no overall deadline beyond their sum.
    pub api_timeout_secs: u64,

    /// Truncation length (in chars) for upstream error excerpts. Default: 500.
    ///
    /// Long upstream bodies (HTML error pages, stack dumps) are cut to this
    /// many characters before being attached to a response, so diagnostics
    /// stay useful without echoing arbitrary payloads back to clients.
    pub detail_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.mistral.ai".to_string(),
            summary_agent_id: DEFAULT_SUMMARY_AGENT_ID.to_string(),
            explain_agent_id: DEFAULT_EXPLAIN_AGENT_ID.to_string(),
            max_tokens: 4000,
            api_timeout_secs: 120,
            detail_limit: 500,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("summary_agent_id", &self.summary_agent_id)
            .field("explain_agent_id", &self.explain_agent_id)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("detail_limit", &self.detail_limit)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the process environment.
    ///
    /// Reads `MISTRAL_API_KEY`; an unset or empty variable leaves the key
    /// as `None` rather than failing, matching the per-request credential
    /// check of the analyze endpoint.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("MISTRAL_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        config
    }

    /// The agent id the given task is routed to.
    pub fn agent_id(&self, task: TaskType) -> &str {
        match task {
            TaskType::Summarize => &self.summary_agent_id,
            TaskType::Explain => &self.explain_agent_id,
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn summary_agent_id(mut self, id: impl Into<String>) -> Self {
        self.config.summary_agent_id = id.into();
        self
    }

    pub fn explain_agent_id(mut self, id: impl Into<String>) -> Self {
        self.config.explain_agent_id = id.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn detail_limit(mut self, chars: usize) -> Self {
        self.config.detail_limit = chars;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, AnalyzeError> {
        let c = &self.config;
        if c.api_base_url.is_empty() {
            return Err(AnalyzeError::InvalidConfig(
                "api_base_url must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(AnalyzeError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.detail_limit == 0 {
            return Err(AnalyzeError::InvalidConfig(
                "detail_limit must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
