//! Process-wide relay configuration.
//!
//! [`RelayConfig`] is built once at startup from environment variables and
//! then shared read-only (behind an `Arc`) by every request.  Parsing goes
//! through [`RelayConfig::from_lookup`] so tests can feed values without
//! touching the process environment.

use std::time::Duration;

use reqwest::header::HeaderValue;
use url::Url;

use crate::error::{RelayError, Result};

/// Default chat model identifier sent in every completion request.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default Sarvam API base URL.
pub const DEFAULT_SPEECH_BASE_URL: &str = "https://api.sarvam.ai";

/// Default upstream timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default frontend origin allowed by CORS (the Vite dev server).
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Credentials and endpoint for the Azure OpenAI chat deployment.
#[derive(Clone)]
pub struct ChatConfig {
    /// Value of the `api-key` header.
    pub api_key: String,
    /// Full chat-completions URL of the deployment, including `api-version`.
    pub endpoint: Url,
    /// Model identifier placed in the request body.
    pub model: String,
}

/// Credentials and base URL for the Sarvam speech service.
#[derive(Clone)]
pub struct SpeechConfig {
    /// Value of the `api-subscription-key` header.
    pub api_key: String,
    /// Base URL; `/speech-to-text` and `/text-to-speech` are appended.
    pub base_url: Url,
}

/// Immutable configuration shared across the relay.
#[derive(Clone)]
pub struct RelayConfig {
    pub chat: ChatConfig,
    /// `None` when no speech credential is configured; the speech endpoints
    /// then fail per request instead of blocking startup.
    pub speech: Option<SpeechConfig>,
    /// Timeout applied to every upstream call.
    pub upstream_timeout: Duration,
    /// Origins permitted by the CORS layer.
    pub allowed_origins: Vec<String>,
}

impl RelayConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails if `AZURE_OPENAI_API_KEY` or `AZURE_OPENAI_ENDPOINT` is missing,
    /// or if any present value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let api_key = get("AZURE_OPENAI_API_KEY").ok_or(RelayError::MissingConfig {
            name: "AZURE_OPENAI_API_KEY",
        })?;
        key_header("AZURE_OPENAI_API_KEY", &api_key)?;
        let endpoint = get("AZURE_OPENAI_ENDPOINT").ok_or(RelayError::MissingConfig {
            name: "AZURE_OPENAI_ENDPOINT",
        })?;
        let endpoint = parse_url("AZURE_OPENAI_ENDPOINT", &endpoint)?;
        let model = get("AZURE_OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        let speech = match get("SARVAM_API_KEY") {
            Some(api_key) => {
                key_header("SARVAM_API_KEY", &api_key)?;
                let base = get("SARVAM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_SPEECH_BASE_URL.to_owned());
                Some(SpeechConfig {
                    api_key,
                    base_url: parse_url("SARVAM_BASE_URL", &base)?,
                })
            }
            None => {
                tracing::warn!("SARVAM_API_KEY not set, speech endpoints will be unavailable");
                None
            }
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|e| RelayError::InvalidConfig {
                    name: "UPSTREAM_TIMEOUT_SECS",
                    reason: format!("`{raw}` is not a whole number of seconds: {e}"),
                })?;
                if secs == 0 {
                    return Err(RelayError::InvalidConfig {
                        name: "UPSTREAM_TIMEOUT_SECS",
                        reason: "timeout must be greater than zero".into(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_owned())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_owned()]);

        Ok(Self {
            chat: ChatConfig {
                api_key,
                endpoint,
                model,
            },
            speech,
            upstream_timeout,
            allowed_origins,
        })
    }

    /// One-line summary with secrets redacted, for startup logs.
    pub fn redacted_summary(&self) -> String {
        format!(
            "chat_endpoint={} model={} api_key={} speech={} timeout={}s origins=[{}]",
            self.chat.endpoint.origin().ascii_serialization(),
            self.chat.model,
            redact(&self.chat.api_key),
            self.speech
                .as_ref()
                .map(|s| s.base_url.as_str().to_owned())
                .unwrap_or_else(|| "disabled".to_owned()),
            self.upstream_timeout.as_secs(),
            self.allowed_origins.join(", "),
        )
    }
}

// Credentials never appear in `Debug` output.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted_summary())
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| RelayError::InvalidConfig {
        name,
        reason: format!("`{raw}` is not a valid URL: {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RelayError::InvalidConfig {
            name,
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

/// Turn a credential into a sensitive header value, rejecting characters
/// that cannot travel in an HTTP header.
pub(crate) fn key_header(name: &'static str, key: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(key).map_err(|_| RelayError::InvalidConfig {
        name,
        reason: "contains characters not allowed in an HTTP header".into(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn redact(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_owned()
    } else {
        format!("****{tail}")
    }
}
