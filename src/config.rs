//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or the path given with `-f`), then applies
//! `QA_HELPER_LOG_LEVEL` and `QA_HELPER_BIND` env overrides. The LLM API key
//! is read from `GROQ_API_KEY` (falling back to `LLM_API_KEY`) and never
//! from TOML.

use std::{
    env, fs,
    path::Path,
};

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// HTTP facade configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Socket address the server binds to.
    pub bind: String,
}

/// Conversation memory configuration.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Maximum number of messages kept in the window (≥ 1).
    pub max_messages: usize,
}

/// OpenAI-compatible provider configuration (`[llm.openai]`).
/// Used for both `groq` and `openai` providers.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    pub temperature: f32,
    /// Cap on generated tokens per reply.
    pub max_tokens: u32,
    /// Per-request timeout in seconds. Expiry degrades to the fallback reply.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Active provider: `"groq"`, `"openai"` or `"dummy"`.
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

impl LlmConfig {
    /// Whether the active provider talks to a remote, authenticated backend.
    pub fn requires_api_key(&self) -> bool {
        matches!(self.provider.as_str(), "groq" | "openai" | "openai-compatible")
    }
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Human-readable service name reported by `/` and `/health`.
    pub service_name: String,
    pub log_level: String,
    pub http: HttpConfig,
    pub memory: MemoryConfig,
    pub llm: LlmConfig,
    /// From `GROQ_API_KEY` / `LLM_API_KEY`. `None` is only valid for `dummy`.
    pub llm_api_key: Option<String>,
}

/// Env-sourced values that take precedence over the TOML file.
/// Tests fill this directly instead of mutating the process environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub bind: Option<String>,
    pub api_key: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("QA_HELPER_LOG_LEVEL").ok(),
            bind: env::var("QA_HELPER_BIND").ok(),
            api_key: env::var("GROQ_API_KEY")
                .or_else(|_| env::var("LLM_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    service: RawService,
    #[serde(default)]
    http: RawHttp,
    #[serde(default)]
    memory: RawMemory,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawService {
    #[serde(default = "default_service_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawService {
    fn default() -> Self {
        Self { name: default_service_name(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawHttp {
    #[serde(default = "default_http_bind")]
    bind: String,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self { bind: default_http_bind() }
    }
}

#[derive(Deserialize)]
struct RawMemory {
    #[serde(default = "default_max_messages")]
    max_messages: usize,
}

impl Default for RawMemory {
    fn default() -> Self {
        Self { max_messages: default_max_messages() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            max_tokens: default_openai_max_tokens(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

fn default_service_name() -> String { "AI Question-Answer Helper".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_http_bind() -> String { "127.0.0.1:8000".to_string() }
fn default_max_messages() -> usize { 10 }
fn default_llm_provider() -> String { "groq".to_string() }
fn default_openai_api_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}
fn default_openai_model() -> String { "mixtral-8x7b-32768".to_string() }
fn default_openai_temperature() -> f32 { 0.7 }
fn default_openai_max_tokens() -> u32 { 500 }
fn default_openai_timeout_seconds() -> u64 { 60 }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from `path` (or [`DEFAULT_CONFIG_PATH`]) with env overrides.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    load_from(
        Path::new(path.unwrap_or(DEFAULT_CONFIG_PATH)),
        Overrides::from_env(),
    )
}

/// Internal loader — explicit path and overrides.
pub fn load_from(path: &Path, overrides: Overrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse(&raw, overrides)
        .map_err(|e| match e {
            AppError::Config(msg) => AppError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
}

/// Parse TOML text and resolve it against `overrides`.
pub fn parse(text: &str, overrides: Overrides) -> Result<Config, AppError> {
    let parsed: RawConfig = toml::from_str(text)
        .map_err(|e| AppError::Config(format!("parse error: {e}")))?;

    if parsed.memory.max_messages == 0 {
        return Err(AppError::Config("memory.max_messages must be at least 1".into()));
    }

    let llm = LlmConfig {
        provider: parsed.llm.provider,
        openai: OpenAiConfig {
            api_base_url: parsed.llm.openai.api_base_url,
            model: parsed.llm.openai.model,
            temperature: parsed.llm.openai.temperature,
            max_tokens: parsed.llm.openai.max_tokens,
            timeout_seconds: parsed.llm.openai.timeout_seconds,
        },
    };

    Ok(Config {
        service_name: parsed.service.name,
        log_level: overrides.log_level.unwrap_or(parsed.service.log_level),
        http: HttpConfig { bind: overrides.bind.unwrap_or(parsed.http.bind) },
        memory: MemoryConfig { max_messages: parsed.memory.max_messages },
        llm,
        llm_api_key: overrides.api_key,
    })
}

// ── test helpers ──────────────────────────────────────────────────────────────

#[cfg(test)]
impl Config {
    /// Dummy LLM, no API key, no network.
    pub fn test_default() -> Self {
        parse("[llm]\ndefault = \"dummy\"\n", Overrides::default())
            .expect("test config must parse")
    }
}
