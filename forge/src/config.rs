//! Service configuration (TOML).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Pipeline and server configuration.
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForgeConfig {
    /// Model identifier sent to the chat-completions endpoint.
    pub model: String,

    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Per-request timeout for model calls, in seconds.
    pub request_timeout_secs: u64,

    /// Maximum tokens requested per model reply.
    pub max_tokens: u32,

    /// Default cap on model invocations per job when the request omits one.
    pub default_recursion_limit: u32,

    /// Evict registry entries untouched for this many seconds.
    pub registry_ttl_secs: u64,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            model: "openai/gpt-oss-120b".to_string(),
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "FORGE_API_KEY".to_string(),
            request_timeout_secs: 120,
            max_tokens: 8192,
            default_recursion_limit: 30,
            registry_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl ForgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("model must be non-empty"));
        }
        if self.api_base.trim().is_empty() {
            return Err(anyhow!("api_base must be non-empty"));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(anyhow!("api_key_env must be non-empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if self.default_recursion_limit == 0 {
            return Err(anyhow!("default_recursion_limit must be > 0"));
        }
        if self.registry_ttl_secs == 0 {
            return Err(anyhow!("registry_ttl_secs must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ForgeConfig::default()`.
pub fn load_config(path: &Path) -> Result<ForgeConfig> {
    if !path.exists() {
        let cfg = ForgeConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ForgeConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ForgeConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
