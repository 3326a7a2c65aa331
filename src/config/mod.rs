use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4800;
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── ChatConfig ───────────────────────────────────────────────────────────────

/// AI companion configuration (`[chat]` in config.toml).
///
/// The API key itself is never read from the file; set `HAVEND_OPENAI_API_KEY`
/// (or `OPENAI_API_KEY`) in the environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Upstream model id. Default: "gpt-4o-mini".
    pub model: String,
    /// OpenAI-compatible API base URL, without trailing slash.
    pub base_url: String,
    /// Maximum tokens per assistant reply. Default: 300.
    pub max_tokens: u32,
    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

// ─── ObservabilityConfig ──────────────────────────────────────────────────────

/// Daemon observability configuration (`[observability]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log SQLite queries that exceed this threshold (milliseconds). Default: 100.
    /// Set to 0 to disable slow query logging.
    pub slow_query_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 100,
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 4800).
    port: Option<u16>,
    /// Log level filter string, e.g. "debug", "info,havend=trace" (default: "info").
    log: Option<String>,
    /// Bind address for the HTTP server (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Bearer token for the REST API. None = auth disabled (trusted loopback use).
    api_token: Option<String>,
    /// AI companion configuration (`[chat]`).
    chat: Option<ChatConfig>,
    /// Observability configuration (`[observability]`).
    observability: Option<ObservabilityConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── HavenConfig ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HavenConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub log: String,
    /// Bind address for the HTTP server (HAVEND_BIND env var, default: "127.0.0.1").
    pub bind_address: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    /// Bearer token required to call the REST API (`HAVEND_API_TOKEN` env var
    /// or `api_token` in config.toml). None = auth disabled.
    pub api_token: Option<String>,
    /// AI companion model / endpoint settings.
    pub chat: ChatConfig,
    /// Observability: slow query threshold.
    pub observability: ObservabilityConfig,
}

impl HavenConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("HAVEND_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("HAVEND_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let api_token = std::env::var("HAVEND_API_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.api_token);

        let chat = toml.chat.unwrap_or_default();
        let observability = toml.observability.unwrap_or_default();

        Self {
            port,
            data_dir,
            log,
            bind_address,
            log_format,
            api_token,
            chat,
            observability,
        }
    }

    /// Upstream API key, environment only. `HAVEND_OPENAI_API_KEY` wins over
    /// the conventional `OPENAI_API_KEY`.
    pub fn chat_api_key() -> Option<String> {
        std::env::var("HAVEND_OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()))
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/havend
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("havend");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/havend or ~/.local/share/havend
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("havend");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("havend");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\havend
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("havend");
        }
    }
    // Fallback
    PathBuf::from(".havend")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_toml() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = HavenConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.log, "info");
        assert_eq!(cfg.chat.model, DEFAULT_CHAT_MODEL);
        assert_eq!(cfg.chat.max_tokens, 300);
    }

    #[test]
    fn cli_overrides_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "port = 5000\nlog = \"debug\"\n\n[chat]\nmodel = \"gpt-4o\"\n",
        )
        .unwrap();
        let cfg = HavenConfig::new(Some(6000), Some(dir.path().to_path_buf()), None, None);
        assert_eq!(cfg.port, 6000);
        assert_eq!(cfg.log, "debug");
        assert_eq!(cfg.chat.model, "gpt-4o");
    }
}
