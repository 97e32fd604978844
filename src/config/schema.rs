/// Configuration schema and defaults for callscope.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[api]`, `[display]`, `[chat]`, `[export]`, `[web]` and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level callscope configuration.
///
/// Maps directly to the `~/.callscope/config.toml` and `.callscope.toml`
/// file schemas. Missing sections and fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallscopeConfig {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub chat: ChatConfig,
    pub export: ExportConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Remote analysis service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the analysis service.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 30_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of recent reports shown on the home page.
    pub recent_reports: usize,
    /// Maximum trend points kept in the analytics trend series (0 = all).
    pub trend_points: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            recent_reports: 5,
            trend_points: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// [chat]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Show suggested questions when a chat session starts.
    pub show_suggestions: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_suggestions: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory CSV exports are written to. Empty means the OS downloads
    /// directory (falling back to the current directory).
    pub dir: String,
    /// How long an export notice stays visible (milliseconds).
    pub notice_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            notice_ms: 4000,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `callscope web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9750".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Console verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every API request to `~/.callscope/requests.jsonl`.
    pub enabled: bool,
    /// Console diagnostics at or above this level are printed to stderr.
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl CallscopeConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `callscope config init` to create a starting config file with
    /// all settings documented.
    pub fn default_toml() -> String {
        r#"# callscope Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CALLSCOPE_*)
#   2. Project config (.callscope.toml in current directory)
#   3. User global config (~/.callscope/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://localhost:8000"   # CALLSCOPE_API_URL
timeout_ms = 30000                   # CALLSCOPE_API_TIMEOUT_MS

[display]
recent_reports = 5                   # Reports listed on the home page
trend_points = 30                    # 0 keeps every trend point

[chat]
show_suggestions = true

[export]
dir = ""                             # Empty = downloads directory
notice_ms = 4000                     # Export notice auto-dismiss delay

[web]
addr = "127.0.0.1:9750"              # CALLSCOPE_WEB_ADDR
open_browser = true

[logging]
enabled = true                       # Request log at ~/.callscope/requests.jsonl
level = "warn"                       # error | warn | info | debug
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
