/// Configuration system for callscope.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::CallscopeConfig::default()`]
/// 2. **User global config**: `~/.callscope/config.toml`
/// 3. **Project local config**: `.callscope.toml` in the current working directory
/// 4. **Environment variables**: `CALLSCOPE_*` overrides (highest precedence)
///
/// Each file is deserialized with defaults for missing fields, so a later
/// layer replaces the earlier one wholesale. In practice users set a handful
/// of keys and the defaults for everything else match.
///
/// # Usage
///
/// ```rust,ignore
/// use callscope::config;
///
/// let cfg = config::load();
/// let client = ApiClient::from_config(&cfg.api);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::CallscopeConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved callscope configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> CallscopeConfig {
    let mut config = CallscopeConfig::default();

    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. Malformed files are reported on stderr and skipped.
fn load_toml_file(path: Option<PathBuf>) -> Option<CallscopeConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!("callscope: ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding the global config and request log: `~/.callscope/`.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".callscope"))
}

fn global_config_path() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".callscope.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `CALLSCOPE_API_URL`: analysis service base URL
/// - `CALLSCOPE_API_TIMEOUT_MS`: request timeout
/// - `CALLSCOPE_WEB_ADDR`: dashboard listen address
/// - `CALLSCOPE_EXPORT_DIR`: CSV export directory
/// - `CALLSCOPE_LOGGING`: request log on/off (`1`/`true`/`yes`/`on`)
/// - `CALLSCOPE_LOG_LEVEL`: `error`, `warn`, `info`, `debug`
fn apply_env_overrides(config: &mut CallscopeConfig) {
    if let Ok(val) = std::env::var("CALLSCOPE_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("CALLSCOPE_API_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("CALLSCOPE_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("CALLSCOPE_EXPORT_DIR") {
        config.export.dir = val;
    }
    if let Ok(val) = std::env::var("CALLSCOPE_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("CALLSCOPE_LOG_LEVEL")
        && let Some(level) = parse_log_level(&val)
    {
        config.logging.level = level;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_log_level(val: &str) -> Option<schema::LogLevel> {
    match val.to_ascii_lowercase().as_str() {
        "error" => Some(schema::LogLevel::Error),
        "warn" | "warning" => Some(schema::LogLevel::Warn),
        "info" => Some(schema::LogLevel::Info),
        "debug" | "trace" => Some(schema::LogLevel::Debug),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.callscope/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, CallscopeConfig::default_toml()).context("failed to write config file")?;
    Ok(())
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `api.base_url`. Creates the file from defaults
/// when it doesn't exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&CallscopeConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values that no longer deserialize into the schema
    let output = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<CallscopeConfig>(&output)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;
    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn parse_log_level_handles_variants() {
        assert_eq!(parse_log_level("WARNING"), Some(schema::LogLevel::Warn));
        assert_eq!(parse_log_level("debug"), Some(schema::LogLevel::Debug));
        assert_eq!(parse_log_level("loud"), None);
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str("[api]\nbase_url = \"http://a\"").unwrap();
        set_toml_value(&mut root, "api.base_url", "http://b:8000").unwrap();
        assert_eq!(root["api"]["base_url"].as_str(), Some("http://b:8000"));
    }

    #[test]
    fn set_toml_value_updates_bool_and_integer() {
        let mut root: toml::Value =
            toml::from_str("[web]\nopen_browser = true\n[api]\ntimeout_ms = 100").unwrap();
        set_toml_value(&mut root, "web.open_browser", "off").unwrap();
        set_toml_value(&mut root, "api.timeout_ms", "2500").unwrap();
        assert_eq!(root["web"]["open_browser"].as_bool(), Some(false));
        assert_eq!(root["api"]["timeout_ms"].as_integer(), Some(2500));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root: toml::Value = toml::from_str("[api]\ntimeout_ms = 100").unwrap();
        assert!(set_toml_value(&mut root, "api.timeout_ms", "soon").is_err());
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "api.unknown", "x").is_err());
        assert!(set_toml_value(&mut root, "api.", "x").is_err());
    }

    #[test]
    fn set_config_value_at_creates_file_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        set_config_value_at(&path, "display.recent_reports", "8").unwrap();

        let cfg: CallscopeConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cfg.display.recent_reports, 8);
        assert_eq!(cfg.api.timeout_ms, 30_000);
    }

    #[test]
    fn set_config_value_at_rejects_invalid_enum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path, false).unwrap();

        assert!(set_config_value_at(&path, "logging.level", "loud").is_err());
        let cfg: CallscopeConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cfg.logging.level, schema::LogLevel::Warn);
    }

    #[test]
    fn write_default_config_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path, false).unwrap();
        assert!(write_default_config(&path, false).is_err());
        assert!(write_default_config(&path, true).is_ok());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: CallscopeConfig = toml::from_str(&toml_str).unwrap();
    }
}
