//! Configuration system for newscheck.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults**: hardcoded in [`schema::NewscheckConfig::default()`]
//! 2. **User global config**: `~/.newscheck/config.toml`
//! 3. **Project local config**: `.newscheck.toml` in the current working directory
//! 4. **Environment variables**: `PORT` and `NEWSCHECK_*` overrides (highest precedence)
//!
//! File layers merge key by key, so a project file only needs the keys it
//! changes. Keys no layer sets fall back to built-in defaults.
//!
//! # Usage
//!
//! ```rust,ignore
//! use newscheck::config;
//!
//! let cfg = config::load();
//! println!("serving {} on port {}", cfg.server.root_dir, cfg.server.port);
//! ```

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::{ApiConfig, LoggingConfig, NewscheckConfig, ServerConfig};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Skipped layers are dropped silently; use [`load_with_warnings`]
/// when they should be reported.
pub fn load() -> NewscheckConfig {
    load_with_warnings().config
}

/// Load the configuration from explicit file locations, then apply the
/// environment layer.
pub fn load_from(global: Option<&Path>, project: Option<&Path>) -> NewscheckConfig {
    load_from_with_warnings(global, project).config
}

/// A config layer that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// The file, or `merged layers` when the combination was rejected.
    pub source: String,
    pub error: String,
}

/// A resolved configuration plus the layers that were skipped to get it.
///
/// Config is loaded before the log subscriber exists, so warnings are
/// carried here and emitted by [`Loaded::report`] once logging is up.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub config: NewscheckConfig,
    pub warnings: Vec<ConfigWarning>,
}

impl Loaded {
    /// Log every skipped layer at `warn`.
    pub fn report(&self) {
        for warning in &self.warnings {
            tracing::warn!(
                source = %warning.source,
                error = %warning.error,
                "ignoring malformed config file"
            );
        }
    }
}

/// [`load`], keeping the warnings for skipped layers.
pub fn load_with_warnings() -> Loaded {
    load_from_with_warnings(
        global_config_path().as_deref(),
        project_config_path().as_deref(),
    )
}

/// [`load_from`], keeping the warnings for skipped layers.
pub fn load_from_with_warnings(global: Option<&Path>, project: Option<&Path>) -> Loaded {
    let mut warnings = Vec::new();
    let mut merged = toml::Value::Table(toml::Table::new());

    for path in [global, project].into_iter().flatten() {
        match load_toml_file(path) {
            Ok(Some(layer)) => merge_config(&mut merged, layer),
            Ok(None) => {}
            Err(error) => warnings.push(ConfigWarning {
                source: path.display().to_string(),
                error,
            }),
        }
    }

    let mut config = merged.try_into::<NewscheckConfig>().unwrap_or_else(|e| {
        warnings.push(ConfigWarning {
            source: "merged layers".to_string(),
            error: e.to_string(),
        });
        NewscheckConfig::default()
    });

    apply_env_overrides(&mut config);

    Loaded { config, warnings }
}

/// Load a TOML config file from the given path as a raw value tree.
///
/// `Ok(None)` when the file doesn't exist or can't be read; `Err` with the
/// parse error when the content is malformed. A malformed file must not
/// keep the server from starting with defaults.
fn load_toml_file(path: &Path) -> Result<Option<toml::Value>, String> {
    let Ok(content) = fs::read_to_string(path) else {
        return Ok(None);
    };
    let value = toml::from_str::<toml::Value>(&content).map_err(|e| e.to_string())?;
    value
        .clone()
        .try_into::<NewscheckConfig>()
        .map_err(|e| e.to_string())?;
    Ok(Some(value))
}

/// Merge a config layer into the base tree.
///
/// Tables merge key by key; any other value in the overlay replaces the
/// base value. Keys a layer does not mention keep the lower layer's value.
fn merge_config(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_config(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.newscheck/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".newscheck").join("config.toml"))
}

/// Path to the project local config: `.newscheck.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".newscheck.toml"))
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
/// - `PORT`: listening port of the asset server
/// - `NEWSCHECK_HOST`: bind interface
/// - `NEWSCHECK_ROOT`: asset root directory
/// - `NEWSCHECK_API_URL`: classification API base URL
/// - `NEWSCHECK_API_TIMEOUT_MS`: `POST /detect` timeout
/// - `NEWSCHECK_LOG`: default log filter
fn apply_env_overrides(config: &mut NewscheckConfig) {
    if let Ok(val) = std::env::var("PORT")
        && let Ok(port) = val.trim().parse::<u16>()
    {
        config.server.port = port;
    }
    if let Ok(val) = std::env::var("NEWSCHECK_HOST")
        && !val.is_empty()
    {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("NEWSCHECK_ROOT")
        && !val.is_empty()
    {
        config.server.root_dir = val;
    }

    if let Ok(val) = std::env::var("NEWSCHECK_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("NEWSCHECK_API_TIMEOUT_MS")
        && let Ok(ms) = val.trim().parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }

    if let Ok(val) = std::env::var("NEWSCHECK_LOG")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.newscheck/config.toml`.
///
/// Returns an error if the file already exists and `force` is not set.
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

    fs::write(path, NewscheckConfig::default_toml()).context("failed to write config file")?;
    Ok(())
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `server.port`. The file is created from the
/// defaults when it does not exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let content = if path.exists() {
        fs::read_to_string(path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&NewscheckConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that would leave the file unloadable.
    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    toml::from_str::<NewscheckConfig>(&output)
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' cannot be set from the command line"),
        None => anyhow::bail!("unknown config key: '{key}'"),
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
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str("[server]\nroot_dir = \"ui\"\n").unwrap();
        set_toml_value(&mut root, "server.root_dir", "public").unwrap();
        assert_eq!(root["server"]["root_dir"].as_str(), Some("public"));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root: toml::Value = toml::from_str("[server]\nport = 3000\n").unwrap();
        set_toml_value(&mut root, "server.port", "8081").unwrap();
        assert_eq!(root["server"]["port"].as_integer(), Some(8081));
    }

    #[test]
    fn set_toml_value_rejects_non_integer() {
        let mut root: toml::Value = toml::from_str("[server]\nport = 3000\n").unwrap();
        assert!(set_toml_value(&mut root, "server.port", "abc").is_err());
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[server]\nport = 3000\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "server.nope", "value").is_err());
        assert!(set_toml_value(&mut root, "", "value").is_err());
    }

    #[test]
    fn set_config_value_creates_file_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        set_config_value_at(&path, "api.base_url", "http://10.0.0.5:9000").unwrap();

        let written: NewscheckConfig =
            toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(written.server.port, 3000);
    }

    #[test]
    fn set_config_value_rejects_out_of_range_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(set_config_value_at(&path, "server.port", "70000").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn write_default_config_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path, false).unwrap();
        assert!(write_default_config(&path, false).is_err());
        assert!(write_default_config(&path, true).is_ok());
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[server\nport = ").unwrap();
        assert!(load_toml_file(&path).is_err());

        fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();
        assert!(load_toml_file(&path).is_err());
    }

    #[test]
    fn project_layer_overrides_only_its_keys() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(
            &global,
            "[server]\nroot_dir = \"global-ui\"\nworkers = 8\n\n[api]\nbase_url = \"http://global:1\"\n",
        )
        .unwrap();
        fs::write(&project, "[server]\nroot_dir = \"public\"\n").unwrap();

        let mut merged = toml::Value::Table(toml::Table::new());
        merge_config(&mut merged, load_toml_file(&global).unwrap().unwrap());
        merge_config(&mut merged, load_toml_file(&project).unwrap().unwrap());
        let config: NewscheckConfig = merged.try_into().unwrap();

        assert_eq!(config.server.root_dir, "public");
        assert_eq!(config.server.workers, 8);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.api.base_url, "http://global:1");
    }

    #[test]
    fn missing_file_is_not_a_layer() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        assert_eq!(load_toml_file(&absent), Ok(None));
    }

    #[test]
    fn malformed_layer_is_reported_once_logging_is_up() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(&global, "[server]\nroot_dir = \"global-ui\"\n").unwrap();
        fs::write(&project, "[server\nport = ").unwrap();

        // Loading itself logs nothing: no subscriber exists yet at startup.
        let (loaded, during_load) =
            crate::logging::capture(|| load_from_with_warnings(Some(&global), Some(&project)));
        assert!(during_load.is_empty(), "{during_load}");
        assert_eq!(loaded.config.server.root_dir, "global-ui");
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].source, project.display().to_string());

        let ((), output) = crate::logging::capture(|| loaded.report());
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("ignoring malformed config file"), "{output}");
        assert!(output.contains("project.toml"), "{output}");
    }

    #[test]
    fn clean_layers_produce_no_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(&global, "[api]\nbase_url = \"http://x:1\"\n").unwrap();
        let loaded = load_from_with_warnings(Some(&global), None);
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config.api.base_url, "http://x:1");
    }
}
