//! Load the `[env]` table from `$XDG_CONFIG_HOME/<app>/config.toml`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

/// `$XDG_CONFIG_HOME/<app_name>/config.toml`, falling back to `~/.config` when
/// `XDG_CONFIG_HOME` is unset or empty. The file may not exist.
pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    let base = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .map(|home| home.join(".config"))
            .ok_or_else(|| LoadError::XdgPath("no home directory".to_string()))?,
    };
    Ok(base.join(app_name).join("config.toml"))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, toml::Value>,
}

/// Renders a TOML scalar as an env value; tables and arrays are skipped.
fn env_value(value: toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s),
        toml::Value::Integer(n) => Some(n.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Env pairs from the `[env]` section. Missing file or section returns an empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = config_path(app_name)?;
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config
        .env
        .into_iter()
        .filter_map(|(k, v)| env_value(v).map(|v| (k, v)))
        .collect())
}
