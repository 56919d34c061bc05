//! Load configuration from XDG `config.toml` and project `.env`, then apply it to the
//! process environment with priority: **existing env > .env > XDG**.
//!
//! Keys are plain environment variable names (`DATASET_API_KEY`, `OPENAI_API_KEY`,
//! `MAX_POLL_ATTEMPTS`, ...); `prism::Settings::from_env` reads them afterwards.

mod dotenv;
mod xdg_toml;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;

pub use xdg_toml::config_path;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Which keys were set, by origin. Values are not kept (they are often secrets).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    pub from_dotenv: Vec<String>,
    pub from_xdg: Vec<String>,
}

impl Applied {
    pub fn is_empty(&self) -> bool {
        self.from_dotenv.is_empty() && self.from_xdg.is_empty()
    }
}

/// Loads `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]` and the project `.env`, then
/// sets only the variables that are **not** already set.
///
/// * `app_name`: e.g. `"prism"`; used for the XDG path.
/// * `override_dir`: if `Some`, look for `.env` there instead of the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Applied, LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;
    let applied = merge_into_env(&dotenv_map, &xdg_map);
    tracing::debug!(
        dotenv = ?applied.from_dotenv,
        xdg = ?applied.from_xdg,
        "Applied configuration"
    );
    Ok(applied)
}

fn merge_into_env(
    dotenv_map: &HashMap<String, String>,
    xdg_map: &HashMap<String, String>,
) -> Applied {
    let keys: BTreeSet<&String> = dotenv_map.keys().chain(xdg_map.keys()).collect();
    let mut applied = Applied::default();

    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key) {
            std::env::set_var(key, v);
            applied.from_dotenv.push(key.clone());
        } else if let Some(v) = xdg_map.get(key) {
            std::env::set_var(key, v);
            applied.from_xdg.push(key.clone());
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_xdg(root: &Path, app: &str, body: &str) {
        let app_dir = root.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn existing_env_wins() {
        let dotenv_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dotenv_dir.path().join(".env"),
            "PRISM_TEST_EXISTING=from_dotenv\n",
        )
        .unwrap();
        temp_env::with_var("PRISM_TEST_EXISTING", Some("from_env"), || {
            let applied = load_and_apply("prism-test-none", Some(dotenv_dir.path())).unwrap();
            assert!(applied.is_empty());
            assert_eq!(std::env::var("PRISM_TEST_EXISTING").as_deref(), Ok("from_env"));
        });
    }

    #[test]
    fn load_and_apply_no_config_ok() {
        let empty = tempfile::tempdir().unwrap();
        temp_env::with_var("XDG_CONFIG_HOME", Some(empty.path()), || {
            let applied = load_and_apply("prism", Some(empty.path())).unwrap();
            assert!(applied.is_empty());
        });
    }

    /// **Scenario**: a key in both files takes the .env value; an XDG-only key still applies.
    #[test]
    fn dotenv_overrides_xdg() {
        let xdg_dir = tempfile::tempdir().unwrap();
        write_xdg(
            xdg_dir.path(),
            "prism",
            "[env]\nPRISM_TEST_PRIORITY = \"from_xdg\"\nPRISM_TEST_XDG_ONLY = \"x\"\n",
        );
        let dotenv_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dotenv_dir.path().join(".env"),
            "PRISM_TEST_PRIORITY=from_dotenv\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                ("XDG_CONFIG_HOME", Some(xdg_dir.path().as_os_str())),
                ("PRISM_TEST_PRIORITY", None),
                ("PRISM_TEST_XDG_ONLY", None),
            ],
            || {
                let applied = load_and_apply("prism", Some(dotenv_dir.path())).unwrap();
                assert_eq!(std::env::var("PRISM_TEST_PRIORITY").unwrap(), "from_dotenv");
                assert_eq!(std::env::var("PRISM_TEST_XDG_ONLY").unwrap(), "x");
                assert_eq!(applied.from_dotenv, vec!["PRISM_TEST_PRIORITY".to_string()]);
                assert_eq!(applied.from_xdg, vec!["PRISM_TEST_XDG_ONLY".to_string()]);
            },
        );
    }

    #[test]
    fn invalid_xdg_toml_fails_with_xdg_parse_error() {
        let xdg_dir = tempfile::tempdir().unwrap();
        write_xdg(xdg_dir.path(), "prism", "invalid [[[\n");
        temp_env::with_var("XDG_CONFIG_HOME", Some(xdg_dir.path()), || {
            let result = load_and_apply("prism", Some(xdg_dir.path()));
            assert!(matches!(result, Err(LoadError::XdgParse(_))));
        });
    }
}
