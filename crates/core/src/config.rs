//! Application configuration.
//!
//! Settings are read from `<config_dir>/picomenu/config.toml` and may be
//! overridden with `PICOMENU_*` environment variables
//! (e.g. `PICOMENU_LANGUAGE=de`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    store::DEFAULT_STATE_FILE,
    translate::{BeepMode, Language},
};

/// Directory under the platform config/data dirs owned by this application.
pub const APP_DIR: &str = "picomenu";

const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "PICOMENU";

const DEFAULT_CONFIG: &str = r#"# picomenu configuration
#
# Every key may also be set through the environment, e.g. PICOMENU_LANGUAGE=de.

# en, de, nl, fr, es, it
language = "en"

# none, some, all
beep = "some"
# bit mask: 1 = config, 2 = button, 4 = map, 8 = okay
beep_level = 3
capital = false

# engines_dir = "/opt/picochess/engines/aarch64"
modern_ini = "engines.ini"
retro_ini = "retro.ini"
favorites_ini = "favorites.ini"

# books_dir = "/opt/picochess/books"
books_ini = "books.ini"

# Leaving the top level with up returns to the caller instead of staying put.
exit_on_top_up = false
# Reload the catalog when engine or book files change.
watch_catalog = true
"#;

/// Runtime settings for the menu and its front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display language.
    pub language: Language,
    /// Beep mode.
    pub beep: BeepMode,
    /// Beep level mask used when `beep` is `some`.
    pub beep_level: u8,
    /// Render large and medium texts in upper case.
    pub capital: bool,
    /// Directory holding engine list files, executables and `.uci` level files.
    pub engines_dir: PathBuf,
    /// Modern engine list file name inside `engines_dir`.
    pub modern_ini: String,
    /// Retro engine list file name inside `engines_dir`.
    pub retro_ini: String,
    /// Favorite engine list file name inside `engines_dir`.
    pub favorites_ini: String,
    /// Directory holding opening books.
    pub books_dir: PathBuf,
    /// Book list file name inside `books_dir`.
    pub books_ini: String,
    /// Where the remembered selections are stored.
    pub state_path: PathBuf,
    /// Directory for log files.
    pub log_dir: PathBuf,
    /// Whether `up` at the top level reports an exit.
    pub exit_on_top_up: bool,
    /// Whether to watch the catalog directories for changes.
    pub watch_catalog: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = data_root();
        Self {
            language: Language::default(),
            beep: BeepMode::default(),
            beep_level: 0x03,
            capital: false,
            engines_dir: data.join("engines"),
            modern_ini: "engines.ini".to_string(),
            retro_ini: "retro.ini".to_string(),
            favorites_ini: "favorites.ini".to_string(),
            books_dir: data.join("books"),
            books_ini: "books.ini".to_string(),
            state_path: config_root().join(DEFAULT_STATE_FILE),
            log_dir: data.join("logs"),
            exit_on_top_up: false,
            watch_catalog: true,
        }
    }
}

impl AppConfig {
    /// Load from the default config file plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::from_path(&default_config_path())
    }

    /// Load from `path` plus environment overrides. A missing file is not an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid config {}", path.display()))
    }
}

/// Location of the config file.
pub fn default_config_path() -> PathBuf {
    config_root().join(CONFIG_FILE)
}

/// Write the default config file unless one already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = default_config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}

fn config_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_matches_defaults() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("nested").join(CONFIG_FILE);
        write_default_config(&path)?;
        assert!(path.is_file());

        let loaded = AppConfig::from_path(&path)?;
        let defaults = AppConfig::default();
        assert_eq!(loaded.language, defaults.language);
        assert_eq!(loaded.beep, defaults.beep);
        assert_eq!(loaded.beep_level, defaults.beep_level);
        assert_eq!(loaded.modern_ini, defaults.modern_ini);
        assert_eq!(loaded.books_ini, defaults.books_ini);
        assert!(!loaded.exit_on_top_up);
        assert!(loaded.watch_catalog);
        Ok(())
    }

    #[test]
    fn existing_file_is_kept() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "language = \"de\"\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "language = \"de\"\n");
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
language = "fr"
beep = "none"
capital = true
engines_dir = "/srv/engines"
exit_on_top_up = true
"#,
        )?;

        let config = AppConfig::from_path(&path)?;
        assert_eq!(config.language, Language::Fr);
        assert_eq!(config.beep, BeepMode::Off);
        assert!(config.capital);
        assert!(config.exit_on_top_up);
        assert_eq!(config.engines_dir, PathBuf::from("/srv/engines"));
        assert_eq!(config.retro_ini, "retro.ini");
        Ok(())
    }

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let temp = tempdir()?;
        let config = AppConfig::from_path(&temp.path().join("absent.toml"))?;
        assert_eq!(config.favorites_ini, "favorites.ini");
        Ok(())
    }
}
