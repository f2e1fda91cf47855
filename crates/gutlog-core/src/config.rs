//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/gutlog/config.toml)
//! 3. Environment variables (GUTLOG_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "GUTLOG";

/// Default base URL of the recipe sync API
pub const DEFAULT_RECIPE_BASE_URL: &str = "https://www.paprikaapp.com/api/v1";

/// Default allowance for timestamps slightly in the future (clock skew, slow typing)
pub const DEFAULT_FUTURE_TOLERANCE_MINUTES: i64 = 5;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db, debug log)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file used when GUTLOG_LOG is set (defaults to <data_dir>/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Base URL of the recipe sync API
    #[serde(default = "default_recipe_base_url")]
    pub recipe_base_url: String,

    /// How far in the future a log timestamp may be
    #[serde(default = "default_future_tolerance")]
    pub future_tolerance_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: None,
            recipe_base_url: default_recipe_base_url(),
            future_tolerance_minutes: default_future_tolerance(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (GUTLOG_DATA_DIR, GUTLOG_LOG_FILE, GUTLOG_RECIPE_BASE_URL,
    ///    GUTLOG_FUTURE_TOLERANCE_MINUTES)
    /// 2. Config file (~/.config/gutlog/config.toml or GUTLOG_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // Empty string clears it
        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Ok(val) = std::env::var(format!("{}_RECIPE_BASE_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.recipe_base_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_FUTURE_TOLERANCE_MINUTES", ENV_PREFIX)) {
            self.future_tolerance_minutes = val.trim().parse().with_context(|| {
                format!(
                    "Invalid {}_FUTURE_TOLERANCE_MINUTES '{}'. Use a whole number.",
                    ENV_PREFIX, val
                )
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.future_tolerance_minutes < 0 {
            bail!(
                "future_tolerance_minutes cannot be negative (got {})",
                self.future_tolerance_minutes
            );
        }
        Ok(())
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with GUTLOG_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gutlog")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("gutlog.db")
    }

    /// Get the path of the debug log
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gutlog")
}

fn default_recipe_base_url() -> String {
    DEFAULT_RECIPE_BASE_URL.to_string()
}

fn default_future_tolerance() -> i64 {
    DEFAULT_FUTURE_TOLERANCE_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "GUTLOG_DATA_DIR",
        "GUTLOG_LOG_FILE",
        "GUTLOG_RECIPE_BASE_URL",
        "GUTLOG_FUTURE_TOLERANCE_MINUTES",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data_dir.ends_with("gutlog"));
        assert!(config.log_file.is_none());
        assert_eq!(config.recipe_base_url, DEFAULT_RECIPE_BASE_URL);
        assert_eq!(config.future_tolerance_minutes, 5);
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/gutlog"),
            ..Config::default()
        };

        assert_eq!(config.sqlite_path(), PathBuf::from("/data/gutlog/gutlog.db"));
        assert_eq!(config.log_path(), PathBuf::from("/data/gutlog/debug.log"));

        let config = Config {
            log_file: Some(PathBuf::from("/tmp/gutlog.log")),
            ..config
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/gutlog.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("GUTLOG_DATA_DIR", "/tmp/gutlog-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/gutlog-test"));
    }

    #[test]
    fn test_env_override_log_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("GUTLOG_LOG_FILE", "/tmp/gutlog.log");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/gutlog.log")));

        env::set_var("GUTLOG_LOG_FILE", "");
        config.apply_env_overrides().unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_env_override_recipe_url_ignores_empty() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("GUTLOG_RECIPE_BASE_URL", "http://localhost:9000/api");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.recipe_base_url, "http://localhost:9000/api");

        env::set_var("GUTLOG_RECIPE_BASE_URL", "");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.recipe_base_url, "http://localhost:9000/api");
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str(r#"data_dir = "/custom/data""#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.recipe_base_url, DEFAULT_RECIPE_BASE_URL);
        assert_eq!(config.future_tolerance_minutes, 5);
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            log_file: None,
            recipe_base_url: "http://recipes.local".to_string(),
            future_tolerance_minutes: 15,
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.recipe_base_url, "http://recipes.local");
        assert_eq!(loaded.future_tolerance_minutes, 15);
        assert!(loaded.data_dir.exists());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("GUTLOG_DATA_DIR", temp_dir.path().join("data"));

        let config = Config::load_from_path(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.recipe_base_url, DEFAULT_RECIPE_BASE_URL);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_env_override_future_tolerance() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("GUTLOG_FUTURE_TOLERANCE_MINUTES", "30");
        let config = Config::load_from_str("future_tolerance_minutes = 10").unwrap();
        assert_eq!(config.future_tolerance_minutes, 30);

        env::set_var("GUTLOG_FUTURE_TOLERANCE_MINUTES", "soon");
        let err = Config::load_from_str("").unwrap_err();
        assert!(err.to_string().contains("GUTLOG_FUTURE_TOLERANCE_MINUTES"));
    }

    #[test]
    fn test_negative_future_tolerance_rejected() {
        let _guard = EnvGuard::new(ENV_VARS);

        let err = Config::load_from_str("future_tolerance_minutes = -5").unwrap_err();
        assert!(err.to_string().contains("cannot be negative"));

        env::set_var("GUTLOG_FUTURE_TOLERANCE_MINUTES", "-1");
        assert!(Config::load_from_str("").is_err());
    }
}
