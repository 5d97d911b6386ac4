//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/microblog/config.toml)
//! 3. Environment variables (MICROBLOG_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_PAGE_SIZE;

/// Environment variable prefix
const ENV_PREFIX: &str = "MICROBLOG";

/// Name of the entries file inside the data directory
const ENTRIES_FILE: &str = "entries.txt";

/// Blog metadata shown by page renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub title: String,
    pub author: String,
    pub description: String,
    pub keywords: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "Microblog".to_string(),
            author: "Someone".to_string(),
            description: "A very plain twitter style microblog".to_string(),
            keywords: "microblog, micro, blog".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the entries file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Posts per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Log file (stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub blog: BlogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            page_size: default_page_size(),
            log_file: None,
            blog: BlogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (MICROBLOG_DATA_DIR, MICROBLOG_PAGE_SIZE, ...)
    /// 2. Config file (~/.config/microblog/config.toml or MICROBLOG_CONFIG)
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
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_var("DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }

        if let Some(val) = env_var("PAGE_SIZE") {
            self.page_size = val
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}_PAGE_SIZE: '{}'", ENV_PREFIX, val))?;
        }

        if let Some(val) = env_var("LOG_FILE") {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Some(val) = env_var("BLOG_TITLE") {
            self.blog.title = val;
        }
        if let Some(val) = env_var("BLOG_AUTHOR") {
            self.blog.author = val;
        }
        if let Some(val) = env_var("BLOG_DESCRIPTION") {
            self.blog.description = val;
        }
        if let Some(val) = env_var("BLOG_KEYWORDS") {
            self.blog.keywords = val;
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
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with MICROBLOG_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_var("CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("microblog")
            .join("config.toml")
    }

    /// Get the path to the entries file
    pub fn entries_path(&self) -> PathBuf {
        self.data_dir.join(ENTRIES_FILE)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("microblog")
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

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
        "MICROBLOG_DATA_DIR",
        "MICROBLOG_PAGE_SIZE",
        "MICROBLOG_LOG_FILE",
        "MICROBLOG_BLOG_TITLE",
        "MICROBLOG_BLOG_AUTHOR",
        "MICROBLOG_BLOG_DESCRIPTION",
        "MICROBLOG_BLOG_KEYWORDS",
        "MICROBLOG_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page_size, 20);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("microblog"));
        assert_eq!(config.blog.title, "Microblog");
        assert_eq!(config.blog.author, "Someone");
    }

    #[test]
    fn test_entries_path() {
        let config = Config::default();
        assert!(config.entries_path().ends_with("entries.txt"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("MICROBLOG_DATA_DIR", "/tmp/microblog-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/microblog-test"));
    }

    #[test]
    fn test_env_override_page_size() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("MICROBLOG_PAGE_SIZE", "5");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.page_size, 5);

        env::set_var("MICROBLOG_PAGE_SIZE", "lots");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_env_override_blog() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("MICROBLOG_BLOG_TITLE", "Field Notes");
        env::set_var("MICROBLOG_BLOG_AUTHOR", "Sam");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.blog.title, "Field Notes");
        assert_eq!(config.blog.author, "Sam");
        assert_eq!(config.blog.keywords, "microblog, micro, blog");
    }

    #[test]
    fn test_env_override_log_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("MICROBLOG_LOG_FILE", "/tmp/microblog.log");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/microblog.log")));

        // Empty string clears it
        env::set_var("MICROBLOG_LOG_FILE", "");
        config.apply_env_overrides().unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/microblog"),
            page_size: 10,
            log_file: Some(PathBuf::from("/var/log/microblog.log")),
            blog: BlogConfig {
                title: "Notes".to_string(),
                ..BlogConfig::default()
            },
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("page_size"));
        assert!(toml_str.contains("[blog]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.page_size, config.page_size);
        assert_eq!(parsed.log_file, config.log_file);
        assert_eq!(parsed.blog, config.blog);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            page_size = 50

            [blog]
            title = "Custom"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.blog.title, "Custom");
        // Unset blog fields keep their defaults
        assert_eq!(config.blog.author, "Someone");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        env::set_var("MICROBLOG_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.page_size, 20);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("conf").join("config.toml");

        let mut config = Config::default();
        config.data_dir = temp_dir.path().join("data");
        config.page_size = 7;
        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.page_size, 7);
    }

    #[test]
    fn test_save_to_default_path_honours_env() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");
        env::set_var("MICROBLOG_CONFIG", &config_path);

        let mut config = Config::default();
        config.data_dir = temp_dir.path().join("data");
        config.blog.title = "Field Notes".to_string();
        config.save().unwrap();

        assert!(config_path.exists());
        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.blog.title, "Field Notes");
    }
}
