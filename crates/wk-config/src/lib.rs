//! Configuration management for the wiki renderer.
//!
//! Parses `wiki.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [paths]
//! media_path = "/media"
//! file_media_path = "${WIKI_ROOT}/media"
//! api_url = "https://api.nette.org"
//! download_dir = "/download"
//! domain = "nette.org"
//! profile_url = "https://forum.nette.org/en/profile.php?id="
//!
//! [render]
//! toc_threshold = 4000
//! default_book = "www"
//! default_lang = "en"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! Every `[paths]` value supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! A relative `file_media_path` is resolved against the config file's
//! directory.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use wk_links::{HOMEPAGE, PageId, Paths};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "wiki.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override site domain.
    pub domain: Option<String>,
    /// Override attachment root on disk.
    pub file_media_path: Option<PathBuf>,
    /// Override automatic table of contents threshold.
    pub toc_threshold: Option<usize>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL and filesystem roots used for link resolution.
    pub paths: Paths,
    /// Rendering options.
    pub render: RenderConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// HTML length above which pages get a table of contents automatically.
    pub toc_threshold: usize,
    /// Book of pages rendered without an explicit page id.
    pub default_book: String,
    /// Language of pages rendered without an explicit page id.
    pub default_lang: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            toc_threshold: 4000,
            default_book: "www".to_owned(),
            default_lang: "en".to_owned(),
        }
    }
}

impl RenderConfig {
    /// Page id in the default book and language.
    ///
    /// An empty `path` means the homepage.
    #[must_use]
    pub fn page_id(&self, path: &str) -> PageId {
        let path = path.trim_matches('/');
        let path = if path.is_empty() { HOMEPAGE } else { path };
        PageId::new(&*self.default_book, &*self.default_lang, path)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`paths.api_url`").
        field: String,
        /// Error message (e.g., "${`API_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wiki.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(domain) = &settings.domain {
            self.paths.domain.clone_from(domain);
        }
        if let Some(file_media_path) = &settings.file_media_path {
            self.paths.file_media_path = file_media_path.to_string_lossy().into_owned();
        }
        if let Some(toc_threshold) = settings.toc_threshold {
            self.render.toc_threshold = toc_threshold;
        }
    }

    /// Search for a config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after applying CLI
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let render = &self.render;

        if render.toc_threshold == 0 {
            return Err(ConfigError::Validation(
                "render.toc_threshold must be greater than 0".to_owned(),
            ));
        }

        require_non_empty(&render.default_book, "render.default_book")?;

        let lang = render.default_lang.as_bytes();
        if lang.len() != 2 || !lang.iter().all(u8::is_ascii_lowercase) {
            return Err(ConfigError::Validation(format!(
                "render.default_lang must be a two-letter language code, got {:?}",
                render.default_lang
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in path roots.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let paths = &mut self.paths;
        for (value, field) in [
            (&mut paths.media_path, "paths.media_path"),
            (&mut paths.file_media_path, "paths.file_media_path"),
            (&mut paths.api_url, "paths.api_url"),
            (&mut paths.download_dir, "paths.download_dir"),
            (&mut paths.domain, "paths.domain"),
            (&mut paths.profile_url, "paths.profile_url"),
        ] {
            *value = expand::expand_env(value, field)?;
        }
        Ok(())
    }

    /// Resolve a relative `file_media_path` against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let file_media_path = Path::new(&self.paths.file_media_path);
        if !self.paths.file_media_path.is_empty() && file_media_path.is_relative() {
            self.paths.file_media_path = config_dir
                .join(file_media_path)
                .to_string_lossy()
                .into_owned();
        }
    }
}
