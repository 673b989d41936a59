use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub const DEFAULT_OUTPUT_DIR: &str = "dist";
pub const DEFAULT_BASE_DOMAIN: &str = "https://usbills.ai/";
/// Where the output directory is served while the browser prints PDFs
pub const DEFAULT_RENDER_BASE_URL: &str = "http://localhost:9000/";
pub const DEFAULT_BROWSER: &str = "google-chrome";

/// Get the default cache directory: $HOME/.cache/fbs
pub fn default_cache_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| {
            Error::Config(
                "Could not determine home directory. Set HOME or USERPROFILE environment variable."
                    .to_string(),
            )
        })?;

    Ok(PathBuf::from(home).join(".cache").join("fbs"))
}

/// Configuration shared by all commands
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Cache directory holding parsed bill files
    pub bills_dir: PathBuf,
    /// Aggregate statistics file
    pub stats_path: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Public site root, with trailing slash
    pub base_domain: String,
    pub render_base_url: String,
    /// Headless browser executable used for PDF export
    pub browser: String,
}

impl Config {
    /// Create a configuration rooted at the given cache directory
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        Self {
            bills_dir: cache_dir.join("bills"),
            stats_path: cache_dir.join("stats.json"),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
            render_base_url: DEFAULT_RENDER_BASE_URL.to_string(),
            browser: DEFAULT_BROWSER.to_string(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("base_domain", &self.base_domain),
            ("render_base_url", &self.render_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.browser.trim().is_empty() {
            return Err(Error::Config("Browser executable is empty".to_string()));
        }

        Ok(())
    }
}

/// Optional settings read from a YAML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bills_dir: Option<PathBuf>,
    pub stats_path: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub base_domain: Option<String>,
    pub render_base_url: Option<String>,
    pub browser: Option<String>,
}

impl FileConfig {
    /// Load and parse an fbs.yml configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

/// Builder for creating configurations
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default settings under `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: Config::new(cache_dir),
        }
    }

    /// Create a builder rooted at $HOME/.cache/fbs
    pub fn from_home() -> Result<Self> {
        Ok(Self::new(default_cache_dir()?))
    }

    /// Apply every setting present in a configuration file
    pub fn file(mut self, file: FileConfig) -> Self {
        if let Some(dir) = file.bills_dir {
            self.config.bills_dir = dir;
        }
        if let Some(path) = file.stats_path {
            self.config.stats_path = path;
        }
        if let Some(dir) = file.template_dir {
            self.config.template_dir = dir;
        }
        if let Some(dir) = file.output_dir {
            self.config.output_dir = dir;
        }
        if let Some(domain) = file.base_domain {
            self.config.base_domain = domain;
        }
        if let Some(url) = file.render_base_url {
            self.config.render_base_url = url;
        }
        if let Some(browser) = file.browser {
            self.config.browser = browser;
        }
        self
    }

    /// Set the bills cache directory
    pub fn bills_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.bills_dir = dir.into();
        self
    }

    /// Set the statistics file path
    pub fn stats_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.stats_path = path.into();
        self
    }

    /// Set the template directory
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dir = dir.into();
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the public site root
    pub fn base_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.base_domain = domain.into();
        self
    }

    /// Set the URL the browser loads rendered pages from
    pub fn render_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.render_base_url = url.into();
        self
    }

    /// Set the browser executable
    pub fn browser(mut self, browser: impl Into<String>) -> Self {
        self.config.browser = browser.into();
        self
    }

    /// Build the final configuration
    pub fn build(mut self) -> Result<Config> {
        for url in [&mut self.config.base_domain, &mut self.config.render_base_url] {
            if !url.ends_with('/') {
                url.push('/');
            }
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".cache/fbs")
    }
}
