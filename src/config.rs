//! TOML configuration parsing and validation.
//!
//! ```toml
//! [storage]
//! path = "./data/clipper.sqlite"
//!
//! [document]
//! title = "Knowledge Base"
//! default_categories = ["AI Tools", "Developer Tools", "Design", "Learning"]
//! locate = "substring"        # or "structural"
//!
//! [cache]
//! ttl_secs = 600
//!
//! [github]
//! owner = "octocat"
//! repo = "kb"
//! path = "README.md"
//! token_env = "GITHUB_TOKEN"
//!
//! [export]
//! filename = "knowledge-base.md"
//! ```
//!
//! Only `[storage]` is required. `[github]` enables `clip pull`,
//! `clip push`, and `clip verify`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clipper_core::document::KnowledgeBaseOptions;
use clipper_core::LocateStrategy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub github: Option<GithubConfig>,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,
    #[serde(default)]
    pub locate: LocateStrategy,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_categories: default_categories(),
            locate: LocateStrategy::default(),
        }
    }
}

fn default_title() -> String {
    KnowledgeBaseOptions::default().title
}
fn default_categories() -> Vec<String> {
    KnowledgeBaseOptions::default().default_categories
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    600
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_github_path")]
    pub path: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_github_path() -> String {
    "README.md".to_string()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_commit_message() -> String {
    "Update knowledge base".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl GithubConfig {
    /// Read the bearer token from the configured environment variable.
    /// Blank values count as absent.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_export_filename")]
    pub filename: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: default_export_filename(),
        }
    }
}

fn default_export_filename() -> PathBuf {
    PathBuf::from("knowledge-base.md")
}

impl Config {
    /// Defaults for commands that can run without a config file.
    pub fn minimal() -> Self {
        Self {
            storage: StorageConfig {
                path: PathBuf::from("./data/clipper.sqlite"),
            },
            document: DocumentConfig::default(),
            cache: CacheConfig::default(),
            github: None,
            export: ExportConfig::default(),
        }
    }

    pub fn kb_options(&self) -> KnowledgeBaseOptions {
        KnowledgeBaseOptions {
            title: self.document.title.clone(),
            default_categories: self.document.default_categories.clone(),
            strategy: self.document.locate,
        }
    }

    pub fn github(&self) -> Result<&GithubConfig> {
        self.github
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("GitHub mirror not configured (add a [github] section)"))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.document.title.trim().is_empty() {
        anyhow::bail!("document.title must not be empty");
    }
    if config.document.default_categories.is_empty() {
        anyhow::bail!("document.default_categories must contain at least one category");
    }
    if config
        .document
        .default_categories
        .iter()
        .any(|c| c.trim().is_empty())
    {
        anyhow::bail!("document.default_categories must not contain blank names");
    }

    if config.cache.ttl_secs == 0 {
        anyhow::bail!("cache.ttl_secs must be > 0");
    }

    if let Some(gh) = &config.github {
        for (field, value) in [("owner", &gh.owner), ("repo", &gh.repo), ("path", &gh.path)] {
            if value.trim().is_empty() {
                anyhow::bail!("github.{} must not be empty", field);
            }
        }
        if gh.timeout_secs == 0 {
            anyhow::bail!("github.timeout_secs must be > 0");
        }
    }

    Ok(config)
}
