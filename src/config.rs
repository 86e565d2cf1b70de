//! Configuration for junit-checks.
//!
//! Settings are layered: `junit-checks.toml` → environment → CLI. The
//! environment layer covers the GitHub Actions inputs (`INPUT_PATH`,
//! `INPUT_STRIPFROMPATH`, `INPUT_ACCESSTOKEN`) and the runner context
//! (`GITHUB_REPOSITORY`, `GITHUB_SHA`, `GITHUB_JOB`, `GITHUB_API_URL`); the
//! binary wires those through clap, so they reach [`ActionConfig::resolve`]
//! as [`Inputs`] together with CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [report]
//! path = "build/test-results/**/TEST-*.xml"
//! strip_from_path = "/home/runner/work/app/app/"
//!
//! [github]
//! api_url = "https://github.example.com/api/v3"
//! check_title = "Junit Results"
//! check_summary = "jUnit Results"
//! annotations_per_request = 50
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::publish::github::DEFAULT_API_URL;
use crate::publish::{DispatchSettings, MAX_ANNOTATIONS_PER_REQUEST};

/// Location probed for a config file when none is given.
pub const DEFAULT_CONFIG_PATH: &str = ".github/junit-checks.toml";
pub const DEFAULT_REPORT_PATTERN: &str = "**/TEST-*.xml";

/// `[report]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    /// Report search pattern, one glob per line
    #[serde(default)]
    pub path: Option<String>,
    /// Substring removed once from each failing case's file path
    #[serde(default)]
    pub strip_from_path: Option<String>,
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSection {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_check_title")]
    pub check_title: String,
    #[serde(default = "default_check_summary")]
    pub check_summary: String,
    #[serde(default = "default_annotations_per_request")]
    pub annotations_per_request: usize,
}

fn default_check_title() -> String {
    "Junit Results".to_string()
}

fn default_check_summary() -> String {
    "jUnit Results".to_string()
}

fn default_annotations_per_request() -> usize {
    MAX_ANNOTATIONS_PER_REQUEST
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            api_url: None,
            check_title: default_check_title(),
            check_summary: default_check_summary(),
            annotations_per_request: default_annotations_per_request(),
        }
    }
}

/// The complete junit-checks.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecksToml {
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub github: GitHubSection,
}

impl ChecksToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse junit-checks.toml")
    }

    /// Load `explicit` if given (it must exist), otherwise the default
    /// location if present, otherwise defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Values coming from CLI flags or their environment fallbacks.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub path: Option<String>,
    pub strip_from_path: Option<String>,
    pub access_token: Option<String>,
    pub repository: Option<String>,
    pub sha: Option<String>,
    pub job: Option<String>,
    pub api_url: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub pattern: String,
    pub strip_from_path: String,
    pub access_token: Option<String>,
    pub api_url: String,
    pub repository: Option<String>,
    pub sha: Option<String>,
    pub job: Option<String>,
    pub check_title: String,
    pub check_summary: String,
    pub annotations_per_request: usize,
    /// Config file that was loaded, if any
    pub source: Option<PathBuf>,
}

/// Treat unset action inputs (exported as empty strings) as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ActionConfig {
    /// Merge file settings with inputs (inputs win).
    pub fn resolve(file: ChecksToml, inputs: Inputs) -> Self {
        let pattern = non_empty(inputs.path)
            .or(non_empty(file.report.path))
            .unwrap_or_else(|| DEFAULT_REPORT_PATTERN.to_string());
        let strip_from_path = non_empty(inputs.strip_from_path)
            .or(non_empty(file.report.strip_from_path))
            .unwrap_or_default();
        let access_token = non_empty(inputs.access_token)
            .or_else(|| non_empty(std::env::var("GITHUB_TOKEN").ok()));
        let api_url = non_empty(inputs.api_url)
            .or(non_empty(file.github.api_url))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            pattern,
            strip_from_path,
            access_token,
            api_url,
            repository: non_empty(inputs.repository),
            sha: non_empty(inputs.sha),
            job: non_empty(inputs.job),
            check_title: file.github.check_title,
            check_summary: file.github.check_summary,
            annotations_per_request: file.github.annotations_per_request,
            source: None,
        }
    }

    /// Load the config file and merge `inputs` on top.
    pub fn load(config_path: Option<&Path>, inputs: Inputs) -> Result<Self> {
        let file = ChecksToml::load_or_default(config_path)?;
        let source = config_path.map(Path::to_path_buf).or_else(|| {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            default_path.exists().then_some(default_path)
        });
        let mut config = Self::resolve(file, inputs);
        config.source = source;
        Ok(config)
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.annotations_per_request == 0 {
            warnings.push(
                "annotations_per_request is 0; one annotation per request will be sent".to_string(),
            );
        } else if self.annotations_per_request > MAX_ANNOTATIONS_PER_REQUEST {
            warnings.push(format!(
                "annotations_per_request {} exceeds the GitHub limit of {}",
                self.annotations_per_request, MAX_ANNOTATIONS_PER_REQUEST
            ));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            warnings.push(format!("api_url '{}' is not an http(s) URL", self.api_url));
        }

        warnings
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            job: self.job.clone(),
            git_ref: self.sha.clone(),
            title: self.check_title.clone(),
            summary: self.check_summary.clone(),
            annotations_per_request: self.annotations_per_request,
        }
    }
}
