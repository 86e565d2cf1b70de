//! Publishing analysed reports to the CI review surface.
//!
//! The [`Dispatcher`] picks the output channel from a document's verdict:
//!
//! | Verdict   | Channel                                                    |
//! |-----------|------------------------------------------------------------|
//! | `failure` | one `::warning` workflow command per annotation, no remote |
//! | `notice`  | update of the running job's check run via [`ChecksApi`]    |
//!
//! Remote access goes through the [`ChecksApi`] trait so the dispatcher can
//! be exercised without a network. The real implementation lives in
//! [`github`].

pub mod github;
pub mod workflow;

use std::io::Write;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::PublishError;
use crate::report::{Annotation, ReportAnalysis, Verdict};

/// GitHub rejects check-run updates with more annotations than this.
pub const MAX_ANNOTATIONS_PER_REQUEST: usize = 50;

/// A check run attached to a commit (subset of fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub id: u64,
    pub name: String,
}

/// The `output` object of a check-run update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRunOutput<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub annotations: &'a [Annotation],
}

/// Abstraction over the check-run endpoints of the review surface.
/// Real implementation: `GitHubChecks`. Test double: `RecordingChecks`.
#[async_trait]
pub trait ChecksApi: Send + Sync {
    /// Every check run recorded for `git_ref`.
    async fn list_check_runs(&self, git_ref: &str) -> Result<Vec<CheckRun>, PublishError>;

    async fn update_check_run(
        &self,
        check_run_id: u64,
        output: &CheckRunOutput<'_>,
    ) -> Result<(), PublishError>;
}

/// Static settings for a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Name of the running job; matched against check-run names.
    pub job: Option<String>,
    /// Commit whose check runs are searched.
    pub git_ref: Option<String>,
    pub title: String,
    pub summary: String,
    pub annotations_per_request: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            job: None,
            git_ref: None,
            title: "Junit Results".to_string(),
            summary: "jUnit Results".to_string(),
            annotations_per_request: MAX_ANNOTATIONS_PER_REQUEST,
        }
    }
}

/// What a dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Annotations were written as workflow commands.
    Logged { lines: usize },
    /// The named check run was updated.
    Updated { check_run_id: u64, requests: usize },
    /// No check run matched the job name; nothing was published.
    CheckRunNotFound,
}

pub struct Dispatcher<C> {
    checks: C,
    settings: DispatchSettings,
}

impl<C: ChecksApi> Dispatcher<C> {
    pub fn new(checks: C, settings: DispatchSettings) -> Self {
        Self { checks, settings }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Publish one analysed document.
    pub async fn dispatch<W: Write + Send>(
        &self,
        analysis: &ReportAnalysis,
        out: &mut W,
    ) -> Result<DispatchOutcome> {
        match analysis.verdict {
            Verdict::Failure => {
                for annotation in &analysis.annotations {
                    writeln!(out, "{}", workflow::warning_command(annotation))
                        .context("Failed to write workflow command")?;
                }
                out.flush().context("Failed to flush workflow commands")?;
                Ok(DispatchOutcome::Logged {
                    lines: analysis.annotations.len(),
                })
            }
            Verdict::Notice => self.update_check_run(&analysis.annotations).await,
        }
    }

    async fn update_check_run(&self, annotations: &[Annotation]) -> Result<DispatchOutcome> {
        let git_ref = self
            .settings
            .git_ref
            .as_deref()
            .ok_or(PublishError::MissingContext("GITHUB_SHA"))?;

        let runs = self
            .checks
            .list_check_runs(git_ref)
            .await
            .context("Failed to list check runs")?;
        debug!(git_ref, count = runs.len(), "Listed check runs");

        let job = self.settings.job.as_deref();
        let Some(check_run) = runs.iter().find(|run| Some(run.name.as_str()) == job) else {
            info!("Junit tests result passed but can not identify test suite.");
            info!("Can happen when performing a pull request from a forked repository.");
            return Ok(DispatchOutcome::CheckRunNotFound);
        };

        let per_request = self.settings.annotations_per_request.max(1);
        let mut requests = 0;
        for chunk in annotations.chunks(per_request) {
            let output = CheckRunOutput {
                title: &self.settings.title,
                summary: &self.settings.summary,
                annotations: chunk,
            };
            self.checks
                .update_check_run(check_run.id, &output)
                .await
                .with_context(|| format!("Failed to update check run {}", check_run.id))?;
            requests += 1;
        }

        info!(
            check_run_id = check_run.id,
            annotations = annotations.len(),
            requests,
            "Updated check run"
        );
        Ok(DispatchOutcome::Updated {
            check_run_id: check_run.id,
            requests,
        })
    }
}
