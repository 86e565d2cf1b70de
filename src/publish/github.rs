use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CheckRun, CheckRunOutput, ChecksApi};
use crate::errors::PublishError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "junit-checks";
const PER_PAGE: usize = 100;

/// Response from the list-check-runs-for-a-ref endpoint.
#[derive(Debug, Deserialize)]
pub struct CheckRunList {
    pub total_count: u64,
    pub check_runs: Vec<CheckRun>,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    output: &'a CheckRunOutput<'a>,
}

/// Check-run client for the GitHub REST API.
///
/// Missing credentials or repository are reported when a call is made, not
/// at construction, so runs that never reach the API need neither.
#[derive(Debug, Clone)]
pub struct GitHubChecks {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    repository: Option<String>,
}

impl GitHubChecks {
    pub fn new(api_url: &str, token: Option<String>, repository: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            repository,
        }
    }

    fn token(&self) -> Result<&str, PublishError> {
        self.token
            .as_deref()
            .ok_or(PublishError::MissingContext("access token"))
    }

    fn repository(&self) -> Result<&str, PublishError> {
        self.repository
            .as_deref()
            .ok_or(PublishError::MissingContext("GITHUB_REPOSITORY"))
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder, PublishError> {
        Ok(self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token()?))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT))
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, PublishError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(PublishError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait::async_trait]
impl ChecksApi for GitHubChecks {
    /// Paginates through all pages automatically.
    async fn list_check_runs(&self, git_ref: &str) -> Result<Vec<CheckRun>, PublishError> {
        let url = format!(
            "{}/repos/{}/commits/{}/check-runs",
            self.api_url,
            self.repository()?,
            git_ref
        );
        let mut all_runs = Vec::new();
        let mut page = 1u32;

        loop {
            let resp = self
                .request(reqwest::Method::GET, &url)?
                .query(&[
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?;
            let list: CheckRunList = check_status(resp).await?.json().await?;

            let count = list.check_runs.len();
            all_runs.extend(list.check_runs);
            debug!(page, count, total = list.total_count, "Fetched check runs");

            if count < PER_PAGE || all_runs.len() as u64 >= list.total_count {
                break;
            }
            page += 1;
        }

        Ok(all_runs)
    }

    async fn update_check_run(
        &self,
        check_run_id: u64,
        output: &CheckRunOutput<'_>,
    ) -> Result<(), PublishError> {
        let url = format!(
            "{}/repos/{}/check-runs/{}",
            self.api_url,
            self.repository()?,
            check_run_id
        );
        let resp = self
            .request(reqwest::Method::PATCH, &url)?
            .json(&UpdateRequest { output })
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}
