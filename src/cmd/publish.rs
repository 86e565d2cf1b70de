//! Report publishing: `junit-checks publish`.

use anyhow::Result;
use tracing::{info, warn};

use junit_checks::config::ActionConfig;
use junit_checks::discovery::discover;
use junit_checks::publish::github::GitHubChecks;
use junit_checks::publish::{DispatchOutcome, Dispatcher};
use junit_checks::report::analyze_file;

/// Analyse and dispatch every discovered report, one file at a time.
///
/// The first fatal error stops the run; files already dispatched stay
/// published. A passing report whose check run cannot be found ends the
/// run successfully without reading further files.
pub async fn cmd_publish(config: &ActionConfig) -> Result<()> {
    for warning in config.validate() {
        warn!("{}", warning);
    }

    let files = discover(&config.pattern)?;
    if files.is_empty() {
        warn!(pattern = %config.pattern, "No report files matched");
        return Ok(());
    }

    let checks = GitHubChecks::new(
        &config.api_url,
        config.access_token.clone(),
        config.repository.clone(),
    );
    let dispatcher = Dispatcher::new(checks, config.dispatch_settings());
    let mut stdout = std::io::stdout();

    for file in &files {
        let Some(analysis) = analyze_file(file, &config.strip_from_path).await? else {
            info!(file = %file.display(), "No test suites found, skipping");
            continue;
        };

        info!(
            file = %file.display(),
            verdict = %analysis.verdict,
            tests = analysis.summary.test_count,
            failures = analysis.summary.failure_count,
            errors = analysis.summary.error_count,
            "Analysed report"
        );

        match dispatcher.dispatch(&analysis, &mut stdout).await? {
            DispatchOutcome::Logged { lines } => {
                info!(file = %file.display(), lines, "Reported failures as workflow warnings")
            }
            DispatchOutcome::Updated { check_run_id, requests } => info!(
                file = %file.display(),
                check_run_id,
                requests,
                "Published annotations to check run"
            ),
            DispatchOutcome::CheckRunNotFound => {
                info!(file = %file.display(), "Stopping without a check run to update");
                break;
            }
        }
    }

    Ok(())
}
