//! Offline report rendering: `junit-checks summarize`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use junit_checks::config::ActionConfig;
use junit_checks::discovery::discover;
use junit_checks::report::{ReportAnalysis, analyze_file};

#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a Path,
    #[serde(flatten)]
    analysis: &'a ReportAnalysis,
}

pub async fn cmd_summarize(config: &ActionConfig, json: bool) -> Result<()> {
    let files = discover(&config.pattern)?;
    if files.is_empty() {
        warn!(pattern = %config.pattern, "No report files matched");
        return Ok(());
    }

    for file in &files {
        let Some(analysis) = analyze_file(file, &config.strip_from_path).await? else {
            info!(file = %file.display(), "No test suites found, skipping");
            continue;
        };

        if json {
            let line = serde_json::to_string(&FileReport {
                file,
                analysis: &analysis,
            })
            .context("Failed to serialize report")?;
            println!("{}", line);
        } else {
            print_text(file, &analysis);
        }
    }

    Ok(())
}

fn print_text(file: &Path, analysis: &ReportAnalysis) {
    println!("{} [{}]", file.display(), analysis.verdict);
    if let Some(summary) = analysis.summary_annotation() {
        println!("  {}", summary.message);
    }
    for annotation in analysis.failure_annotations() {
        println!(
            "  {}:{} {}",
            annotation.path.as_deref().unwrap_or("<unknown>"),
            annotation.start_line,
            annotation.title
        );
        for line in annotation.message.lines() {
            println!("      {}", line);
        }
    }
}
