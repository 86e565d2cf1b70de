use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use junit_checks::config::{ActionConfig, Inputs};
use junit_checks::publish::workflow;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;

#[derive(Parser)]
#[command(name = "junit-checks")]
#[command(version, about = "Publish JUnit XML test results as GitHub check-run annotations")]
pub struct Cli {
    /// Show debug logs (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to a junit-checks.toml file (default: .github/junit-checks.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report selection shared by every subcommand.
#[derive(Args, Clone, Debug, Default)]
pub struct ReportArgs {
    /// Report search pattern, one glob per line; `!` excludes
    #[arg(long, env = "INPUT_PATH")]
    pub path: Option<String>,

    /// Substring removed once from each failing case's file path
    #[arg(long, env = "INPUT_STRIPFROMPATH")]
    pub strip_from_path: Option<String>,
}

/// Review-surface context, normally provided by the Actions runner.
#[derive(Args, Clone, Debug, Default)]
pub struct GitHubArgs {
    /// Token used for check-run calls (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_ACCESSTOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Commit whose check runs are searched
    #[arg(long, env = "GITHUB_SHA")]
    pub sha: Option<String>,

    /// Name of the running job; the check run with this name is updated
    #[arg(long, env = "GITHUB_JOB")]
    pub job: Option<String>,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyse every report and publish the results
    Publish {
        #[command(flatten)]
        report: ReportArgs,
        #[command(flatten)]
        github: GitHubArgs,
    },
    /// Analyse every report and print the results without publishing
    Summarize {
        #[command(flatten)]
        report: ReportArgs,
        /// Print one JSON document per report instead of text
        #[arg(long)]
        json: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
        #[command(flatten)]
        report: ReportArgs,
        #[command(flatten)]
        github: GitHubArgs,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
}

fn inputs(report: &ReportArgs, github: &GitHubArgs) -> Inputs {
    Inputs {
        path: report.path.clone(),
        strip_from_path: report.strip_from_path.clone(),
        access_token: github.access_token.clone(),
        repository: github.repository.clone(),
        sha: github.sha.clone(),
        job: github.job.clone(),
        api_url: github.api_url.clone(),
    }
}

fn init_tracing(cli: &Cli) {
    let default_filter = if cli.verbose {
        "junit_checks=debug"
    } else {
        "junit_checks=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Publish { report, github } => {
            let config = ActionConfig::load(config_path, inputs(report, github))?;
            cmd::cmd_publish(&config).await?;
        }
        Commands::Summarize { report, json } => {
            let config =
                ActionConfig::load(config_path, inputs(report, &GitHubArgs::default()))?;
            cmd::cmd_summarize(&config, *json).await?;
        }
        Commands::Config {
            command,
            report,
            github,
        } => {
            let config = ActionConfig::load(config_path, inputs(report, github))?;
            cmd::cmd_config(&config, *command)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{:#}", err);
            error!("{}", message);
            println!("{}", workflow::error_command(&message));
            ExitCode::FAILURE
        }
    }
}
