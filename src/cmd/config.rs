//! Configuration view and validation commands: `junit-checks config`.

use anyhow::Result;

use junit_checks::config::ActionConfig;

use crate::ConfigCommands;

pub fn cmd_config(config: &ActionConfig, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("junit-checks Configuration");
            println!("==========================");
            println!();
            match &config.source {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("No config file found, using defaults"),
            }
            println!();

            println!("[report]");
            println!("  path = \"{}\"", config.pattern.replace('\n', "\\n"));
            println!("  strip_from_path = \"{}\"", config.strip_from_path);
            println!();

            println!("[github]");
            println!("  api_url = \"{}\"", config.api_url);
            println!("  check_title = \"{}\"", config.check_title);
            println!("  check_summary = \"{}\"", config.check_summary);
            println!(
                "  annotations_per_request = {}",
                config.annotations_per_request
            );
            println!();

            println!("Runner context:");
            println!("  repository = {}", config.repository.as_deref().unwrap_or("<unset>"));
            println!("  sha = {}", config.sha.as_deref().unwrap_or("<unset>"));
            println!("  job = {}", config.job.as_deref().unwrap_or("<unset>"));
            println!(
                "  access token = {}",
                if config.access_token.is_some() { "<set>" } else { "<unset>" }
            );
            println!();
        }
        Some(ConfigCommands::Validate) => {
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }
        }
    }

    Ok(())
}
