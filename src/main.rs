mod cli;
mod config;
mod consolidate;
mod engine;
mod matcher;
mod report;
mod rules;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use engine::Scanner;
use report::finding::Severity;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("verscout=debug")
    } else if cli.quiet {
        EnvFilter::new("verscout=error")
    } else {
        EnvFilter::new("verscout=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    info!("verscout v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        cli::Commands::Scan(args) => {
            // Validate before scanning so a typo doesn't cost a full run
            let fail_on = match args.fail_on.as_deref() {
                Some(name) => Some(
                    Severity::parse(name).ok_or_else(|| anyhow!("unknown severity '{}'", name))?,
                ),
                None => None,
            };

            let scanner = Scanner::new(args)?;
            let report = scanner.run()?;

            // Output the report
            match scanner.format() {
                "json" => {
                    let output = report::json::render(&report)?;
                    if let Some(ref path) = args.out {
                        std::fs::write(path, &output)?;
                        info!("Report written to {}", path.display());
                    } else {
                        println!("{}", output);
                    }
                }
                _ => {
                    report::terminal::render(&report);
                    if let Some(ref path) = args.out {
                        let json_output = report::json::render(&report)?;
                        std::fs::write(path, &json_output)?;
                        info!("JSON report also written to {}", path.display());
                    }
                }
            }

            // Exit code based on findings
            if let Some(threshold) = fail_on {
                if report.has_findings_at_or_above(threshold) {
                    std::process::exit(1);
                }
            }
        }
        cli::Commands::Init => {
            config::init_config()?;
        }
        cli::Commands::ListRules(args) => {
            let rules = rules::listing::listed_rules(&args)?;
            rules::listing::list_rules(&rules);
        }
    }

    Ok(())
}
