//! Command line host for the EmailBison node
//!
//! Runs job files against a live EmailBison instance, checks credentials,
//! loads dropdown options and prints the node description.

mod job;

use anyhow::{bail, Context, Result};
use bison_core::{
    BisonConfig, EmailBisonClient, LogObserver, NodeDescription, NodeExecutor, OptionSource,
    OptionsService,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use job::JobFile;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("bison-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("EmailBison node runner")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .env("EMAILBISON_CONFIG")
                .global(true)
                .help("Credentials file (serverUrl, apiToken); EMAILBISON_* variables override it"),
        )
        .subcommand(
            Command::new("run")
                .about("Execute a job file and print the output items")
                .arg(
                    Arg::new("job")
                        .long("job")
                        .short('j')
                        .value_name("FILE")
                        .required(true)
                        .help("Job file describing resource, operation and items"),
                )
                .arg(
                    Arg::new("continue-on-fail")
                        .long("continue-on-fail")
                        .help("Emit an error record for failed items instead of aborting")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .help("Write output items here instead of stdout"),
                ),
        )
        .subcommand(Command::new("test-credentials").about("Verify the configured API token"))
        .subcommand(
            Command::new("options")
                .about("Load dropdown options")
                .arg(
                    Arg::new("source")
                        .required(true)
                        .value_name("SOURCE")
                        .help("getLeads, getCampaigns, getSenderEmails, getWorkspaces or getTags"),
                ),
        )
        .subcommand(Command::new("describe").about("Print resources and operations as JSON"))
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);

    match matches.subcommand() {
        Some(("run", sub)) => run_job(config_path.as_deref(), sub).await,
        Some(("test-credentials", _)) => test_credentials(config_path.as_deref()).await,
        Some(("options", sub)) => load_options(config_path.as_deref(), sub).await,
        Some(("describe", _)) => print_json(&NodeDescription::build()),
        Some((other, _)) => bail!("Unknown command '{}'", other),
        None => bail!("No command specified. Use --help for options."),
    }
}

fn connect(config_path: Option<&Path>) -> Result<EmailBisonClient> {
    let config = BisonConfig::load(config_path).context("Failed to load EmailBison credentials")?;
    let client = EmailBisonClient::new(&config)?;
    log::info!("Using EmailBison API at {}", client.base_url());
    Ok(client)
}

async fn run_job(config_path: Option<&Path>, matches: &ArgMatches) -> Result<()> {
    let job_path = matches
        .get_one::<String>("job")
        .map(PathBuf::from)
        .context("--job is required")?;
    let job = JobFile::from_file(&job_path)?;
    log::info!("Processing job {}: {}:{}", job_path.display(), job.resource, job.operation);

    let config = BisonConfig::load(config_path).context("Failed to load EmailBison credentials")?;
    let continue_on_fail = matches.get_flag("continue-on-fail")
        || job.continue_on_fail.unwrap_or(config.continue_on_fail);
    let client = EmailBisonClient::new(&config)?;

    let params = job.into_parameters();
    let executor = NodeExecutor::new(client)
        .with_observer(Arc::new(LogObserver))
        .continue_on_fail(continue_on_fail);
    let output = executor.execute(&params, params.item_count()).await?;

    let failed = output.iter().filter(|item| item.is_error()).count();
    log::info!("Job produced {} records ({} failed)", output.len(), failed);

    match matches.get_one::<String>("output") {
        Some(path) => {
            let rendered = serde_json::to_string_pretty(&output)?;
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output to {}", path))?;
            log::info!("Wrote output to {}", path);
            Ok(())
        }
        None => print_json(&output),
    }
}

async fn test_credentials(config_path: Option<&Path>) -> Result<()> {
    let client = connect(config_path)?;
    client.verify_credentials().await?;
    println!("Connection successful");
    Ok(())
}

async fn load_options(config_path: Option<&Path>, matches: &ArgMatches) -> Result<()> {
    let source: OptionSource = matches
        .get_one::<String>("source")
        .context("SOURCE is required")?
        .parse()?;

    let client = connect(config_path)?;
    let options = OptionsService::new(client, Arc::new(LogObserver))
        .load(source)
        .await;
    print_json(&options)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
