//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `urlscan_lookup` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - JSON output of lookup and action results
//!
//! All core functionality is implemented in the library crate.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::process;

use urlscan_lookup::config::{Cli, Command, LookupArgs, SubmitArgs};
use urlscan_lookup::initialization::init_logger_with;
use urlscan_lookup::messages::SubmitRequest;
use urlscan_lookup::{validate_options, Entity, Integration, Message, Options};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn parse_entities(args: &LookupArgs) -> Vec<Entity> {
    args.values
        .iter()
        .filter_map(|value| match Entity::infer(value) {
            Some(entity) if args.passive => Some(entity),
            Some(entity) => Some(entity.on_demand()),
            None => {
                log::warn!("Skipping unrecognized indicator: {}", value);
                None
            }
        })
        .collect()
}

async fn run(command: Command, integration: &Integration, options: &Options) -> Result<bool> {
    match command {
        Command::Lookup(args) => {
            let entities = parse_entities(&args);
            let batch = integration.lookup(&entities, options).await;
            print_json(&batch)?;
            Ok(batch.errors.is_empty())
        }
        Command::Retry(args) => {
            for entity in parse_entities(&args) {
                let response = integration
                    .on_message(Message::RetryLookup { entity }, options)
                    .await?;
                print_json(&response)?;
            }
            Ok(true)
        }
        Command::Quota => {
            let response = integration.on_message(Message::GetQuota, options).await?;
            print_json(&response)?;
            Ok(true)
        }
        Command::Submit(SubmitArgs {
            value,
            tags,
            public,
        }) => {
            let entity = Entity::infer(&value)
                .filter(|e| e.is_url() || e.is_domain())
                .ok_or_else(|| anyhow!("{value} is not a URL or domain"))?
                .on_demand();
            let message = Message::SubmitUrl {
                data: SubmitRequest {
                    entity,
                    tags,
                    submit_as_public: public,
                },
            };
            let response = integration.on_message(message, options).await?;
            print_json(&response)?;
            Ok(true)
        }
        Command::Validate => {
            let errors = validate_options(options);
            print_json(&errors)?;
            Ok(errors.is_empty())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // so URLSCAN_API_KEY need not be exported manually
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {e}");
        }
    }

    let cli = Cli::parse();
    let config = cli.global.to_config();
    let options = cli.global.to_options();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let integration = Integration::startup(&config).context("Failed to start integration")?;

    match run(cli.command, &integration, &options).await {
        Ok(true) => Ok(()),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("urlscan_lookup error: {:#}", e);
            process::exit(1);
        }
    }
}
