//
//  rested-api
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rested_api::api::client::error_message;
use rested_api::api::ApiError;
use rested_api::cli::{Cli, Commands};
use rested_api::exit_codes;
use rested_api::output::OutputWriter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            let writer = OutputWriter::table();
            match e.downcast_ref::<ApiError>() {
                Some(api_err) => {
                    writer.write_error(&error_message(api_err));
                    std::process::exit(exit_codes::for_api_error(api_err));
                }
                None => {
                    writer.write_error(&format!("{e:#}"));
                    std::process::exit(exit_codes::ERROR);
                }
            }
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("RESTED_DEBUG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Call(cmd) => cmd.run(&cli.global).await,
        Commands::Route(cmd) => cmd.run(&cli.global).await,
        Commands::Token(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("rested version {}", rested_api::VERSION);
            Ok(())
        }
    }
}
