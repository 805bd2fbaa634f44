// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! pipewright - ML Pipeline Compiler
//!
//! Compile component DAGs into Tekton or Argo workflow manifests.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipewright::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "pipewright=debug"
    } else {
        "pipewright=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init {
            name,
            template,
            force,
        } => pipewright::cli::init::run(name, template, force, cli.verbose),
        Commands::Compile(args) => pipewright::cli::compile::run(args, cli.verbose),
        Commands::Validate { definition, config } => {
            pipewright::cli::validate::run(definition, config, cli.verbose)
        }
        Commands::Graph { definition, format } => {
            pipewright::cli::graph::run(definition, format, cli.verbose)
        }
    }
}
