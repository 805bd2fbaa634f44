// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for pipewright.

pub mod compile;
pub mod graph;
pub mod init;
pub mod validate;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::compiler::config::CONFIG_FILE;
use crate::compiler::{AccessMode, CompilerConfig, WorkflowFormat};
use crate::component::ComponentRegistry;
use crate::errors::PipewrightError;
use crate::pipeline::{Pipeline, PipelineDefinition};

/// ML pipeline compiler
///
/// Declare component DAGs and compile them into workflow manifests.
#[derive(Parser, Debug)]
#[clap(
    name = "pipewright",
    version,
    about = "Compile ML pipeline definitions into Tekton or Argo workflow manifests",
    long_about = None,
    after_help = "Examples:\n\
        pipewright init --template model-training   Scaffold the training pipeline\n\
        pipewright validate                         Check pipeline.yaml\n\
        pipewright compile                          Write pipeline.manifest.yaml\n\
        pipewright graph --format mermaid           Show the task graph\n\n\
        See 'pipewright <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a pipeline definition from a template
    Init {
        /// Pipeline name (defaults to the template's name)
        name: Option<String>,

        /// Template to start from (model-training, empty)
        #[clap(short, long, default_value = "model-training")]
        template: InitTemplate,

        /// Overwrite an existing pipeline.yaml
        #[clap(long)]
        force: bool,
    },

    /// Compile a pipeline definition into a workflow manifest
    Compile(CompileArgs),

    /// Validate a pipeline definition
    Validate {
        /// Pipeline definition to validate
        #[clap(default_value = "pipeline.yaml")]
        definition: PathBuf,

        /// Config file (defaults to pipewright.toml when present)
        #[clap(short, long)]
        config: Option<PathBuf>,
    },

    /// Show pipeline as a graph
    Graph {
        /// Pipeline definition
        #[clap(default_value = "pipeline.yaml")]
        definition: PathBuf,

        /// Output format (text, dot, mermaid)
        #[clap(short, long, default_value = "text")]
        format: GraphFormat,
    },
}

/// Arguments of the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Pipeline definition to compile
    #[clap(default_value = "pipeline.yaml")]
    pub definition: PathBuf,

    /// Output file (defaults to <definition>.manifest.yaml)
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Print the manifest instead of writing it
    #[clap(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Workflow format (tekton, argo)
    #[clap(short, long)]
    pub format: Option<WorkflowFormat>,

    /// Storage class for the shared volume [env: DEFAULT_STORAGE_CLASS]
    #[clap(long)]
    pub storage_class: Option<String>,

    /// Access mode for the shared volume [env: DEFAULT_ACCESSMODES]
    #[clap(long)]
    pub access_mode: Option<AccessMode>,

    /// Image for components that do not declare one
    #[clap(long)]
    pub default_image: Option<String>,

    /// Config file (defaults to pipewright.toml when present)
    #[clap(short, long)]
    pub config: Option<PathBuf>,
}

/// Template for the init command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitTemplate {
    ModelTraining,
    Empty,
}

impl std::str::FromStr for InitTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model-training" => Ok(Self::ModelTraining),
            "empty" => Ok(Self::Empty),
            _ => Err(format!(
                "Unknown template: {} (available: model-training, empty)",
                s
            )),
        }
    }
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown graph format: {}", s)),
        }
    }
}

/// Load a definition file and register its components
pub fn load_definition(path: &Path) -> Result<(ComponentRegistry, Pipeline), PipewrightError> {
    PipelineDefinition::from_file(path)?.into_parts()
}

/// Resolve compiler settings from the config file and environment
pub fn resolve_config(config_path: Option<&Path>) -> Result<CompilerConfig, PipewrightError> {
    let config = match config_path {
        Some(path) => CompilerConfig::load(path)?,
        None if Path::new(CONFIG_FILE).exists() => CompilerConfig::load(Path::new(CONFIG_FILE))?,
        None => CompilerConfig::default(),
    };

    config.with_env_overrides(|key| std::env::var(key).ok())
}

/// Print a recovery suggestion, if any, and convert into a report
pub fn fail(err: PipewrightError) -> miette::Report {
    if let Some(suggestion) = err.suggestion() {
        eprintln!();
        eprint!("{}", suggestion.to_string().yellow());
        eprintln!();
    }
    err.into()
}
