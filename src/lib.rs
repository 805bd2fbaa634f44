// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! # pipewright - ML Pipeline Compiler
//!
//! `pipewright` declares machine-learning pipelines as a registry of
//! components plus a DAG of tasks, and compiles them into workflow manifests
//! for an external runtime.
//!
//! ## Features
//!
//! - **Typed components** - Entry point, image, packages, env and secrets as data
//! - **Dependency graph** - Cycle detection and deterministic execution order
//! - **Manifest compiler** - Tekton PipelineRuns or Argo Workflows
//! - **Explicit configuration** - Storage settings passed in, never mutated globally
//!
//! ## Quick Start
//!
//! ```bash
//! # Scaffold the five-stage training pipeline
//! pipewright init --template model-training
//!
//! # Check it
//! pipewright validate
//!
//! # Compile to pipeline.manifest.yaml
//! pipewright compile
//! ```

pub mod cli;
pub mod compiler;
pub mod component;
pub mod errors;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use compiler::{CompilerConfig, Manifest, ManifestCompiler, WorkflowFormat};
pub use component::{Component, ComponentRegistry, EntryPoint};
pub use errors::{PipewrightError, PipewrightResult};
pub use pipeline::{DagBuilder, Pipeline, PipelineBuilder, PipelineDefinition, Task};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
