// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Pipeline definitions and types
//!
//! This module defines pipelines as ordered tasks over registered components,
//! the dependency graph between them, and the validation run before compiling.

mod builder;
mod dag;
mod definition;
pub mod naming;
pub mod preset;
mod validation;

pub use builder::{PipelineBuilder, TaskId};
pub use dag::DagBuilder;
pub use definition::*;
pub use validation::{PipelineValidator, ValidationResult};
