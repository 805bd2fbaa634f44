// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Error types
//!
//! Every failure in pipewright is fatal at compile time: a definition either
//! produces a complete manifest or nothing is written.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipewright operations
pub type PipewrightResult<T> = Result<T, PipewrightError>;

/// Main error type for pipewright
#[derive(Error, Debug, Diagnostic)]
pub enum PipewrightError {
    // ─────────────────────────────────────────────────────────────────────────
    // Registry Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Component '{name}' is already registered with a different definition")]
    #[diagnostic(
        code(pipewright::duplicate_component),
        help("Rename one of the components or make both definitions identical")
    )]
    DuplicateComponent { name: String },

    #[error("Component '{component}' is missing required field '{field}'")]
    #[diagnostic(code(pipewright::missing_field))]
    MissingField {
        component: String,
        field: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Graph Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Circular dependency detected: {}", tasks.join(" → "))]
    #[diagnostic(
        code(pipewright::circular_dependency),
        help("Review the 'after' lists of these tasks to remove the cycle")
    )]
    CircularDependency { tasks: Vec<String> },

    #[error("Task '{task}' runs after unknown task '{dependency}'")]
    #[diagnostic(
        code(pipewright::unknown_dependency),
        help("Check that '{dependency}' is defined in your pipeline")
    )]
    UnknownDependency { task: String, dependency: String },

    #[error("Task name '{task}' is used more than once")]
    #[diagnostic(code(pipewright::duplicate_task))]
    DuplicateTask { task: String },

    #[error("Tasks '{first}' and '{second}' both map to the resource name '{label}'")]
    #[diagnostic(
        code(pipewright::task_name_collision),
        help("Rename one of the tasks; names are lowercased and non-alphanumerics become '-'")
    )]
    TaskNameCollision {
        first: String,
        second: String,
        label: String,
    },

    #[error("Task '{task}' uses unknown component '{component}'")]
    #[diagnostic(
        code(pipewright::unknown_component),
        help("Declare '{component}' under 'components' before referencing it")
    )]
    UnknownComponent { task: String, component: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline '{name}' has no tasks")]
    #[diagnostic(code(pipewright::empty_pipeline))]
    EmptyPipeline { name: String },

    #[error("Pipeline definition not found: {path}")]
    #[diagnostic(
        code(pipewright::definition_not_found),
        help("Create one with 'pipewright init' or pass the path explicitly")
    )]
    DefinitionNotFound { path: PathBuf },

    #[error("Invalid value '{value}' for '{key}'")]
    #[diagnostic(code(pipewright::invalid_config))]
    InvalidConfig {
        key: String,
        value: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(pipewright::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(pipewright::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(pipewright::io_error))]
    Io { message: String },

    #[error("YAML error: {message}")]
    #[diagnostic(code(pipewright::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(pipewright::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(pipewright::toml_error))]
    Toml { message: String },
}

impl From<std::io::Error> for PipewrightError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for PipewrightError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for PipewrightError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for PipewrightError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl PipewrightError {
    /// Create a missing field error with a hint for the field
    pub fn missing_field(component: &str, field: &str) -> Self {
        let help = match field {
            "image" => Some(
                "Set 'image' on the component or configure 'default_image' in pipewright.toml"
                    .to_string(),
            ),
            "entry.module" | "entry.function" => Some(
                "Entry points take the form { module: data_ingestion, function: ingest_data }"
                    .to_string(),
            ),
            _ => None,
        };

        Self::MissingField {
            component: component.to_string(),
            field: field.to_string(),
            help,
        }
    }

    /// Create an invalid configuration error listing the accepted values
    pub fn invalid_config(key: &str, value: &str, accepted: &[&str]) -> Self {
        Self::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
            help: Some(format!("Accepted values: {}", accepted.join(", "))),
        }
    }

    /// Recovery steps for errors that have a known fix
    pub fn suggestion(&self) -> Option<RecoverySuggestion> {
        match self {
            Self::CircularDependency { tasks } => {
                Some(RecoverySuggestion::fix_circular_dependency(tasks))
            }
            Self::DuplicateComponent { name } => {
                Some(RecoverySuggestion::fix_duplicate_component(name))
            }
            Self::MissingField {
                component, field, ..
            } => Some(RecoverySuggestion::fix_missing_field(component, field)),
            Self::DefinitionNotFound { .. } => Some(RecoverySuggestion::create_definition()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_tasks() {
        let err = PipewrightError::CircularDependency {
            tasks: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a → b");
    }

    #[test]
    fn test_missing_image_has_help() {
        match PipewrightError::missing_field("train", "image") {
            PipewrightError::MissingField { help, .. } => {
                assert!(help.unwrap().contains("default_image"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_suggestion_only_for_fixable_errors() {
        assert!(PipewrightError::DuplicateComponent { name: "x".into() }
            .suggestion()
            .is_some());
        assert!(PipewrightError::Io { message: "boom".into() }
            .suggestion()
            .is_none());
    }
}
