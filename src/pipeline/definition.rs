// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Pipeline definition structures
//!
//! Defines the in-memory pipeline model and the schema of `pipeline.yaml`
//! files, which bundle component declarations with the tasks that use them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::component::{Component, ComponentRegistry};
use crate::errors::PipewrightError;

/// A named, ordered collection of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Pipeline description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tasks in declaration order
    pub tasks: Vec<Task>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tasks: Vec::new(),
        }
    }

    /// Get a task by name
    pub fn get_task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Get all task names
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }
}

/// One use of a component within a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// Task name (must be unique within pipeline)
    pub name: String,

    /// Name of the registered component to run
    pub component: String,

    /// Tasks that must finish before this one starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,

    /// Parameter overrides, merged over the component defaults
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl Task {
    pub fn new(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
            after: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }
}

/// Pipeline definition from pipeline.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDefinition {
    /// Definition version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Pipeline name
    pub name: String,

    /// Pipeline description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Component declarations
    #[serde(default)]
    pub components: Vec<Component>,

    /// Tasks in declaration order
    #[serde(default)]
    pub tasks: Vec<Task>,
}

fn default_version() -> String {
    "1".to_string()
}

impl PipelineDefinition {
    /// Load a definition from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, PipewrightError> {
        if !path.exists() {
            return Err(PipewrightError::DefinitionNotFound {
                path: path.to_path_buf(),
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| PipewrightError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Self::from_yaml(&content)
    }

    /// Parse a definition from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, PipewrightError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize the definition to YAML
    pub fn to_yaml(&self) -> Result<String, PipewrightError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Assemble a definition from a registry and the pipeline using it
    pub fn from_parts(registry: &ComponentRegistry, pipeline: &Pipeline) -> Self {
        Self {
            version: default_version(),
            name: pipeline.name.clone(),
            description: pipeline.description.clone(),
            components: registry.iter().cloned().collect(),
            tasks: pipeline.tasks.clone(),
        }
    }

    /// Register every component and return the registry with the pipeline
    pub fn into_parts(self) -> Result<(ComponentRegistry, Pipeline), PipewrightError> {
        let mut registry = ComponentRegistry::new();
        for component in self.components {
            registry.register(component)?;
        }

        let pipeline = Pipeline {
            name: self.name,
            description: self.description,
            tasks: self.tasks,
        };

        Ok((registry, pipeline))
    }
}
