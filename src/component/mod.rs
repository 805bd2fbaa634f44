// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Component descriptors
//!
//! A component is a reusable unit of work: an entry point inside a container
//! image, the packages it needs, and its default parameters. Components are
//! plain data; nothing is inferred from the wrapped function itself.

mod registry;

pub use registry::ComponentRegistry;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::PipewrightError;

/// A reusable unit of work
///
/// `name` and `entry` default to blank when absent so that `check_required`
/// can report them as missing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Component {
    /// Component name (unique within a registry)
    #[serde(default)]
    pub name: String,

    /// Component description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Function to invoke
    #[serde(default)]
    pub entry: EntryPoint,

    /// Container image the entry point runs in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Packages installed before the entry point runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,

    /// Default parameters, passed as keyword arguments
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,

    /// Plain environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    /// Secrets exposed to the container as environment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<SecretRef>,
}

impl Component {
    /// Create a component with no image, packages or parameters
    pub fn new(name: impl Into<String>, entry: EntryPoint) -> Self {
        Self {
            name: name.into(),
            description: None,
            entry,
            image: None,
            packages: Vec::new(),
            parameters: BTreeMap::new(),
            env: Vec::new(),
            secrets: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages.extend(packages.into_iter().map(Into::into));
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push(EnvVar {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_secret(mut self, name: impl Into<String>) -> Self {
        self.secrets.push(SecretRef { name: name.into() });
        self
    }

    /// Image to run, falling back to `default_image` when none is declared
    pub fn resolved_image<'a>(&'a self, default_image: Option<&'a str>) -> Option<&'a str> {
        self.image
            .as_deref()
            .filter(|image| !image.trim().is_empty())
            .or(default_image)
    }

    /// Check the fields a manifest node cannot be built without
    pub fn check_required(&self, default_image: Option<&str>) -> Result<(), PipewrightError> {
        if self.name.trim().is_empty() {
            return Err(PipewrightError::missing_field("<unnamed>", "name"));
        }
        if self.entry.module.trim().is_empty() {
            return Err(PipewrightError::missing_field(&self.name, "entry.module"));
        }
        if self.entry.function.trim().is_empty() {
            return Err(PipewrightError::missing_field(&self.name, "entry.function"));
        }
        if self.resolved_image(default_image).is_none() {
            return Err(PipewrightError::missing_field(&self.name, "image"));
        }
        Ok(())
    }
}

/// Python entry point of a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryPoint {
    /// Module to import from
    #[serde(default)]
    pub module: String,
    /// Function to call
    #[serde(default)]
    pub function: String,
}

impl EntryPoint {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}

/// A plain environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Reference to a secret whose keys become environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    /// Name of the secret in the target cluster
    pub name: String,
}
