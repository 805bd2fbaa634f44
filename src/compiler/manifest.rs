// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Format-neutral manifest
//!
//! The compiler lowers a pipeline into this structure first; renderers then
//! turn it into a concrete workflow document.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::compiler::config::AccessMode;
use crate::component::{EnvVar, SecretRef};

/// Annotation key prefix
pub const ANNOTATION_PREFIX: &str = "pipewright.dev";

/// A compiled pipeline
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    /// Resource name of the pipeline
    pub name: String,

    /// Pipeline description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// One node per task, in execution order
    pub nodes: Vec<ManifestNode>,

    /// Shared volume settings
    pub provisioning: Provisioning,

    /// BLAKE3 hash of the definition the manifest was compiled from
    pub definition_hash: String,
}

impl Manifest {
    /// Get a node by name
    pub fn node(&self, name: &str) -> Option<&ManifestNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of predecessor edges across all nodes
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.run_after.len()).sum()
    }

    /// Node names in execution order
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    /// Annotations shared by every rendered format
    pub fn annotations(&self) -> BTreeMap<String, String> {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            format!("{}/definition-hash", ANNOTATION_PREFIX),
            self.definition_hash.clone(),
        );
        annotations.insert(
            format!("{}/compiler-version", ANNOTATION_PREFIX),
            crate::VERSION.to_string(),
        );
        if let Some(ref description) = self.description {
            annotations.insert(
                format!("{}/description", ANNOTATION_PREFIX),
                description.clone(),
            );
        }
        annotations
    }
}

/// A task lowered for the runtime
#[derive(Debug, Clone, Serialize)]
pub struct ManifestNode {
    /// Resource name of the task
    pub name: String,

    /// Component the task was built from
    pub component: String,

    /// Container image
    pub image: String,

    /// Container command; parameter arguments are appended by the renderer
    pub command: Vec<String>,

    /// Parameters with their values, component defaults merged with task overrides
    pub parameters: BTreeMap<String, String>,

    /// Nodes that must finish first
    pub run_after: Vec<String>,

    pub env: Vec<EnvVar>,

    pub secrets: Vec<SecretRef>,
}

/// Storage provisioned by the runtime for the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct Provisioning {
    pub storage_class: String,
    pub access_mode: AccessMode,
    pub size: String,
}
