// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Kubernetes object fragments shared by the renderers

use serde::Serialize;
use std::collections::BTreeMap;

use crate::compiler::manifest::{ManifestNode, Provisioning};

/// Name of the volume shared by all tasks
pub const DATA_VOLUME: &str = "pipeline-data";

/// Where the shared volume is mounted in each container
pub const DATA_MOUNT_PATH: &str = "/workspace/data";

#[derive(Debug, Serialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvFromSource {
    pub secret_ref: SecretName,
}

#[derive(Debug, Serialize)]
pub struct SecretName {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimSpec {
    pub storage_class_name: String,
    pub access_modes: Vec<String>,
    pub resources: ResourceRequirements,
}

#[derive(Debug, Serialize)]
pub struct ResourceRequirements {
    pub requests: BTreeMap<String, String>,
}

impl PersistentVolumeClaimSpec {
    pub fn from_provisioning(provisioning: &Provisioning) -> Self {
        let mut requests = BTreeMap::new();
        requests.insert("storage".to_string(), provisioning.size.clone());

        Self {
            storage_class_name: provisioning.storage_class.clone(),
            access_modes: vec![provisioning.access_mode.to_string()],
            resources: ResourceRequirements { requests },
        }
    }
}

/// Container env entries of a node
pub fn env_vars(node: &ManifestNode) -> Vec<NameValue> {
    node.env
        .iter()
        .map(|var| NameValue {
            name: var.name.clone(),
            value: var.value.clone(),
        })
        .collect()
}

/// Container envFrom entries of a node
pub fn env_from(node: &ManifestNode) -> Vec<EnvFromSource> {
    node.secrets
        .iter()
        .map(|secret| EnvFromSource {
            secret_ref: SecretName {
                name: secret.name.clone(),
            },
        })
        .collect()
}

/// Command arguments passing each parameter as `name <placeholder>`
pub fn parameter_args(node: &ManifestNode, placeholder: impl Fn(&str) -> String) -> Vec<String> {
    node.parameters
        .keys()
        .flat_map(|name| [name.clone(), placeholder(name)])
        .collect()
}

/// Parameter values bound at the task level
pub fn parameter_values(node: &ManifestNode) -> Vec<NameValue> {
    node.parameters
        .iter()
        .map(|(name, value)| NameValue {
            name: name.clone(),
            value: value.clone(),
        })
        .collect()
}
