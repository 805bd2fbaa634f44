// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Argo renderer
//!
//! Emits a `Workflow` whose entrypoint is a DAG template. Each task gets its
//! own container template named `task-<name>`.

use serde::Serialize;
use std::collections::BTreeMap;

use super::k8s::{
    env_from, env_vars, parameter_args, parameter_values, EnvFromSource, NameValue,
    PersistentVolumeClaimSpec, DATA_MOUNT_PATH, DATA_VOLUME,
};
use super::manifest::{Manifest, ManifestNode};
use super::{ManifestRenderer, WorkflowFormat};
use crate::errors::PipewrightError;

const API_VERSION: &str = "argoproj.io/v1alpha1";
const ENTRYPOINT: &str = "pipeline";

/// Renders manifests as Argo Workflows
pub struct ArgoRenderer;

impl ManifestRenderer for ArgoRenderer {
    fn format(&self) -> WorkflowFormat {
        WorkflowFormat::Argo
    }

    fn render(&self, manifest: &Manifest) -> Result<serde_yaml::Value, PipewrightError> {
        let mut templates = vec![Template {
            name: ENTRYPOINT.to_string(),
            dag: Some(DagTemplate {
                tasks: manifest.nodes.iter().map(dag_task).collect(),
            }),
            inputs: None,
            container: None,
        }];
        templates.extend(manifest.nodes.iter().map(container_template));

        let workflow = Workflow {
            api_version: API_VERSION,
            kind: "Workflow",
            metadata: Metadata {
                generate_name: format!("{}-", manifest.name),
                annotations: manifest.annotations(),
            },
            spec: WorkflowSpec {
                entrypoint: ENTRYPOINT.to_string(),
                templates,
                volume_claim_templates: vec![ClaimTemplate {
                    metadata: ClaimMetadata {
                        name: DATA_VOLUME.to_string(),
                    },
                    spec: PersistentVolumeClaimSpec::from_provisioning(&manifest.provisioning),
                }],
            },
        };

        serde_yaml::to_value(workflow).map_err(Into::into)
    }
}

fn template_name(node: &ManifestNode) -> String {
    format!("task-{}", node.name)
}

fn dag_task(node: &ManifestNode) -> DagTask {
    let parameters = parameter_values(node);

    DagTask {
        name: node.name.clone(),
        template: template_name(node),
        dependencies: node.run_after.clone(),
        arguments: (!parameters.is_empty()).then_some(Arguments { parameters }),
    }
}

fn container_template(node: &ManifestNode) -> Template {
    let inputs = (!node.parameters.is_empty()).then(|| Inputs {
        parameters: node
            .parameters
            .keys()
            .map(|name| InputParameter { name: name.clone() })
            .collect(),
    });

    Template {
        name: template_name(node),
        dag: None,
        inputs,
        container: Some(Container {
            image: node.image.clone(),
            command: node.command.clone(),
            args: parameter_args(node, |name| format!("{{{{inputs.parameters.{}}}}}", name)),
            env: env_vars(node),
            env_from: env_from(node),
            volume_mounts: vec![VolumeMount {
                name: DATA_VOLUME.to_string(),
                mount_path: DATA_MOUNT_PATH.to_string(),
            }],
        }),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Workflow {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: WorkflowSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    generate_name: String,
    annotations: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowSpec {
    entrypoint: String,
    templates: Vec<Template>,
    volume_claim_templates: Vec<ClaimTemplate>,
}

#[derive(Debug, Serialize)]
struct Template {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dag: Option<DagTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<Inputs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<Container>,
}

#[derive(Debug, Serialize)]
struct DagTemplate {
    tasks: Vec<DagTask>,
}

#[derive(Debug, Serialize)]
struct DagTask {
    name: String,
    template: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<Arguments>,
}

#[derive(Debug, Serialize)]
struct Arguments {
    parameters: Vec<NameValue>,
}

#[derive(Debug, Serialize)]
struct Inputs {
    parameters: Vec<InputParameter>,
}

#[derive(Debug, Serialize)]
struct InputParameter {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Container {
    image: String,
    command: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    args: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    env: Vec<NameValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    env_from: Vec<EnvFromSource>,
    volume_mounts: Vec<VolumeMount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VolumeMount {
    name: String,
    mount_path: String,
}

#[derive(Debug, Serialize)]
struct ClaimTemplate {
    metadata: ClaimMetadata,
    spec: PersistentVolumeClaimSpec,
}

#[derive(Debug, Serialize)]
struct ClaimMetadata {
    name: String,
}
