// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Tekton renderer
//!
//! Emits a `PipelineRun` with an embedded pipeline spec. Every task carries an
//! inline `taskSpec` with a single step, and all tasks share one workspace
//! backed by a volume claim template.

use serde::Serialize;
use std::collections::BTreeMap;

use super::k8s::{
    env_from, env_vars, parameter_args, parameter_values, EnvFromSource, NameValue,
    PersistentVolumeClaimSpec, DATA_MOUNT_PATH, DATA_VOLUME,
};
use super::manifest::{Manifest, ManifestNode};
use super::{ManifestRenderer, WorkflowFormat};
use crate::errors::PipewrightError;

const API_VERSION: &str = "tekton.dev/v1beta1";
const TASK_WORKSPACE: &str = "data";

/// Renders manifests as Tekton PipelineRuns
pub struct TektonRenderer;

impl ManifestRenderer for TektonRenderer {
    fn format(&self) -> WorkflowFormat {
        WorkflowFormat::Tekton
    }

    fn render(&self, manifest: &Manifest) -> Result<serde_yaml::Value, PipewrightError> {
        let run = PipelineRun {
            api_version: API_VERSION,
            kind: "PipelineRun",
            metadata: Metadata {
                name: manifest.name.clone(),
                annotations: manifest.annotations(),
            },
            spec: PipelineRunSpec {
                pipeline_spec: PipelineSpec {
                    tasks: manifest.nodes.iter().map(pipeline_task).collect(),
                    workspaces: vec![WorkspaceDeclaration {
                        name: DATA_VOLUME.to_string(),
                        mount_path: None,
                    }],
                },
                workspaces: vec![WorkspaceBinding {
                    name: DATA_VOLUME.to_string(),
                    volume_claim_template: VolumeClaimTemplate {
                        spec: PersistentVolumeClaimSpec::from_provisioning(&manifest.provisioning),
                    },
                }],
            },
        };

        serde_yaml::to_value(run).map_err(Into::into)
    }
}

fn pipeline_task(node: &ManifestNode) -> PipelineTask {
    let mut args = parameter_args(node, |name| format!("$(params.{})", name));
    let mut command = node.command.clone();
    command.append(&mut args);

    PipelineTask {
        name: node.name.clone(),
        run_after: node.run_after.clone(),
        params: parameter_values(node),
        task_spec: TaskSpec {
            params: node
                .parameters
                .keys()
                .map(|name| ParamSpec {
                    name: name.clone(),
                    kind: "string",
                })
                .collect(),
            steps: vec![Step {
                name: "main".to_string(),
                image: node.image.clone(),
                command,
                env: env_vars(node),
                env_from: env_from(node),
            }],
            workspaces: vec![WorkspaceDeclaration {
                name: TASK_WORKSPACE.to_string(),
                mount_path: Some(DATA_MOUNT_PATH.to_string()),
            }],
        },
        workspaces: vec![WorkspacePipelineTaskBinding {
            name: TASK_WORKSPACE.to_string(),
            workspace: DATA_VOLUME.to_string(),
        }],
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineRun {
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: PipelineRunSpec,
}

#[derive(Debug, Serialize)]
struct Metadata {
    name: String,
    annotations: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineRunSpec {
    pipeline_spec: PipelineSpec,
    workspaces: Vec<WorkspaceBinding>,
}

#[derive(Debug, Serialize)]
struct PipelineSpec {
    tasks: Vec<PipelineTask>,
    workspaces: Vec<WorkspaceDeclaration>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineTask {
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    run_after: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<NameValue>,
    task_spec: TaskSpec,
    workspaces: Vec<WorkspacePipelineTaskBinding>,
}

#[derive(Debug, Serialize)]
struct TaskSpec {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<ParamSpec>,
    steps: Vec<Step>,
    workspaces: Vec<WorkspaceDeclaration>,
}

#[derive(Debug, Serialize)]
struct ParamSpec {
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Step {
    name: String,
    image: String,
    command: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    env: Vec<NameValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    env_from: Vec<EnvFromSource>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceDeclaration {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mount_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct WorkspacePipelineTaskBinding {
    name: String,
    workspace: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceBinding {
    name: String,
    volume_claim_template: VolumeClaimTemplate,
}

#[derive(Debug, Serialize)]
struct VolumeClaimTemplate {
    spec: PersistentVolumeClaimSpec,
}
