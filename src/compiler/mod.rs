// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Manifest compiler
//!
//! Lowers a validated pipeline and its component registry into a static
//! workflow manifest for an external runtime. Compilation is all-or-nothing:
//! any error aborts before a file is written.

mod argo;
pub mod config;
mod k8s;
pub mod manifest;
mod tekton;

pub use argo::ArgoRenderer;
pub use config::{AccessMode, CompilerConfig, WorkflowFormat};
pub use manifest::{Manifest, ManifestNode, Provisioning};
pub use tekton::TektonRenderer;

use blake3::Hasher;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::component::{Component, ComponentRegistry};
use crate::errors::PipewrightError;
use crate::pipeline::naming::sanitize_name;
use crate::pipeline::{DagBuilder, Pipeline};

/// Serializes a [`Manifest`] into one workflow format
pub trait ManifestRenderer {
    /// Format this renderer produces
    fn format(&self) -> WorkflowFormat;

    /// Build the workflow document
    fn render(&self, manifest: &Manifest) -> Result<serde_yaml::Value, PipewrightError>;
}

/// Renderer for a workflow format
pub fn renderer_for(format: WorkflowFormat) -> Box<dyn ManifestRenderer> {
    match format {
        WorkflowFormat::Tekton => Box::new(TektonRenderer),
        WorkflowFormat::Argo => Box::new(ArgoRenderer),
    }
}

/// Pipeline to manifest compiler
pub struct ManifestCompiler {
    config: CompilerConfig,
}

impl ManifestCompiler {
    /// Create a compiler with explicit settings
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a pipeline into a format-neutral manifest
    pub fn compile(
        &self,
        pipeline: &Pipeline,
        registry: &ComponentRegistry,
    ) -> Result<Manifest, PipewrightError> {
        if pipeline.tasks.is_empty() {
            return Err(PipewrightError::EmptyPipeline {
                name: pipeline.name.clone(),
            });
        }

        let dag = DagBuilder::build(pipeline)?;
        let order = dag.topological_order()?;
        let labels = node_labels(pipeline)?;
        let default_image = self.config.default_image.as_deref();

        let mut nodes = Vec::with_capacity(order.len());
        for idx in order {
            let task = &pipeline.tasks[idx];
            let component = registry.get(&task.component).ok_or_else(|| {
                PipewrightError::UnknownComponent {
                    task: task.name.clone(),
                    component: task.component.clone(),
                }
            })?;

            component.check_required(default_image)?;
            let image = component
                .resolved_image(default_image)
                .ok_or_else(|| PipewrightError::missing_field(&component.name, "image"))?;

            let mut parameters = component.parameters.clone();
            parameters.extend(task.parameters.clone());

            let run_after = dag
                .dependencies(&task.name)
                .unwrap_or_default()
                .iter()
                .map(|dep| labels[dep.as_str()].clone())
                .collect();

            debug!(task = %task.name, component = %component.name, image, "lowered task");

            nodes.push(ManifestNode {
                name: labels[task.name.as_str()].clone(),
                component: component.name.clone(),
                image: image.to_string(),
                command: entry_command(component),
                parameters,
                run_after,
                env: component.env.clone(),
                secrets: component.secrets.clone(),
            });
        }

        let manifest = Manifest {
            name: sanitize_name(&pipeline.name),
            description: pipeline.description.clone(),
            nodes,
            provisioning: Provisioning {
                storage_class: self.config.storage_class.clone(),
                access_mode: self.config.access_mode,
                size: self.config.volume_size.clone(),
            },
            definition_hash: definition_hash(pipeline, registry)?,
        };

        info!(
            pipeline = %manifest.name,
            nodes = manifest.node_count(),
            edges = manifest.edge_count(),
            "compiled pipeline"
        );

        Ok(manifest)
    }

    /// Render a manifest in the configured workflow format
    pub fn render(&self, manifest: &Manifest) -> Result<String, PipewrightError> {
        let renderer = renderer_for(self.config.format);
        let document = renderer.render(manifest)?;
        debug!(format = %renderer.format(), "rendered manifest");
        serde_yaml::to_string(&document).map_err(Into::into)
    }

    /// Compile, render and write a manifest to `path`
    pub fn compile_to_file(
        &self,
        pipeline: &Pipeline,
        registry: &ComponentRegistry,
        path: &Path,
    ) -> Result<Manifest, PipewrightError> {
        let manifest = self.compile(pipeline, registry)?;
        let rendered = self.render(&manifest)?;

        let write_error = |e: std::io::Error| PipewrightError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, rendered).map_err(write_error)?;

        info!(path = %path.display(), format = %self.config.format, "wrote manifest");
        Ok(manifest)
    }
}

impl Default for ManifestCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

/// Manifest path for a pipeline definition
///
/// `training/pipeline.yaml` compiles to `training/pipeline.manifest.yaml`.
pub fn derive_output_path(source: &Path) -> PathBuf {
    source.with_extension("manifest.yaml")
}

/// Map each task name to its resource name, rejecting collisions
fn node_labels(pipeline: &Pipeline) -> Result<HashMap<&str, String>, PipewrightError> {
    let mut labels = HashMap::with_capacity(pipeline.tasks.len());
    let mut taken: HashMap<String, &str> = HashMap::new();

    for task in &pipeline.tasks {
        let label = sanitize_name(&task.name);
        if let Some(first) = taken.insert(label.clone(), task.name.as_str()) {
            return Err(PipewrightError::TaskNameCollision {
                first: first.to_string(),
                second: task.name.clone(),
                label,
            });
        }
        labels.insert(task.name.as_str(), label);
    }

    Ok(labels)
}

/// Container command running a component's entry point
///
/// Parameters arrive as `name value` argument pairs and are passed to the
/// function as keyword arguments.
fn entry_command(component: &Component) -> Vec<String> {
    let program = format!(
        "import sys\nfrom {module} import {function}\n\n\
         kwargs = dict(zip(sys.argv[1::2], sys.argv[2::2]))\n\
         {function}(**kwargs)\n",
        module = component.entry.module,
        function = component.entry.function,
    );

    let python = ["python3", "-u", "-c"]
        .into_iter()
        .map(String::from)
        .chain(std::iter::once(program));

    if component.packages.is_empty() {
        return python.collect();
    }

    let packages = component
        .packages
        .iter()
        .map(|p| format!("'{}'", p.replace('\'', r"'\''")))
        .collect::<Vec<_>>()
        .join(" ");
    let install = format!(
        "PIP_DISABLE_PIP_VERSION_CHECK=1 python3 -m pip install --quiet --no-warn-script-location {}",
        packages
    );
    let script = format!("({install} || {install} --user) && \"$0\" \"$@\"");

    ["sh".to_string(), "-c".to_string(), script]
        .into_iter()
        .chain(python)
        .collect()
}

/// Stable hash of the pipeline and the components its tasks use
fn definition_hash(
    pipeline: &Pipeline,
    registry: &ComponentRegistry,
) -> Result<String, PipewrightError> {
    let mut hasher = Hasher::new();
    hasher.update(serde_json::to_string(pipeline)?.as_bytes());

    let mut seen = std::collections::HashSet::new();
    for task in &pipeline.tasks {
        if !seen.insert(task.component.as_str()) {
            continue;
        }
        if let Some(component) = registry.get(&task.component) {
            hasher.update(serde_json::to_string(component)?.as_bytes());
        }
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::EntryPoint;
    use crate::pipeline::{preset, PipelineBuilder, PipelineDefinition, Task};
    use std::collections::HashMap;

    fn linear_chain() -> (ComponentRegistry, Pipeline) {
        let mut registry = ComponentRegistry::new();
        let mut builder = PipelineBuilder::new("chain");
        let mut previous = None;

        for name in ["ingest", "preprocess", "train", "convert", "upload"] {
            let component = Component::new(name, EntryPoint::new(name, "run")).with_image("img:1");
            let task = builder.add_task(registry.register(component).unwrap());
            if let Some(prev) = previous {
                builder.after(task, prev);
            }
            previous = Some(task);
        }

        (registry, builder.build())
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_linear_chain_compiles() {
        let (registry, pipeline) = linear_chain();
        let manifest = ManifestCompiler::default().compile(&pipeline, &registry).unwrap();

        assert_eq!(manifest.node_count(), 5);
        assert_eq!(manifest.edge_count(), 4);
        assert_eq!(
            manifest.node_names(),
            vec!["ingest", "preprocess", "train", "convert", "upload"]
        );
        assert_eq!(manifest.node("train").unwrap().run_after, vec!["preprocess"]);
        assert!(manifest.node("ingest").unwrap().run_after.is_empty());
    }

    #[test]
    fn test_one_edge_per_relation_in_diamond() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(Component::new("c", EntryPoint::new("m", "f")).with_image("img"))
            .unwrap();

        let mut pipeline = Pipeline::new("diamond");
        for (name, after) in [
            ("a", vec![]),
            ("b", vec!["a"]),
            ("c", vec!["a"]),
            ("d", vec!["b", "c", "b"]),
        ] {
            let mut task = Task::new(name, "c");
            task.after = after.into_iter().map(String::from).collect();
            pipeline.tasks.push(task);
        }

        let manifest = ManifestCompiler::default().compile(&pipeline, &registry).unwrap();
        assert_eq!(manifest.node_count(), 4);
        assert_eq!(manifest.edge_count(), 4);
        assert_eq!(manifest.node("d").unwrap().run_after, vec!["b", "c"]);
    }

    #[test]
    fn test_cycle_aborts_compile() {
        let (registry, mut pipeline) = linear_chain();
        pipeline.tasks[0].after.push("upload".into());

        let result = ManifestCompiler::default().compile(&pipeline, &registry);
        assert!(matches!(result, Err(PipewrightError::CircularDependency { .. })));
    }

    #[test]
    fn test_missing_image_is_schema_error() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(Component::new("bare", EntryPoint::new("m", "f")))
            .unwrap();
        let mut pipeline = Pipeline::new("p");
        pipeline.tasks.push(Task::new("bare", "bare"));

        let result = ManifestCompiler::default().compile(&pipeline, &registry);
        assert!(matches!(
            result,
            Err(PipewrightError::MissingField { ref field, .. }) if field == "image"
        ));

        let config = CompilerConfig {
            default_image: Some("python:3.11".into()),
            ..CompilerConfig::default()
        };
        let manifest = ManifestCompiler::new(config).compile(&pipeline, &registry).unwrap();
        assert_eq!(manifest.nodes[0].image, "python:3.11");
    }

    #[test]
    fn test_unknown_component() {
        let mut pipeline = Pipeline::new("p");
        pipeline.tasks.push(Task::new("t", "ghost"));

        let result = ManifestCompiler::default().compile(&pipeline, &ComponentRegistry::new());
        assert!(matches!(result, Err(PipewrightError::UnknownComponent { .. })));
    }

    #[test]
    fn test_empty_pipeline() {
        let result =
            ManifestCompiler::default().compile(&Pipeline::new("p"), &ComponentRegistry::new());
        assert!(matches!(result, Err(PipewrightError::EmptyPipeline { .. })));
    }

    #[test]
    fn test_component_without_entry_is_missing_field() {
        let yaml = r#"
name: "partial"
components: [{name: ingest, image: "img:1"}]
tasks:
  - name: ingest
    component: ingest
"#;
        let (registry, pipeline) = PipelineDefinition::from_yaml(yaml)
            .unwrap()
            .into_parts()
            .unwrap();

        let result = ManifestCompiler::default().compile(&pipeline, &registry);
        match result {
            Err(PipewrightError::MissingField { component, field, .. }) => {
                assert_eq!(component, "ingest");
                assert_eq!(field, "entry.module");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_sanitized_name_collision() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(Component::new("c", EntryPoint::new("m", "f")).with_image("img"))
            .unwrap();
        let mut pipeline = Pipeline::new("p");
        pipeline.tasks.push(Task::new("train_model", "c"));
        pipeline.tasks.push(Task::new("train-model", "c"));

        let result = ManifestCompiler::default().compile(&pipeline, &registry);
        match result {
            Err(PipewrightError::TaskNameCollision { first, second, label }) => {
                assert_eq!(first, "train_model");
                assert_eq!(second, "train-model");
                assert_eq!(label, "train-model");
            }
            other => panic!("expected TaskNameCollision, got {other:?}"),
        }
    }

    #[test]
    fn test_parameters_merge_task_over_component() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                Component::new("train", EntryPoint::new("m", "f"))
                    .with_image("img")
                    .with_parameter("epochs", "10")
                    .with_parameter("lr", "0.01"),
            )
            .unwrap();
        let mut pipeline = Pipeline::new("p");
        let mut task = Task::new("train", "train");
        task.parameters.insert("epochs".into(), "20".into());
        pipeline.tasks.push(task);

        let manifest = ManifestCompiler::default().compile(&pipeline, &registry).unwrap();
        let params = &manifest.nodes[0].parameters;
        assert_eq!(params["epochs"], "20");
        assert_eq!(params["lr"], "0.01");
    }

    #[test]
    fn test_entry_command_without_packages() {
        let component = Component::new("c", EntryPoint::new("data_ingestion", "ingest_data"));
        let command = entry_command(&component);

        assert_eq!(&command[..3], &["python3", "-u", "-c"]);
        assert!(command[3].contains("from data_ingestion import ingest_data"));
        assert!(command[3].contains("ingest_data(**kwargs)"));
    }

    #[test]
    fn test_entry_command_installs_packages() {
        let component = Component::new("c", EntryPoint::new("model_upload", "upload_model"))
            .with_packages(["boto3", "botocore"]);
        let command = entry_command(&component);

        assert_eq!(command[0], "sh");
        assert_eq!(command[1], "-c");
        assert!(command[2]
            .contains("pip install --quiet --no-warn-script-location 'boto3' 'botocore'"));
        assert!(command[2].ends_with("&& \"$0\" \"$@\""));
        assert_eq!(command[3], "python3");
    }

    #[test]
    fn test_storage_class_from_environment() {
        let (registry, pipeline) = linear_chain();
        let config = CompilerConfig::default()
            .with_env_overrides(env(&[(config::STORAGE_CLASS_ENV, "standard")]))
            .unwrap();
        let compiler = ManifestCompiler::new(config);

        let manifest = compiler.compile(&pipeline, &registry).unwrap();
        assert_eq!(manifest.provisioning.storage_class, "standard");

        let rendered = compiler.render(&manifest).unwrap();
        assert!(rendered.contains("storageClassName: standard"));
        assert!(!rendered.contains("gp3"));
    }

    #[test]
    fn test_default_provisioning() {
        let (registry, pipeline) = linear_chain();
        let compiler = ManifestCompiler::default();
        let manifest = compiler.compile(&pipeline, &registry).unwrap();

        assert_eq!(manifest.provisioning.storage_class, "gp3");
        assert_eq!(manifest.provisioning.access_mode, AccessMode::ReadWriteOnce);

        let rendered = compiler.render(&manifest).unwrap();
        assert!(rendered.contains("storageClassName: gp3"));
        assert!(rendered.contains("- ReadWriteOnce"));
    }

    #[test]
    fn test_render_tekton_structure() {
        let (registry, pipeline) = preset::model_training().unwrap();
        let compiler = ManifestCompiler::default();
        let manifest = compiler.compile(&pipeline, &registry).unwrap();
        let rendered = compiler.render(&manifest).unwrap();

        let doc: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(doc["apiVersion"], "tekton.dev/v1beta1");
        assert_eq!(doc["kind"], "PipelineRun");
        assert_eq!(doc["metadata"]["name"], "model-training-pipeline-kfp");

        let tasks = doc["spec"]["pipelineSpec"]["tasks"].as_sequence().unwrap();
        assert_eq!(tasks.len(), 5);
        assert_eq!(tasks[0]["name"], "ingest-data");
        assert!(tasks[0].get("runAfter").is_none());
        assert_eq!(tasks[4]["runAfter"][0], "convert-model");
        assert_eq!(
            tasks[4]["taskSpec"]["steps"][0]["image"],
            preset::PYTORCH_RUNTIME_IMAGE
        );
    }

    #[test]
    fn test_render_argo_structure() {
        let (registry, pipeline) = linear_chain();
        let compiler = ManifestCompiler::new(CompilerConfig {
            format: WorkflowFormat::Argo,
            ..CompilerConfig::default()
        });
        let manifest = compiler.compile(&pipeline, &registry).unwrap();
        let doc: serde_yaml::Value =
            serde_yaml::from_str(&compiler.render(&manifest).unwrap()).unwrap();

        assert_eq!(doc["kind"], "Workflow");
        assert_eq!(doc["metadata"]["generateName"], "chain-");
        assert_eq!(doc["spec"]["entrypoint"], "pipeline");

        let templates = doc["spec"]["templates"].as_sequence().unwrap();
        assert_eq!(templates.len(), 6);
        let dag_tasks = templates[0]["dag"]["tasks"].as_sequence().unwrap();
        assert_eq!(dag_tasks[1]["template"], "task-preprocess");
        assert_eq!(dag_tasks[1]["dependencies"][0], "ingest");
        assert_eq!(
            doc["spec"]["volumeClaimTemplates"][0]["spec"]["storageClassName"],
            "gp3"
        );
    }

    #[test]
    fn test_render_parameters_and_secrets() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                Component::new("upload", EntryPoint::new("model_upload", "upload_model"))
                    .with_image("img")
                    .with_parameter("bucket", "models")
                    .with_env("S3_KEY", "models/model.onnx")
                    .with_secret("aws-connection-my-storage"),
            )
            .unwrap();
        let mut pipeline = Pipeline::new("p");
        pipeline.tasks.push(Task::new("upload", "upload"));

        let compiler = ManifestCompiler::default();
        let manifest = compiler.compile(&pipeline, &registry).unwrap();
        let doc: serde_yaml::Value =
            serde_yaml::from_str(&compiler.render(&manifest).unwrap()).unwrap();
        let task = &doc["spec"]["pipelineSpec"]["tasks"][0];

        assert_eq!(task["params"][0]["name"], "bucket");
        assert_eq!(task["params"][0]["value"], "models");
        let step = &task["taskSpec"]["steps"][0];
        let command = step["command"].as_sequence().unwrap();
        assert_eq!(command[command.len() - 2], "bucket");
        assert_eq!(command[command.len() - 1], "$(params.bucket)");
        assert_eq!(step["env"][0]["name"], "S3_KEY");
        assert_eq!(step["envFrom"][0]["secretRef"]["name"], "aws-connection-my-storage");
    }

    #[test]
    fn test_definition_hash_tracks_content() {
        let (registry, pipeline) = linear_chain();
        let compiler = ManifestCompiler::default();
        let first = compiler.compile(&pipeline, &registry).unwrap();
        let again = compiler.compile(&pipeline, &registry).unwrap();
        assert_eq!(first.definition_hash, again.definition_hash);

        let mut changed = pipeline.clone();
        changed.tasks[4].parameters.insert("bucket".into(), "other".into());
        let other = compiler.compile(&changed, &registry).unwrap();
        assert_ne!(first.definition_hash, other.definition_hash);
    }

    #[test]
    fn test_compile_to_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("chain.manifest.yaml");
        let (registry, pipeline) = linear_chain();

        ManifestCompiler::default()
            .compile_to_file(&pipeline, &registry, &path)
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("kind: PipelineRun"));
    }

    #[test]
    fn test_compile_to_unwritable_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let (registry, pipeline) = linear_chain();

        let result = ManifestCompiler::default().compile_to_file(
            &pipeline,
            &registry,
            &blocker.join("manifest.yaml"),
        );
        assert!(matches!(result, Err(PipewrightError::FileWriteError { .. })));
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("pipelines/training.yaml")),
            PathBuf::from("pipelines/training.manifest.yaml")
        );
        assert_eq!(
            derive_output_path(Path::new("training")),
            PathBuf::from("training.manifest.yaml")
        );
    }
}
