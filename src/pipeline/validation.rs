// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Pipeline validation
//!
//! Collects every problem in a pipeline up front, rather than stopping at the
//! first one the compiler would hit.

use std::collections::{HashMap, HashSet};

use crate::component::ComponentRegistry;
use crate::errors::PipewrightError;
use crate::pipeline::naming::{is_valid_name, sanitize_name};
use crate::pipeline::{DagBuilder, Pipeline, Task};

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate a pipeline against the components it uses
    ///
    /// `default_image` is the configured fallback for components that do not
    /// declare an image.
    pub fn validate(
        pipeline: &Pipeline,
        registry: &ComponentRegistry,
        default_image: Option<&str>,
    ) -> Result<ValidationResult, PipewrightError> {
        let mut result = ValidationResult::new();

        // Check for empty pipelines
        if pipeline.tasks.is_empty() {
            result.add_error("Pipeline has no tasks defined");
        }

        Self::validate_names(pipeline, &mut result);

        // Validate DAG structure (checks for cycles and unknown dependencies)
        match DagBuilder::build(pipeline) {
            Ok(dag) => {
                if pipeline.tasks.len() > 1 {
                    for name in dag.isolated() {
                        result.add_warning(&format!(
                            "Task '{}' is not connected to any other task",
                            name
                        ));
                    }
                }
            }
            // Already reported by validate_names
            Err(PipewrightError::DuplicateTask { .. }) => {}
            Err(PipewrightError::CircularDependency { tasks }) => {
                result.add_error(&format!("Circular dependency: {}", tasks.join(" → ")));
            }
            Err(PipewrightError::UnknownDependency { task, dependency }) => {
                result.add_error(&format!(
                    "Task '{}' runs after unknown task '{}'",
                    task, dependency
                ));
            }
            Err(e) => {
                result.add_error(&format!("DAG validation error: {}", e));
            }
        }

        // Validate each task
        for task in &pipeline.tasks {
            Self::validate_task(task, registry, &mut result);
        }

        Self::validate_components(pipeline, registry, default_image, &mut result);

        Ok(result)
    }

    /// Check task names for duplicates and manifest name collisions
    fn validate_names(pipeline: &Pipeline, result: &mut ValidationResult) {
        let mut seen_names = HashSet::new();
        let mut sanitized: HashMap<String, &str> = HashMap::new();

        for task in &pipeline.tasks {
            if !seen_names.insert(task.name.as_str()) {
                result.add_error(&format!("Duplicate task name: '{}'", task.name));
                continue;
            }

            let label = sanitize_name(&task.name);
            if let Some(other) = sanitized.get(&label) {
                result.add_error(&format!(
                    "Tasks '{}' and '{}' both become '{}' in the manifest",
                    other, task.name, label
                ));
            } else {
                if !is_valid_name(&task.name) {
                    result.add_warning(&format!(
                        "Task '{}' will be renamed to '{}' in the manifest",
                        task.name, label
                    ));
                }
                sanitized.insert(label, task.name.as_str());
            }
        }
    }

    /// Validate a single task
    fn validate_task(task: &Task, registry: &ComponentRegistry, result: &mut ValidationResult) {
        if !registry.contains(&task.component) {
            result.add_error(&format!(
                "Task '{}': uses unknown component '{}'",
                task.name, task.component
            ));
        }

        let mut seen = HashSet::new();
        for dep in &task.after {
            if !seen.insert(dep) {
                result.add_warning(&format!(
                    "Task '{}': '{}' is listed in 'after' more than once",
                    task.name, dep
                ));
            }
        }
    }

    /// Check required fields of used components and flag unused ones
    fn validate_components(
        pipeline: &Pipeline,
        registry: &ComponentRegistry,
        default_image: Option<&str>,
        result: &mut ValidationResult,
    ) {
        let used: HashSet<&str> = pipeline.tasks.iter().map(|t| t.component.as_str()).collect();

        for component in registry.iter() {
            if !used.contains(component.name.as_str()) {
                result.add_warning(&format!(
                    "Component '{}' is declared but no task uses it",
                    component.name
                ));
                continue;
            }

            if let Err(e) = component.check_required(default_image) {
                result.add_error(&e.to_string());
            }
        }
    }
}

/// Result of pipeline validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, EntryPoint};

    fn registry(names: &[&str]) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        for name in names {
            registry
                .register(Component::new(*name, EntryPoint::new("m", "f")).with_image("img"))
                .unwrap();
        }
        registry
    }

    fn task(name: &str, component: &str, after: &[&str]) -> Task {
        let mut task = Task::new(name, component);
        task.after = after.iter().map(|s| s.to_string()).collect();
        task
    }

    fn pipeline(tasks: Vec<Task>) -> Pipeline {
        Pipeline {
            name: "test".into(),
            description: None,
            tasks,
        }
    }

    #[test]
    fn test_validate_empty_pipeline() {
        let result =
            PipelineValidator::validate(&pipeline(vec![]), &ComponentRegistry::new(), None)
                .unwrap();
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no tasks"));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let p = pipeline(vec![task("dup", "c", &[]), task("dup", "c", &[])]);

        let result = PipelineValidator::validate(&p, &registry(&["c"]), None).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("Duplicate")));
    }

    #[test]
    fn test_validate_sanitized_collision() {
        let p = pipeline(vec![
            task("train_model", "c", &[]),
            task("train-model", "c", &["train_model"]),
        ]);

        let result = PipelineValidator::validate(&p, &registry(&["c"]), None).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("both become 'train-model'")));
    }

    #[test]
    fn test_validate_cycle_and_unknown_dependency() {
        let p = pipeline(vec![task("a", "c", &["b"]), task("b", "c", &["a"])]);
        let result = PipelineValidator::validate(&p, &registry(&["c"]), None).unwrap();
        assert!(result.errors.iter().any(|e| e.starts_with("Circular dependency")));

        let p = pipeline(vec![task("a", "c", &["ghost"])]);
        let result = PipelineValidator::validate(&p, &registry(&["c"]), None).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("unknown task 'ghost'")));
    }

    #[test]
    fn test_validate_unknown_component() {
        let p = pipeline(vec![task("a", "missing", &[])]);

        let result = PipelineValidator::validate(&p, &registry(&[]), None).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("unknown component 'missing'")));
    }

    #[test]
    fn test_validate_missing_image_respects_default() {
        let mut registry = ComponentRegistry::new();
        registry
            .register(Component::new("c", EntryPoint::new("m", "f")))
            .unwrap();
        let p = pipeline(vec![task("a", "c", &[])]);

        let result = PipelineValidator::validate(&p, &registry, None).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("'image'")));

        let result = PipelineValidator::validate(&p, &registry, Some("python:3.11")).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_validate_component_without_entry() {
        let yaml = r#"
name: "partial"
components: [{name: ingest, image: "img:1"}]
tasks:
  - name: ingest
    component: ingest
"#;
        let (registry, p) = crate::pipeline::PipelineDefinition::from_yaml(yaml)
            .unwrap()
            .into_parts()
            .unwrap();

        let result = PipelineValidator::validate(&p, &registry, None).unwrap();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("'ingest' is missing required field 'entry.module'")));
    }

    #[test]
    fn test_validate_warnings() {
        let p = pipeline(vec![
            task("a", "c", &[]),
            task("b", "c", &["a", "a"]),
            task("Lonely_Task", "c", &[]),
        ]);

        let result = PipelineValidator::validate(&p, &registry(&["c", "unused"]), None).unwrap();
        assert!(result.is_valid());
        assert!(result.has_warnings());
        assert!(result.warnings.iter().any(|w| w.contains("more than once")));
        assert!(result.warnings.iter().any(|w| w.contains("renamed to 'lonely-task'")));
        assert!(result.warnings.iter().any(|w| w.contains("'Lonely_Task' is not connected")));
        assert!(result.warnings.iter().any(|w| w.contains("'unused' is declared")));
    }
}
