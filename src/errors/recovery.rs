// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest fixing a circular dependency
    pub fn fix_circular_dependency(tasks: &[String]) -> Self {
        Self {
            action: "Remove circular dependency".into(),
            steps: vec![
                format!("Detected cycle: {}", tasks.join(" → ")),
                "Review the 'after' lists of the tasks above".into(),
                "Ensure tasks form a directed acyclic graph (DAG)".into(),
            ],
            commands: vec![
                "# Visualize your pipeline:".into(),
                "pipewright graph --format mermaid".into(),
            ],
        }
    }

    /// Suggest resolving a registry name collision
    pub fn fix_duplicate_component(name: &str) -> Self {
        Self {
            action: format!("Resolve duplicate component '{}'", name),
            steps: vec![
                "Two component declarations share a name but differ in content".into(),
                "Rename one of them, or remove the copy if they should be the same".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest filling in a required component field
    pub fn fix_missing_field(component: &str, field: &str) -> Self {
        let mut steps = vec![format!(
            "Component '{}' must declare '{}' before it can be compiled",
            component, field
        )];
        if field == "image" {
            steps.push("Alternatively set a fallback image for every component:".into());
        }

        let commands = if field == "image" {
            vec![
                "# pipewright.toml".into(),
                "[compiler]".into(),
                "default_image = \"registry.example.com/runtime:latest\"".into(),
            ]
        } else {
            vec![]
        };

        Self {
            action: format!("Add '{}' to component '{}'", field, component),
            steps,
            commands,
        }
    }

    /// Suggest creating a pipeline definition
    pub fn create_definition() -> Self {
        Self {
            action: "Create a pipeline definition".into(),
            steps: vec![
                "No pipeline.yaml found in current directory".into(),
                "Scaffold one from a template or pass a path explicitly".into(),
            ],
            commands: vec![
                "# Five-stage training pipeline:".into(),
                "pipewright init --template model-training".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
