// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Init command - scaffold a pipeline definition

use colored::Colorize;
use miette::Result;
use std::path::Path;

use super::{fail, InitTemplate};
use crate::compiler::config::CONFIG_FILE;
use crate::component::{Component, ComponentRegistry, EntryPoint};
use crate::pipeline::{preset, Pipeline, PipelineDefinition, Task};
use crate::utils::print_success;

const DEFINITION_FILE: &str = "pipeline.yaml";

/// Run the init command
pub fn run(name: Option<String>, template: InitTemplate, force: bool, verbose: bool) -> Result<()> {
    println!("{}", "Initializing pipeline...".bold());
    println!();

    if Path::new(DEFINITION_FILE).exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            DEFINITION_FILE
        ));
    }

    let content = match template {
        InitTemplate::ModelTraining => generate_model_training(name)?,
        InitTemplate::Empty => generate_empty_template(name.as_deref().unwrap_or("my-pipeline"))?,
    };

    std::fs::write(DEFINITION_FILE, &content)
        .map_err(|e| miette::miette!("Failed to write {}: {}", DEFINITION_FILE, e))?;
    print_success(&format!("Created {}", DEFINITION_FILE));

    if !Path::new(CONFIG_FILE).exists() {
        std::fs::write(CONFIG_FILE, CONFIG_TEMPLATE)
            .map_err(|e| miette::miette!("Failed to write {}: {}", CONFIG_FILE, e))?;
        print_success(&format!("Created {}", CONFIG_FILE));
    }

    println!();
    println!("{}", "Pipeline initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to point at your entry points", DEFINITION_FILE.cyan());
    println!("  2. Run {} to check it", "pipewright validate".cyan());
    println!("  3. Run {} to write the manifest", "pipewright compile".cyan());
    println!();

    if verbose {
        println!("{}", "Generated definition:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", content.dimmed());
    }

    Ok(())
}

fn generate_model_training(name: Option<String>) -> Result<String> {
    let (registry, mut pipeline) = preset::model_training().map_err(fail)?;
    if let Some(name) = name {
        pipeline.name = name;
    }

    let yaml = PipelineDefinition::from_parts(&registry, &pipeline)
        .to_yaml()
        .map_err(fail)?;

    Ok(format!(
        r#"# pipewright pipeline definition
#
# Components may also declare plain environment variables and secrets:
#
#   env:
#     - name: S3_KEY
#       value: models/object-detection/model.onnx
#   secrets:
#     - name: aws-connection-my-storage

{yaml}"#
    ))
}

fn generate_empty_template(name: &str) -> Result<String> {
    let mut registry = ComponentRegistry::new();
    let hello = Component::new("hello", EntryPoint::new("hello", "main"))
        .with_image("python:3.11-slim");
    registry.register(hello).map_err(fail)?;

    let mut pipeline = Pipeline::new(name);
    pipeline.tasks.push(Task::new("hello", "hello"));

    let yaml = PipelineDefinition::from_parts(&registry, &pipeline)
        .to_yaml()
        .map_err(fail)?;

    Ok(format!(
        r#"# pipewright pipeline definition

{yaml}
# Add more tasks as needed:
# - name: "next"
#   component: "hello"
#   after: ["hello"]
"#
    ))
}

const CONFIG_TEMPLATE: &str = r#"# pipewright compiler settings
# DEFAULT_STORAGE_CLASS and DEFAULT_ACCESSMODES override the storage values below.

[compiler]
format = "tekton"
storage_class = "gp3"
access_mode = "ReadWriteOnce"
volume_size = "2Gi"
# default_image = "python:3.11-slim"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompilerConfig;

    #[test]
    fn test_model_training_template_round_trips() {
        let content = generate_model_training(Some("training".into())).unwrap();
        let (registry, pipeline) = PipelineDefinition::from_yaml(&content)
            .unwrap()
            .into_parts()
            .unwrap();

        assert_eq!(pipeline.name, "training");
        assert_eq!(pipeline.tasks.len(), 5);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_empty_template_parses() {
        let content = generate_empty_template("demo").unwrap();
        let definition = PipelineDefinition::from_yaml(&content).unwrap();
        assert_eq!(definition.name, "demo");
        assert_eq!(definition.tasks.len(), 1);
    }

    #[test]
    fn test_empty_template_escapes_name() {
        let content = generate_empty_template("say \"hi\": now").unwrap();
        let definition = PipelineDefinition::from_yaml(&content).unwrap();
        assert_eq!(definition.name, "say \"hi\": now");
    }

    #[test]
    fn test_config_template_matches_defaults() {
        let config = CompilerConfig::from_toml(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, CompilerConfig::default());
    }
}
