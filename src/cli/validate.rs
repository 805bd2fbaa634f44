// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Validate command - check a pipeline definition

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{fail, load_definition, resolve_config};
use crate::pipeline::PipelineValidator;
use crate::utils::{print_error, print_section, print_success, print_warning};

/// Run the validate command
pub fn run(definition: PathBuf, config: Option<PathBuf>, verbose: bool) -> Result<()> {
    println!("{}", "Validating pipeline...".bold());
    println!();

    let (registry, pipeline) = match load_definition(&definition) {
        Ok(parts) => parts,
        Err(e) => {
            print_error("Failed to load pipeline definition");
            eprintln!();
            return Err(fail(e));
        }
    };

    print_success("Pipeline definition parsed");

    let config = resolve_config(config.as_deref()).map_err(fail)?;
    let validation =
        PipelineValidator::validate(&pipeline, &registry, config.default_image.as_deref())?;

    if !validation.errors.is_empty() {
        print_section(&"Errors".red().bold().to_string());
        for error in &validation.errors {
            print_error(error);
        }
    }

    if !validation.warnings.is_empty() {
        print_section(&"Warnings".yellow().bold().to_string());
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose {
        print_section(&"Pipeline summary".bold().to_string());
        println!("  Name: {}", pipeline.name);
        println!("  Components: {}", registry.len());
        println!("  Tasks: {}", pipeline.tasks.len());
        for task in &pipeline.tasks {
            let deps = if task.after.is_empty() {
                String::new()
            } else {
                format!(" [after: {}]", task.after.join(", "))
            };
            println!("    - {} ({}){}", task.name, task.component, deps.dimmed());
        }
    }

    println!();

    if !validation.is_valid() {
        return Err(miette::miette!("Pipeline validation failed"));
    }

    if validation.has_warnings() {
        println!("{}", "Pipeline is valid but has warnings.".yellow().bold());
    } else {
        println!("{}", "Pipeline is valid!".green().bold());
    }

    Ok(())
}
