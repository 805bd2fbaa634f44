// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Compile command - lower a definition into a workflow manifest

use colored::Colorize;
use miette::Result;

use super::{fail, load_definition, resolve_config, CompileArgs};
use crate::compiler::{derive_output_path, ManifestCompiler};

/// Run the compile command
pub fn run(args: CompileArgs, verbose: bool) -> Result<()> {
    let (registry, pipeline) = load_definition(&args.definition).map_err(fail)?;

    // Flags override config file and environment
    let mut config = resolve_config(args.config.as_deref()).map_err(fail)?;
    if let Some(format) = args.format {
        config.format = format;
    }
    if let Some(storage_class) = args.storage_class {
        config.storage_class = storage_class;
    }
    if let Some(access_mode) = args.access_mode {
        config.access_mode = access_mode;
    }
    if let Some(default_image) = args.default_image {
        config.default_image = Some(default_image);
    }

    let compiler = ManifestCompiler::new(config);

    if args.stdout {
        let manifest = compiler.compile(&pipeline, &registry).map_err(fail)?;
        print!("{}", compiler.render(&manifest).map_err(fail)?);
        return Ok(());
    }

    let output = args
        .output
        .unwrap_or_else(|| derive_output_path(&args.definition));
    let manifest = compiler
        .compile_to_file(&pipeline, &registry, &output)
        .map_err(fail)?;

    println!(
        "  {} Compiled {} ({} tasks, {} edges) → {}",
        "✓".green(),
        manifest.name.bold(),
        manifest.node_count(),
        manifest.edge_count(),
        output.display().to_string().cyan()
    );

    if verbose {
        let provisioning = &manifest.provisioning;
        println!();
        println!("{}:", "Manifest summary".bold());
        println!("  Format: {}", compiler.config().format);
        println!(
            "  Volume: {} {} ({})",
            provisioning.size, provisioning.storage_class, provisioning.access_mode
        );
        for (i, node) in manifest.nodes.iter().enumerate() {
            let deps = if node.run_after.is_empty() {
                String::new()
            } else {
                format!(" [after: {}]", node.run_after.join(", "))
            };
            println!("  {}. {} ({}){}", i + 1, node.name, node.image, deps.dimmed());
        }
    }

    Ok(())
}
