// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Graph command - visualize pipeline as a graph

use miette::Result;
use std::path::PathBuf;

use super::{fail, load_definition, GraphFormat};
use crate::pipeline::DagBuilder;

/// Run the graph command
pub fn run(definition: PathBuf, format: GraphFormat, verbose: bool) -> Result<()> {
    let (_, pipeline) = load_definition(&definition).map_err(fail)?;

    // Build DAG
    let dag = DagBuilder::build(&pipeline).map_err(fail)?;

    // Output in requested format
    let output = match format {
        GraphFormat::Text => dag.to_text(&pipeline)?,
        GraphFormat::Dot => dag.to_dot(),
        GraphFormat::Mermaid => dag.to_mermaid(),
    };

    println!("{}", output);

    if verbose && format == GraphFormat::Text {
        println!("Parallel levels:");
        for (i, level) in dag.execution_levels()?.iter().enumerate() {
            println!("  {}: {}", i, level.join(", "));
        }
    }

    Ok(())
}
