// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! DAG (Directed Acyclic Graph) builder for task dependencies
//!
//! Builds and validates the "runs after" graph of a pipeline, ensuring a
//! deterministic execution order and detecting cycles.

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::errors::PipewrightError;
use crate::pipeline::Pipeline;

/// Builder for task dependency DAGs
///
/// Node `i` always corresponds to `pipeline.tasks[i]`, so node indices double
/// as insertion order.
pub struct DagBuilder {
    graph: DiGraph<usize, ()>,
    name_to_index: HashMap<String, NodeIndex>,
    names: Vec<String>,
}

impl DagBuilder {
    /// Create a new DAG builder
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_to_index: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// Build a DAG from a pipeline and check that it is acyclic
    pub fn build(pipeline: &Pipeline) -> Result<Self, PipewrightError> {
        let builder = Self::from_pipeline(pipeline)?;
        builder.validate_acyclic()?;
        Ok(builder)
    }

    /// Build the graph without checking for cycles
    pub fn from_pipeline(pipeline: &Pipeline) -> Result<Self, PipewrightError> {
        let mut builder = Self::new();

        // Add all tasks as nodes
        for (idx, task) in pipeline.tasks.iter().enumerate() {
            if builder.name_to_index.contains_key(&task.name) {
                return Err(PipewrightError::DuplicateTask {
                    task: task.name.clone(),
                });
            }
            let node = builder.graph.add_node(idx);
            builder.name_to_index.insert(task.name.clone(), node);
            builder.names.push(task.name.clone());
        }

        // Add dependency edges (predecessor -> task)
        for task in &pipeline.tasks {
            let task_node = builder.name_to_index[&task.name];

            for dep_name in &task.after {
                let dep_node = builder.name_to_index.get(dep_name).ok_or_else(|| {
                    PipewrightError::UnknownDependency {
                        task: task.name.clone(),
                        dependency: dep_name.clone(),
                    }
                })?;

                // Repeated entries describe the same relation
                if !builder.graph.contains_edge(*dep_node, task_node) {
                    builder.graph.add_edge(*dep_node, task_node, ());
                }
            }
        }

        debug!(
            pipeline = %pipeline.name,
            tasks = builder.node_count(),
            edges = builder.edge_count(),
            "built dependency graph"
        );

        Ok(builder)
    }

    /// Validate that the graph is acyclic
    pub fn validate_acyclic(&self) -> Result<(), PipewrightError> {
        self.topological_order().map(|_| ())
    }

    /// Number of tasks
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct "runs after" relations
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Describe the first cycle found, members in insertion order
    fn cycle_error(&self) -> PipewrightError {
        let mut cycles: Vec<Vec<usize>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut members: Vec<usize> = scc.into_iter().map(|n| n.index()).collect();
                members.sort_unstable();
                members
            })
            .collect();
        cycles.sort();

        let tasks = cycles
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|idx| self.names[idx].clone())
            .collect();

        PipewrightError::CircularDependency { tasks }
    }

    /// Get topologically sorted task indices
    ///
    /// Among tasks that are ready at the same time, the one declared first
    /// comes first.
    pub fn topological_order(&self) -> Result<Vec<usize>, PipewrightError> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut order = Vec::with_capacity(self.node_count());
        while let Some(Reverse(idx)) = ready.pop() {
            let node = NodeIndex::new(idx);
            order.push(self.graph[node]);

            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                let degree = &mut in_degree[next.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }

        if order.len() < self.node_count() {
            return Err(self.cycle_error());
        }

        Ok(order)
    }

    /// Get topologically sorted task names
    pub fn topological_order_names(&self) -> Result<Vec<String>, PipewrightError> {
        Ok(self
            .topological_order()?
            .into_iter()
            .map(|idx| self.names[idx].clone())
            .collect())
    }

    /// Group tasks into levels that may run concurrently
    ///
    /// A task sits one level below its deepest predecessor.
    pub fn execution_levels(&self) -> Result<Vec<Vec<String>>, PipewrightError> {
        let order = self.topological_order()?;
        let mut depth = vec![0usize; self.node_count()];

        for &idx in &order {
            let node = NodeIndex::new(idx);
            depth[idx] = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|pred| depth[pred.index()] + 1)
                .max()
                .unwrap_or(0);
        }

        let level_count = depth.iter().max().map_or(0, |d| d + 1);
        let mut levels = vec![Vec::new(); level_count];
        for (idx, &d) in depth.iter().enumerate() {
            levels[d].push(self.names[idx].clone());
        }

        Ok(levels)
    }

    /// Get dependencies for a task (tasks that must run before it)
    pub fn dependencies(&self, task_name: &str) -> Option<Vec<String>> {
        let node = self.name_to_index.get(task_name)?;
        Some(self.neighbor_names(*node, Direction::Incoming))
    }

    /// Get dependents for a task (tasks that run after it)
    pub fn dependents(&self, task_name: &str) -> Option<Vec<String>> {
        let node = self.name_to_index.get(task_name)?;
        Some(self.neighbor_names(*node, Direction::Outgoing))
    }

    fn neighbor_names(&self, node: NodeIndex, direction: Direction) -> Vec<String> {
        let mut indices: Vec<usize> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|n| n.index())
            .collect();
        indices.sort_unstable();
        indices.into_iter().map(|idx| self.names[idx].clone()).collect()
    }

    /// Check if task A depends (directly or transitively) on task B
    pub fn depends_on(&self, task_a: &str, task_b: &str) -> bool {
        let Some(node_a) = self.name_to_index.get(task_a) else {
            return false;
        };
        let Some(node_b) = self.name_to_index.get(task_b) else {
            return false;
        };

        has_path_connecting(&self.graph, *node_b, *node_a, None)
    }

    /// Tasks with neither predecessors nor dependents
    pub fn isolated(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|n| self.graph.neighbors_undirected(*n).next().is_none())
            .map(|n| self.names[n.index()].clone())
            .collect()
    }

    /// Iterate edges as (predecessor, task) name pairs
    fn edge_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.raw_edges().iter().map(|edge| {
            (
                self.names[edge.source().index()].as_str(),
                self.names[edge.target().index()].as_str(),
            )
        })
    }

    /// Generate Mermaid diagram of the DAG
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");

        // Node ids are positional; names only appear as quoted labels
        for (idx, name) in self.names.iter().enumerate() {
            out.push_str(&format!("    n{}[\"{}\"]\n", idx, mermaid_label(name)));
        }

        for edge in self.graph.raw_edges() {
            out.push_str(&format!(
                "    n{} --> n{}\n",
                edge.source().index(),
                edge.target().index()
            ));
        }

        out
    }

    /// Generate DOT diagram of the DAG
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=TB;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for (from, to) in self.edge_names() {
            out.push_str(&format!("    {} -> {};\n", dot_id(from), dot_id(to)));
        }

        for name in self.isolated() {
            out.push_str(&format!("    {};\n", dot_id(&name)));
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation of execution order
    pub fn to_text(&self, pipeline: &Pipeline) -> Result<String, PipewrightError> {
        let order = self.topological_order()?;
        let mut out = String::new();

        for (i, idx) in order.iter().enumerate() {
            let task = &pipeline.tasks[*idx];
            let deps = self.dependencies(&task.name).unwrap_or_default();

            out.push_str(&format!("{}. {} ({})", i + 1, task.name, task.component));

            if !deps.is_empty() {
                out.push_str(&format!(" [after: {}]", deps.join(", ")));
            }

            out.push('\n');
        }

        Ok(out)
    }
}

impl Default for DagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Quoted DOT identifier
fn dot_id(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Text for a quoted Mermaid label
fn mermaid_label(name: &str) -> String {
    name.replace('"', "#quot;")
}
