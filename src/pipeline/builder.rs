// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Programmatic pipeline construction
//!
//! Tasks are created from components and wired with `after`, the same way a
//! pipeline function instantiates components and orders them.

use crate::component::Component;
use crate::pipeline::naming::sanitize_name;
use crate::pipeline::{Pipeline, Task};

/// Handle to a task added to a [`PipelineBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(usize);

/// Builder for [`Pipeline`]s
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            pipeline: Pipeline::new(name),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.pipeline.description = Some(description.into());
        self
    }

    /// Add a task named after its component
    ///
    /// Reusing a component yields `name-2`, `name-3`, ...
    pub fn add_task(&mut self, component: &Component) -> TaskId {
        let base = sanitize_name(&component.name);
        let name = self.unique_name(&base);
        self.push(Task::new(name, component.name.clone()))
    }

    /// Add a task with an explicit name
    ///
    /// Name clashes are left for validation to report.
    pub fn add_named_task(&mut self, name: impl Into<String>, component: &Component) -> TaskId {
        self.push(Task::new(name, component.name.clone()))
    }

    /// Declare that `task` runs after `predecessor`
    pub fn after(&mut self, task: TaskId, predecessor: TaskId) -> &mut Self {
        let predecessor_name = self.pipeline.tasks[predecessor.0].name.clone();
        let after = &mut self.pipeline.tasks[task.0].after;
        if !after.contains(&predecessor_name) {
            after.push(predecessor_name);
        }
        self
    }

    /// Override a parameter for one task
    pub fn with_parameter(
        &mut self,
        task: TaskId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.pipeline.tasks[task.0]
            .parameters
            .insert(key.into(), value.into());
        self
    }

    pub fn task_name(&self, task: TaskId) -> &str {
        &self.pipeline.tasks[task.0].name
    }

    /// Finish building
    pub fn build(self) -> Pipeline {
        self.pipeline
    }

    fn push(&mut self, task: Task) -> TaskId {
        self.pipeline.tasks.push(task);
        TaskId(self.pipeline.tasks.len() - 1)
    }

    fn unique_name(&self, base: &str) -> String {
        if self.pipeline.get_task(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| self.pipeline.get_task(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }
}
