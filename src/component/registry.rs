// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Component registry
//!
//! Maps component names to their descriptors, preserving registration order.

use std::collections::HashMap;

use tracing::debug;

use super::Component;
use crate::errors::PipewrightError;

/// Registry of named components
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<Component>,
    name_to_index: HashMap<String, usize>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component
    ///
    /// Registering the same definition twice is a no-op. Registering a
    /// different definition under an existing name fails, as does a blank name.
    pub fn register(&mut self, component: Component) -> Result<&Component, PipewrightError> {
        if component.name.trim().is_empty() {
            return Err(PipewrightError::missing_field("<unnamed>", "name"));
        }

        if let Some(&idx) = self.name_to_index.get(&component.name) {
            if self.components[idx] != component {
                return Err(PipewrightError::DuplicateComponent {
                    name: component.name,
                });
            }
            debug!(component = %component.name, "component already registered");
            return Ok(&self.components[idx]);
        }

        debug!(component = %component.name, entry = %component.entry, "registering component");
        let idx = self.components.len();
        self.name_to_index.insert(component.name.clone(), idx);
        self.components.push(component);
        Ok(&self.components[idx])
    }

    /// Look up a component by name
    pub fn get(&self, name: &str) -> Option<&Component> {
        self.name_to_index.get(name).map(|&idx| &self.components[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Component names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::EntryPoint;

    fn component(name: &str, image: &str) -> Component {
        Component::new(name, EntryPoint::new("pkg", "run")).with_image(image)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ComponentRegistry::new();
        registry.register(component("ingest", "img:1")).unwrap();
        registry.register(component("train", "img:1")).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("train"));
        assert_eq!(registry.get("ingest").unwrap().image.as_deref(), Some("img:1"));
        assert_eq!(registry.names(), vec!["ingest", "train"]);
    }

    #[test]
    fn test_identical_registration_is_idempotent() {
        let mut registry = ComponentRegistry::new();
        registry.register(component("ingest", "img:1")).unwrap();
        registry.register(component("ingest", "img:1")).unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_registration_fails() {
        let mut registry = ComponentRegistry::new();
        registry.register(component("ingest", "img:1")).unwrap();

        let result = registry.register(component("ingest", "img:2"));
        assert!(matches!(
            result,
            Err(PipewrightError::DuplicateComponent { ref name }) if name == "ingest"
        ));
        // The original definition is untouched
        assert_eq!(registry.get("ingest").unwrap().image.as_deref(), Some("img:1"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut registry = ComponentRegistry::new();
        let result = registry.register(component(" ", "img:1"));
        assert!(matches!(
            result,
            Err(PipewrightError::MissingField { ref field, .. }) if field == "name"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_packages_are_part_of_identity() {
        let mut registry = ComponentRegistry::new();
        registry.register(component("upload", "img:1")).unwrap();

        let with_packages = component("upload", "img:1").with_packages(["boto3"]);
        assert!(registry.register(with_packages).is_err());
    }
}
