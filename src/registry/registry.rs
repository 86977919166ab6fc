//! # Template Registry
//!
//! Templates live in an immutable `RegistrySnapshot`. Registration and reload
//! build a new snapshot and swap it in under a short write lock; readers
//! clone the current `Arc` and never see a half-built registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::errors::{RegistryError, RegistryResult};
use super::template::QueryTemplate;
use crate::observability::Logger;

/// Immutable set of templates keyed by exact name
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    templates: HashMap<String, Arc<QueryTemplate>>,
}

impl RegistrySnapshot {
    /// Builds a snapshot, rejecting duplicate names
    pub fn from_templates(
        templates: impl IntoIterator<Item = QueryTemplate>,
    ) -> RegistryResult<Self> {
        let mut snapshot = Self::default();
        for template in templates {
            snapshot.insert(template)?;
        }
        Ok(snapshot)
    }

    fn insert(&mut self, template: QueryTemplate) -> RegistryResult<()> {
        if self.templates.contains_key(template.name()) {
            return Err(RegistryError::DuplicateTemplate(template.name().to_string()));
        }
        self.templates
            .insert(template.name().to_string(), Arc::new(template));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<QueryTemplate>> {
        self.templates.get(name).cloned()
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Process-wide registry of stored queries
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry serving the given snapshot
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Register a template
    pub fn register(&self, template: QueryTemplate) -> RegistryResult<()> {
        let mut current = self
            .current
            .write()
            .map_err(|_| RegistryError::Internal("Lock poisoned".into()))?;

        let name = template.name().to_string();
        let mut next = RegistrySnapshot::clone(&current);
        next.insert(template)?;
        *current = Arc::new(next);

        Logger::info("TEMPLATE_REGISTERED", &[("template", &name)]);
        Ok(())
    }

    /// Resolve a template by exact, case-sensitive name
    pub fn resolve(&self, name: &str) -> RegistryResult<Arc<QueryTemplate>> {
        self.snapshot()?
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Replace every template at once
    pub fn reload(&self, snapshot: RegistrySnapshot) -> RegistryResult<()> {
        let count = snapshot.len().to_string();
        let mut current = self
            .current
            .write()
            .map_err(|_| RegistryError::Internal("Lock poisoned".into()))?;
        *current = Arc::new(snapshot);

        Logger::info("REGISTRY_RELOADED", &[("templates", &count)]);
        Ok(())
    }

    /// Current snapshot
    pub fn snapshot(&self) -> RegistryResult<Arc<RegistrySnapshot>> {
        self.current
            .read()
            .map(|current| Arc::clone(&current))
            .map_err(|_| RegistryError::Internal("Lock poisoned".into()))
    }

    /// List template names
    pub fn names(&self) -> Vec<String> {
        self.snapshot().map(|s| s.names()).unwrap_or_default()
    }

    /// Get template count
    pub fn len(&self) -> usize {
        self.snapshot().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
