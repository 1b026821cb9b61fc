//! In-memory shape registry.

use super::{ShapeRegistry, ShapeSchema, sort_schemas};
use crate::params::ParamMap;
use std::collections::HashMap;

/// The "tool" parameter group: every registered shape schema together with
/// the values its editor currently shows.
#[derive(Debug, Clone, Default)]
pub struct ParameterGroup {
    /// Registered schemas, keyed by name.
    schemas: HashMap<String, ShapeSchema>,
    /// Transient edit state for each schema.
    values: HashMap<String, ParamMap>,
    /// Bumped on every register/unregister.
    generation: u64,
}

impl ParameterGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group holding the given schemas.
    pub fn with_schemas(schemas: impl IntoIterator<Item = ShapeSchema>) -> Self {
        let mut group = Self::new();
        for schema in schemas {
            group.register(schema);
        }
        group
    }

    /// Register a schema, replacing any schema of the same name.
    ///
    /// The editor values start out as the schema defaults.
    pub fn register(&mut self, schema: ShapeSchema) {
        log::debug!("Registering shape '{}'", schema.name);
        self.values.insert(schema.name.clone(), schema.default_values());
        self.schemas.insert(schema.name.clone(), schema);
        self.generation += 1;
    }

    /// Remove a schema and its editor values.
    pub fn unregister(&mut self, name: &str) -> Option<ShapeSchema> {
        let removed = self.schemas.remove(name)?;
        log::debug!("Unregistering shape '{}'", name);
        self.values.remove(name);
        self.generation += 1;
        Some(removed)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl ShapeRegistry for ParameterGroup {
    fn list_schemas(&self) -> Vec<&ShapeSchema> {
        let mut schemas: Vec<&ShapeSchema> = self.schemas.values().collect();
        sort_schemas(&mut schemas);
        schemas
    }

    fn get_schema(&self, name: &str) -> Option<&ShapeSchema> {
        self.schemas.get(name)
    }

    fn current_default_values(&self, schema_name: &str) -> Option<&ParamMap> {
        self.values.get(schema_name)
    }

    fn set_default_values(&mut self, schema_name: &str, values: &ParamMap) -> bool {
        let Some(schema) = self.schemas.get(schema_name) else {
            return false;
        };
        let filtered = schema.filter_values(values);
        let current = self.values.entry(schema_name.to_string()).or_default();
        current.extend(filtered);
        true
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
