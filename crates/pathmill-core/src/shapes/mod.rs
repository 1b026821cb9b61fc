//! Shape schemas describing the geometry parameters of a tool.
//!
//! Schemas come from plugins that can appear and disappear at runtime.
//! The core only reads them through [`ShapeRegistry`].

mod builtin;
mod group;

pub use builtin::{ball_nose, builtin_schemas, flat_bottom, toroidal};
pub use group::ParameterGroup;

use crate::params::{ParamKind, ParamMap, ParamValue};
use serde::{Deserialize, Serialize};

/// Editor section a parameter is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParamSection {
    #[default]
    Size,
    Speed,
}

impl ParamSection {
    /// Display label of the section.
    pub fn label(&self) -> &'static str {
        match self {
            ParamSection::Size => "Size",
            ParamSection::Speed => "Speed",
        }
    }
}

/// A typed parameter declared by a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamField {
    /// Key under which the value is stored.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Declared type.
    pub kind: ParamKind,
    /// Value used for new tools and freshly registered schemas.
    pub default: ParamValue,
    /// Editor section.
    #[serde(default)]
    pub section: ParamSection,
}

impl ParamField {
    /// Create a field; the default is coerced to `kind` when possible.
    pub fn new(key: &str, label: &str, kind: ParamKind, default: impl Into<ParamValue>) -> Self {
        let default = default.into();
        let default = kind.coerce(&default).unwrap_or(default);
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            default,
            section: ParamSection::Size,
        }
    }

    /// Builder: place the field in a section.
    pub fn in_section(mut self, section: ParamSection) -> Self {
        self.section = section;
        self
    }
}

/// A pluggable tool shape and the parameters it contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSchema {
    /// Stable key, stored in [`crate::tool::Tool::shape`].
    pub name: String,
    /// Display label.
    pub label: String,
    /// Sort order, ascending.
    pub weight: i32,
    /// Parameters in declaration order.
    pub fields: Vec<ParamField>,
}

impl ShapeSchema {
    /// Create a schema without parameters.
    pub fn new(name: &str, label: &str, weight: i32) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            weight,
            fields: Vec::new(),
        }
    }

    /// Builder: add a parameter.
    pub fn with_field(mut self, field: ParamField) -> Self {
        self.fields.retain(|f| f.key != field.key);
        self.fields.push(field);
        self
    }

    /// Look up a parameter declaration.
    pub fn field(&self, key: &str) -> Option<&ParamField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields shown in the given editor section.
    pub fn section_fields(&self, section: ParamSection) -> impl Iterator<Item = &ParamField> {
        self.fields.iter().filter(move |f| f.section == section)
    }

    /// Default values for every declared parameter.
    pub fn default_values(&self) -> ParamMap {
        self.fields
            .iter()
            .map(|f| (f.key.clone(), f.default.clone()))
            .collect()
    }

    /// Keep the keys this schema declares, coerced to their kinds.
    ///
    /// Values that fail coercion are dropped.
    pub fn filter_values(&self, values: &ParamMap) -> ParamMap {
        let mut out = ParamMap::new();
        for (key, value) in values {
            let Some(field) = self.field(key) else { continue };
            match field.kind.coerce(value) {
                Some(v) => {
                    out.insert(key.clone(), v);
                }
                None => log::warn!(
                    "Dropping value {:?} for '{}.{}': expected {:?}",
                    value,
                    self.name,
                    key,
                    field.kind
                ),
            }
        }
        out
    }
}

/// Read access to the currently available shape schemas, plus their
/// transient edit state.
///
/// Lookups of unknown names return `None`; callers treat that as an
/// invalid selection rather than an error.
pub trait ShapeRegistry {
    /// All schemas, ascending by weight, ties broken by name.
    fn list_schemas(&self) -> Vec<&ShapeSchema>;

    /// Look up a schema by name.
    fn get_schema(&self, name: &str) -> Option<&ShapeSchema>;

    /// The values currently shown in the editor for a schema.
    fn current_default_values(&self, schema_name: &str) -> Option<&ParamMap>;

    /// Overwrite the editor values of a schema.
    ///
    /// Only keys the schema declares are taken; missing keys keep their
    /// current value. Returns false for an unknown schema.
    fn set_default_values(&mut self, schema_name: &str, values: &ParamMap) -> bool;

    /// Counter that moves whenever the set of schemas changes.
    fn generation(&self) -> u64;

    /// Whether a schema with this name is available.
    fn contains(&self, name: &str) -> bool {
        self.get_schema(name).is_some()
    }
}

/// Sort schemas by weight, then name.
pub(crate) fn sort_schemas(schemas: &mut [&ShapeSchema]) {
    schemas.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ShapeSchema {
        ShapeSchema::new("flat_bottom", "Flat bottom", 10)
            .with_field(ParamField::new("radius", "Radius", ParamKind::Float, 1.0))
            .with_field(
                ParamField::new("feed", "Feed", ParamKind::Int, 300).in_section(ParamSection::Speed),
            )
    }

    #[test]
    fn test_default_values() {
        let defaults = schema().default_values();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults["radius"], ParamValue::Float(1.0));
        assert_eq!(defaults["feed"], ParamValue::Int(300));
    }

    #[test]
    fn test_field_default_is_coerced() {
        let field = ParamField::new("radius", "Radius", ParamKind::Float, 2_i64);
        assert_eq!(field.default, ParamValue::Float(2.0));
    }

    #[test]
    fn test_section_fields() {
        let s = schema();
        let speed: Vec<_> = s.section_fields(ParamSection::Speed).map(|f| f.key.as_str()).collect();
        assert_eq!(speed, vec!["feed"]);
    }

    #[test]
    fn test_filter_values_drops_unknown_and_mistyped() {
        let mut values = ParamMap::new();
        values.insert("radius".into(), ParamValue::Int(3));
        values.insert("feed".into(), ParamValue::Text("fast".into()));
        values.insert("name".into(), ParamValue::Text("Tool #1".into()));

        let filtered = schema().filter_values(&values);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered["radius"], ParamValue::Float(3.0));
    }

    #[test]
    fn test_with_field_replaces_same_key() {
        let s = schema().with_field(ParamField::new("radius", "Radius", ParamKind::Float, 5.0));
        assert_eq!(s.fields.len(), 2);
        assert_eq!(s.field("radius").unwrap().default, ParamValue::Float(5.0));
    }
}
