//! Tool records.

use crate::params::{ParamMap, ParamValue};
use serde::{Deserialize, Serialize};

/// User-visible tool number.
pub type ToolId = u32;

/// Key of the display name in the application namespace.
pub const NAME_KEY: &str = "name";
/// Key of the tool number in the full value map.
pub const TOOL_ID_KEY: &str = "tool_id";
/// Key of the shape name in the full value map.
pub const SHAPE_KEY: &str = "shape";

/// A configurable cutting tool.
///
/// Values live in two namespaces. Application values (such as the name)
/// survive shape changes; shape values belong to the current shape schema
/// and are replaced wholesale when the editor state is stored back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool number, conventionally unique.
    pub tool_id: ToolId,
    /// Name of the shape schema.
    pub shape: String,
    /// Application-level values.
    #[serde(default)]
    application: ParamMap,
    /// Schema-dependent values.
    #[serde(default)]
    shape_values: ParamMap,
}

impl Tool {
    /// Create a tool with the given shape and no values.
    pub fn new(tool_id: ToolId, shape: &str) -> Self {
        Self {
            tool_id,
            shape: shape.to_string(),
            application: ParamMap::new(),
            shape_values: ParamMap::new(),
        }
    }

    /// Builder: set the display name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.set_name(name);
        self
    }

    /// Builder: set the shape values.
    pub fn with_shape_values(mut self, values: ParamMap) -> Self {
        self.shape_values = values;
        self
    }

    /// Display name, empty if unset.
    pub fn name(&self) -> &str {
        self.application
            .get(NAME_KEY)
            .and_then(ParamValue::as_str)
            .unwrap_or("")
    }

    /// Set the display name.
    pub fn set_name(&mut self, name: &str) {
        self.application.insert(NAME_KEY.to_string(), ParamValue::from(name));
    }

    /// Read a value from the full map: `tool_id`, `shape` or a shape parameter.
    pub fn get_value(&self, key: &str) -> Option<ParamValue> {
        match key {
            TOOL_ID_KEY => Some(ParamValue::Int(self.tool_id.into())),
            SHAPE_KEY => Some(ParamValue::Text(self.shape.clone())),
            _ => self.shape_values.get(key).cloned(),
        }
    }

    /// Write a value into the full map.
    ///
    /// `tool_id` takes non-negative integers and `shape` takes text; writes
    /// of any other type to those keys are ignored. Returns whether the
    /// value was stored.
    pub fn set_value(&mut self, key: &str, value: ParamValue) -> bool {
        match key {
            TOOL_ID_KEY => match value.as_i64().and_then(|v| ToolId::try_from(v).ok()) {
                Some(id) => {
                    self.tool_id = id;
                    true
                }
                None => false,
            },
            SHAPE_KEY => match value {
                ParamValue::Text(shape) => {
                    self.shape = shape;
                    true
                }
                _ => false,
            },
            _ => {
                self.shape_values.insert(key.to_string(), value);
                true
            }
        }
    }

    /// Read an application value.
    pub fn get_application_value(&self, key: &str) -> Option<&ParamValue> {
        self.application.get(key)
    }

    /// Write an application value.
    pub fn set_application_value(&mut self, key: &str, value: ParamValue) {
        self.application.insert(key.to_string(), value);
    }

    /// Application values.
    pub fn application_values(&self) -> &ParamMap {
        &self.application
    }

    /// Shape values.
    pub fn shape_values(&self) -> &ParamMap {
        &self.shape_values
    }

    /// Replace all shape values.
    pub fn replace_shape_values(&mut self, values: ParamMap) {
        self.shape_values = values;
    }

    /// Full value map: shape values plus `tool_id` and `shape`.
    ///
    /// This is what gets pushed into a shape editor.
    pub fn get_dict(&self) -> ParamMap {
        let mut dict = self.shape_values.clone();
        dict.insert(TOOL_ID_KEY.to_string(), ParamValue::Int(self.tool_id.into()));
        dict.insert(SHAPE_KEY.to_string(), ParamValue::Text(self.shape.clone()));
        dict
    }

    /// Cutting diameter, if the shape defines a radius.
    pub fn diameter(&self) -> Option<f64> {
        self.shape_values
            .get("radius")
            .and_then(ParamValue::as_f64)
            .map(|r| 2.0 * r)
    }
}
