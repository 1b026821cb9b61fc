//! PathMill Core Library
//!
//! Tool collection management for PathMill: tool records, pluggable shape
//! schemas, and the synchronizer that keeps the selected tool and the shape
//! parameter editor consistent.

pub mod collection;
pub mod config;
pub mod events;
pub mod filters;
pub mod params;
pub mod shapes;
pub mod sync;
pub mod tool;

pub use collection::{ToolCollection, ToolError, ToolRow};
pub use config::{ConfigError, ToolsConfig};
pub use events::{EventBus, HandlerId, ToolEvent};
pub use filters::{ToolpathFilter, toolpath_filters};
pub use params::{ParamKind, ParamMap, ParamValue};
pub use shapes::{ParamField, ParamSection, ParameterGroup, ShapeRegistry, ShapeSchema};
pub use sync::{EditorState, ParameterSynchronizer, ShapeChoice};
pub use tool::{Tool, ToolId};
