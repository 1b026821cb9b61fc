//! Keeps the selected tool, the active shape and the shape editor in step.
//!
//! Two directions of data flow exist:
//! - push: a newly selected tool's stored values are written into its
//!   shape's editor state;
//! - pull: user edits in the shape editor are written back into the
//!   selected tool.
//!
//! Both are plain method calls. Events on the [`EventBus`] only notify the
//! view afterwards, so a push can never trigger a pull or the other way round.

use crate::collection::{ToolCollection, ToolError};
use crate::config::ToolsConfig;
use crate::events::{EventBus, ToolEvent};
use crate::filters::{ToolpathFilter, toolpath_filters};
use crate::params::{ParamMap, ParamValue};
use crate::shapes::ShapeRegistry;
use crate::tool::{Tool, ToolId};

/// Visibility of the shape parameter editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// Nothing to edit: no tool selected or no usable shape.
    #[default]
    Hidden,
    /// The editor shows the selected tool.
    Active,
}

/// One entry of the shape selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeChoice {
    pub label: String,
    pub name: String,
}

/// Mediator between the tool collection, the shape registry and the view.
#[derive(Debug)]
pub struct ParameterSynchronizer {
    tools: ToolCollection,
    bus: EventBus,
    config: ToolsConfig,
    /// Shape picked in the selector.
    active_shape: Option<String>,
    editor: EditorState,
    /// Selector entries, ascending by weight.
    choices: Vec<ShapeChoice>,
    /// Registry generation the choices were built from.
    seen_generation: Option<u64>,
}

impl ParameterSynchronizer {
    /// Create a synchronizer with an empty collection.
    ///
    /// Call [`ParameterSynchronizer::refresh_registry`] once the registry is
    /// populated.
    pub fn new(config: ToolsConfig) -> Self {
        Self::with_tools(config, ToolCollection::new())
    }

    /// Create a synchronizer around an existing collection.
    pub fn with_tools(config: ToolsConfig, mut tools: ToolCollection) -> Self {
        tools.set_enforce_unique_ids(config.enforce_unique_ids);
        tools.drain_events();
        Self {
            tools,
            bus: EventBus::new(),
            config,
            active_shape: None,
            editor: EditorState::Hidden,
            choices: Vec::new(),
            seen_generation: None,
        }
    }

    /// The tool collection.
    pub fn tools(&self) -> &ToolCollection {
        &self.tools
    }

    /// The notification bus, for subscribing view handlers.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// The notification bus.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Active configuration.
    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Current editor visibility.
    pub fn editor(&self) -> EditorState {
        self.editor
    }

    /// Shape picked in the selector, if any.
    pub fn active_shape(&self) -> Option<&str> {
        self.active_shape.as_deref()
    }

    /// Values the editor currently shows.
    pub fn editor_values<'a>(&self, registry: &'a dyn ShapeRegistry) -> Option<&'a ParamMap> {
        registry.current_default_values(self.active_shape.as_deref()?)
    }

    /// Selector entries.
    pub fn shape_choices(&self) -> &[ShapeChoice] {
        &self.choices
    }

    /// New tools can only be created while a shape exists.
    pub fn can_create_tool(&self) -> bool {
        !self.choices.is_empty()
    }

    /// The selector is only worth showing with a real choice.
    pub fn shape_selector_visible(&self) -> bool {
        self.choices.len() >= 2
    }

    /// Resolve a tool by id for downstream consumers.
    pub fn resolve_tool(&self, tool_id: ToolId) -> Option<&Tool> {
        self.tools.get_by_tool_id(tool_id)
    }

    /// Toolpath filters for cutting with a tool.
    pub fn toolpath_filters(&self, tool_id: ToolId) -> Result<Vec<ToolpathFilter>, ToolError> {
        toolpath_filters(&self.tools, tool_id)
    }

    /// Create a tool with the configured default shape and select it.
    pub fn new_tool(&mut self, registry: &mut dyn ShapeRegistry) -> Option<ToolId> {
        let tool_id = self
            .tools
            .create_tool(&*registry, &self.config.default_shape)
            .map(|tool| tool.tool_id);
        if tool_id.is_none() {
            log::warn!("Cannot create a tool: no shape is available");
        }
        self.dispatch(registry);
        tool_id
    }

    /// Change the selection from the list view.
    pub fn select(&mut self, registry: &mut dyn ShapeRegistry, index: Option<usize>) -> bool {
        let changed = self.tools.select(index);
        self.dispatch(registry);
        changed
    }

    /// Move a tool up in the list.
    pub fn move_up(&mut self, registry: &mut dyn ShapeRegistry, index: usize) -> bool {
        let moved = self.tools.move_up(index);
        self.dispatch(registry);
        moved
    }

    /// Move a tool down in the list.
    pub fn move_down(&mut self, registry: &mut dyn ShapeRegistry, index: usize) -> bool {
        let moved = self.tools.move_down(index);
        self.dispatch(registry);
        moved
    }

    /// Delete a tool.
    pub fn delete(&mut self, registry: &mut dyn ShapeRegistry, index: usize) -> Option<Tool> {
        let removed = self.tools.delete(index);
        self.dispatch(registry);
        removed
    }

    /// Name cell edited in the list view.
    pub fn edit_name(&mut self, registry: &mut dyn ShapeRegistry, index: usize, text: &str) -> bool {
        let changed = self.tools.edit_name(index, text);
        self.dispatch(registry);
        changed
    }

    /// Id cell edited in the list view.
    pub fn edit_tool_id(
        &mut self,
        registry: &mut dyn ShapeRegistry,
        index: usize,
        text: &str,
    ) -> Result<bool, ToolError> {
        let result = self.tools.edit_tool_id(index, text);
        if let Err(e) = &result {
            log::warn!("Ignoring tool id edit: {}", e);
        }
        self.dispatch(registry);
        result
    }

    /// Run a batch of changes against the collection, then bring the editor
    /// and the view up to date.
    pub fn update_tools<T>(
        &mut self,
        registry: &mut dyn ShapeRegistry,
        f: impl FnOnce(&mut ToolCollection) -> T,
    ) -> T {
        let result = f(&mut self.tools);
        self.dispatch(registry);
        result
    }

    /// The user picked a shape in the selector.
    ///
    /// Unknown names are ignored.
    pub fn choose_shape(&mut self, registry: &mut dyn ShapeRegistry, name: &str) -> bool {
        if !registry.contains(name) {
            log::warn!("Ignoring unknown shape '{}'", name);
            return false;
        }
        self.active_shape = Some(name.to_string());
        self.bus.emit(ToolEvent::ShapeChanged);
        self.editor_changed(registry)
    }

    /// The user changed one editor value.
    ///
    /// The value is coerced to the parameter's kind; unknown keys and values
    /// of the wrong kind are ignored. Returns whether the selected tool was
    /// updated.
    pub fn edit_parameter(&mut self, registry: &mut dyn ShapeRegistry, key: &str, value: ParamValue) -> bool {
        let Some(shape) = self.active_shape.clone() else {
            log::debug!("No active shape, ignoring edit of '{}'", key);
            return false;
        };
        let Some(field) = registry.get_schema(&shape).and_then(|s| s.field(key)) else {
            log::warn!("Shape '{}' has no parameter '{}'", shape, key);
            return false;
        };
        let Some(value) = field.kind.coerce(&value) else {
            log::warn!("Rejecting {:?} for '{}': expected {:?}", value, key, field.kind);
            return false;
        };
        let mut values = ParamMap::new();
        values.insert(key.to_string(), value);
        registry.set_default_values(&shape, &values);
        self.editor_changed(registry)
    }

    /// Pull the editor state into the selected tool.
    ///
    /// The tool takes the active shape and a copy of the editor values,
    /// replacing whatever shape values it had. Returns false (and hides the
    /// editor) when there is no selected tool or no usable shape.
    pub fn editor_changed(&mut self, registry: &mut dyn ShapeRegistry) -> bool {
        let shape = self
            .active_shape
            .clone()
            .filter(|name| registry.contains(name));
        let values = shape
            .as_deref()
            .and_then(|name| registry.current_default_values(name))
            .cloned();

        match (self.tools.selected_mut(), shape, values) {
            (Some(tool), Some(shape), Some(values)) => {
                log::debug!("Storing editor values into tool #{}", tool.tool_id);
                tool.shape = shape;
                tool.replace_shape_values(values);
                self.editor = EditorState::Active;
                self.bus.emit(ToolEvent::ToolChanged);
                true
            }
            _ => {
                self.editor = EditorState::Hidden;
                false
            }
        }
    }

    /// React to a change of the registry's schema set, if it moved since
    /// the last call.
    pub fn refresh_registry(&mut self, registry: &mut dyn ShapeRegistry) -> bool {
        if self.seen_generation == Some(registry.generation()) {
            return false;
        }
        self.registry_changed(registry);
        true
    }

    /// Rebuild the selector, evict tools with vanished shapes and keep the
    /// active shape if it still exists.
    pub fn registry_changed(&mut self, registry: &mut dyn ShapeRegistry) {
        let previous = self.active_shape.take();
        self.choices = registry
            .list_schemas()
            .into_iter()
            .map(|s| ShapeChoice {
                label: s.label.clone(),
                name: s.name.clone(),
            })
            .collect();

        let evicted = self.tools.reconcile_with_registry(&*registry);
        if !evicted.is_empty() {
            log::info!("Evicted {} tool(s) with unavailable shapes", evicted.len());
        }

        self.active_shape = previous.filter(|name| registry.contains(name));
        // Re-registered schemas come back with default editor values.
        let reloaded = self.tools.selected().is_some() && self.load_selected_tool(registry);
        self.seen_generation = Some(registry.generation());
        self.bus.emit(ToolEvent::ShapeListChanged);
        self.dispatch(registry);
        if reloaded {
            self.bus.emit(ToolEvent::ShapeChanged);
        }
    }

    /// Forward collection events to the view, loading the editor whenever
    /// the selection moved.
    fn dispatch(&mut self, registry: &mut dyn ShapeRegistry) {
        for event in self.tools.drain_events() {
            if event == ToolEvent::SelectionChanged {
                let loaded = self.load_selected_tool(registry);
                self.bus.emit(event);
                if loaded {
                    // Let editor widgets repaint from the new values.
                    self.bus.emit(ToolEvent::ShapeChanged);
                }
            } else {
                self.bus.emit(event);
            }
        }
    }

    /// Push the selected tool into its shape's editor state.
    ///
    /// Parameters the tool lacks fall back to the schema defaults so the
    /// editor never shows values left over from another tool.
    fn load_selected_tool(&mut self, registry: &mut dyn ShapeRegistry) -> bool {
        let Some(tool) = self.tools.selected() else {
            log::debug!("No tool selected, hiding editor");
            self.editor = EditorState::Hidden;
            return false;
        };

        let Some(schema) = registry.get_schema(&tool.shape) else {
            log::debug!("Tool #{} has unknown shape '{}'", tool.tool_id, tool.shape);
            self.active_shape = None;
            self.editor = EditorState::Hidden;
            return false;
        };

        let mut values = schema.default_values();
        values.extend(tool.get_dict());
        let shape = schema.name.clone();
        registry.set_default_values(&shape, &values);
        self.active_shape = Some(shape);
        self.editor = EditorState::Active;
        true
    }
}
