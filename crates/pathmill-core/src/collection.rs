//! Ordered tool collection with a single selection.

use crate::events::ToolEvent;
use crate::params::ParamValue;
use crate::shapes::ShapeRegistry;
use crate::tool::{Tool, ToolId};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised by tool edits and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("No tool at position {0}")]
    NoSuchTool(usize),
    #[error("Invalid tool id: {0:?}")]
    InvalidToolId(String),
    #[error("Tool id {0} is already in use")]
    DuplicateToolId(ToolId),
    #[error("Unknown tool id: {0}")]
    UnknownToolId(ToolId),
}

/// Summary of one tool for the list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRow {
    pub tool_id: ToolId,
    pub name: String,
    /// Shape label, or the raw shape name if the schema is unknown.
    pub shape: String,
    /// Diameter with unit, e.g. `2mm`. Empty if the shape has no radius.
    pub size: String,
}

/// The tools of a project in user-defined order.
///
/// Operations record the events they raise; the owner drains them with
/// [`ToolCollection::drain_events`] and forwards them to the view.
#[derive(Debug, Clone)]
pub struct ToolCollection {
    tools: Vec<Tool>,
    /// Index of the selected tool. Always valid when set.
    selected: Option<usize>,
    /// Events raised since the last drain.
    pending: Vec<ToolEvent>,
    /// Reject manual tool id edits that collide with another tool.
    enforce_unique_ids: bool,
}

impl Default for ToolCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            selected: None,
            pending: Vec::new(),
            enforce_unique_ids: true,
        }
    }

    /// Choose whether manual id edits must keep ids unique.
    pub fn set_enforce_unique_ids(&mut self, enforce: bool) {
        self.enforce_unique_ids = enforce;
    }

    fn raise(&mut self, event: ToolEvent) {
        if !self.pending.contains(&event) {
            self.pending.push(event);
        }
    }

    /// Take the events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<ToolEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tools in order.
    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    /// Get a tool by position.
    pub fn get(&self, index: usize) -> Option<&Tool> {
        self.tools.get(index)
    }

    /// Position of the selected tool.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The selected tool.
    pub fn selected(&self) -> Option<&Tool> {
        self.selected.and_then(|i| self.tools.get(i))
    }

    /// The selected tool, mutably.
    pub fn selected_mut(&mut self) -> Option<&mut Tool> {
        self.selected.and_then(|i| self.tools.get_mut(i))
    }

    /// Smallest positive id not used by any tool.
    pub fn next_tool_id(&self) -> ToolId {
        let used: HashSet<ToolId> = self.tools.iter().map(|t| t.tool_id).collect();
        let mut tool_id = 1;
        while used.contains(&tool_id) {
            tool_id += 1;
        }
        tool_id
    }

    /// Create a tool with the next free id and select it.
    ///
    /// Falls back to the first available schema if `default_shape` is not
    /// registered. Returns `None` if the registry has no schema at all.
    pub fn create_tool(&mut self, registry: &dyn ShapeRegistry, default_shape: &str) -> Option<&Tool> {
        let schema = match registry.get_schema(default_shape) {
            Some(schema) => schema,
            None => {
                let fallback = registry.list_schemas().into_iter().next()?;
                log::warn!(
                    "Default shape '{}' is not available, using '{}'",
                    default_shape,
                    fallback.name
                );
                fallback
            }
        };

        let tool_id = self.next_tool_id();
        let tool = Tool::new(tool_id, &schema.name)
            .with_name(&format!("Tool #{}", tool_id))
            .with_shape_values(schema.default_values());
        log::info!("Created tool #{} ({})", tool_id, schema.name);

        self.tools.push(tool);
        self.raise(ToolEvent::ListChanged);
        let index = self.tools.len() - 1;
        self.select_by_index(index);
        self.tools.last()
    }

    /// Append an existing tool without changing the selection.
    pub fn add(&mut self, tool: Tool) {
        self.tools.push(tool);
        self.raise(ToolEvent::ListChanged);
    }

    /// Set or clear the selection.
    ///
    /// An out-of-range index is ignored. Returns whether the selection changed.
    pub fn select(&mut self, index: Option<usize>) -> bool {
        if let Some(i) = index {
            if i >= self.tools.len() {
                log::debug!("Ignoring selection of missing tool {}", i);
                return false;
            }
        }
        if self.selected == index {
            return false;
        }
        self.selected = index;
        self.raise(ToolEvent::SelectionChanged);
        true
    }

    /// Select the tool at `index`.
    pub fn select_by_index(&mut self, index: usize) -> bool {
        self.select(Some(index))
    }

    /// Read a value of the tool at `index` from its full map.
    pub fn get_value(&self, index: usize, key: &str) -> Option<ParamValue> {
        self.tools.get(index)?.get_value(key)
    }

    /// Write a value of the tool at `index` into its full map.
    pub fn set_value(&mut self, index: usize, key: &str, value: ParamValue) -> bool {
        self.tools
            .get_mut(index)
            .map(|tool| tool.set_value(key, value))
            .unwrap_or(false)
    }

    /// Move a tool one position towards the front.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.tools.len() {
            return false;
        }
        self.swap(index - 1, index);
        true
    }

    /// Move a tool one position towards the back.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.tools.len() {
            return false;
        }
        self.swap(index, index + 1);
        true
    }

    /// Swap two adjacent tools; the selection stays on the same tool.
    fn swap(&mut self, a: usize, b: usize) {
        self.tools.swap(a, b);
        self.selected = match self.selected {
            Some(i) if i == a => Some(b),
            Some(i) if i == b => Some(a),
            other => other,
        };
        self.raise(ToolEvent::ListChanged);
    }

    /// Remove the tool at `index`.
    pub fn delete(&mut self, index: usize) -> Option<Tool> {
        if index >= self.tools.len() {
            return None;
        }
        let tool = self.tools.remove(index);
        match self.selected {
            Some(i) if i == index => {
                self.selected = None;
                self.raise(ToolEvent::SelectionChanged);
            }
            Some(i) if i > index => self.selected = Some(i - 1),
            _ => {}
        }
        self.raise(ToolEvent::ListChanged);
        Some(tool)
    }

    /// Remove every tool whose shape is not in `valid`.
    ///
    /// Survivors keep their order and values. Returns the removed tools in
    /// collection order.
    pub fn prune_shapes(&mut self, valid: &HashSet<&str>) -> Vec<Tool> {
        let removal: Vec<usize> = self
            .tools
            .iter()
            .enumerate()
            .filter(|(_, tool)| !valid.contains(tool.shape.as_str()))
            .map(|(index, _)| index)
            .collect();

        // Back to front so earlier removals don't shift later indices.
        let mut removed = Vec::with_capacity(removal.len());
        for &index in removal.iter().rev() {
            if let Some(tool) = self.delete(index) {
                log::info!("Removing tool #{}: shape '{}' is gone", tool.tool_id, tool.shape);
                removed.push(tool);
            }
        }
        removed.reverse();
        removed
    }

    /// Evict tools whose shape is no longer registered.
    pub fn reconcile_with_registry(&mut self, registry: &dyn ShapeRegistry) -> Vec<Tool> {
        let schemas = registry.list_schemas();
        let valid: HashSet<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
        self.prune_shapes(&valid)
    }

    /// Rename a tool from the list view.
    ///
    /// Blank or unchanged names are ignored. Returns whether the name changed.
    pub fn edit_name(&mut self, index: usize, text: &str) -> bool {
        let Some(tool) = self.tools.get_mut(index) else {
            return false;
        };
        if text.trim().is_empty() || text == tool.name() {
            return false;
        }
        tool.set_name(text);
        self.raise(ToolEvent::ListChanged);
        true
    }

    /// Change a tool id from the list view.
    ///
    /// Returns `Ok(false)` when the id is unchanged.
    pub fn edit_tool_id(&mut self, index: usize, text: &str) -> Result<bool, ToolError> {
        let new_id: ToolId = text
            .trim()
            .parse()
            .map_err(|_| ToolError::InvalidToolId(text.to_string()))?;
        let current = self.tools.get(index).ok_or(ToolError::NoSuchTool(index))?.tool_id;
        if new_id == current {
            return Ok(false);
        }
        if self.enforce_unique_ids && self.get_by_tool_id(new_id).is_some() {
            return Err(ToolError::DuplicateToolId(new_id));
        }
        self.tools[index].tool_id = new_id;
        self.raise(ToolEvent::ListChanged);
        Ok(true)
    }

    /// Find a tool by id, independent of its position.
    ///
    /// With duplicate ids the first tool in order wins.
    pub fn get_by_tool_id(&self, tool_id: ToolId) -> Option<&Tool> {
        self.tools.iter().find(|t| t.tool_id == tool_id)
    }

    /// Position of the first tool with this id.
    pub fn position_of(&self, tool_id: ToolId) -> Option<usize> {
        self.tools.iter().position(|t| t.tool_id == tool_id)
    }

    /// Rows for the list view.
    pub fn rows(&self, registry: &dyn ShapeRegistry, unit: &str) -> Vec<ToolRow> {
        self.tools
            .iter()
            .map(|tool| ToolRow {
                tool_id: tool.tool_id,
                name: tool.name().to_string(),
                shape: registry
                    .get_schema(&tool.shape)
                    .map(|s| s.label.clone())
                    .unwrap_or_else(|| tool.shape.clone()),
                size: tool
                    .diameter()
                    .map(|d| format!("{}{}", d, unit))
                    .unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamKind;
    use crate::shapes::{ParamField, ParameterGroup, ShapeSchema, flat_bottom};

    fn registry() -> ParameterGroup {
        ParameterGroup::with_schemas([flat_bottom()])
    }

    fn collection_with(shapes: &[&str]) -> ToolCollection {
        let mut tools = ToolCollection::new();
        for (i, shape) in shapes.iter().enumerate() {
            tools.add(Tool::new(i as ToolId + 1, shape));
        }
        tools.drain_events();
        tools
    }

    fn ids(tools: &ToolCollection) -> Vec<ToolId> {
        tools.iter().map(|t| t.tool_id).collect()
    }

    #[test]
    fn test_create_tool() {
        let registry = registry();
        let mut tools = ToolCollection::new();
        let tool = tools.create_tool(&registry, "flat_bottom").unwrap();

        assert_eq!(tool.tool_id, 1);
        assert_eq!(tool.name(), "Tool #1");
        assert_eq!(tool.shape, "flat_bottom");
        assert_eq!(tool.get_value("radius"), Some(ParamValue::Float(1.0)));
        assert_eq!(tools.selected_index(), Some(0));
        assert_eq!(
            tools.drain_events(),
            vec![ToolEvent::ListChanged, ToolEvent::SelectionChanged]
        );
    }

    #[test]
    fn test_create_tool_without_schemas() {
        let registry = ParameterGroup::new();
        let mut tools = ToolCollection::new();
        assert!(tools.create_tool(&registry, "flat_bottom").is_none());
        assert!(tools.is_empty());
        assert!(tools.drain_events().is_empty());
    }

    #[test]
    fn test_create_tool_falls_back_to_first_schema() {
        let registry = ParameterGroup::with_schemas([
            ShapeSchema::new("ball_nose", "Ball nose", 20),
            ShapeSchema::new("drill", "Drill", 5)
                .with_field(ParamField::new("radius", "Radius", ParamKind::Float, 0.5)),
        ]);
        let mut tools = ToolCollection::new();
        let tool = tools.create_tool(&registry, "flat_bottom").unwrap();
        assert_eq!(tool.shape, "drill");
    }

    #[test]
    fn test_tool_ids_fill_gaps() {
        let registry = registry();
        let mut tools = ToolCollection::new();
        for _ in 0..4 {
            tools.create_tool(&registry, "flat_bottom");
        }
        assert_eq!(ids(&tools), vec![1, 2, 3, 4]);

        tools.delete(1);
        tools.delete(0);
        assert_eq!(tools.next_tool_id(), 1);
        tools.create_tool(&registry, "flat_bottom");
        tools.create_tool(&registry, "flat_bottom");
        tools.create_tool(&registry, "flat_bottom");
        assert_eq!(ids(&tools), vec![3, 4, 1, 2, 5]);
    }

    #[test]
    fn test_next_tool_id_after_manual_edit() {
        let mut tools = collection_with(&["a", "a"]);
        tools.edit_tool_id(0, "5").unwrap();
        // ids are now [5, 2]
        assert_eq!(tools.next_tool_id(), 1);
        tools.add(Tool::new(1, "a"));
        assert_eq!(tools.next_tool_id(), 3);
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut tools = collection_with(&["a", "b"]);
        assert!(tools.select_by_index(1));
        assert!(!tools.select_by_index(5));
        assert_eq!(tools.selected_index(), Some(1));
        assert!(!tools.select_by_index(1));
        assert_eq!(tools.drain_events(), vec![ToolEvent::SelectionChanged]);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut tools = collection_with(&["a", "b", "c"]);
        tools.select_by_index(1);
        tools.drain_events();

        let removed = tools.delete(1).unwrap();
        assert_eq!(removed.tool_id, 2);
        assert_eq!(tools.selected_index(), None);
        assert_eq!(
            tools.drain_events(),
            vec![ToolEvent::SelectionChanged, ToolEvent::ListChanged]
        );
    }

    #[test]
    fn test_delete_before_selection_shifts_index() {
        let mut tools = collection_with(&["a", "b", "c"]);
        tools.select_by_index(2);
        tools.delete(0);
        assert_eq!(tools.selected_index(), Some(1));
        assert_eq!(tools.selected().unwrap().tool_id, 3);
    }

    #[test]
    fn test_delete_after_selection_keeps_index() {
        let mut tools = collection_with(&["a", "b", "c"]);
        tools.select_by_index(1);
        tools.delete(2);
        assert_eq!(tools.selected_index(), Some(1));
        assert!(tools.delete(7).is_none());
    }

    #[test]
    fn test_move_keeps_selected_tool() {
        let mut tools = collection_with(&["a", "b", "c"]);
        tools.select_by_index(1);

        assert!(tools.move_up(1));
        assert_eq!(ids(&tools), vec![2, 1, 3]);
        assert_eq!(tools.selected().unwrap().tool_id, 2);

        assert!(tools.move_down(1));
        assert_eq!(ids(&tools), vec![2, 3, 1]);
        assert_eq!(tools.selected().unwrap().tool_id, 2);

        assert!(!tools.move_up(0));
        assert!(!tools.move_down(2));
    }

    #[test]
    fn test_prune_shapes() {
        let mut tools = collection_with(&["A", "B", "A", "C"]);
        let valid: HashSet<&str> = ["A", "C"].into_iter().collect();

        let removed = tools.prune_shapes(&valid);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].shape, "B");
        let shapes: Vec<_> = tools.iter().map(|t| t.shape.as_str()).collect();
        assert_eq!(shapes, vec!["A", "A", "C"]);
        assert_eq!(ids(&tools), vec![1, 3, 4]);
    }

    #[test]
    fn test_prune_keeps_selection_on_survivor() {
        let mut tools = collection_with(&["B", "A", "B", "A"]);
        tools.select_by_index(3);
        let valid: HashSet<&str> = ["A"].into_iter().collect();
        tools.prune_shapes(&valid);
        assert_eq!(tools.selected().unwrap().tool_id, 4);
        assert_eq!(tools.selected_index(), Some(1));
    }

    #[test]
    fn test_prune_selected_tool_clears_selection() {
        let mut tools = collection_with(&["A", "B"]);
        tools.select_by_index(1);
        let valid: HashSet<&str> = ["A"].into_iter().collect();
        tools.prune_shapes(&valid);
        assert_eq!(tools.selected_index(), None);
    }

    #[test]
    fn test_reconcile_with_registry() {
        let mut registry = registry();
        let mut tools = ToolCollection::new();
        tools.create_tool(&registry, "flat_bottom");
        assert!(tools.reconcile_with_registry(&registry).is_empty());

        registry.unregister("flat_bottom");
        let removed = tools.reconcile_with_registry(&registry);
        assert_eq!(removed.len(), 1);
        assert!(tools.is_empty());
    }

    #[test]
    fn test_edit_name() {
        let mut tools = collection_with(&["a"]);
        tools.set_value(0, "radius", ParamValue::Float(1.0));
        tools.edit_name(0, "Roughing");
        tools.drain_events();

        assert!(!tools.edit_name(0, ""));
        assert!(!tools.edit_name(0, "   "));
        assert!(!tools.edit_name(0, "Roughing"));
        assert!(tools.drain_events().is_empty());

        assert!(tools.edit_name(0, "Finishing"));
        assert_eq!(tools.get(0).unwrap().name(), "Finishing");
        assert_eq!(tools.drain_events(), vec![ToolEvent::ListChanged]);
    }

    #[test]
    fn test_edit_tool_id() {
        let mut tools = collection_with(&["a", "a"]);
        assert_eq!(
            tools.edit_tool_id(0, "abc"),
            Err(ToolError::InvalidToolId("abc".to_string()))
        );
        assert_eq!(tools.edit_tool_id(0, "1"), Ok(false));
        assert_eq!(tools.edit_tool_id(0, " 9 "), Ok(true));
        assert_eq!(tools.get(0).unwrap().tool_id, 9);
        assert_eq!(tools.edit_tool_id(5, "3"), Err(ToolError::NoSuchTool(5)));
    }

    #[test]
    fn test_duplicate_tool_id() {
        let mut tools = collection_with(&["a", "a"]);
        assert_eq!(tools.edit_tool_id(1, "1"), Err(ToolError::DuplicateToolId(1)));
        assert_eq!(tools.get(1).unwrap().tool_id, 2);

        tools.set_enforce_unique_ids(false);
        assert_eq!(tools.edit_tool_id(1, "1"), Ok(true));
        assert_eq!(ids(&tools), vec![1, 1]);
        assert_eq!(tools.position_of(1), Some(0));
    }

    #[test]
    fn test_get_by_tool_id_ignores_order() {
        let mut tools = collection_with(&["a", "b", "c"]);
        tools.move_down(0);
        tools.move_down(1);
        let tool = tools.get_by_tool_id(1).unwrap();
        assert_eq!(tool.shape, "a");
        assert!(tools.get_by_tool_id(42).is_none());
    }

    #[test]
    fn test_rows() {
        let registry = registry();
        let mut tools = ToolCollection::new();
        tools.create_tool(&registry, "flat_bottom");
        tools.add(Tool::new(7, "gone").with_name("Orphan"));

        let rows = tools.rows(&registry, "mm");
        assert_eq!(rows[0].tool_id, 1);
        assert_eq!(rows[0].name, "Tool #1");
        assert_eq!(rows[0].shape, "Flat bottom");
        assert_eq!(rows[0].size, "2mm");
        assert_eq!(rows[1].shape, "gone");
        assert_eq!(rows[1].size, "");
    }
}
