//! Line-oriented front end for the tool subsystem.
//!
//! The shell plays the part of the view layer: it turns commands into
//! synchronizer calls and repaints the list or the editor when the
//! corresponding events fire.

use crate::commands::CommandRegistry;
use pathmill_core::shapes::{ParamSection, builtin_schemas};
use pathmill_core::{
    EditorState, ParamValue, ParameterGroup, ParameterSynchronizer, ShapeRegistry, ToolError,
    ToolEvent, ToolsConfig,
};
use std::cell::Cell;
use std::fmt::Write as _;
use std::rc::Rc;
use thiserror::Error;

/// Errors reported back to the user.
#[derive(Debug, Error, PartialEq)]
pub enum ShellError {
    #[error("Unknown command: {0} (try 'help')")]
    UnknownCommand(String),
    #[error("Usage: {0}")]
    Usage(String),
    #[error("No tool at position {0}")]
    NoSuchPosition(String),
    #[error("No built-in shape named '{0}'")]
    UnknownBuiltin(String),
    #[error("No shape named '{0}'")]
    UnknownShape(String),
    #[error("Cannot create a tool: no shape is loaded")]
    NoShapes,
    #[error("No tool selected")]
    NoSelection,
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Interactive tool shell.
pub struct Shell {
    registry: ParameterGroup,
    sync: ParameterSynchronizer,
    /// Set by list-related events.
    list_dirty: Rc<Cell<bool>>,
    /// Set by editor-related events.
    editor_dirty: Rc<Cell<bool>>,
}

impl Shell {
    /// Create a shell with every built-in shape loaded.
    pub fn new(config: ToolsConfig) -> Self {
        Self::with_registry(config, ParameterGroup::with_schemas(builtin_schemas()))
    }

    /// Create a shell around an existing registry.
    pub fn with_registry(config: ToolsConfig, mut registry: ParameterGroup) -> Self {
        let mut sync = ParameterSynchronizer::new(config);
        let list_dirty = Rc::new(Cell::new(false));
        let editor_dirty = Rc::new(Cell::new(false));

        for event in [ToolEvent::ListChanged, ToolEvent::SelectionChanged, ToolEvent::ToolChanged] {
            let flag = list_dirty.clone();
            sync.bus_mut().subscribe(event, move || flag.set(true));
        }
        for event in [ToolEvent::ShapeChanged, ToolEvent::ShapeListChanged] {
            let flag = editor_dirty.clone();
            sync.bus_mut().subscribe(event, move || flag.set(true));
        }

        sync.refresh_registry(&mut registry);
        list_dirty.set(false);
        editor_dirty.set(false);

        Self {
            registry,
            sync,
            list_dirty,
            editor_dirty,
        }
    }

    /// The synchronizer behind the shell.
    pub fn sync(&self) -> &ParameterSynchronizer {
        &self.sync
    }

    /// Execute one command line.
    pub fn execute(&mut self, line: &str) -> Result<Reply, ShellError> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let mut out = match command {
            "" => String::new(),
            "help" => CommandRegistry::help(),
            "quit" | "exit" => return Ok(Reply::Quit),
            "list" => {
                self.list_dirty.set(true);
                String::new()
            }
            "new" => {
                if !self.sync.can_create_tool() {
                    return Err(ShellError::NoShapes);
                }
                let tool_id = self.sync.new_tool(&mut self.registry).ok_or(ShellError::NoShapes)?;
                format!("Created tool #{}\n", tool_id)
            }
            "select" => {
                let index = if rest == "none" {
                    None
                } else {
                    Some(self.position(rest, "select <n>|none")?)
                };
                self.sync.select(&mut self.registry, index);
                String::new()
            }
            "up" => {
                let index = self.position(rest, "up <n>")?;
                self.sync.move_up(&mut self.registry, index);
                String::new()
            }
            "down" => {
                let index = self.position(rest, "down <n>")?;
                self.sync.move_down(&mut self.registry, index);
                String::new()
            }
            "delete" => {
                let index = self.position(rest, "delete <n>")?;
                match self.sync.delete(&mut self.registry, index) {
                    Some(tool) => format!("Deleted tool #{}\n", tool.tool_id),
                    None => String::new(),
                }
            }
            "name" => {
                let (position, text) = split_arg(rest).ok_or_else(|| usage("name <n> <text>"))?;
                let index = self.position(position, "name <n> <text>")?;
                self.sync.edit_name(&mut self.registry, index, text);
                String::new()
            }
            "id" => {
                let (position, text) = split_arg(rest).ok_or_else(|| usage("id <n> <number>"))?;
                let index = self.position(position, "id <n> <number>")?;
                self.sync.edit_tool_id(&mut self.registry, index, text)?;
                String::new()
            }
            "shapes" => self.render_shapes(),
            "shape" => {
                if rest.is_empty() {
                    return Err(usage("shape <name>"));
                }
                if self.sync.tools().selected().is_none() {
                    return Err(ShellError::NoSelection);
                }
                if !self.sync.choose_shape(&mut self.registry, rest) {
                    return Err(ShellError::UnknownShape(rest.to_string()));
                }
                String::new()
            }
            "set" => {
                let (key, text) = split_arg(rest).ok_or_else(|| usage("set <key> <value>"))?;
                self.set_parameter(key, text)?;
                String::new()
            }
            "show" => {
                self.editor_dirty.set(true);
                String::new()
            }
            "load" => {
                let schema = builtin_schemas()
                    .into_iter()
                    .find(|s| s.name == rest)
                    .ok_or_else(|| ShellError::UnknownBuiltin(rest.to_string()))?;
                self.registry.register(schema);
                self.sync.refresh_registry(&mut self.registry);
                format!("Loaded shape '{}'\n", rest)
            }
            "unload" => {
                self.registry
                    .unregister(rest)
                    .ok_or_else(|| ShellError::UnknownShape(rest.to_string()))?;
                self.sync.refresh_registry(&mut self.registry);
                format!("Unloaded shape '{}'\n", rest)
            }
            "filters" => {
                let tool_id = rest.parse().map_err(|_| usage("filters <tool id>"))?;
                let filters = self.sync.toolpath_filters(tool_id)?;
                let mut out = String::new();
                for filter in filters {
                    let _ = writeln!(out, "{:?}", filter);
                }
                out
            }
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };

        if self.list_dirty.replace(false) {
            out.push_str(&self.render_list());
        }
        if self.editor_dirty.replace(false) {
            out.push_str(&self.render_editor());
        }
        Ok(Reply::Output(out))
    }

    /// Parse a 1-based position into an index.
    fn position(&self, text: &str, usage_line: &str) -> Result<usize, ShellError> {
        let position: usize = text.parse().map_err(|_| usage(usage_line))?;
        if position == 0 || position > self.sync.tools().len() {
            return Err(ShellError::NoSuchPosition(text.to_string()));
        }
        Ok(position - 1)
    }

    fn set_parameter(&mut self, key: &str, text: &str) -> Result<(), ShellError> {
        if self.sync.tools().selected().is_none() {
            return Err(ShellError::NoSelection);
        }
        let invalid = || ShellError::InvalidValue {
            key: key.to_string(),
            value: text.to_string(),
        };
        let kind = self
            .sync
            .active_shape()
            .and_then(|shape| self.registry.get_schema(shape))
            .and_then(|schema| schema.field(key))
            .map(|field| field.kind)
            .ok_or_else(invalid)?;
        let value: ParamValue = kind.parse(text).ok_or_else(invalid)?;
        if self.sync.edit_parameter(&mut self.registry, key, value) {
            Ok(())
        } else {
            Err(invalid())
        }
    }

    fn render_list(&self) -> String {
        let unit = self.sync.config().unit.clone();
        let rows = self.sync.tools().rows(&self.registry, &unit);
        if rows.is_empty() {
            return "(no tools)\n".to_string();
        }
        let selected = self.sync.tools().selected_index();
        let mut out = String::new();
        for (index, row) in rows.iter().enumerate() {
            let marker = if selected == Some(index) { '*' } else { ' ' };
            let _ = writeln!(
                out,
                "{} {:>2}. #{:<3} {:<16} {:<12} {}",
                marker,
                index + 1,
                row.tool_id,
                row.name,
                row.shape,
                row.size
            );
        }
        out
    }

    fn render_shapes(&self) -> String {
        let mut out = String::new();
        if self.sync.shape_choices().is_empty() {
            return "(no shapes loaded)\n".to_string();
        }
        for choice in self.sync.shape_choices() {
            let marker = if self.sync.active_shape() == Some(choice.name.as_str()) {
                '*'
            } else {
                ' '
            };
            let _ = writeln!(out, "{} {:<14} {}", marker, choice.name, choice.label);
        }
        out
    }

    fn render_editor(&self) -> String {
        if self.sync.editor() == EditorState::Hidden {
            return String::new();
        }
        let (Some(shape), Some(values)) = (
            self.sync.active_shape().and_then(|s| self.registry.get_schema(s)),
            self.sync.editor_values(&self.registry),
        ) else {
            return String::new();
        };

        let mut out = String::new();
        if self.sync.shape_selector_visible() {
            let _ = writeln!(out, "Shape: {}", shape.label);
        }
        for section in [ParamSection::Size, ParamSection::Speed] {
            let mut fields = shape.section_fields(section).peekable();
            if fields.peek().is_none() {
                continue;
            }
            let _ = writeln!(out, "[{}]", section.label());
            for field in fields {
                let value = values.get(&field.key).map(ToString::to_string).unwrap_or_default();
                let _ = writeln!(out, "  {:<14} {}", field.key, value);
            }
        }
        out
    }
}

fn usage(line: &str) -> ShellError {
    ShellError::Usage(line.to_string())
}

/// Split "<first> <rest>" at the first whitespace.
fn split_arg(text: &str) -> Option<(&str, &str)> {
    let (first, rest) = text.split_once(char::is_whitespace)?;
    let rest = rest.trim();
    if rest.is_empty() { None } else { Some((first, rest)) }
}
