//! Shell command registry and help text.

/// A shell command definition.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: &'static str,
    pub args: &'static str,
    pub description: &'static str,
}

impl Command {
    pub const fn new(name: &'static str, args: &'static str, description: &'static str) -> Self {
        Self {
            name,
            args,
            description,
        }
    }

    /// Format the usage line (e.g., "select <n>").
    pub fn usage(&self) -> String {
        if self.args.is_empty() {
            self.name.to_string()
        } else {
            format!("{} {}", self.name, self.args)
        }
    }
}

/// Registry of all shell commands.
pub struct CommandRegistry;

impl CommandRegistry {
    /// Get all registered commands.
    pub fn all() -> Vec<Command> {
        vec![
            Command::new("list", "", "Show all tools"),
            Command::new("new", "", "Create a tool with the default shape"),
            Command::new("select", "<n>|none", "Select the tool at position n"),
            Command::new("up", "<n>", "Move a tool up"),
            Command::new("down", "<n>", "Move a tool down"),
            Command::new("delete", "<n>", "Delete a tool"),
            Command::new("name", "<n> <text>", "Rename a tool"),
            Command::new("id", "<n> <number>", "Change a tool number"),
            Command::new("shapes", "", "Show available shapes"),
            Command::new("shape", "<name>", "Change the shape of the selected tool"),
            Command::new("set", "<key> <value>", "Change a parameter of the selected tool"),
            Command::new("show", "", "Show the parameter editor"),
            Command::new("load", "<shape>", "Load a built-in shape plugin"),
            Command::new("unload", "<shape>", "Unload a shape plugin"),
            Command::new("filters", "<tool id>", "Show toolpath filters for a tool"),
            Command::new("help", "", "Show this help"),
            Command::new("quit", "", "Exit"),
        ]
    }

    /// Look up a command by name.
    pub fn find(name: &str) -> Option<Command> {
        Self::all().into_iter().find(|c| c.name == name)
    }

    /// Help text listing every command.
    pub fn help() -> String {
        let mut out = String::from("Commands:\n");
        for command in Self::all() {
            out.push_str(&format!("  {:22} {}\n", command.usage(), command.description));
        }
        out
    }
}
