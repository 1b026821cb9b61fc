//! PathMill Application
//!
//! A command shell over the tool subsystem, standing in for the GUI.

mod commands;
mod shell;

pub use commands::{Command, CommandRegistry};
pub use shell::{Reply, Shell, ShellError};
