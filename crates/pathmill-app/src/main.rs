//! Main application entry point.

use pathmill_app::{Reply, Shell};
use pathmill_core::ToolsConfig;
use std::io::{self, BufRead, Write};

fn main() {
    env_logger::init();
    log::info!("Starting PathMill");

    let config = match std::env::args().nth(1) {
        Some(path) => match ToolsConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path);
                config
            }
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => ToolsConfig::default(),
    };

    let mut shell = Shell::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("PathMill tool shell. Type 'help' for commands.");

    loop {
        print!("> ");
        if let Err(e) = stdout.flush() {
            log::warn!("Failed to flush output: {}", e);
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        }

        match shell.execute(&line) {
            Ok(Reply::Output(out)) => print!("{}", out),
            Ok(Reply::Quit) => break,
            Err(e) => println!("error: {}", e),
        }
    }
}
