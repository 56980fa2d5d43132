//! Coloured terminal output for the operator.

use colored::Colorize;
use tellopad_link::Console;
use tellopad_types::Command;

/// Writes operator-facing lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn response(&self, text: &str) {
        println!("{} {}", "Response:".cyan(), text.trim_end());
    }

    fn sent(&self, command: &Command, hex: &str) {
        println!(
            "{} {} ( HEX: {} )",
            "Command sent:".dimmed(),
            command.as_str().bold(),
            hex.dimmed()
        );
    }

    fn trace(&self, line: &str) {
        println!("{}", line.dimmed());
    }

    fn notice(&self, line: &str) {
        println!("{}", line.yellow());
    }
}
