//! Interactive prompts.
//!
//! Startup questions read plain lines from stdin.  The in-flight free-text
//! command prompt uses `rustyline` so earlier commands can be recalled with
//! the arrow keys.

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tellopad_pilot::OperatorPrompt;
use tracing::warn;

use crate::config::Config;
use crate::target::{self, TargetChoice};

/// Print `msg` and read one trimmed line.  `None` on EOF or read error.
pub fn prompt_line(msg: &str) -> Option<String> {
    read_raw_line(msg).map(|line| line.trim().to_string())
}

/// Print `msg` and read one line with only its terminator removed.
fn read_raw_line(msg: &str) -> Option<String> {
    print!("{}", msg);
    io::stdout().flush().ok();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(strip_line_terminator(&line).to_string()),
        Err(e) => {
            eprintln!("{}: {}", "Read error".red(), e);
            None
        }
    }
}

/// Drop a trailing `\n` or `\r\n`; everything else is kept.
fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Ask until the operator names a reachable target.  `None` on EOF.
pub fn ask_target(cfg: &Config) -> Option<SocketAddr> {
    loop {
        let answer = prompt_line(&format!("{} ", "Enter target IP >".truecolor(100, 160, 250)))?;
        let host = match target::classify(&answer, cfg) {
            Ok(TargetChoice::Preset(addr)) => return Some(addr),
            Ok(TargetChoice::Host(host)) => host,
            Err(e) => {
                println!("  {} {}", "Warning:".yellow(), e);
                continue;
            }
        };
        let port = loop {
            let answer =
                prompt_line(&format!("{} ", "Enter target port >".truecolor(100, 160, 250)))?;
            match target::parse_port(&answer) {
                Ok(port) => break port,
                Err(e) => println!("  {} {}", "Warning:".yellow(), e),
            }
        };
        match target::resolve(&host, port) {
            Ok(addr) => return Some(addr),
            Err(e) => println!("  {} {}", "Warning:".yellow(), e),
        }
    }
}

/// Free-text command prompt backed by `rustyline`.
pub struct LinePrompt {
    editor: DefaultEditor,
}

impl LinePrompt {
    pub fn new() -> Result<Self, ReadlineError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl OperatorPrompt for LinePrompt {
    fn read_command(&mut self) -> Option<String> {
        println!();
        match self.editor.readline("Type a custom command here > ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Some(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "Custom command cancelled.".dimmed());
                None
            }
            Err(e) => {
                warn!(error = %e, "operator prompt failed");
                None
            }
        }
    }
}

/// Plain stdin fallback when no line editor can be attached to the terminal.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl OperatorPrompt for StdinPrompt {
    fn read_command(&mut self) -> Option<String> {
        read_raw_line("\nType a custom command here > ")
    }
}
