//! [`SetupSequencer`] – puts the flight controller into SDK command mode.
//!
//! Sends `command`, `streamoff` and `speed 100`, pausing after each one.  The
//! controller's text parser drops commands that arrive back to back, so the
//! pause is part of the protocol.  Sends are fire-and-forget.

use std::thread;
use std::time::Duration;

use tellopad_link::CommandSender;
use tellopad_types::Command;
use tracing::info;

/// The startup script, in order.
pub const SETUP_COMMANDS: [&str; 3] = ["command", "streamoff", "speed 100"];

/// Pause after each setup command.
pub const DEFAULT_SETUP_DELAY: Duration = Duration::from_millis(500);

pub struct SetupSequencer {
    commands: Vec<Command>,
    delay: Duration,
}

impl Default for SetupSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_SETUP_DELAY)
    }
}

impl SetupSequencer {
    pub fn new(delay: Duration) -> Self {
        Self {
            commands: SETUP_COMMANDS.iter().map(|c| Command::new(*c)).collect(),
            delay,
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Run the script once.  Returns how many commands were handed to the
    /// transport; failures have already been logged by the sender.
    pub fn run(&self, sender: &CommandSender) -> usize {
        let mut delivered = 0;
        for command in &self.commands {
            if sender.send(command).is_ok() {
                delivered += 1;
            }
            thread::sleep(self.delay);
        }
        info!(delivered, total = self.commands.len(), "setup sequence finished");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;
    use tellopad_link::SessionFlags;
    use tellopad_link::sim::{MemoryTransport, RecordingConsole};

    fn sender(transport: Arc<MemoryTransport>) -> CommandSender {
        CommandSender::new(
            transport,
            "192.168.10.1:8889".parse().unwrap(),
            Arc::new(SessionFlags::new()),
            RecordingConsole::new(),
        )
    }

    #[test]
    fn sends_script_in_order() {
        let transport = MemoryTransport::new();
        let delivered = SetupSequencer::new(Duration::ZERO).run(&sender(transport.clone()));
        assert_eq!(delivered, 3);
        assert_eq!(transport.sent_text(), vec!["command", "streamoff", "speed 100"]);
    }

    #[test]
    fn pauses_after_each_command() {
        let transport = MemoryTransport::new();
        let start = Instant::now();
        SetupSequencer::new(Duration::from_millis(10)).run(&sender(transport));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn failed_sends_do_not_abort_the_script() {
        let transport = MemoryTransport::failing();
        let delivered = SetupSequencer::new(Duration::ZERO).run(&sender(transport));
        assert_eq!(delivered, 0);
    }

    #[test]
    fn default_delay_is_half_a_second() {
        let s = SetupSequencer::default();
        assert_eq!(s.delay, Duration::from_millis(500));
        assert_eq!(s.commands().len(), 3);
    }
}
