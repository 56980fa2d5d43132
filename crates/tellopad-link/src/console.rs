//! Operator-facing console output.
//!
//! Local console lines never go over the wire.  The CLI implements
//! [`Console`] with coloured terminal output; tests use
//! [`RecordingConsole`][crate::sim::RecordingConsole].

use tellopad_types::Command;

/// Sink for everything shown to the operator.
pub trait Console: Send + Sync {
    /// A reply received from the flight controller.
    fn response(&self, text: &str);

    /// A command that was just sent, with its hex encoding.
    fn sent(&self, command: &Command, hex: &str);

    /// A debug-mode trace line describing an input event.
    fn trace(&self, line: &str);

    /// A status notice (debug toggled, setup progress, warnings).
    fn notice(&self, line: &str);
}

/// One recorded console line, see
/// [`RecordingConsole`][crate::sim::RecordingConsole].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    Response(String),
    Sent { command: String, hex: String },
    Trace(String),
    Notice(String),
}
