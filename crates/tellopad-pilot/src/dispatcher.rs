//! [`Dispatcher`] – controller events in, at most one command out.
//!
//! # Button bindings
//!
//! | Button | Result | Expects a reply |
//! |---|---|---|
//! | `BACK` | `land` | no |
//! | `START` | `takeoff` | no |
//! | `DPAD_LEFT` / `RIGHT` / `UP` / `DOWN` | `flip l` / `r` / `f` / `b` | no |
//! | `A` | operator types the command | yes |
//! | `B` | `battery?` | yes |
//! | `Y` | `temp?` | yes |
//! | `X` | `tof?` | yes |
//! | `RIGHT_THUMB` | `wifi?` | yes |
//! | `LEFT_THUMB` | toggle debug mode, nothing sent | unchanged |
//!
//! Any other button is ignored.  Only presses act; releases and triggers are
//! ignored.
//!
//! # Sticks
//!
//! Every stick move updates that stick's two axes and emits
//! `rc <left x> <left y> <right y> <right x>` built from the last known
//! position of both sticks.
//!
//! # Controller disconnect
//!
//! A disconnect centres both sticks and emits one `rc 0 0 0 0` so the
//! aircraft hovers instead of holding the last deflection.  Stick events are
//! then ignored until the controller reconnects; buttons keep working.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tellopad_link::SessionFlags;
//! use tellopad_pilot::{Action, Dispatcher};
//! use tellopad_types::{ControllerEvent, Stick};
//!
//! let mut d = Dispatcher::new(Arc::new(SessionFlags::new()));
//! let out = d.handle(&ControllerEvent::StickMoved { stick: Stick::Left, x: 0.5, y: -0.5 });
//! match out.action {
//!     Action::Send(cmd) => assert_eq!(cmd.as_str(), "rc 50 -50 0 0"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use std::sync::Arc;

use tellopad_link::SessionFlags;
use tellopad_types::{Button, Command, ControllerEvent, TelloError};
use tracing::debug;

use crate::sticks::StickState;

/// What a button press is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Send a fixed command.  Queries (`battery?`, ...) expect a reply.
    Send(&'static str),
    /// Ask the operator for a free-text command.
    OperatorText,
    ToggleDebug,
    Unbound,
}

/// The binding for `button`.
pub fn binding(button: Button) -> Binding {
    match button {
        Button::Back => Binding::Send("land"),
        Button::Start => Binding::Send("takeoff"),
        Button::DpadLeft => Binding::Send("flip l"),
        Button::DpadRight => Binding::Send("flip r"),
        Button::DpadUp => Binding::Send("flip f"),
        Button::DpadDown => Binding::Send("flip b"),
        Button::B => Binding::Send("battery?"),
        Button::Y => Binding::Send("temp?"),
        Button::X => Binding::Send("tof?"),
        Button::RightThumb => Binding::Send("wifi?"),
        Button::A => Binding::OperatorText,
        Button::LeftThumb => Binding::ToggleDebug,
        Button::LeftShoulder | Button::RightShoulder => Binding::Unbound,
    }
}

/// Dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Ready,
    /// Waiting for the operator to type a command.  Events delivered in this
    /// state are dropped.
    AwaitingOperatorText,
}

/// What the caller must do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Send(Command),
    /// Block on the operator prompt, then call
    /// [`Dispatcher::submit_operator_text`] or
    /// [`Dispatcher::cancel_operator_text`].
    PromptOperator,
    /// Debug mode changed to the contained value.
    DebugToggled(bool),
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub action: Action,
    /// Human-readable description of the event; present only in debug mode.
    pub trace: Option<String>,
}

pub struct Dispatcher {
    sticks: StickState,
    flags: Arc<SessionFlags>,
    state: DispatchState,
    connected: bool,
}

impl Dispatcher {
    /// A dispatcher with centred sticks that assumes the controller is
    /// connected.
    pub fn new(flags: Arc<SessionFlags>) -> Self {
        Self {
            sticks: StickState::default(),
            flags,
            state: DispatchState::Ready,
            connected: true,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn sticks(&self) -> StickState {
        self.sticks
    }

    pub fn flags(&self) -> &Arc<SessionFlags> {
        &self.flags
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Handle one event.
    pub fn handle(&mut self, event: &ControllerEvent) -> Dispatch {
        let trace = self.flags.debug_mode().then(|| describe(event));

        if self.state == DispatchState::AwaitingOperatorText {
            debug!(?event, "event dropped while awaiting operator text");
            return Dispatch {
                action: Action::None,
                trace,
            };
        }

        let action = match *event {
            ControllerEvent::ButtonPressed { button } => self.press(button),
            ControllerEvent::StickMoved { stick, x, y } => {
                if !self.connected || !self.sticks.update(stick, x, y) {
                    Action::None
                } else {
                    self.flags.set_expect_one_response(false);
                    Action::Send(self.sticks.rc_command())
                }
            }
            ControllerEvent::ConnectionChanged { connected } => self.connection(connected),
            ControllerEvent::ButtonReleased { .. } | ControllerEvent::TriggerMoved { .. } => {
                Action::None
            }
        };

        Dispatch { action, trace }
    }

    /// Finish an operator prompt with the text that was typed.
    ///
    /// An accepted command raises the reply expectation: whatever the
    /// operator typed, its answer is shown.
    ///
    /// # Errors
    ///
    /// - [`TelloError::Input`] – no prompt is pending.
    /// - [`TelloError::InvalidCommand`] – the text was rejected; nothing will
    ///   be sent and the reply expectation is cleared.
    pub fn submit_operator_text(&mut self, text: &str) -> Result<Command, TelloError> {
        if self.state != DispatchState::AwaitingOperatorText {
            return Err(TelloError::Input("no operator prompt pending".to_string()));
        }
        self.state = DispatchState::Ready;
        let parsed = Command::from_operator_text(text);
        self.flags.set_expect_one_response(parsed.is_ok());
        parsed
    }

    /// Abandon a pending operator prompt.
    pub fn cancel_operator_text(&mut self) {
        if self.state == DispatchState::AwaitingOperatorText {
            self.state = DispatchState::Ready;
            self.flags.set_expect_one_response(false);
        }
    }

    fn press(&mut self, button: Button) -> Action {
        match binding(button) {
            Binding::Send(text) => {
                let command = Command::new(text);
                // Raised before the send so a fast reply is not missed.
                self.flags.set_expect_one_response(command.is_query());
                Action::Send(command)
            }
            Binding::OperatorText => {
                // The flag waits for the typed command; a late reply to an
                // earlier command must not consume it.
                self.state = DispatchState::AwaitingOperatorText;
                Action::PromptOperator
            }
            Binding::ToggleDebug => Action::DebugToggled(self.flags.toggle_debug()),
            Binding::Unbound => Action::None,
        }
    }

    fn connection(&mut self, connected: bool) -> Action {
        match (self.connected, connected) {
            (true, false) => {
                self.connected = false;
                self.sticks.center();
                self.flags.set_expect_one_response(false);
                Action::Send(self.sticks.rc_command())
            }
            (false, true) => {
                self.connected = true;
                Action::None
            }
            _ => Action::None,
        }
    }
}

fn describe(event: &ControllerEvent) -> String {
    match event {
        ControllerEvent::ButtonPressed { button } => format!("{button} pressed"),
        ControllerEvent::ButtonReleased { button } => format!("{button} released"),
        ControllerEvent::StickMoved { stick, x, y } => {
            format!("{stick} stick > x {x}, y {y}")
        }
        ControllerEvent::TriggerMoved { trigger, value } => {
            format!("{trigger} trigger > {value}")
        }
        ControllerEvent::ConnectionChanged { connected: true } => {
            "controller connected".to_string()
        }
        ControllerEvent::ConnectionChanged { connected: false } => {
            "controller disconnected".to_string()
        }
    }
}
