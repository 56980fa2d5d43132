//! `tellopad-types` – shared vocabulary for the tellopad crates.
//!
//! Controller input is modelled as a closed [`ControllerEvent`] sum type so
//! the dispatcher can match on it exhaustively.  Outbound traffic is a
//! [`Command`]: a plain ASCII string that the flight controller's text
//! parser understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A digital button on the game controller.
///
/// Names follow the XInput identifiers (`"DPAD_UP"`, `"LEFT_THUMB"`, …) both
/// in serde and in [`Display`][fmt::Display] / [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Button {
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Start,
    Back,
    LeftThumb,
    RightThumb,
    LeftShoulder,
    RightShoulder,
    A,
    B,
    X,
    Y,
}

impl Button {
    /// Every button the controller can report.
    pub const ALL: [Button; 14] = [
        Button::DpadUp,
        Button::DpadDown,
        Button::DpadLeft,
        Button::DpadRight,
        Button::Start,
        Button::Back,
        Button::LeftThumb,
        Button::RightThumb,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
    ];

    /// The XInput identifier of this button.
    pub fn name(&self) -> &'static str {
        match self {
            Button::DpadUp => "DPAD_UP",
            Button::DpadDown => "DPAD_DOWN",
            Button::DpadLeft => "DPAD_LEFT",
            Button::DpadRight => "DPAD_RIGHT",
            Button::Start => "START",
            Button::Back => "BACK",
            Button::LeftThumb => "LEFT_THUMB",
            Button::RightThumb => "RIGHT_THUMB",
            Button::LeftShoulder => "LEFT_SHOULDER",
            Button::RightShoulder => "RIGHT_SHOULDER",
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = TelloError;

    /// Case-sensitive: `"a"` is not `Button::A`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::ALL
            .iter()
            .copied()
            .find(|b| b.name() == s)
            .ok_or_else(|| TelloError::Input(format!("unknown button '{s}'")))
    }
}

/// One of the two analog sticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stick {
    Left,
    Right,
}

impl fmt::Display for Stick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stick::Left => f.write_str("LEFT"),
            Stick::Right => f.write_str("RIGHT"),
        }
    }
}

/// One of the two analog triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trigger {
    Left,
    Right,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Left => f.write_str("LEFT"),
            Trigger::Right => f.write_str("RIGHT"),
        }
    }
}

/// A single discrete event produced by the controller polling layer.
///
/// Serialised with an internal `"type"` tag, e.g.
/// `{"type":"stick_moved","stick":"LEFT","x":0.5,"y":-0.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    ButtonPressed { button: Button },
    ButtonReleased { button: Button },
    /// Axis values are in `[-1.0, 1.0]`.
    StickMoved { stick: Stick, x: f32, y: f32 },
    /// Trigger value is in `[0.0, 1.0]`.
    TriggerMoved { trigger: Trigger, value: f32 },
    ConnectionChanged { connected: bool },
}

/// A text command for the flight controller.
///
/// The wire form is the UTF-8 encoding of the string with no delimiter; the
/// datagram boundary terminates the command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(String);

impl Command {
    /// Wrap a command built from a fixed, known-good template.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Validate operator-entered free text.
    ///
    /// A trailing line terminator is stripped; everything else is sent
    /// verbatim.
    ///
    /// # Errors
    ///
    /// [`TelloError::InvalidCommand`] when the text is empty, contains
    /// non-ASCII characters, or contains control characters.
    pub fn from_operator_text(text: &str) -> Result<Self, TelloError> {
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return Err(TelloError::InvalidCommand("empty command".to_string()));
        }
        if !text.is_ascii() {
            return Err(TelloError::InvalidCommand(format!(
                "non-ASCII characters in '{text}'"
            )));
        }
        if text.chars().any(|c| c.is_ascii_control()) {
            return Err(TelloError::InvalidCommand(format!(
                "control characters in {text:?}"
            )));
        }
        Ok(Self(text.to_string()))
    }

    /// Build the four-axis remote-control command.
    ///
    /// The wire order is `rc <left x> <left y> <right y> <right x>`; the
    /// flight controller reads the right stick Y before X.
    pub fn rc(left_x: i32, left_y: i32, right_x: i32, right_y: i32) -> Self {
        Self(format!("rc {left_x} {left_y} {right_y} {right_x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for read commands such as `battery?` whose reply the operator
    /// is waiting for.  Decides whether a bound button raises the reply
    /// expectation.
    pub fn is_query(&self) -> bool {
        self.0.ends_with('?')
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type shared by every tellopad crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelloError {
    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Decode Error: {0}")]
    Decode(String),

    #[error("Invalid Command: {0}")]
    InvalidCommand(String),

    #[error("Invalid Target: {0}")]
    InvalidTarget(String),

    #[error("Input Error: {0}")]
    Input(String),

    #[error("Config Error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_roundtrip_through_from_str() {
        for b in Button::ALL {
            assert_eq!(b.name().parse::<Button>().unwrap(), b);
        }
    }

    #[test]
    fn button_from_str_is_case_sensitive() {
        assert!("a".parse::<Button>().is_err());
        assert!("dpad_up".parse::<Button>().is_err());
        assert_eq!("RIGHT_THUMB".parse::<Button>().unwrap(), Button::RightThumb);
    }

    #[test]
    fn button_serde_uses_xinput_names() {
        let json = serde_json::to_string(&Button::DpadLeft).unwrap();
        assert_eq!(json, "\"DPAD_LEFT\"");
        let back: Button = serde_json::from_str("\"LEFT_THUMB\"").unwrap();
        assert_eq!(back, Button::LeftThumb);
    }

    #[test]
    fn stick_event_parses_from_tagged_json() {
        let event: ControllerEvent =
            serde_json::from_str(r#"{"type":"stick_moved","stick":"LEFT","x":0.5,"y":-0.5}"#)
                .unwrap();
        assert_eq!(
            event,
            ControllerEvent::StickMoved {
                stick: Stick::Left,
                x: 0.5,
                y: -0.5
            }
        );
    }

    #[test]
    fn unknown_button_in_json_is_rejected() {
        let res: Result<ControllerEvent, _> =
            serde_json::from_str(r#"{"type":"button_pressed","button":"GUIDE"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn rc_command_puts_right_y_before_right_x() {
        let cmd = Command::rc(1, 2, 3, 4);
        assert_eq!(cmd.as_str(), "rc 1 2 4 3");
    }

    #[test]
    fn rc_command_formats_negative_values() {
        assert_eq!(Command::rc(50, -50, 0, 0).as_str(), "rc 50 -50 0 0");
    }

    #[test]
    fn stick_and_trigger_display_match_serde_names() {
        assert_eq!(Stick::Right.to_string(), "RIGHT");
        assert_eq!(Trigger::Left.to_string(), "LEFT");
        assert_eq!(serde_json::to_string(&Trigger::Right).unwrap(), "\"RIGHT\"");
    }

    #[test]
    fn query_detection() {
        assert!(Command::new("battery?").is_query());
        assert!(Command::new("wifi?").is_query());
        assert!(!Command::new("land").is_query());
    }

    #[test]
    fn operator_text_strips_line_terminator() {
        let cmd = Command::from_operator_text("up 50\r\n").unwrap();
        assert_eq!(cmd.as_str(), "up 50");
    }

    #[test]
    fn operator_text_is_otherwise_verbatim() {
        let cmd = Command::from_operator_text("  go 20 20 20 10 ").unwrap();
        assert_eq!(cmd.as_str(), "  go 20 20 20 10 ");
    }

    #[test]
    fn operator_text_rejects_empty_and_non_ascii() {
        assert!(matches!(
            Command::from_operator_text("\n"),
            Err(TelloError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::from_operator_text("höhe 10"),
            Err(TelloError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::from_operator_text("land\x07"),
            Err(TelloError::InvalidCommand(_))
        ));
    }

    #[test]
    fn error_display() {
        let err = TelloError::Transport("socket closed".to_string());
        assert!(err.to_string().contains("socket closed"));
    }
}
