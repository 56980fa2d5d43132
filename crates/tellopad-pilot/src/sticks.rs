//! Stick positions in integer percent.

use tellopad_types::{Command, Stick};

/// Convert an axis value in `[-1.0, 1.0]` to an integer percent.
///
/// `x * 100` is rounded to the nearest integer (halves away from zero) and
/// clamped to `[-100, 100]`.  Returns `None` for NaN or infinite input.
pub fn axis_to_percent(value: f32) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    let scaled = (f64::from(value) * 100.0).round().clamp(-100.0, 100.0);
    Some(scaled as i32)
}

/// Last known position of both sticks.  Starts centred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickState {
    pub left_x: i32,
    pub left_y: i32,
    pub right_x: i32,
    pub right_y: i32,
}

impl StickState {
    /// Update one stick.  The other stick keeps its last value.
    ///
    /// Returns `false` (and changes nothing) when either axis is not a
    /// finite number.
    pub fn update(&mut self, stick: Stick, x: f32, y: f32) -> bool {
        let (Some(x), Some(y)) = (axis_to_percent(x), axis_to_percent(y)) else {
            return false;
        };
        match stick {
            Stick::Left => {
                self.left_x = x;
                self.left_y = y;
            }
            Stick::Right => {
                self.right_x = x;
                self.right_y = y;
            }
        }
        true
    }

    /// Return both sticks to centre.
    pub fn center(&mut self) {
        *self = Self::default();
    }

    /// The `rc` command for the current position.
    pub fn rc_command(&self) -> Command {
        Command::rc(self.left_x, self.left_y, self.right_x, self.right_y)
    }
}
