//! Controller vibration.
//!
//! Used once at startup to tell the operator the controller was detected.

use std::thread;
use std::time::Duration;

/// Something that can drive the controller's two rumble motors.
pub trait Haptics: Send {
    /// Set motor strengths; `0` is off, `u16::MAX` is full.
    fn set_vibration(&mut self, left: u16, right: u16);
}

/// Haptics for sources that have no way to reach the controller.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn set_vibration(&mut self, _left: u16, _right: u16) {}
}

/// One step of a rumble pattern: set the motors, then hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumbleStep {
    pub left: u16,
    pub right: u16,
    pub hold: Duration,
}

const RAMP_STEPS: u16 = 20;
const RAMP_INCREMENT: u16 = 2500;

/// The "controller detected" pattern.
///
/// The right motor ramps up in 20 steps of 2500, 50 ms apart.  After a
/// 300 ms pause both motors pulse at (65000, 45000) for 300 ms.
pub fn acknowledgement_pattern() -> Vec<RumbleStep> {
    let mut steps: Vec<RumbleStep> = (0..RAMP_STEPS)
        .map(|i| RumbleStep {
            left: 0,
            right: i * RAMP_INCREMENT,
            hold: Duration::from_millis(50),
        })
        .collect();
    steps.push(RumbleStep {
        left: 0,
        right: 0,
        hold: Duration::from_millis(300),
    });
    steps.push(RumbleStep {
        left: 65000,
        right: 45000,
        hold: Duration::from_millis(300),
    });
    steps.push(RumbleStep {
        left: 0,
        right: 0,
        hold: Duration::ZERO,
    });
    steps
}

/// Play `pattern` on `haptics`, blocking for its full duration.
pub fn play(haptics: &mut dyn Haptics, pattern: &[RumbleStep]) {
    for step in pattern {
        haptics.set_vibration(step.left, step.right);
        if !step.hold.is_zero() {
            thread::sleep(step.hold);
        }
    }
}
