//! `tellopad-pilot` – controller input to flight commands.
//!
//! # Modules
//!
//! - [`sticks`] – [`StickState`][sticks::StickState]: last known stick
//!   positions in integer percent and the RC command built from them.
//! - [`dispatcher`] – [`Dispatcher`][dispatcher::Dispatcher]: the input state
//!   machine.  Buttons are edge-triggered (press only), sticks are
//!   level-triggered (every move emits an RC command).
//! - [`setup`] – [`SetupSequencer`][setup::SetupSequencer]: the fixed startup
//!   script that puts the flight controller into command mode.
//! - [`source`] – [`EventSource`][source::EventSource] and the replay / UDP
//!   bridge adapters that feed controller events in.
//! - [`haptics`] – [`Haptics`][haptics::Haptics] and the startup
//!   acknowledgement rumble.
//! - [`pilot`] – [`Pilot`][pilot::Pilot]: the polling loop that ties a
//!   source, the dispatcher, the operator prompt and the sender together.
//!
//! # Operator text prompt
//!
//! Button `A` moves the dispatcher into
//! [`DispatchState::AwaitingOperatorText`][dispatcher::DispatchState::AwaitingOperatorText].
//! The loop then blocks on the [`OperatorPrompt`][pilot::OperatorPrompt]; no
//! controller events are processed until the operator answers or cancels.

pub mod dispatcher;
pub mod haptics;
pub mod pilot;
pub mod setup;
pub mod source;
pub mod sticks;

pub use dispatcher::{Action, Dispatch, DispatchState, Dispatcher};
pub use haptics::{Haptics, NoHaptics};
pub use pilot::{OperatorPrompt, Pilot, PilotExit};
pub use setup::SetupSequencer;
pub use source::{EventSource, ReplaySource, ScriptedSource, UdpEventSource};
pub use sticks::StickState;
