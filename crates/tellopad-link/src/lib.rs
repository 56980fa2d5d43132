//! `tellopad-link` – the UDP side of tellopad.
//!
//! Moves command datagrams to the flight controller and surfaces its replies
//! without caring what the commands mean.
//!
//! # Modules
//!
//! - [`transport`] – [`Transport`] trait and the [`UdpTransport`] socket
//!   implementation, including the send-only fallback when the local port is
//!   taken.
//! - [`codec`] – the single UTF-8 / hex encoding boundary for commands.
//! - [`session`] – [`SessionFlags`]: the atomic mode flags shared by the
//!   dispatcher and the response listener.
//! - [`console`] – [`Console`] trait for operator-facing output.
//! - [`sender`] – [`CommandSender`]: encode, echo and send one command.
//! - [`listener`] – [`ResponseListener`]: the receive loop.
//! - [`sim`] – in-memory transport and recording console for headless tests.

pub mod codec;
pub mod console;
pub mod listener;
pub mod sender;
pub mod session;
pub mod sim;
pub mod transport;

pub use console::{Console, ConsoleLine};
pub use listener::ResponseListener;
pub use sender::CommandSender;
pub use session::SessionFlags;
pub use transport::{Transport, UdpTransport};
