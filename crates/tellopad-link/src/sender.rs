//! [`CommandSender`] – the one path every command takes to the wire.

use std::net::SocketAddr;
use std::sync::Arc;

use tellopad_types::{Command, TelloError};
use tracing::{debug, warn};

use crate::codec;
use crate::console::Console;
use crate::session::SessionFlags;
use crate::transport::Transport;

/// Encodes a [`Command`], echoes it when `print_sent` is on, and sends it to
/// the fixed destination.  Fire-and-forget: no reply is awaited.
#[derive(Clone)]
pub struct CommandSender {
    transport: Arc<dyn Transport>,
    destination: SocketAddr,
    flags: Arc<SessionFlags>,
    console: Arc<dyn Console>,
}

impl CommandSender {
    pub fn new(
        transport: Arc<dyn Transport>,
        destination: SocketAddr,
        flags: Arc<SessionFlags>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            transport,
            destination,
            flags,
            console,
        }
    }

    /// Send `command` once.
    ///
    /// # Errors
    ///
    /// Propagates the transport error after logging it; the caller decides
    /// whether to care.  Nothing is retried.
    pub fn send(&self, command: &Command) -> Result<usize, TelloError> {
        let bytes = codec::encode(command);
        if self.flags.print_sent() {
            self.console.sent(command, &codec::to_hex(&bytes));
        }
        match self.transport.send_to(&bytes, self.destination) {
            Ok(n) => {
                debug!(command = %command, bytes = n, dest = %self.destination, "sent");
                Ok(n)
            }
            Err(e) => {
                warn!(command = %command, error = %e, "send failed");
                Err(e)
            }
        }
    }
}
