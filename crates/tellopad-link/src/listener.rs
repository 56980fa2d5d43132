//! [`ResponseListener`] – the receive loop.
//!
//! Runs on its own thread for the life of the process, blocked in
//! [`Transport::recv`].  Each datagram is decoded as UTF-8 and shown only
//! when `print_response` is on or a query reply is expected.  The first
//! transport or decode failure stops the loop for good; the dispatch side
//! keeps running.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tellopad_types::TelloError;
use tracing::{debug, error};

use crate::codec;
use crate::console::Console;
use crate::session::SessionFlags;
use crate::transport::Transport;

/// Receive buffer size; one Ethernet frame.
pub const RECV_BUFFER_LEN: usize = 1518;

pub struct ResponseListener {
    transport: Arc<dyn Transport>,
    flags: Arc<SessionFlags>,
    console: Arc<dyn Console>,
}

impl ResponseListener {
    pub fn new(
        transport: Arc<dyn Transport>,
        flags: Arc<SessionFlags>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            transport,
            flags,
            console,
        }
    }

    /// Start the loop on a named thread.
    pub fn spawn(self) -> io::Result<JoinHandle<TelloError>> {
        thread::Builder::new()
            .name("response-listener".to_string())
            .spawn(move || self.run())
    }

    /// Receive until the transport fails.  Returns the terminating error,
    /// which has already been logged.
    pub fn run(&self) -> TelloError {
        let mut buf = [0u8; RECV_BUFFER_LEN];
        loop {
            let outcome = self
                .transport
                .recv(&mut buf)
                .and_then(|n| self.handle_datagram(&buf[..n]));
            if let Err(e) = outcome {
                error!(error = %e, "response listener stopped");
                return e;
            }
        }
    }

    /// Decode one datagram and show it if wanted.  Returns whether it was
    /// shown.
    ///
    /// # Errors
    ///
    /// [`TelloError::Decode`] when the payload is not UTF-8.
    pub fn handle_datagram(&self, payload: &[u8]) -> Result<bool, TelloError> {
        let text = codec::decode(payload)?;
        let expected = self.flags.take_expected_response();
        if expected || self.flags.print_response() {
            self.console.response(&text);
            Ok(true)
        } else {
            debug!(response = %text.trim_end(), "response suppressed");
            Ok(false)
        }
    }
}
