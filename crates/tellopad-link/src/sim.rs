//! In-process stand-ins for headless tests.
//!
//! [`MemoryTransport`] records every outbound datagram and lets a test
//! inject inbound ones; [`RecordingConsole`] captures operator output.
//!
//! # Example
//!
//! ```rust
//! use std::net::SocketAddr;
//! use tellopad_link::Transport;
//! use tellopad_link::sim::MemoryTransport;
//!
//! let transport = MemoryTransport::new();
//! let dest: SocketAddr = "192.168.10.1:8889".parse().unwrap();
//! transport.send_to(b"takeoff", dest).unwrap();
//! assert_eq!(transport.sent_text(), vec!["takeoff".to_string()]);
//! ```

use std::net::SocketAddr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use tellopad_types::{Command, TelloError};

use crate::console::{Console, ConsoleLine};
use crate::transport::Transport;

// ────────────────────────────────────────────────────────────────────────────
// Memory transport
// ────────────────────────────────────────────────────────────────────────────

/// A transport that never touches the network.
///
/// `recv` blocks until [`inject`][Self::inject] delivers a datagram, and
/// fails once [`close`][Self::close] has been called and the queue is empty.
pub struct MemoryTransport {
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    inbound_tx: Mutex<Option<Sender<Vec<u8>>>>,
    inbound_rx: Mutex<Receiver<Vec<u8>>>,
    fail_sends: bool,
}

impl MemoryTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    /// A transport whose every send fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    fn build(fail_sends: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            sent: Mutex::new(Vec::new()),
            inbound_tx: Mutex::new(Some(tx)),
            inbound_rx: Mutex::new(rx),
            fail_sends,
        }
    }

    /// Queue an inbound datagram.
    pub fn inject(&self, payload: &[u8]) {
        if let Some(tx) = self.inbound_tx.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            let _ = tx.send(payload.to_vec());
        }
    }

    /// Close the inbound side; pending datagrams are still delivered.
    pub fn close(&self) {
        self.inbound_tx
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
    }

    /// Every datagram sent so far with its destination.
    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Every datagram sent so far, decoded lossily as text.
    pub fn sent_text(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|(bytes, _)| String::from_utf8_lossy(&bytes).into_owned())
            .collect()
    }
}

impl Transport for MemoryTransport {
    fn send_to(&self, payload: &[u8], dest: SocketAddr) -> Result<usize, TelloError> {
        if self.fail_sends {
            return Err(TelloError::Transport("simulated send failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((payload.to_vec(), dest));
        Ok(payload.len())
    }

    fn recv(&self, buf: &mut [u8]) -> Result<usize, TelloError> {
        let rx = self.inbound_rx.lock().unwrap_or_else(|p| p.into_inner());
        let payload = rx
            .recv()
            .map_err(|_| TelloError::Transport("memory transport closed".to_string()))?;
        let n = payload.len().min(buf.len());
        buf[..n].copy_from_slice(&payload[..n]);
        Ok(n)
    }

    fn can_receive(&self) -> bool {
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recording console
// ────────────────────────────────────────────────────────────────────────────

/// A [`Console`] that stores every line for later assertions.
#[derive(Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl RecordingConsole {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Only the response lines, in arrival order.
    pub fn responses(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                ConsoleLine::Response(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, line: ConsoleLine) {
        self.lines
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(line);
    }
}

impl Console for RecordingConsole {
    fn response(&self, text: &str) {
        self.push(ConsoleLine::Response(text.to_string()));
    }

    fn sent(&self, command: &Command, hex: &str) {
        self.push(ConsoleLine::Sent {
            command: command.to_string(),
            hex: hex.to_string(),
        });
    }

    fn trace(&self, line: &str) {
        self.push(ConsoleLine::Trace(line.to_string()));
    }

    fn notice(&self, line: &str) {
        self.push(ConsoleLine::Notice(line.to_string()));
    }
}
