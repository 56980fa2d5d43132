//! Datagram transport.
//!
//! [`Transport`] is the only seam between tellopad and the network.  A single
//! transport is shared (`Arc<dyn Transport>`) by the sending side and the
//! response listener; UDP sockets allow a concurrent `send_to` and `recv`
//! without extra locking.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

use tellopad_types::TelloError;
use tracing::{debug, warn};

/// A bound datagram socket.
pub trait Transport: Send + Sync {
    /// Send one datagram to `dest`.  Returns the number of bytes sent.
    ///
    /// # Errors
    ///
    /// [`TelloError::Transport`] when the datagram could not be handed to
    /// the network stack.  Sends are never retried.
    fn send_to(&self, payload: &[u8], dest: SocketAddr) -> Result<usize, TelloError>;

    /// Block until one datagram arrives and copy it into `buf`.
    ///
    /// # Errors
    ///
    /// [`TelloError::Transport`] when the socket fails or is closed.
    fn recv(&self, buf: &mut [u8]) -> Result<usize, TelloError>;

    /// Whether replies can be received on this transport.
    fn can_receive(&self) -> bool;
}

/// UDP transport bound to a local port.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    can_receive: bool,
}

impl UdpTransport {
    /// Bind `0.0.0.0:local_port`.  Port `0` picks an ephemeral port.
    ///
    /// # Errors
    ///
    /// [`TelloError::Transport`] when the bind fails.
    pub fn bind(local_port: u16) -> Result<Self, TelloError> {
        let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, local_port);
        let socket = UdpSocket::bind(addr)
            .map_err(|e| TelloError::Transport(format!("bind {addr}: {e}")))?;
        debug!(%addr, "udp transport bound");
        Ok(Self {
            socket,
            can_receive: true,
        })
    }

    /// Bind `local_port`, falling back to a send-only socket when the port
    /// is already in use (typically another running instance).
    ///
    /// # Errors
    ///
    /// [`TelloError::Transport`] only when no socket at all can be opened.
    pub fn open(local_port: u16) -> Result<Self, TelloError> {
        match Self::bind(local_port) {
            Ok(t) => Ok(t),
            Err(e) => {
                warn!(error = %e, local_port, "local port unavailable; continuing send-only");
                let mut fallback = Self::bind(0)?;
                fallback.can_receive = false;
                Ok(fallback)
            }
        }
    }

    /// The locally bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, TelloError> {
        self.socket
            .local_addr()
            .map_err(|e| TelloError::Transport(e.to_string()))
    }
}

impl Transport for UdpTransport {
    fn send_to(&self, payload: &[u8], dest: SocketAddr) -> Result<usize, TelloError> {
        self.socket
            .send_to(payload, dest)
            .map_err(|e| TelloError::Transport(format!("send to {dest}: {e}")))
    }

    fn recv(&self, buf: &mut [u8]) -> Result<usize, TelloError> {
        loop {
            match self.socket.recv_from(buf) {
                Ok((n, _from)) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TelloError::Transport(format!("receive: {e}"))),
            }
        }
    }

    fn can_receive(&self) -> bool {
        self.can_receive
    }
}
