//! Controller event sources.
//!
//! Reading the physical controller happens outside tellopad.  An
//! [`EventSource`] is polled once per loop tick and hands over whatever events
//! are pending, in order.
//!
//! - [`ScriptedSource`] – a fixed in-memory list, for tests and demos.
//! - [`ReplaySource`] – a JSON-lines recording with per-line delays.
//! - [`UdpEventSource`] – JSON events pushed by an external gamepad bridge,
//!   one event per datagram.  The bridge also receives rumble requests back
//!   through [`BridgeHaptics`].
//!
//! Malformed input is skipped silently (logged at `debug`).

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;
use tellopad_types::{ControllerEvent, TelloError};
use tracing::{debug, warn};

use crate::haptics::Haptics;

/// A non-blocking supplier of controller events.
pub trait EventSource: Send {
    /// The next pending event, or `None` when nothing is pending right now.
    fn poll(&mut self) -> Option<ControllerEvent>;

    /// `true` once the source can never produce another event.
    fn is_exhausted(&self) -> bool {
        false
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted
// ────────────────────────────────────────────────────────────────────────────

/// Yields a fixed list of events, one per poll, then is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    events: VecDeque<ControllerEvent>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = ControllerEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedSource {
    fn poll(&mut self) -> Option<ControllerEvent> {
        self.events.pop_front()
    }

    fn is_exhausted(&self) -> bool {
        self.events.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Replay
// ────────────────────────────────────────────────────────────────────────────

/// One line of a replay file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayEntry {
    /// Wait this long after the previous event before releasing this one.
    pub delay: Duration,
    pub event: ControllerEvent,
}

/// Parse one replay line.
///
/// A line is a serialised [`ControllerEvent`] with an optional `delay_ms`
/// field, e.g. `{"delay_ms":250,"type":"button_pressed","button":"START"}`.
/// Blank lines and `#` comments yield `None`, as do lines that do not parse.
pub fn parse_replay_line(line: &str) -> Option<ReplayEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, line, "skipping malformed replay line");
            return None;
        }
    };
    let delay_ms = value
        .as_object_mut()
        .and_then(|obj| obj.remove("delay_ms"))
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    match serde_json::from_value::<ControllerEvent>(value) {
        Ok(event) => Some(ReplayEntry {
            delay: Duration::from_millis(delay_ms),
            event,
        }),
        Err(e) => {
            debug!(error = %e, line, "skipping unrecognised replay event");
            None
        }
    }
}

/// Replays a recorded session.
///
/// The first event's delay is measured from the first poll.
#[derive(Debug)]
pub struct ReplaySource {
    entries: VecDeque<ReplayEntry>,
    last_release: Option<Instant>,
}

impl ReplaySource {
    /// Load a JSON-lines replay file.
    ///
    /// # Errors
    ///
    /// [`TelloError::Input`] when the file cannot be read.
    pub fn open(path: &Path) -> Result<Self, TelloError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| TelloError::Input(format!("read replay {}: {e}", path.display())))?;
        Ok(Self::from_entries(raw.lines().filter_map(parse_replay_line)))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ReplayEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            last_release: None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

impl EventSource for ReplaySource {
    fn poll(&mut self) -> Option<ControllerEvent> {
        let now = Instant::now();
        let since = *self.last_release.get_or_insert(now);
        let due = since + self.entries.front()?.delay;
        if now < due {
            return None;
        }
        self.last_release = Some(now);
        self.entries.pop_front().map(|e| e.event)
    }

    fn is_exhausted(&self) -> bool {
        self.entries.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// UDP bridge
// ────────────────────────────────────────────────────────────────────────────

const BRIDGE_BUFFER_LEN: usize = 512;

/// Receives controller events from a gamepad bridge over UDP.
///
/// The address of the last bridge that sent a valid event is remembered so
/// rumble requests can be sent back to it.
pub struct UdpEventSource {
    socket: UdpSocket,
    peer: Arc<Mutex<Option<SocketAddr>>>,
}

impl UdpEventSource {
    /// Bind `addr` in non-blocking mode.
    ///
    /// # Errors
    ///
    /// [`TelloError::Input`] when the socket cannot be bound.
    pub fn bind(addr: SocketAddr) -> Result<Self, TelloError> {
        let socket = UdpSocket::bind(addr)
            .and_then(|s| s.set_nonblocking(true).map(|_| s))
            .map_err(|e| TelloError::Input(format!("bind input bridge {addr}: {e}")))?;
        Ok(Self {
            socket,
            peer: Arc::new(Mutex::new(None)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TelloError> {
        self.socket
            .local_addr()
            .map_err(|e| TelloError::Input(e.to_string()))
    }

    /// The bridge that most recently sent a valid event.
    pub fn peer(&self) -> Option<SocketAddr> {
        *self.peer.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// A [`Haptics`] handle that forwards rumble requests to the bridge.
    ///
    /// # Errors
    ///
    /// [`TelloError::Input`] when the socket cannot be cloned.
    pub fn haptics(&self) -> Result<BridgeHaptics, TelloError> {
        let socket = self
            .socket
            .try_clone()
            .map_err(|e| TelloError::Input(format!("clone input bridge socket: {e}")))?;
        Ok(BridgeHaptics {
            socket,
            peer: self.peer.clone(),
        })
    }
}

impl EventSource for UdpEventSource {
    fn poll(&mut self) -> Option<ControllerEvent> {
        let mut buf = [0u8; BRIDGE_BUFFER_LEN];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((n, from)) => match serde_json::from_slice::<ControllerEvent>(&buf[..n]) {
                    Ok(event) => {
                        *self.peer.lock().unwrap_or_else(|p| p.into_inner()) = Some(from);
                        return Some(event);
                    }
                    Err(e) => debug!(error = %e, %from, "skipping malformed bridge datagram"),
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return None,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "input bridge receive failed");
                    return None;
                }
            }
        }
    }
}

/// Rumble request sent to the bridge.
#[derive(Debug, Serialize)]
struct VibrationFrame {
    #[serde(rename = "type")]
    kind: &'static str,
    left: u16,
    right: u16,
}

/// Forwards vibration requests to the gamepad bridge as JSON datagrams:
/// `{"type":"vibration","left":0,"right":65535}`.
pub struct BridgeHaptics {
    socket: UdpSocket,
    peer: Arc<Mutex<Option<SocketAddr>>>,
}

impl Haptics for BridgeHaptics {
    fn set_vibration(&mut self, left: u16, right: u16) {
        let Some(peer) = *self.peer.lock().unwrap_or_else(|p| p.into_inner()) else {
            return;
        };
        let frame = VibrationFrame {
            kind: "vibration",
            left,
            right,
        };
        match serde_json::to_vec(&frame) {
            Ok(bytes) => {
                if let Err(e) = self.socket.send_to(&bytes, peer) {
                    debug!(error = %e, %peer, "vibration request not delivered");
                }
            }
            Err(e) => debug!(error = %e, "vibration frame not serialisable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::Ipv4Addr;
    use std::thread;
    use tellopad_types::{Button, Stick};

    #[test]
    fn scripted_source_yields_in_order_then_exhausts() {
        let mut src = ScriptedSource::new([
            ControllerEvent::ButtonPressed { button: Button::Start },
            ControllerEvent::ButtonPressed { button: Button::Back },
        ]);
        assert!(!src.is_exhausted());
        assert_eq!(
            src.poll(),
            Some(ControllerEvent::ButtonPressed { button: Button::Start })
        );
        assert_eq!(
            src.poll(),
            Some(ControllerEvent::ButtonPressed { button: Button::Back })
        );
        assert!(src.is_exhausted());
        assert_eq!(src.poll(), None);
    }

    #[test]
    fn replay_line_with_delay() {
        let entry =
            parse_replay_line(r#"{"delay_ms":250,"type":"button_pressed","button":"START"}"#)
                .unwrap();
        assert_eq!(entry.delay, Duration::from_millis(250));
        assert_eq!(
            entry.event,
            ControllerEvent::ButtonPressed { button: Button::Start }
        );
    }

    #[test]
    fn replay_line_without_delay_defaults_to_zero() {
        let entry =
            parse_replay_line(r#"{"type":"stick_moved","stick":"RIGHT","x":0.1,"y":-1.0}"#)
                .unwrap();
        assert_eq!(entry.delay, Duration::ZERO);
        assert!(matches!(
            entry.event,
            ControllerEvent::StickMoved { stick: Stick::Right, .. }
        ));
    }

    #[test]
    fn replay_skips_comments_blanks_and_garbage() {
        assert!(parse_replay_line("").is_none());
        assert!(parse_replay_line("# takeoff first").is_none());
        assert!(parse_replay_line("not json").is_none());
        assert!(parse_replay_line(r#"{"type":"button_pressed","button":"GUIDE"}"#).is_none());
        assert!(parse_replay_line("[1, 2]").is_none());
    }

    #[test]
    fn replay_file_loads_valid_lines() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        writeln!(file, "# demo flight").unwrap();
        writeln!(file, r#"{{"type":"button_pressed","button":"START"}}"#).unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, r#"{{"type":"button_pressed","button":"BACK"}}"#).unwrap();

        let mut src = ReplaySource::open(file.path()).expect("open replay");
        assert_eq!(src.remaining(), 2);
        assert_eq!(
            src.poll(),
            Some(ControllerEvent::ButtonPressed { button: Button::Start })
        );
        assert_eq!(
            src.poll(),
            Some(ControllerEvent::ButtonPressed { button: Button::Back })
        );
        assert!(src.is_exhausted());
    }

    #[test]
    fn replay_open_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let res = ReplaySource::open(&dir.path().join("missing.jsonl"));
        assert!(matches!(res, Err(TelloError::Input(_))));
    }

    #[test]
    fn replay_holds_events_until_due() {
        let mut src = ReplaySource::from_entries([ReplayEntry {
            delay: Duration::from_millis(40),
            event: ControllerEvent::ButtonPressed { button: Button::Start },
        }]);
        assert_eq!(src.poll(), None);
        assert!(!src.is_exhausted());
        thread::sleep(Duration::from_millis(50));
        assert!(src.poll().is_some());
        assert!(src.is_exhausted());
    }

    #[test]
    fn udp_source_receives_bridge_events() {
        let mut src = UdpEventSource::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let addr = src.local_addr().unwrap();
        assert_eq!(src.poll(), None);

        let bridge = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        bridge.send_to(b"{broken", addr).unwrap();
        bridge
            .send_to(br#"{"type":"button_pressed","button":"B"}"#, addr)
            .unwrap();

        let mut got = None;
        for _ in 0..100 {
            got = src.poll();
            if got.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(got, Some(ControllerEvent::ButtonPressed { button: Button::B }));
        assert_eq!(src.peer(), Some(bridge.local_addr().unwrap()));
    }

    #[test]
    fn bridge_haptics_sends_vibration_frames_to_peer() {
        let mut src = UdpEventSource::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
        let addr = src.local_addr().unwrap();
        let mut haptics = src.haptics().unwrap();

        // No peer yet: silently dropped.
        haptics.set_vibration(1, 2);

        let bridge = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        bridge
            .send_to(br#"{"type":"connection_changed","connected":true}"#, addr)
            .unwrap();
        for _ in 0..100 {
            if src.poll().is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        haptics.set_vibration(65000, 45000);
        bridge
            .set_read_timeout(Some(Duration::from_secs(1)))
            .unwrap();
        let mut buf = [0u8; 128];
        let (n, _) = bridge.recv_from(&mut buf).unwrap();
        let frame: serde_json::Value = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(frame["type"], "vibration");
        assert_eq!(frame["left"], 65000);
        assert_eq!(frame["right"], 45000);
    }
}
