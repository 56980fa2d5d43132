//! [`Pilot`] – the dispatch loop.
//!
//! Polls the [`EventSource`] every `poll_interval`, feeds each event to the
//! [`Dispatcher`] in delivery order, and carries out the resulting
//! [`Action`].  The loop is single-threaded; the response listener runs on
//! its own thread and only shares the session flags and the transport.
//!
//! While the operator prompt is open the loop is blocked; pending controller
//! events stay queued in the source.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tellopad_link::{CommandSender, Console};
use tellopad_types::{Command, ControllerEvent};
use tracing::{info, warn};

use crate::dispatcher::{Action, Dispatcher};
use crate::haptics::{self, Haptics};
use crate::source::EventSource;

/// Default polling period of the dispatch loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Blocking source of operator-typed commands.
pub trait OperatorPrompt {
    /// Ask for one line.  `None` means the operator cancelled.
    fn read_command(&mut self) -> Option<String>;
}

/// Why [`Pilot::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotExit {
    /// The event source has nothing more to give.
    SourceExhausted,
    /// Shutdown was requested; `land` was sent.
    Shutdown,
}

pub struct Pilot {
    dispatcher: Dispatcher,
    source: Box<dyn EventSource>,
    prompt: Box<dyn OperatorPrompt>,
    sender: CommandSender,
    console: Arc<dyn Console>,
    poll_interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Pilot {
    pub fn new(
        dispatcher: Dispatcher,
        source: Box<dyn EventSource>,
        prompt: Box<dyn OperatorPrompt>,
        sender: CommandSender,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            dispatcher,
            source,
            prompt,
            sender,
            console,
            poll_interval: DEFAULT_POLL_INTERVAL,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Stop the loop (and land) once `shutdown` becomes `true`.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Drain the events pending at startup and report whether one of them
    /// announced a connected controller.  Everything drained is discarded.
    pub fn detect_controller(&mut self) -> bool {
        let mut detected = false;
        while let Some(event) = self.source.poll() {
            if matches!(event, ControllerEvent::ConnectionChanged { connected: true }) {
                detected = true;
            }
        }
        detected
    }

    /// Run until the source is exhausted or shutdown is requested.
    pub fn run(&mut self) -> PilotExit {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "dispatch loop started");
        loop {
            if self.shutdown_requested() {
                return self.land_and_exit();
            }
            thread::sleep(self.poll_interval);
            while let Some(event) = self.source.poll() {
                self.step(&event);
                if self.shutdown_requested() {
                    return self.land_and_exit();
                }
            }
            if self.source.is_exhausted() {
                info!("event source exhausted");
                return PilotExit::SourceExhausted;
            }
        }
    }

    /// Process one event.  Returns the command that was sent, if any.
    pub fn step(&mut self, event: &ControllerEvent) -> Option<Command> {
        let dispatch = self.dispatcher.handle(event);
        if let Some(line) = &dispatch.trace {
            self.console.trace(line);
        }
        match dispatch.action {
            Action::None => None,
            Action::Send(command) => self.send(command),
            Action::PromptOperator => {
                let text = self.prompt.read_command();
                match text {
                    Some(text) => match self.dispatcher.submit_operator_text(&text) {
                        Ok(command) => self.send(command),
                        Err(e) => {
                            warn!(error = %e, "operator command dropped");
                            self.console.notice(&format!("Command not sent: {e}"));
                            None
                        }
                    },
                    None => {
                        self.dispatcher.cancel_operator_text();
                        None
                    }
                }
            }
            Action::DebugToggled(on) => {
                let line = if on {
                    "Debug mode is now turned on. Press L3 to deactivate."
                } else {
                    "Debug mode is now turned off. Press L3 to activate."
                };
                self.console.notice(line);
                None
            }
        }
    }

    fn send(&self, command: Command) -> Option<Command> {
        // Failures are logged by the sender and never retried.
        let _ = self.sender.send(&command);
        Some(command)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn land_and_exit(&self) -> PilotExit {
        info!("shutdown requested; landing");
        let _ = self.sender.send(&Command::new("land"));
        PilotExit::Shutdown
    }
}

/// Play the "controller detected" rumble.
pub fn acknowledge_controller(device: &mut dyn Haptics) {
    haptics::play(device, &haptics::acknowledgement_pattern());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tellopad_link::SessionFlags;
    use tellopad_link::sim::{MemoryTransport, RecordingConsole};
    use tellopad_link::{ConsoleLine, ResponseListener};
    use tellopad_types::{Button, Stick};

    use crate::source::ScriptedSource;

    struct CannedPrompt {
        answers: VecDeque<Option<String>>,
    }

    impl CannedPrompt {
        fn silent() -> Box<Self> {
            Box::new(Self {
                answers: VecDeque::new(),
            })
        }

        fn new(answers: impl IntoIterator<Item = Option<&'static str>>) -> Box<Self> {
            Box::new(Self {
                answers: answers.into_iter().map(|a| a.map(str::to_string)).collect(),
            })
        }
    }

    impl OperatorPrompt for CannedPrompt {
        fn read_command(&mut self) -> Option<String> {
            self.answers.pop_front().flatten()
        }
    }

    struct Rig {
        pilot: Pilot,
        transport: Arc<MemoryTransport>,
        flags: Arc<SessionFlags>,
        console: Arc<RecordingConsole>,
    }

    fn rig(events: Vec<ControllerEvent>, prompt: Box<dyn OperatorPrompt>) -> Rig {
        let transport = MemoryTransport::new();
        let flags = Arc::new(SessionFlags::new());
        let console = RecordingConsole::new();
        let sender = CommandSender::new(
            transport.clone(),
            "192.168.10.1:8889".parse().unwrap(),
            flags.clone(),
            console.clone(),
        );
        let pilot = Pilot::new(
            Dispatcher::new(flags.clone()),
            Box::new(ScriptedSource::new(events)),
            prompt,
            sender,
            console.clone(),
        )
        .with_poll_interval(Duration::ZERO);
        Rig {
            pilot,
            transport,
            flags,
            console,
        }
    }

    fn press(button: Button) -> ControllerEvent {
        ControllerEvent::ButtonPressed { button }
    }

    #[test]
    fn runs_events_in_order_until_exhausted() {
        let mut r = rig(
            vec![
                press(Button::Start),
                ControllerEvent::StickMoved { stick: Stick::Left, x: 0.5, y: -0.5 },
                press(Button::LeftShoulder),
                press(Button::Back),
            ],
            CannedPrompt::silent(),
        );
        assert_eq!(r.pilot.run(), PilotExit::SourceExhausted);
        assert_eq!(r.transport.sent_text(), vec!["takeoff", "rc 50 -50 0 0", "land"]);
    }

    #[test]
    fn operator_text_is_sent_verbatim() {
        let mut r = rig(vec![press(Button::A)], CannedPrompt::new([Some("forward 50")]));
        r.pilot.run();
        assert_eq!(r.transport.sent_text(), vec!["forward 50"]);
        assert!(r.flags.expect_one_response());
    }

    #[test]
    fn cancelled_prompt_sends_nothing() {
        let mut r = rig(vec![press(Button::A)], CannedPrompt::new([None]));
        r.pilot.run();
        assert!(r.transport.sent().is_empty());
        assert!(!r.flags.expect_one_response());
    }

    #[test]
    fn invalid_operator_text_is_dropped_with_notice() {
        let mut r = rig(vec![press(Button::A)], CannedPrompt::new([Some("")]));
        r.pilot.run();
        assert!(r.transport.sent().is_empty());
        assert!(matches!(
            r.console.lines().as_slice(),
            [ConsoleLine::Notice(msg)] if msg.starts_with("Command not sent")
        ));
    }

    #[test]
    fn debug_toggle_announces_and_traces() {
        let mut r = rig(
            vec![press(Button::LeftThumb), press(Button::Back), press(Button::LeftThumb)],
            CannedPrompt::silent(),
        );
        r.pilot.run();
        assert_eq!(
            r.console.lines(),
            vec![
                ConsoleLine::Notice(
                    "Debug mode is now turned on. Press L3 to deactivate.".to_string()
                ),
                ConsoleLine::Trace("BACK pressed".to_string()),
                ConsoleLine::Sent {
                    command: "land".to_string(),
                    hex: "6c616e64".to_string()
                },
                ConsoleLine::Trace("LEFT_THUMB pressed".to_string()),
                ConsoleLine::Notice(
                    "Debug mode is now turned off. Press L3 to activate.".to_string()
                ),
            ]
        );
    }

    #[test]
    fn shutdown_lands_and_stops() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let r = rig(vec![press(Button::Start)], CannedPrompt::silent());
        let mut pilot = r.pilot.with_shutdown(shutdown);
        assert_eq!(pilot.run(), PilotExit::Shutdown);
        assert_eq!(r.transport.sent_text(), vec!["land"]);
    }

    #[test]
    fn detect_controller_drains_startup_events() {
        let mut r = rig(
            vec![
                press(Button::Start),
                ControllerEvent::ConnectionChanged { connected: true },
            ],
            CannedPrompt::silent(),
        );
        assert!(r.pilot.detect_controller());
        assert_eq!(r.pilot.run(), PilotExit::SourceExhausted);
        assert!(r.transport.sent().is_empty());
    }

    #[test]
    fn no_controller_detected_without_connect_event() {
        let mut r = rig(vec![press(Button::Start)], CannedPrompt::silent());
        assert!(!r.pilot.detect_controller());
    }

    #[test]
    fn battery_query_reply_is_shown_once() {
        let mut r = rig(
            vec![
                press(Button::B),
                ControllerEvent::StickMoved { stick: Stick::Right, x: 0.0, y: 0.1 },
            ],
            CannedPrompt::silent(),
        );
        let listener =
            ResponseListener::new(r.transport.clone(), r.flags.clone(), r.console.clone());

        assert_eq!(r.pilot.step(&press(Button::B)), Some(Command::new("battery?")));
        assert!(listener.handle_datagram(b"87%").unwrap());

        r.pilot.step(&ControllerEvent::StickMoved { stick: Stick::Right, x: 0.0, y: 0.1 });
        assert!(!r.flags.expect_one_response());
        assert!(!listener.handle_datagram(b"ok").unwrap());
        assert_eq!(r.console.responses(), vec!["87%".to_string()]);
    }

    #[test]
    fn send_failures_do_not_stop_the_loop() {
        let flags = Arc::new(SessionFlags::new());
        let console = RecordingConsole::new();
        let sender = CommandSender::new(
            MemoryTransport::failing(),
            "192.168.10.1:8889".parse().unwrap(),
            flags.clone(),
            console.clone(),
        );
        let mut pilot = Pilot::new(
            Dispatcher::new(flags),
            Box::new(ScriptedSource::new([press(Button::Start), press(Button::Back)])),
            CannedPrompt::silent(),
            sender,
            console,
        )
        .with_poll_interval(Duration::ZERO);
        assert_eq!(pilot.run(), PilotExit::SourceExhausted);
    }
}
