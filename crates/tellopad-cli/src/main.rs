//! `tellopad` – game controller to Tello flight commands.
//!
//! This binary:
//!
//! 1. Opens the UDP command socket and starts the response listener.
//! 2. Asks the operator for the target (`tello`, `laptop`, or a custom
//!    address and port).
//! 3. Checks for a controller and plays the acknowledgement rumble.
//! 4. Runs the setup script (`command`, `streamoff`, `speed 100`).
//! 5. Translates controller events into commands until the input source
//!    ends or Ctrl-C is pressed, which lands the aircraft first.

mod config;
mod console;
mod prompt;
mod target;

use colored::Colorize;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use config::InputSpec;
use console::TerminalConsole;
use tellopad_link::{CommandSender, Console, ResponseListener, SessionFlags, Transport, UdpTransport};
use tellopad_pilot::haptics::Haptics;
use tellopad_pilot::pilot::acknowledge_controller;
use tellopad_pilot::{
    Dispatcher, EventSource, NoHaptics, OperatorPrompt, Pilot, PilotExit, ReplaySource,
    SetupSequencer, UdpEventSource,
};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG filters (default "warn" so records do not break up the
    // prompts); TELLOPAD_LOG_FORMAT=json switches to newline-delimited JSON.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("TELLOPAD_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Ctrl-C ────────────────────────────────────────────────────────────
    // Before the dispatch loop is armed Ctrl-C just exits.  Once flying it
    // asks the loop to land and stop.
    let shutdown = Arc::new(AtomicBool::new(false));
    let armed = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        let armed = armed.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            if !armed.load(Ordering::SeqCst) || shutdown.swap(true, Ordering::SeqCst) {
                println!();
                process::exit(130);
            }
            println!();
            println!("{}", "⚠  Ctrl-C received – landing and exiting …".yellow().bold());
        }) {
            warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will not land the aircraft");
        }
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}", e.to_string().red());
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    let flags = Arc::new(SessionFlags::new());
    let console: Arc<dyn Console> = Arc::new(TerminalConsole);

    // ── Transport + response listener ─────────────────────────────────────
    let transport: Arc<dyn Transport> = match UdpTransport::open(cfg.local_port) {
        Ok(t) => Arc::new(t),
        Err(e) => {
            println!("{}: {}", "Cannot open a UDP socket".red(), e);
            process::exit(1);
        }
    };
    if transport.can_receive() {
        let listener = ResponseListener::new(transport.clone(), flags.clone(), console.clone());
        if let Err(e) = listener.spawn() {
            warn!(error = %e, "Failed to start the response listener; replies will not be shown");
        }
    } else {
        println!(
            "{} Port {} is already in use, probably by another running instance. \
             Close it to see replies; commands will still be sent.",
            "Warning:".yellow(),
            cfg.local_port
        );
    }

    // ── Target ────────────────────────────────────────────────────────────
    let Some(destination) = prompt::ask_target(&cfg) else {
        println!();
        process::exit(0);
    };
    println!(
        "> Will send packets to: {} - {}",
        destination.ip().to_string().bold(),
        destination.port().to_string().bold()
    );
    let sender = CommandSender::new(transport, destination, flags.clone(), console.clone());

    // ── Input source ──────────────────────────────────────────────────────
    let (source, mut haptics) = match open_input(&cfg) {
        Ok(pair) => pair,
        Err(e) => {
            println!("{}: {}", "Input error".red(), e);
            process::exit(1);
        }
    };
    let operator_prompt: Box<dyn OperatorPrompt> = match prompt::LinePrompt::new() {
        Ok(p) => Box::new(p),
        Err(e) => {
            warn!(error = %e, "line editor unavailable; falling back to plain stdin");
            Box::new(prompt::StdinPrompt)
        }
    };

    let mut pilot = Pilot::new(
        Dispatcher::new(flags),
        source,
        operator_prompt,
        sender.clone(),
        console,
    )
    .with_poll_interval(cfg.poll_interval())
    .with_shutdown(shutdown);

    // ── Controller check ──────────────────────────────────────────────────
    if pilot.detect_controller() {
        println!("{}", "\n> Controller detected!".green());
        if cfg.rumble {
            acknowledge_controller(haptics.as_mut());
        }
    } else {
        println!(
            "{}",
            "\n> Warning: Controller isn't detected. Is it turned on and connected to the input bridge?"
                .red()
        );
    }

    // ── Setup ─────────────────────────────────────────────────────────────
    println!("{}", "\n> Starting setup...".green());
    SetupSequencer::new(cfg.setup_delay()).run(&sender);
    println!("{}", "> Setup finished!\n".green());

    // ── Fly ───────────────────────────────────────────────────────────────
    armed.store(true, Ordering::SeqCst);
    match pilot.run() {
        PilotExit::SourceExhausted => println!("{}", "> Input source finished.".dimmed()),
        PilotExit::Shutdown => println!("{}", "  ✓ Land sent. Exiting tellopad.".green()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

fn open_input(cfg: &config::Config) -> Result<(Box<dyn EventSource>, Box<dyn Haptics>), String> {
    match cfg.input_spec()? {
        InputSpec::Replay(path) => {
            let source = ReplaySource::open(&path).map_err(|e| e.to_string())?;
            println!(
                "  Replaying {} event(s) from {}",
                source.remaining(),
                path.display().to_string().bold()
            );
            Ok((Box::new(source), Box::new(NoHaptics)))
        }
        InputSpec::Udp(addr) => {
            let source = UdpEventSource::bind(addr).map_err(|e| e.to_string())?;
            println!("  Listening for controller events on {}", addr.to_string().bold());
            let haptics: Box<dyn Haptics> = match source.haptics() {
                Ok(h) => Box::new(h),
                Err(e) => {
                    warn!(error = %e, "rumble unavailable");
                    Box::new(NoHaptics)
                }
            };
            Ok((Box::new(source), haptics))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "tellopad".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Game controller flight deck for Tello");
    println!();
}
