//! [`SessionFlags`] – mode flags shared between the dispatch loop and the
//! response listener.
//!
//! The dispatcher is the only writer of `debug_mode`, `print_response` and
//! `print_sent`.  `expect_one_response` is raised by the dispatcher when it
//! issues a query and consumed by the listener once the reply has been
//! shown.  Reads may observe a write one receive cycle late; the flags only
//! gate console output.
//!
//! # Example
//!
//! ```
//! use tellopad_link::SessionFlags;
//!
//! let flags = SessionFlags::new();
//! assert!(flags.toggle_debug());
//! assert!(flags.print_response() && flags.print_sent());
//! assert!(!flags.toggle_debug());
//! assert!(!flags.print_response() && !flags.print_sent());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

/// Atomic mode flags.  Share via `Arc<SessionFlags>`.
#[derive(Debug, Default)]
pub struct SessionFlags {
    debug_mode: AtomicBool,
    print_response: AtomicBool,
    print_sent: AtomicBool,
    expect_one_response: AtomicBool,
}

impl SessionFlags {
    /// All flags start cleared.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode.load(Ordering::SeqCst)
    }

    pub fn print_response(&self) -> bool {
        self.print_response.load(Ordering::SeqCst)
    }

    pub fn print_sent(&self) -> bool {
        self.print_sent.load(Ordering::SeqCst)
    }

    pub fn expect_one_response(&self) -> bool {
        self.expect_one_response.load(Ordering::SeqCst)
    }

    /// Set debug mode; `print_response` and `print_sent` follow it.
    pub fn set_debug(&self, on: bool) {
        self.debug_mode.store(on, Ordering::SeqCst);
        self.print_response.store(on, Ordering::SeqCst);
        self.print_sent.store(on, Ordering::SeqCst);
    }

    /// Flip debug mode and return the new value.
    pub fn toggle_debug(&self) -> bool {
        let on = !self.debug_mode();
        self.set_debug(on);
        on
    }

    pub fn set_expect_one_response(&self, expect: bool) {
        self.expect_one_response.store(expect, Ordering::SeqCst);
    }

    /// Clear `expect_one_response`, returning whether it was set.
    pub fn take_expected_response(&self) -> bool {
        self.expect_one_response.swap(false, Ordering::SeqCst)
    }
}
