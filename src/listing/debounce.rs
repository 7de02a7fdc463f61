//! Debounced search glue.
//!
//! Raw search input is held as a single pending value. It takes effect only
//! once the quiescence window passes with no newer input; every submission
//! supersedes the previous one, so at most one value is ever pending.

use std::time::{Duration, Instant};

/// Identifies one submission. Only the most recent ticket can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceTicket(u64);

#[derive(Debug, Clone)]
struct Pending {
    text: String,
    deadline: Instant,
    ticket: DebounceTicket,
}

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    window: Duration,
    pending: Option<Pending>,
    issued: u64,
}

impl SearchDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            issued: 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queues `text`, replacing anything pending, and restarts the window from `now`.
    pub fn submit(&mut self, text: impl Into<String>, now: Instant) -> DebounceTicket {
        self.issued += 1;
        let ticket = DebounceTicket(self.issued);
        self.pending = Some(Pending {
            text: text.into(),
            deadline: now + self.window,
            ticket,
        });
        ticket
    }

    /// Releases the pending text once its window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.pending.take().map(|p| p.text),
            _ => None,
        }
    }

    /// Releases the pending text when `ticket` is still current.
    ///
    /// Used by timer tasks: a stale ticket means newer input arrived after
    /// the timer started, so the firing is discarded.
    pub fn fire(&mut self, ticket: DebounceTicket) -> Option<String> {
        match &self.pending {
            Some(p) if p.ticket == ticket => self.pending.take().map(|p| p.text),
            _ => None,
        }
    }

    /// Drops pending input without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
