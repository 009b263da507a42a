//! Reload scheduling: debounced change notifications, fallback polling,
//! watch re-arming and hash-based suppression of redundant reloads.
//!
//! Timers are stored deadlines checked against the caller's clock, so the
//! event loop owns all timing and tests can drive it with fake instants.

use std::time::{Duration, Instant};

use crate::model::BoardConfig;

/// Why a reload was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadSource {
    Startup,
    Manual,
    Mutation,
    Poll,
    Watch,
}

impl ReloadSource {
    /// Manual, mutation and startup reloads apply even when nothing changed.
    pub fn always_applies(self) -> bool {
        matches!(
            self,
            ReloadSource::Startup | ReloadSource::Manual | ReloadSource::Mutation
        )
    }
}

/// Identifies one in-flight reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    pub seq: u64,
    pub source: ReloadSource,
}

/// Scheduler timers that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Due {
    Reload(ReloadSource),
    RearmWatch,
}

/// What to do with a finished reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Apply,
    /// Payload identical to the last applied one
    Unchanged,
    /// A newer reload has already been applied
    Stale,
}

#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    debounce: Duration,
    poll_interval: Duration,
    watch_backoff: Duration,
    debounce_deadline: Option<Instant>,
    next_poll: Instant,
    rearm_at: Option<Instant>,
    last_hash: Option<u64>,
    next_seq: u64,
    last_applied_seq: u64,
    /// Number of reloads applied so far
    pub applied: u64,
    /// Number of reloads dropped as unchanged or stale
    pub suppressed: u64,
}

impl RefreshScheduler {
    pub fn new(debounce: Duration, poll_interval: Duration, watch_backoff: Duration, now: Instant) -> Self {
        RefreshScheduler {
            debounce,
            poll_interval,
            watch_backoff,
            debounce_deadline: None,
            next_poll: now + poll_interval,
            rearm_at: None,
            last_hash: None,
            next_seq: 1,
            last_applied_seq: 0,
            applied: 0,
            suppressed: 0,
        }
    }

    pub fn from_config(config: &BoardConfig, now: Instant) -> Self {
        Self::new(
            config.debounce(),
            config.poll_interval(),
            config.watch_backoff(),
            now,
        )
    }

    /// A change marker was touched: (re)start the single debounce timer.
    pub fn notify_change(&mut self, now: Instant) {
        self.debounce_deadline = Some(now + self.debounce);
    }

    /// The watch broke: re-arm after the backoff delay. Further failures
    /// while a re-arm is pending keep the original deadline. Returns true
    /// when this failure started a new backoff.
    pub fn watch_failed(&mut self, now: Instant) -> bool {
        if self.rearm_at.is_some() {
            return false;
        }
        self.rearm_at = Some(now + self.watch_backoff);
        true
    }

    pub fn is_rearm_pending(&self) -> bool {
        self.rearm_at.is_some()
    }

    /// Allocate a ticket for a reload about to be issued.
    pub fn ticket(&mut self, source: ReloadSource) -> ReloadTicket {
        let seq = self.next_seq;
        self.next_seq += 1;
        ReloadTicket { seq, source }
    }

    /// Fire every timer whose deadline has passed. At most one reload is
    /// returned; a debounced change wins over a poll that is due together.
    pub fn due(&mut self, now: Instant) -> Vec<Due> {
        let mut out = Vec::new();
        let mut reload = None;

        if self.debounce_deadline.is_some_and(|d| now >= d) {
            self.debounce_deadline = None;
            reload = Some(ReloadSource::Watch);
        }
        if now >= self.next_poll {
            self.next_poll = now + self.poll_interval;
            reload.get_or_insert(ReloadSource::Poll);
        }
        if let Some(source) = reload {
            out.push(Due::Reload(source));
        }
        if self.rearm_at.is_some_and(|d| now >= d) {
            self.rearm_at = None;
            out.push(Due::RearmWatch);
        }
        out
    }

    /// Earliest pending deadline, for sizing the event-loop wait.
    pub fn next_deadline(&self) -> Instant {
        [self.debounce_deadline, self.rearm_at]
            .into_iter()
            .flatten()
            .fold(self.next_poll, Instant::min)
    }

    /// Decide whether a finished reload replaces the model, and record it.
    pub fn accept(&mut self, ticket: ReloadTicket, hash: u64) -> Acceptance {
        if ticket.seq < self.last_applied_seq {
            self.suppressed += 1;
            return Acceptance::Stale;
        }
        if !ticket.source.always_applies() && self.last_hash == Some(hash) {
            self.suppressed += 1;
            return Acceptance::Unchanged;
        }
        self.last_hash = Some(hash);
        self.last_applied_seq = ticket.seq;
        self.applied += 1;
        Acceptance::Apply
    }
}
