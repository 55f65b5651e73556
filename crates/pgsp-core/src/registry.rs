//! Entry registry: the set of operations currently shown.
//!
//! Each tick the scheduler merges every fetched batch into the registry and
//! then runs one eviction pass:
//!
//! ```text
//!   fetched record ──► identity (kind, pid) ──► known? ──yes──► replace record, last_seen = now
//!                                                  │                (render state kept)
//!                                                  no
//!                                                  ▼
//!                                        new entry, fresh bar
//!
//!   after all batches: drop entries with now - last_seen >= retention
//! ```
//!
//! An operation that disappears from its view has finished (or failed, or
//! was cancelled). Its entry stays, frozen at the last observed record, until
//! the retention window has passed so the user sees it complete.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::models::{Identity, ProgressInfo, ProgressRecord};
use crate::tui::widgets::{BarError, ProgressBar};

/// One tracked operation.
#[derive(Debug)]
pub struct TrackedEntry {
    identity: Identity,
    record: ProgressRecord,
    last_seen: Instant,
    first_seen_at: DateTime<Local>,
    serial: u64,
    bar: Option<ProgressBar>,
}

impl TrackedEntry {
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Latest observed record.
    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// Wall-clock time the operation was first observed.
    pub fn first_seen_at(&self) -> DateTime<Local> {
        self.first_seen_at
    }

    /// Registry-unique number assigned at creation; never changes on update.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Render state, absent when the bar could not be built.
    pub fn bar(&self) -> Option<&ProgressBar> {
        self.bar.as_ref()
    }

    /// Time since the operation was last observed.
    pub fn unseen_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}

/// Insertion-ordered store of tracked operations.
#[derive(Debug)]
pub struct Registry {
    entries: Vec<TrackedEntry>,
    retention: Duration,
    bar_width: u16,
    next_serial: u64,
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// `retention` is how long a vanished operation stays visible;
    /// `bar_width` is the width given to newly created bars.
    pub fn new(retention: Duration, bar_width: u16) -> Self {
        Self {
            entries: Vec::new(),
            retention,
            bar_width,
            next_serial: 0,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn entries(&self) -> &[TrackedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, identity: &Identity) -> Option<&TrackedEntry> {
        self.entries.iter().find(|e| e.identity == *identity)
    }

    /// Resizes every bar, and bars created from now on.
    pub fn set_bar_width(&mut self, width: u16) {
        self.bar_width = width;
        for bar in self.entries.iter_mut().filter_map(|e| e.bar.as_mut()) {
            bar.set_width(width);
        }
    }

    /// Merges one fetched batch observed at `now`.
    ///
    /// Known identities get their record replaced and `last_seen` refreshed;
    /// their render state is kept. Unknown identities are appended with a
    /// fresh bar. A duplicate identity inside the batch overwrites the
    /// earlier occurrence.
    pub fn merge<I>(&mut self, batch: I, now: Instant)
    where
        I: IntoIterator<Item = ProgressRecord>,
    {
        self.merge_with(batch, now, |record, width| {
            ProgressBar::new(record.display_color(), width)
        });
    }

    /// Like [`Registry::merge`], building bars for new entries with `make_bar`.
    ///
    /// A failed bar is logged and the entry is tracked without one.
    pub(crate) fn merge_with<I, F>(&mut self, batch: I, now: Instant, mut make_bar: F)
    where
        I: IntoIterator<Item = ProgressRecord>,
        F: FnMut(&ProgressRecord, u16) -> Result<ProgressBar, BarError>,
    {
        for record in batch {
            let identity = record.identity();
            if let Some(entry) = self.entries.iter_mut().find(|e| e.identity == identity) {
                entry.record = record;
                entry.last_seen = now;
                continue;
            }

            let bar = match make_bar(&record, self.bar_width) {
                Ok(bar) => Some(bar),
                Err(e) => {
                    warn!(kind = %identity.kind, pid = identity.pid, error = %e,
                        "completion bar unavailable");
                    None
                }
            };
            debug!(kind = %identity.kind, pid = identity.pid, "tracking new operation");

            self.entries.push(TrackedEntry {
                identity,
                record,
                last_seen: now,
                first_seen_at: Local::now(),
                serial: self.next_serial,
                bar,
            });
            self.next_serial += 1;
        }
    }

    /// Drops entries not observed for at least the retention window.
    ///
    /// Returns the number of entries removed.
    pub fn evict(&mut self, now: Instant) -> usize {
        let retention = self.retention;
        let before = self.entries.len();
        self.entries.retain(|e| {
            let keep = e.unseen_for(now) < retention;
            if !keep {
                debug!(kind = %e.identity.kind, pid = e.identity.pid, "operation aged out");
            }
            keep
        });
        before - self.entries.len()
    }

    /// Merges every batch of one tick, then evicts.
    pub fn reconcile<B, I>(&mut self, batches: B, now: Instant) -> usize
    where
        B: IntoIterator<Item = I>,
        I: IntoIterator<Item = ProgressRecord>,
    {
        for batch in batches {
            self.merge(batch, now);
        }
        self.evict(now)
    }
}
