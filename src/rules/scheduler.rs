//! Tick-aligned job scheduling.
//!
//! The host calls into the engine once per game tick. Jobs are registered
//! either as one-shots (`after`) or as repeating jobs (`every`); a repeating
//! job first fires `interval` ticks after registration, then every `interval`
//! ticks. Jobs due on the same tick come out in registration order and each
//! runs to completion before the next.

use serde::Serialize;

/// Work the engine knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Job {
    /// Create the ledger objective and announce readiness.
    Startup,
    RefreshBalances,
    Transfers,
    FirstItemRewards,
    Milestones,
    /// Index into the engine's achievement list.
    Achievement(usize),
}

#[derive(Debug, Clone)]
struct Entry {
    job: Job,
    interval: Option<u64>,
    next_due: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    tick: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks elapsed since creation.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Run `job` every `interval` ticks. An interval of zero is treated as one.
    pub fn every(&mut self, interval: u64, job: Job) {
        let interval = interval.max(1);
        self.entries.push(Entry {
            job,
            interval: Some(interval),
            next_due: self.tick + interval,
        });
    }

    /// Run `job` once, `delay` ticks from now.
    pub fn after(&mut self, delay: u64, job: Job) {
        self.entries.push(Entry {
            job,
            interval: None,
            next_due: self.tick + delay.max(1),
        });
    }

    /// Number of registered jobs still pending.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance one tick and return the jobs due on it.
    pub fn advance(&mut self) -> Vec<Job> {
        self.tick += 1;
        let now = self.tick;
        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            if entry.next_due > now {
                return true;
            }
            due.push(entry.job);
            match entry.interval {
                Some(interval) => {
                    entry.next_due = now + interval;
                    true
                }
                None => false,
            }
        });
        due
    }
}
