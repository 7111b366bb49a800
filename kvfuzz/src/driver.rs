use std::{
    fmt::{self, Display},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use rand::Rng;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    random,
    service::{KeyValueService, ServiceError},
    settings::Settings,
    tracker::KeyTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Modify,
    Delete,
    List,
}

impl Operation {
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Read,
        Self::Modify,
        Self::Delete,
        Self::List,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Modify => "modify",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The service answered 200.
    Success,
    /// The service answered with any other status.
    Failure,
    /// No usable answer: the request failed in transport or the body was garbage.
    Error,
    /// Nothing to operate on, no request was sent.
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: u64,
    pub failed: u64,
    pub errored: u64,
    pub skipped: u64,
}

impl Tally {
    const fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.succeeded += 1,
            Outcome::Failure => self.failed += 1,
            Outcome::Error => self.errored += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.succeeded + self.failed + self.errored + self.skipped
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    tallies: [Tally; Operation::ALL.len()],
    forced_deletes: u64,
}

impl RunStats {
    #[must_use]
    pub const fn tally(&self, operation: Operation) -> Tally {
        self.tallies[operation as usize]
    }

    /// Iterations where the tracker was at capacity, so delete was picked without a draw.
    #[must_use]
    pub const fn forced_deletes(&self) -> u64 {
        self.forced_deletes
    }

    #[must_use]
    pub fn operations(&self) -> u64 {
        self.tallies.iter().map(Tally::total).sum()
    }

    const fn record(&mut self, operation: Operation, outcome: Outcome) {
        self.tallies[operation as usize].record(outcome);
    }
}

/// Issues random operations against a [`KeyValueService`], one at a time, keeping a
/// [`KeyTracker`] of the keys that should exist.
///
/// The tracker is only changed by a successful response. A failed create or delete might
/// still have taken effect on the server, we don't guess, and only a successful `list`
/// brings the tracker back in line.
pub struct Driver<S, R> {
    service: S,
    rng: R,
    settings: Settings,
    tracker: KeyTracker,
    stats: RunStats,
}

impl<S: KeyValueService, R: Rng> Driver<S, R> {
    pub fn new(service: S, settings: Settings, rng: R) -> Self {
        Self {
            service,
            rng,
            settings,
            tracker: KeyTracker::new(),
            stats: RunStats::default(),
        }
    }

    pub const fn tracker(&self) -> &KeyTracker {
        &self.tracker
    }

    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn at_capacity(&self) -> bool {
        self.tracker.size() >= self.settings.max_keys
    }

    /// Delete while at capacity, otherwise any operation with equal probability.
    pub fn select(&mut self) -> Operation {
        if self.at_capacity() {
            return Operation::Delete;
        }

        Operation::ALL[self.rng.random_range(0..Operation::ALL.len())]
    }

    /// Runs until `stop` is set. The flag is only checked between iterations, a request that
    /// is already in flight is always waited for.
    #[instrument(skip_all)]
    pub async fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            self.step().await;

            let pause = self.rng.random_range(self.settings.pause_seconds.clone());
            debug!(pause, "sleeping before the next operation");
            tokio::time::sleep(Duration::from_secs(pause)).await;
        }

        self.log_summary();
    }

    pub async fn step(&mut self) -> Operation {
        if self.at_capacity() {
            self.stats.forced_deletes += 1;
            debug!(
                tracked = self.tracker.size(),
                max_keys = self.settings.max_keys,
                "too many keys, forcing a delete"
            );
        }

        let operation = self.select();
        self.perform(operation).await;

        operation
    }

    pub async fn perform(&mut self, operation: Operation) -> Outcome {
        let outcome = match operation {
            Operation::Create => self.create().await,
            Operation::Read => self.read().await,
            Operation::Modify => self.modify().await,
            Operation::Delete => self.delete().await,
            Operation::List => self.list().await,
        };

        self.stats.record(operation, outcome);

        outcome
    }

    fn pick_target(&mut self) -> Option<String> {
        self.tracker
            .pick_random(&mut self.rng)
            .map(str::to_string)
    }

    #[instrument(skip_all)]
    async fn create(&mut self) -> Outcome {
        let key = random::alphanumeric(&mut self.rng, self.settings.key_length);
        let value = random::alphanumeric(&mut self.rng, self.settings.value_length);

        match self.service.create(&key, &value).await {
            Ok(()) => {
                info!(%key, "created key {key}");
                self.tracker.add(key);

                Outcome::Success
            }
            Err(error) => report(Operation::Create, Some(&key), &error),
        }
    }

    #[instrument(skip_all)]
    async fn read(&mut self) -> Outcome {
        let Some(key) = self.pick_target() else {
            info!("no keys available to read");
            return Outcome::Skipped;
        };

        match self.service.read(&key).await {
            Ok(data) => {
                info!(%key, %data, "read key {key}, data: {data}");

                Outcome::Success
            }
            Err(error) => report(Operation::Read, Some(&key), &error),
        }
    }

    #[instrument(skip_all)]
    async fn modify(&mut self) -> Outcome {
        let Some(key) = self.pick_target() else {
            info!("no keys available to modify");
            return Outcome::Skipped;
        };
        let value = random::alphanumeric(&mut self.rng, self.settings.value_length);

        match self.service.modify(&key, &value).await {
            Ok(()) => {
                info!(%key, "modified key {key}");

                Outcome::Success
            }
            Err(error) => report(Operation::Modify, Some(&key), &error),
        }
    }

    #[instrument(skip_all)]
    async fn delete(&mut self) -> Outcome {
        let Some(key) = self.pick_target() else {
            info!("no keys available to delete");
            return Outcome::Skipped;
        };

        match self.service.delete(&key).await {
            Ok(()) => {
                self.tracker.remove(&key);
                info!(%key, "deleted key {key}");

                Outcome::Success
            }
            Err(error) => report(Operation::Delete, Some(&key), &error),
        }
    }

    #[instrument(skip_all)]
    async fn list(&mut self) -> Outcome {
        match self.service.list().await {
            Ok(keys) => {
                let previous = self.tracker.size();
                self.tracker.replace_all(keys);
                info!(
                    previous,
                    listed = self.tracker.size(),
                    "listed {} keys, replaced {previous} tracked keys",
                    self.tracker.size()
                );

                Outcome::Success
            }
            Err(error) => report(Operation::List, None, &error),
        }
    }

    fn log_summary(&self) {
        for operation in Operation::ALL {
            let tally = self.stats.tally(operation);

            info!(
                %operation,
                succeeded = tally.succeeded,
                failed = tally.failed,
                errored = tally.errored,
                skipped = tally.skipped,
                "{operation}: {} succeeded, {} failed, {} errored, {} skipped",
                tally.succeeded,
                tally.failed,
                tally.errored,
                tally.skipped
            );
        }

        info!(
            operations = self.stats.operations(),
            forced_deletes = self.stats.forced_deletes,
            tracked = self.tracker.size(),
            "loop finished"
        );
    }
}

/// Logs a failed operation. Callers leave the tracker as it was.
fn report(operation: Operation, key: Option<&str>, error: &ServiceError) -> Outcome {
    match error {
        ServiceError::Status(status) => {
            warn!(key, status = status.as_u16(), "{operation} failed: {error}");

            Outcome::Failure
        }
        ServiceError::Transport(_) => {
            error!(key, "{operation} failed: {error}");

            Outcome::Error
        }
    }
}
