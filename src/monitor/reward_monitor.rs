use std::time::Duration;

use alloy::{primitives::Address, rpc::types::Log};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_stream::{Stream, StreamExt};

use crate::{
    SubscriptionError,
    monitor::{Alert, RoundState, StreamKind, round_number},
    notifier::Notifier,
    source::LogResult,
};

/// Default time to wait after a round starts before alerting.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2 * 60 * 60);
/// Default repeat interval; zero disables the periodic check.
pub const DEFAULT_NOTIFY_INTERVAL: Duration = Duration::ZERO;

/// Correlates NewRound and Reward logs for one orchestrator and raises alerts.
///
/// The monitor owns its [`RoundState`] and handles one input at a time, so the alert text always
/// reflects the state at the moment its trigger was processed.
#[derive(Debug)]
pub struct RewardMonitor<T: Notifier> {
    orchestrator: Address,
    delay: Duration,
    notify_interval: Duration,
    notifier: T,
    state: RoundState,
}

impl<T: Notifier> RewardMonitor<T> {
    #[must_use]
    pub fn new(orchestrator: Address, notifier: T) -> Self {
        Self {
            orchestrator,
            delay: DEFAULT_DELAY,
            notify_interval: DEFAULT_NOTIFY_INTERVAL,
            notifier,
            state: RoundState::new(),
        }
    }

    /// Set how long after a round starts a missing reward becomes alert-worthy.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the period of the missing-reward check. [`Duration::ZERO`] disables it.
    #[must_use]
    pub fn notify_interval(mut self, notify_interval: Duration) -> Self {
        self.notify_interval = notify_interval;
        self
    }

    #[must_use]
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    #[must_use]
    pub fn notifier(&self) -> &T {
        &self.notifier
    }

    /// Run the monitoring loop until either stream fails.
    ///
    /// Waits on the reward stream, the round stream and the tick timer, handling whichever is
    /// ready first. A stream error, or a stream ending, sends one alert and stops the loop.
    /// Nothing is resubscribed.
    ///
    /// Returns the error that ended the loop.
    pub async fn run<R, N>(&mut self, mut rewards: R, mut rounds: N) -> SubscriptionError
    where
        R: Stream<Item = LogResult> + Unpin,
        N: Stream<Item = LogResult> + Unpin,
    {
        let mut ticker = self.ticker();
        info!(
            orchestrator = %self.orchestrator,
            delay = %humantime::format_duration(self.delay),
            notify_interval = %humantime::format_duration(self.notify_interval),
            "Monitoring started"
        );

        loop {
            let (stream, failure) = tokio::select! {
                item = rewards.next() => match item {
                    Some(Ok(log)) => {
                        self.handle_reward(&log).await;
                        continue;
                    }
                    Some(Err(e)) => (StreamKind::Reward, e),
                    None => (StreamKind::Reward, SubscriptionError::Closed),
                },
                item = rounds.next() => match item {
                    Some(Ok(log)) => {
                        self.handle_new_round(&log);
                        continue;
                    }
                    Some(Err(e)) => (StreamKind::NewRound, e),
                    None => (StreamKind::NewRound, SubscriptionError::Closed),
                },
                () = next_tick(&mut ticker) => {
                    self.handle_tick(Instant::now()).await;
                    continue;
                }
            };

            error!(stream = %stream, error = %failure, "Subscription failed, stopping monitor");
            self.dispatch(Alert::SubscriptionFailed { stream, error: failure.clone() }).await;
            return failure;
        }
    }

    /// Record a NewRound log received now. Logs retracted by a reorg are ignored.
    pub fn handle_new_round(&mut self, log: &Log) {
        if log.removed {
            debug!(block = ?log.block_number, "Ignoring removed NewRound log");
            return;
        }
        let round = round_number(log);
        self.state.start_round(round, Instant::now());
        info!(round = round, block = ?log.block_number, "New round started");
    }

    /// Record a Reward log and send its confirmation. Logs retracted by a reorg are ignored.
    pub async fn handle_reward(&mut self, log: &Log) {
        if log.removed {
            debug!(block = ?log.block_number, tx = ?log.transaction_hash, "Ignoring removed Reward log");
            return;
        }
        self.state.record_reward();
        let alert = Alert::RewardCalled {
            orchestrator: self.orchestrator,
            block: log.block_number,
            tx: log.transaction_hash,
        };
        self.dispatch(alert).await;
    }

    /// Check for an overdue reward at `now`, alerting if it is.
    ///
    /// Fires on every tick while the condition holds.
    pub async fn handle_tick(&mut self, now: Instant) {
        if !self.state.is_overdue(now, self.delay) {
            trace!(phase = ?self.state.phase(), "Tick, nothing overdue");
            return;
        }
        let alert = Alert::RewardMissing {
            orchestrator: self.orchestrator,
            round: self.state.current_round(),
            delay: self.delay,
        };
        self.dispatch(alert).await;
    }

    /// Log `alert` and make one delivery attempt.
    async fn dispatch(&self, alert: Alert) {
        let message = alert.to_string();
        info!(alert = %message, "Sending alert");
        if let Err(e) = self.notifier.notify(&message).await {
            warn!(error = %e, "Failed to deliver alert");
        }
    }

    /// The first tick fires one full interval after the loop starts.
    fn ticker(&self) -> Option<Interval> {
        if self.notify_interval.is_zero() {
            return None;
        }
        let mut ticker = interval_at(Instant::now() + self.notify_interval, self.notify_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(ticker)
    }
}

/// Resolves on the next tick, or never when ticking is disabled.
///
/// After a stall only one tick is delivered, so the check runs against the current time rather
/// than the tick's schedule.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
