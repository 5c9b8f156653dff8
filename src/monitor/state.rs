use std::time::Duration;

use alloy::{primitives::U256, rpc::types::Log};
use tokio::time::Instant;

/// Where the tracked orchestrator stands in the current round.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum RoundPhase {
    /// No round boundary observed yet.
    Idle,
    /// A round started and no reward has been seen since.
    Pending,
    /// A reward was seen since the last round boundary.
    Satisfied,
}

/// Round tracking owned by the monitoring loop.
///
/// `reward_called` only holds between a Reward event and the next NewRound event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundState {
    current_round: u64,
    round_started_at: Option<Instant>,
    reward_called: bool,
}

impl RoundState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_round(&self) -> u64 {
        self.current_round
    }

    #[must_use]
    pub fn round_started_at(&self) -> Option<Instant> {
        self.round_started_at
    }

    #[must_use]
    pub fn reward_called(&self) -> bool {
        self.reward_called
    }

    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        match (self.reward_called, self.round_started_at) {
            (true, _) => RoundPhase::Satisfied,
            (false, Some(_)) => RoundPhase::Pending,
            (false, None) => RoundPhase::Idle,
        }
    }

    /// A new round began at `now`.
    pub fn start_round(&mut self, round: u64, now: Instant) {
        self.current_round = round;
        self.round_started_at = Some(now);
        self.reward_called = false;
    }

    /// A reward call was observed. Valid in every phase, including [`RoundPhase::Idle`].
    pub fn record_reward(&mut self) {
        self.reward_called = true;
    }

    /// Whether a tick at `now` should raise a missing-reward alert.
    #[must_use]
    pub fn is_overdue(&self, now: Instant, delay: Duration) -> bool {
        match self.round_started_at {
            Some(started) if !self.reward_called => now.saturating_duration_since(started) >= delay,
            _ => false,
        }
    }
}

/// Round number carried by a NewRound log.
///
/// `topics[0]` is the event selector and `topics[1]` the indexed round as a big-endian integer.
/// Logs with fewer than two topics map to round 0; values wider than 64 bits saturate.
#[must_use]
pub fn round_number(log: &Log) -> u64 {
    log.topics()
        .get(1)
        .map_or(0, |topic| U256::from_be_bytes(topic.0).saturating_to::<u64>())
}
