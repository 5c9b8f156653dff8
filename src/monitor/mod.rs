//! The round/reward correlator.
//!
//! [`RewardMonitor`] consumes the Reward and NewRound log streams plus a periodic tick and moves
//! through three phases:
//!
//! | phase | meaning |
//! |---|---|
//! | [`RoundPhase::Idle`] | no round boundary seen yet |
//! | [`RoundPhase::Pending`] | round started, no reward yet |
//! | [`RoundPhase::Satisfied`] | reward seen since the last round boundary |
//!
//! A NewRound log always moves to `Pending`. A Reward log always moves to `Satisfied` and sends a
//! confirmation. A tick in `Pending` past the configured delay sends a missing-reward alert, and
//! keeps doing so on every later tick until the phase changes.

mod alert;
mod reward_monitor;
mod state;

pub use alert::{Alert, StreamKind};
pub use reward_monitor::{DEFAULT_DELAY, DEFAULT_NOTIFY_INTERVAL, RewardMonitor};
pub use state::{RoundPhase, RoundState, round_number};
