//! Reward-Watcher monitors a Livepeer orchestrator's reward calls on Arbitrum One.
//!
//! The protocol expects every active orchestrator to call `reward()` once per round. This crate
//! follows the `NewRound` event of the `RoundsManager` and the `Reward` event of the
//! `BondingManager` (filtered to one orchestrator) and sends a chat alert when a round has been
//! running for longer than a configurable delay without a reward call.
//!
//! The pieces, leaf first:
//!
//! * [`connection`]: picks the first live RPC endpoint from an ordered candidate list.
//! * [`source`]: turns a provider and a filter into a stream of logs that ends on the first error.
//! * [`notifier`]: delivers alert text, e.g. through [`TelegramNotifier`].
//! * [`monitor`]: the [`RewardMonitor`] state machine that correlates both streams with a tick.
//! * [`abi`] and [`EventFilter`]: build the two log filters from the contracts' JSON ABIs.
//!
//! [`watch`] runs the whole pipeline from a [`Config`].
//!
//! # Failure model
//!
//! Startup problems (configuration, ABIs, connectivity, subscription) are returned before the loop
//! starts. Once running, the first subscription error is alerted once and ends the loop; nothing
//! is resubscribed, so recovery is a process restart. Alert delivery gets a single attempt and a
//! failure is only logged.
//!
//! # Ordering
//!
//! Each log stream preserves chain order. There is no ordering between the two streams or the
//! tick; inputs are handled one at a time in whatever order they become ready.

#[macro_use]
mod logging;

pub mod abi;
pub mod connection;
pub mod monitor;
pub mod notifier;
pub mod source;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod app;
mod config;
mod error;
mod filter;

pub use app::watch;
pub use config::{
    BOT_TOKEN_ENV, CHAT_ID_ENV, Cli, Config, DEFAULT_ABI_DIR, DEFAULT_RPC_URL, NotifierConfig,
};
pub use error::{
    ConfigError, ConnectivityError, DownloadError, NotificationError, SubscriptionError, WatcherError,
};
pub use filter::EventFilter;

pub use monitor::{Alert, RewardMonitor, RoundPhase, RoundState};
pub use notifier::{LogNotifier, Notifier, TelegramNotifier};
