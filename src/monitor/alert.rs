use std::{fmt, time::Duration};

use alloy::primitives::{Address, B256};

use crate::SubscriptionError;

/// Which of the two log streams an input or failure came from.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum StreamKind {
    Reward,
    NewRound,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Reward => f.write_str("Reward"),
            StreamKind::NewRound => f.write_str("NewRound"),
        }
    }
}

/// A notification raised by the monitor. Rendered once, when the triggering input is handled.
#[derive(Debug, Clone)]
pub enum Alert {
    RewardCalled { orchestrator: Address, block: Option<u64>, tx: Option<B256> },
    RewardMissing { orchestrator: Address, round: u64, delay: Duration },
    SubscriptionFailed { stream: StreamKind, error: SubscriptionError },
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::RewardCalled { orchestrator, block, tx } => {
                write!(f, "✅ Reward called for {orchestrator} at block ")?;
                match block {
                    Some(block) => write!(f, "{block}")?,
                    None => f.write_str("pending")?,
                }
                match tx {
                    Some(tx) => write!(f, ", tx {tx}"),
                    None => f.write_str(", tx unknown"),
                }
            }
            Alert::RewardMissing { orchestrator, round, delay } => write!(
                f,
                "❌ No reward called for {orchestrator} in round {round} after {}",
                humantime::format_duration(*delay)
            ),
            Alert::SubscriptionFailed { stream, error } => {
                write!(f, "⚠️ {stream} subscription error: {error}")
            }
        }
    }
}
