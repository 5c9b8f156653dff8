//! RPC endpoint selection.
//!
//! [`ConnectionSelector`] walks an ordered list of endpoint candidates once, left to right, and
//! returns the first one that both opens and answers a liveness probe (`eth_blockNumber`):
//! * the whole selection shares one timeout budget
//! * a failed probe drops the connection before the next candidate is tried
//! * candidates after the first working one are never contacted
//! * when every candidate fails the result is [`ConnectivityError::AllEndpointsUnreachable`]
//!
//! Opening and probing go through the [`Dialer`] trait. [`RpcDialer`] is the alloy
//! implementation used by the binary; tests plug in scripted dialers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use reward_watcher::connection::ConnectionSelectorBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let selector = ConnectionSelectorBuilder::new(["wss://arb1.example/ws", "https://arb1.arbitrum.io/rpc"])
//!     .timeout(Duration::from_secs(5))
//!     .build();
//!
//! let connection = selector.connect().await?;
//! println!("connected to {}", connection.uri());
//! # Ok(()) }
//! ```
//!
//! [`ConnectivityError::AllEndpointsUnreachable`]: crate::ConnectivityError::AllEndpointsUnreachable

pub mod builder;
pub mod dialer;
pub mod selector;

pub use builder::*;
pub use dialer::{Dialer, RpcDialer};
pub use selector::{Connection, ConnectionSelector};
