//! Log sources: turn a provider and a [`Filter`](alloy::rpc::types::Filter) into a
//! [`LogStream`].
//!
//! Each subscription runs a forwarding task that feeds a bounded channel. The consumer sees a
//! lazy, infinite sequence of logs that is terminated by a single [`SubscriptionError`] item if
//! the underlying subscription closes, lags, or the poller stops. Nothing is resubscribed.
//!
//! Ordering is preserved per stream only; two streams carry no ordering relative to each other.
//!
//! [`SubscriptionError`]: crate::SubscriptionError

mod stream;
mod subscribe;

pub use stream::{ChannelState, IntoLogResult, LogResult, LogStream, TryStream};
pub use subscribe::{DEFAULT_POLL_INTERVAL, DEFAULT_STREAM_BUFFER_CAPACITY, LogSubscriber};
