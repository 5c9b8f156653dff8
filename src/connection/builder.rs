use std::time::Duration;

use crate::connection::{ConnectionSelector, Dialer, RpcDialer};

/// Default budget for the whole selection pass.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default number of extra probe attempts per candidate.
pub const DEFAULT_PROBE_RETRIES: usize = 0;
/// Default base delay between probe retries.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(250);

/// Builder for constructing a [`ConnectionSelector`].
#[derive(Debug, Clone)]
pub struct ConnectionSelectorBuilder {
    candidates: Vec<String>,
    timeout: Duration,
    probe_retries: usize,
    min_delay: Duration,
    require_pubsub: bool,
}

impl ConnectionSelectorBuilder {
    /// Create a builder over `candidates`, tried in the given order.
    #[must_use]
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_CONNECT_TIMEOUT,
            probe_retries: DEFAULT_PROBE_RETRIES,
            min_delay: DEFAULT_MIN_DELAY,
            require_pubsub: false,
        }
    }

    /// Set the timeout shared by all connection attempts.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many times a failed probe is retried against the same candidate.
    ///
    /// Retries never move on to another candidate; that happens only after the last retry fails.
    #[must_use]
    pub fn probe_retries(mut self, probe_retries: usize) -> Self {
        self.probe_retries = probe_retries;
        self
    }

    /// Set the base delay for exponential backoff between probe retries.
    #[must_use]
    pub fn min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    /// Reject candidates whose transport cannot serve `eth_subscribe`.
    ///
    /// Only honoured by [`RpcDialer`]; custom dialers decide for themselves.
    #[must_use]
    pub fn require_pubsub(mut self, require_pubsub: bool) -> Self {
        self.require_pubsub = require_pubsub;
        self
    }

    /// Build a selector that dials through alloy.
    #[must_use]
    pub fn build(self) -> ConnectionSelector<RpcDialer> {
        let dialer = RpcDialer::new(self.require_pubsub);
        self.build_with_dialer(dialer)
    }

    /// Build a selector around a custom [`Dialer`].
    #[must_use]
    pub fn build_with_dialer<D: Dialer>(self, dialer: D) -> ConnectionSelector<D> {
        debug!(
            candidates = self.candidates.len(),
            timeout_ms = self.timeout.as_millis(),
            probe_retries = self.probe_retries,
            "Building ConnectionSelector"
        );

        ConnectionSelector {
            dialer,
            candidates: self.candidates,
            timeout: self.timeout,
            probe_retries: self.probe_retries,
            min_delay: self.min_delay,
        }
    }
}
