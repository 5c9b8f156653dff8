use std::time::Duration;

use alloy::transports::{RpcError, TransportErrorKind};
use backon::{ExponentialBuilder, Retryable};
use tokio::time::{Instant, timeout_at};

use crate::{ConnectivityError, connection::Dialer};

/// An opened link to exactly one of the configured endpoint candidates.
#[derive(Debug)]
pub struct Connection<C> {
    handle: C,
    uri: String,
}

impl<C> Connection<C> {
    /// The underlying connection handle.
    #[must_use]
    pub fn handle(&self) -> &C {
        &self.handle
    }

    /// The candidate URI this connection was opened against.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn into_parts(self) -> (C, String) {
        (self.handle, self.uri)
    }
}

/// Picks the first live endpoint from an ordered candidate list.
///
/// Construct with [`ConnectionSelectorBuilder`](crate::connection::ConnectionSelectorBuilder).
#[derive(Debug, Clone)]
pub struct ConnectionSelector<D: Dialer> {
    pub(crate) dialer: D,
    pub(crate) candidates: Vec<String>,
    pub(crate) timeout: Duration,
    pub(crate) probe_retries: usize,
    pub(crate) min_delay: Duration,
}

impl<D: Dialer> ConnectionSelector<D> {
    /// Connect to the first candidate that opens and answers a liveness probe.
    ///
    /// Candidates are tried once each, in order, within one shared timeout budget.
    ///
    /// # Errors
    ///
    /// * [`ConnectivityError::NoCandidates`] if the candidate list is empty.
    /// * [`ConnectivityError::AllEndpointsUnreachable`] if every candidate failed to open, failed
    ///   its probe, or the budget ran out before it could be tried.
    pub async fn connect(&self) -> Result<Connection<D::Connection>, ConnectivityError> {
        if self.candidates.is_empty() {
            return Err(ConnectivityError::NoCandidates);
        }

        let deadline = Instant::now() + self.timeout;
        let total = self.candidates.len();
        let mut attempted = 0;

        for (idx, uri) in self.candidates.iter().enumerate() {
            if Instant::now() >= deadline {
                warn!(
                    remaining = total - idx,
                    "Connection budget exhausted, skipping remaining endpoints"
                );
                break;
            }

            debug!(uri = %uri, candidate = idx + 1, total = total, "Attempting endpoint");
            attempted += 1;

            match timeout_at(deadline, self.attempt(uri)).await {
                Ok(Ok((handle, height))) => {
                    info!(uri = %uri, height = height, "Connected to RPC endpoint");
                    return Ok(Connection { handle, uri: uri.clone() });
                }
                Ok(Err(e)) => {
                    warn!(uri = %uri, error = %e, "Endpoint failed");
                }
                Err(_) => {
                    warn!(uri = %uri, "Endpoint timed out");
                }
            }
        }

        error!(attempted = attempted, total = total, "All RPC endpoints failed");
        Err(ConnectivityError::AllEndpointsUnreachable { attempted })
    }

    /// Open `uri` and probe it. The connection is dropped if the probe fails.
    async fn attempt(&self, uri: &str) -> Result<(D::Connection, u64), RpcError<TransportErrorKind>> {
        let connection = self.dialer.dial(uri).await?;

        let retry_strategy = ExponentialBuilder::default()
            .with_max_times(self.probe_retries)
            .with_min_delay(self.min_delay);

        let height = (|| self.dialer.probe(&connection))
            .retry(retry_strategy)
            .notify(|err: &RpcError<TransportErrorKind>, dur: Duration| {
                info!(error = %err, "Probe failed, retrying after {:?}", dur);
            })
            .sleep(tokio::time::sleep)
            .await?;

        Ok((connection, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connection::ConnectionSelectorBuilder,
        test_utils::{DialOutcome, ScriptedDialer},
    };

    fn selector(dialer: ScriptedDialer, candidates: &[&str]) -> ConnectionSelector<ScriptedDialer> {
        ConnectionSelectorBuilder::new(candidates.iter().copied())
            .timeout(Duration::from_secs(5))
            .min_delay(Duration::from_millis(10))
            .build_with_dialer(dialer)
    }

    #[tokio::test]
    async fn returns_first_candidate_that_opens_and_probes() -> anyhow::Result<()> {
        let dialer = ScriptedDialer::new()
            .outcome("bad-url", DialOutcome::DialFails)
            .outcome("good-url-1", DialOutcome::Healthy(10))
            .outcome("good-url-2", DialOutcome::Healthy(20));

        let connection =
            selector(dialer.clone(), &["bad-url", "good-url-1", "good-url-2"]).connect().await?;

        assert_eq!(connection.uri(), "good-url-1");
        assert_eq!(connection.handle().uri, "good-url-1");
        assert_eq!(dialer.dialed(), vec!["bad-url", "good-url-1"]);

        Ok(())
    }

    #[tokio::test]
    async fn probe_failure_moves_to_next_candidate() -> anyhow::Result<()> {
        let dialer = ScriptedDialer::new()
            .outcome("stale", DialOutcome::ProbeFails)
            .outcome("fresh", DialOutcome::Healthy(7));

        let connection = selector(dialer.clone(), &["stale", "fresh"]).connect().await?;

        assert_eq!(connection.uri(), "fresh");
        assert_eq!(dialer.probes("stale"), 1);
        assert_eq!(dialer.probes("fresh"), 1);

        Ok(())
    }

    #[tokio::test]
    async fn all_candidates_failing_is_unreachable() {
        let dialer = ScriptedDialer::new()
            .outcome("a", DialOutcome::DialFails)
            .outcome("b", DialOutcome::ProbeFails);

        let result = selector(dialer.clone(), &["a", "b"]).connect().await;

        assert_eq!(result.unwrap_err(), ConnectivityError::AllEndpointsUnreachable { attempted: 2 });
        assert_eq!(dialer.dialed(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn empty_candidate_list_is_rejected() {
        let result = selector(ScriptedDialer::new(), &[]).connect().await;

        assert_eq!(result.unwrap_err(), ConnectivityError::NoCandidates);
    }

    #[tokio::test]
    async fn probe_retries_stay_on_the_same_candidate() -> anyhow::Result<()> {
        let dialer = ScriptedDialer::new()
            .outcome("flaky", DialOutcome::ProbeFailsTimes(2, 99))
            .outcome("backup", DialOutcome::Healthy(1));

        let connection = ConnectionSelectorBuilder::new(["flaky", "backup"])
            .probe_retries(2)
            .min_delay(Duration::from_millis(1))
            .build_with_dialer(dialer.clone())
            .connect()
            .await?;

        assert_eq!(connection.uri(), "flaky");
        assert_eq!(dialer.probes("flaky"), 3);
        assert_eq!(dialer.dialed(), vec!["flaky"]);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_budget_is_shared_across_candidates() {
        let dialer = ScriptedDialer::new()
            .outcome("slow", DialOutcome::Hangs)
            .outcome("good", DialOutcome::Healthy(1));

        let result = ConnectionSelectorBuilder::new(["slow", "good"])
            .timeout(Duration::from_secs(5))
            .build_with_dialer(dialer.clone())
            .connect()
            .await;

        assert_eq!(result.unwrap_err(), ConnectivityError::AllEndpointsUnreachable { attempted: 1 });
        assert_eq!(dialer.dialed(), vec!["slow"]);
    }
}
