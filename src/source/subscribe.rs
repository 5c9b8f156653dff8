use std::time::Duration;

use alloy::{
    providers::{Provider, RootProvider},
    pubsub::Subscription,
    rpc::types::{Filter, Log},
};
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};

use crate::{
    SubscriptionError,
    connection::RpcDialer,
    source::{ChannelState, LogResult, LogStream, TryStream},
};

/// Default interval between `eth_getFilterChanges` polls on HTTP endpoints.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(7);
/// Default capacity of the channel between a forwarding task and its consumer.
pub const DEFAULT_STREAM_BUFFER_CAPACITY: usize = 128;

/// Creates log streams on a connected provider.
///
/// Endpoints with a pub-sub transport get an `eth_subscribe` logs subscription. HTTP endpoints
/// fall back to an `eth_newFilter` poller. Either way the stream is not restarted: once it
/// yields an error it ends.
#[derive(Debug, Clone)]
pub struct LogSubscriber {
    provider: RootProvider,
    poll_interval: Duration,
}

impl LogSubscriber {
    #[must_use]
    pub fn new(provider: RootProvider) -> Self {
        Self { provider, poll_interval: DEFAULT_POLL_INTERVAL }
    }

    /// Set the poll interval used when the endpoint has no pub-sub support.
    #[must_use]
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start streaming logs that match `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::Rpc`] if the node rejects the subscription or filter.
    pub async fn subscribe(&self, filter: &Filter) -> Result<LogStream, SubscriptionError> {
        let (sender, receiver) = mpsc::channel(DEFAULT_STREAM_BUFFER_CAPACITY);

        if RpcDialer::supports_pubsub(&self.provider) {
            info!("eth_subscribe logs called");
            let subscription = self.provider.subscribe_logs(filter).await.inspect_err(|e| {
                error!(error = %e, "eth_subscribe failed");
            })?;
            tokio::spawn(forward_subscription(subscription, sender));
        } else {
            info!(
                poll_interval_ms = self.poll_interval.as_millis(),
                "Endpoint lacks pubsub, polling eth_getFilterChanges"
            );
            let poller = self.provider.watch_logs(filter).await.inspect_err(|e| {
                error!(error = %e, "eth_newFilter failed");
            })?;
            let logs = poller.with_poll_interval(self.poll_interval).into_stream();
            tokio::spawn(forward_batches(logs, sender));
        }

        Ok(ReceiverStream::new(receiver))
    }
}

/// Receiving half of a pub-sub log feed.
pub(crate) trait RecvLog {
    fn recv(&mut self) -> impl Future<Output = Result<Log, RecvError>> + Send;
}

impl RecvLog for Subscription<Log> {
    async fn recv(&mut self) -> Result<Log, RecvError> {
        Subscription::recv(self).await
    }
}

impl RecvLog for broadcast::Receiver<Log> {
    async fn recv(&mut self) -> Result<Log, RecvError> {
        broadcast::Receiver::recv(self).await
    }
}

/// Pump a pub-sub subscription into `sender` until either side goes away.
pub(crate) async fn forward_subscription<S: RecvLog>(
    mut subscription: S,
    sender: mpsc::Sender<LogResult>,
) {
    loop {
        let received = tokio::select! {
            () = sender.closed() => {
                debug!("Log stream dropped, ending subscription");
                return;
            }
            received = subscription.recv() => received,
        };

        match received {
            Ok(log) => {
                if sender.try_stream(log).await.is_closed() {
                    return;
                }
            }
            Err(RecvError::Closed) => {
                error!("Subscription channel closed");
                let _ = sender.try_stream(SubscriptionError::Closed).await;
                return;
            }
            // Dropped logs would desynchronise round tracking, so a lag ends the stream.
            Err(RecvError::Lagged(skipped)) => {
                error!(skipped = skipped, "Subscription lagged");
                let _ = sender.try_stream(SubscriptionError::Lagged(skipped)).await;
                return;
            }
        }
    }
}

/// Flatten polled log batches into `sender`. The poller ending is reported as a closed stream.
pub(crate) async fn forward_batches<S>(mut batches: S, sender: mpsc::Sender<LogResult>)
where
    S: Stream<Item = Vec<Log>> + Unpin,
{
    loop {
        let batch = tokio::select! {
            () = sender.closed() => {
                debug!("Log stream dropped, ending poller");
                return;
            }
            batch = batches.next() => batch,
        };

        let Some(batch) = batch else {
            error!("Log poller stopped");
            let _ = sender.try_stream(SubscriptionError::Closed).await;
            return;
        };

        for log in batch {
            if let ChannelState::Closed = sender.try_stream(log).await {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_closed, assert_failed, assert_next, test_utils::new_round_log};
    use tokio_stream::iter;

    #[tokio::test]
    async fn batches_are_flattened_in_order() {
        let (sender, receiver) = mpsc::channel(8);
        let batches = iter(vec![vec![new_round_log(1, 10)], vec![], vec![
            new_round_log(2, 11),
            new_round_log(3, 12),
        ]]);

        forward_batches(batches, sender).await;

        let items: Vec<_> = ReceiverStream::new(receiver).collect().await;
        assert_eq!(items.len(), 4);
        let blocks: Vec<_> =
            items[..3].iter().map(|item| item.as_ref().unwrap().block_number).collect();
        assert_eq!(blocks, vec![Some(10), Some(11), Some(12)]);
        assert!(matches!(items[3], Err(SubscriptionError::Closed)));
    }

    #[tokio::test]
    async fn lagged_subscription_ends_the_stream() {
        let (tx, rx) = broadcast::channel(1);
        tx.send(new_round_log(1, 10)).unwrap();
        tx.send(new_round_log(2, 11)).unwrap();
        tx.send(new_round_log(3, 12)).unwrap();

        let (sender, receiver) = mpsc::channel(8);
        forward_subscription(rx, sender).await;

        let mut stream = ReceiverStream::new(receiver);
        assert_failed!(stream, SubscriptionError::Lagged(2));
        assert_closed!(stream);
    }

    #[tokio::test]
    async fn closed_subscription_ends_the_stream() {
        let (tx, rx) = broadcast::channel(4);
        tx.send(new_round_log(1, 10)).unwrap();
        drop(tx);

        let (sender, receiver) = mpsc::channel(8);
        forward_subscription(rx, sender).await;

        let mut stream = ReceiverStream::new(receiver);
        assert_next!(stream, new_round_log(1, 10));
        assert_failed!(stream, SubscriptionError::Closed);
        assert_closed!(stream);
    }

    #[tokio::test]
    async fn subscription_forwarding_stops_when_consumer_drops() {
        let (_tx, rx) = broadcast::channel::<Log>(4);
        let (sender, receiver) = mpsc::channel(8);
        drop(receiver);

        // The feed stays open, so only the dropped consumer can end the task.
        tokio::time::timeout(Duration::from_secs(1), forward_subscription(rx, sender))
            .await
            .expect("forwarding should stop once the receiver is gone");
    }

    #[tokio::test]
    async fn forwarding_stops_when_consumer_drops() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);

        let batches = iter(vec![vec![new_round_log(1, 10), new_round_log(2, 11)]]);

        // Returns instead of blocking on a full channel with no reader.
        tokio::time::timeout(Duration::from_secs(1), forward_batches(batches, sender))
            .await
            .expect("forwarding should stop once the receiver is gone");
    }
}
