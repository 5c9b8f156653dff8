use alloy::rpc::types::Log;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::SubscriptionError;

/// Item yielded by a [`LogStream`]. An `Err` is always the last item.
pub type LogResult = Result<Log, SubscriptionError>;

/// Stream of logs matching one filter, fed by a background forwarding task.
pub type LogStream = ReceiverStream<LogResult>;

/// Whether the consumer side of a log channel is still listening.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Open,
    Closed,
}

impl ChannelState {
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, ChannelState::Open)
    }

    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, ChannelState::Closed)
    }
}

pub trait IntoLogResult {
    fn into_log_result(self) -> LogResult;
}

impl IntoLogResult for Log {
    fn into_log_result(self) -> LogResult {
        Ok(self)
    }
}

impl IntoLogResult for SubscriptionError {
    fn into_log_result(self) -> LogResult {
        Err(self)
    }
}

/// Forward an item downstream, reporting whether the receiver is still there.
#[allow(async_fn_in_trait)]
pub trait TryStream {
    async fn try_stream<M: IntoLogResult>(&self, msg: M) -> ChannelState;
}

impl TryStream for mpsc::Sender<LogResult> {
    async fn try_stream<M: IntoLogResult>(&self, msg: M) -> ChannelState {
        let item = msg.into_log_result();
        match &item {
            Ok(log) => trace!(
                block = ?log.block_number,
                tx = ?log.transaction_hash,
                "Forwarding log"
            ),
            Err(err) => debug!(error = %err, "Forwarding subscription error"),
        }
        if let Err(err) = self.send(item).await {
            warn!(error = %err, "Downstream channel closed, stopping stream");
            return ChannelState::Closed;
        }
        ChannelState::Open
    }
}
