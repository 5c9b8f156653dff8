use std::{path::PathBuf, sync::Arc};

use alloy::transports::{RpcError, TransportErrorKind};
use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error returned by [`crate::watch`] and the `reward-watcher` binary.
///
/// Every variant except [`WatcherError::Subscription`] is raised before the monitoring loop
/// starts. None of them are retried; recovery is left to the process supervisor, which can tell
/// the cases apart through [`WatcherError::exit_code`].
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}

impl WatcherError {
    /// Process exit status for this failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            WatcherError::Config(_) => 2,
            WatcherError::Connectivity(_) => 3,
            WatcherError::Subscription(_) => 4,
        }
    }
}

/// Invalid or missing startup input: CLI arguments, environment, ABI files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    MissingEnv(&'static str),

    #[error("failed to read ABI file {path}: {source}")]
    AbiRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse ABI file {path}: {source}")]
    AbiParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("event {event} not found in ABI file {path}")]
    EventNotFound { event: &'static str, path: PathBuf },

    #[error("failed to build notifier: {0}")]
    Notifier(#[source] NotificationError),
}

/// No usable RPC endpoint could be selected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    #[error("no RPC endpoints configured")]
    NoCandidates,

    /// `attempted` counts the candidates dialed before the budget ran out.
    #[error("no RPC endpoint answered ({attempted} tried)")]
    AllEndpointsUnreachable { attempted: usize },
}

/// A log subscription could not be created or was torn down while running.
#[derive(Error, Debug, Clone)]
pub enum SubscriptionError {
    /// The underlying RPC transport returned an error.
    #[error("RPC error: {0}")]
    Rpc(Arc<RpcError<TransportErrorKind>>),

    /// The log stream ended, for example because the WebSocket connection dropped.
    #[error("subscription closed")]
    Closed,

    /// Notifications were dropped because the consumer fell behind.
    #[error("subscription lagged, {0} logs skipped")]
    Lagged(u64),
}

impl From<RpcError<TransportErrorKind>> for SubscriptionError {
    fn from(error: RpcError<TransportErrorKind>) -> Self {
        SubscriptionError::Rpc(Arc::new(error))
    }
}

/// Fetching or saving a contract ABI failed. Files saved before the failure are kept.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("{contract} is not a deployment record: {source}")]
    Malformed {
        contract: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single alert delivery failed. Never fatal.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response status {0}")]
    Status(StatusCode),
}
