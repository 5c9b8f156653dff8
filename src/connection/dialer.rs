use alloy::{
    providers::{Provider, RootProvider},
    transports::{RpcError, TransportErrorKind},
};

/// Opens connections to endpoint URIs and checks that they are alive.
///
/// A connection is closed by dropping it.
pub trait Dialer {
    type Connection: Send;

    /// Open a connection to `uri`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached or the URI is malformed.
    fn dial(
        &self,
        uri: &str,
    ) -> impl Future<Output = Result<Self::Connection, RpcError<TransportErrorKind>>> + Send;

    /// Issue one liveness probe, returning the latest known block height.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint does not answer the probe.
    fn probe(
        &self,
        connection: &Self::Connection,
    ) -> impl Future<Output = Result<u64, RpcError<TransportErrorKind>>> + Send;
}

/// [`Dialer`] backed by alloy's [`RootProvider`].
///
/// The transport is chosen from the URI scheme (`http(s)`, `ws(s)` or an IPC path).
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcDialer {
    require_pubsub: bool,
}

impl RpcDialer {
    #[must_use]
    pub fn new(require_pubsub: bool) -> Self {
        Self { require_pubsub }
    }

    /// Check if a provider supports pubsub
    #[must_use]
    pub fn supports_pubsub(provider: &RootProvider) -> bool {
        provider.client().pubsub_frontend().is_some()
    }
}

impl Dialer for RpcDialer {
    type Connection = RootProvider;

    async fn dial(&self, uri: &str) -> Result<RootProvider, RpcError<TransportErrorKind>> {
        RootProvider::connect(uri).await
    }

    async fn probe(&self, provider: &RootProvider) -> Result<u64, RpcError<TransportErrorKind>> {
        if self.require_pubsub && !Self::supports_pubsub(provider) {
            return Err(TransportErrorKind::PubsubUnavailable.into());
        }
        provider.get_block_number().await
    }
}
