use alloy::{
    primitives::{Address, B256},
    rpc::types::Filter,
};

/// Log filter for one event on one contract, optionally narrowed by its first indexed argument.
///
/// ```rust
/// use alloy::primitives::{address, b256};
/// use reward_watcher::EventFilter;
///
/// let filter = EventFilter::new()
///     .contract_address(address!("0x35Bcf3c30594191d53231E4FF333E8A770453e40"))
///     .event(b256!("0x619caafabdd75649b302ba8419e48cccf64f37f1983ac4727cfb38b57703ffc9"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    contract_address: Option<Address>,
    event: Option<B256>,
    topic1: Option<B256>,
}

impl EventFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contract_address(mut self, address: Address) -> Self {
        self.contract_address = Some(address);
        self
    }

    /// Match a single event by its selector (`topic0`).
    #[must_use]
    pub fn event(mut self, selector: B256) -> Self {
        self.event = Some(selector);
        self
    }

    /// Restrict the first indexed argument (`topic1`).
    #[must_use]
    pub fn topic1(mut self, topic: B256) -> Self {
        self.topic1 = Some(topic);
        self
    }

    /// Restrict the first indexed argument to an address, left-padded to 32 bytes.
    #[must_use]
    pub fn indexed_address(self, address: Address) -> Self {
        self.topic1(address.into_word())
    }

    #[must_use]
    pub fn selector(&self) -> Option<B256> {
        self.event
    }

    #[must_use]
    pub fn to_filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(address) = self.contract_address {
            filter = filter.address(address);
        }
        if let Some(selector) = self.event {
            filter = filter.event_signature(selector);
        }
        if let Some(topic) = self.topic1 {
            filter = filter.topic1(topic);
        }
        filter
    }
}
