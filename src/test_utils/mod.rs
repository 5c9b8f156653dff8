//! Builders and fakes shared by unit and integration tests.

pub mod macros;

use std::{
    collections::HashMap,
    fs, io,
    path::Path,
    sync::{Arc, Mutex},
};

use alloy::{
    primitives::{Address, B256, Bytes, LogData, keccak256},
    rpc::types::Log,
    transports::{RpcError, TransportErrorKind},
};

use crate::{
    NotificationError,
    abi::{BONDING_MANAGER, BONDING_MANAGER_ABI, ROUNDS_MANAGER, ROUNDS_MANAGER_ABI},
    connection::Dialer,
    notifier::Notifier,
};

pub const BONDING_MANAGER_ABI_JSON: &str = r#"[
  {"type":"function","name":"reward","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
  {"type":"event","name":"Reward","anonymous":false,"inputs":[
    {"name":"transcoder","type":"address","indexed":true,"internalType":"address"},
    {"name":"amount","type":"uint256","indexed":false,"internalType":"uint256"}
  ]}
]"#;

pub const ROUNDS_MANAGER_ABI_JSON: &str = r#"[
  {"type":"function","name":"currentRound","inputs":[],"outputs":[{"name":"","type":"uint256","internalType":"uint256"}],"stateMutability":"view"},
  {"type":"event","name":"NewRound","anonymous":false,"inputs":[
    {"name":"round","type":"uint256","indexed":true,"internalType":"uint256"},
    {"name":"blockHash","type":"bytes32","indexed":false,"internalType":"bytes32"}
  ]}
]"#;

/// Write both ABI fixtures into `dir`.
///
/// # Errors
///
/// Returns an I/O error if either file cannot be written.
pub fn write_abis(dir: &Path) -> io::Result<()> {
    fs::write(dir.join(BONDING_MANAGER_ABI), BONDING_MANAGER_ABI_JSON)?;
    fs::write(dir.join(ROUNDS_MANAGER_ABI), ROUNDS_MANAGER_ABI_JSON)
}

#[must_use]
pub fn reward_selector() -> B256 {
    keccak256("Reward(address,uint256)")
}

#[must_use]
pub fn new_round_selector() -> B256 {
    keccak256("NewRound(uint256,bytes32)")
}

/// A log with arbitrary topics, mined in `block`.
#[must_use]
pub fn log_with_topics(topics: Vec<B256>, block: u64) -> Log {
    log_at(ROUNDS_MANAGER, topics, block)
}

/// A `NewRound(round)` log mined in `block`.
#[must_use]
pub fn new_round_log(round: u64, block: u64) -> Log {
    let round = B256::left_padding_from(&round.to_be_bytes());
    log_at(ROUNDS_MANAGER, vec![new_round_selector(), round], block)
}

/// A `Reward(orchestrator)` log mined in `block`.
#[must_use]
pub fn reward_log(orchestrator: Address, block: u64) -> Log {
    log_at(BONDING_MANAGER, vec![reward_selector(), orchestrator.into_word()], block)
}

fn log_at(address: Address, topics: Vec<B256>, block: u64) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address,
            data: LogData::new_unchecked(topics, Bytes::new()),
        },
        block_number: Some(block),
        transaction_hash: Some(keccak256(block.to_be_bytes())),
        ..Default::default()
    }
}

#[derive(Debug, Default)]
struct Recorded {
    messages: Vec<String>,
    attempts: usize,
}

/// [`Notifier`] that keeps every message it is asked to send.
///
/// Clones share the same record, so a test can hand one clone to a monitor and inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    recorded: Arc<Mutex<Recorded>>,
    fail: bool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails. Attempts are still counted.
    #[must_use]
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Messages delivered so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.recorded.lock().expect("recorder poisoned").messages.clone()
    }

    /// Delivery attempts so far, failed ones included.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.recorded.lock().expect("recorder poisoned").attempts
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let mut recorded = self.recorded.lock().expect("recorder poisoned");
        recorded.attempts += 1;
        if self.fail {
            return Err(NotificationError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        }
        recorded.messages.push(message.to_owned());
        Ok(())
    }
}

/// How a [`ScriptedDialer`] treats one URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialOutcome {
    /// Opening the connection fails.
    DialFails,
    /// Opens, but every probe fails.
    ProbeFails,
    /// Opens; the first `n` probes fail, later ones report the height.
    ProbeFailsTimes(usize, u64),
    /// Opens and reports the height.
    Healthy(u64),
    /// Opening never completes.
    Hangs,
}

#[derive(Debug, Default)]
struct Script {
    outcomes: HashMap<String, DialOutcome>,
    dialed: Vec<String>,
    probes: HashMap<String, usize>,
}

/// [`Dialer`] driven by a per-URI script. Unknown URIs fail to open.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDialer {
    script: Arc<Mutex<Script>>,
}

/// Connection handle produced by [`ScriptedDialer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedConnection {
    pub uri: String,
}

impl ScriptedDialer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn outcome(self, uri: &str, outcome: DialOutcome) -> Self {
        self.script.lock().expect("script poisoned").outcomes.insert(uri.to_owned(), outcome);
        self
    }

    /// URIs passed to `dial`, in call order.
    #[must_use]
    pub fn dialed(&self) -> Vec<String> {
        self.script.lock().expect("script poisoned").dialed.clone()
    }

    /// Number of probes issued against `uri`.
    #[must_use]
    pub fn probes(&self, uri: &str) -> usize {
        self.script.lock().expect("script poisoned").probes.get(uri).copied().unwrap_or(0)
    }

    fn lookup(&self, uri: &str) -> DialOutcome {
        self.script
            .lock()
            .expect("script poisoned")
            .outcomes
            .get(uri)
            .copied()
            .unwrap_or(DialOutcome::DialFails)
    }
}

impl Dialer for ScriptedDialer {
    type Connection = ScriptedConnection;

    async fn dial(&self, uri: &str) -> Result<ScriptedConnection, RpcError<TransportErrorKind>> {
        self.script.lock().expect("script poisoned").dialed.push(uri.to_owned());
        match self.lookup(uri) {
            DialOutcome::DialFails => Err(TransportErrorKind::BackendGone.into()),
            DialOutcome::Hangs => std::future::pending().await,
            _ => Ok(ScriptedConnection { uri: uri.to_owned() }),
        }
    }

    async fn probe(
        &self,
        connection: &ScriptedConnection,
    ) -> Result<u64, RpcError<TransportErrorKind>> {
        let attempt = {
            let mut script = self.script.lock().expect("script poisoned");
            let count = script.probes.entry(connection.uri.clone()).or_default();
            *count += 1;
            *count
        };
        match self.lookup(&connection.uri) {
            DialOutcome::Healthy(height) => Ok(height),
            DialOutcome::ProbeFailsTimes(failures, height) if attempt > failures => Ok(height),
            _ => Err(TransportErrorKind::BackendGone.into()),
        }
    }
}
