//! Contract interface loading and the two filters the watcher subscribes with.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, B256, address},
};
use serde::Deserialize;

use crate::{ConfigError, DownloadError, EventFilter};

/// `BondingManager` proxy on Arbitrum One.
pub const BONDING_MANAGER: Address = address!("0x35Bcf3c30594191d53231E4FF333E8A770453e40");
/// `RoundsManager` proxy on Arbitrum One.
pub const ROUNDS_MANAGER: Address = address!("0xdd6f56DcC28D3F5f27084381fE8Df634985cc39f");

pub const BONDING_MANAGER_ABI: &str = "BondingManager.json";
pub const ROUNDS_MANAGER_ABI: &str = "RoundsManager.json";

pub const REWARD_EVENT: &str = "Reward";
pub const NEW_ROUND_EVENT: &str = "NewRound";

/// Where the watched events are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contracts {
    pub bonding_manager: Address,
    pub rounds_manager: Address,
}

impl Default for Contracts {
    fn default() -> Self {
        Self { bonding_manager: BONDING_MANAGER, rounds_manager: ROUNDS_MANAGER }
    }
}

/// Read a JSON ABI file.
///
/// # Errors
///
/// [`ConfigError::AbiRead`] if the file cannot be read, [`ConfigError::AbiParse`] if it is not a
/// valid ABI.
pub fn load_abi(path: impl AsRef<Path>) -> Result<JsonAbi, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::AbiRead { path: path.to_owned(), source })?;
    serde_json::from_str(&contents)
        .map_err(|source| ConfigError::AbiParse { path: path.to_owned(), source })
}

/// Resolve `name` to its selector. Overloads resolve to the first declaration.
///
/// # Errors
///
/// [`ConfigError::EventNotFound`] if the ABI declares no such event.
pub fn event_selector(abi: &JsonAbi, name: &'static str, path: &Path) -> Result<B256, ConfigError> {
    abi.event(name)
        .and_then(|events| events.first())
        .map(|event| event.selector())
        .ok_or_else(|| ConfigError::EventNotFound { event: name, path: path.to_owned() })
}

/// The reward and new-round filters for one orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFilters {
    /// `Reward` on the bonding manager, restricted to the orchestrator as `topic1`.
    pub reward: EventFilter,
    /// `NewRound` on the rounds manager, unrestricted.
    pub new_round: EventFilter,
}

impl WatchFilters {
    /// Load both ABIs from `abi_dir` and build the filters.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] raised while reading either ABI or resolving its event.
    pub fn load(
        abi_dir: impl AsRef<Path>,
        orchestrator: Address,
        contracts: Contracts,
    ) -> Result<Self, ConfigError> {
        let abi_dir = abi_dir.as_ref();

        let bonding_path = abi_dir.join(BONDING_MANAGER_ABI);
        let bonding_abi = load_abi(&bonding_path)?;
        let reward = event_selector(&bonding_abi, REWARD_EVENT, &bonding_path)?;

        let rounds_path = abi_dir.join(ROUNDS_MANAGER_ABI);
        let rounds_abi = load_abi(&rounds_path)?;
        let new_round = event_selector(&rounds_abi, NEW_ROUND_EVENT, &rounds_path)?;

        debug!(reward = %reward, new_round = %new_round, "Resolved event selectors");

        Ok(Self::from_selectors(orchestrator, contracts, reward, new_round))
    }

    #[must_use]
    pub fn from_selectors(
        orchestrator: Address,
        contracts: Contracts,
        reward: B256,
        new_round: B256,
    ) -> Self {
        Self {
            reward: EventFilter::new()
                .contract_address(contracts.bonding_manager)
                .event(reward)
                .indexed_address(orchestrator),
            new_round: EventFilter::new().contract_address(contracts.rounds_manager).event(new_round),
        }
    }
}

/// A deployment record as published in the protocol repository; only `abi` is kept.
#[derive(Debug, Deserialize)]
struct Deployment {
    abi: serde_json::Value,
}

/// Source of a contract's deployment record and the file its ABI is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiSource {
    pub contract: &'static str,
    pub file_name: &'static str,
}

/// Contracts fetched by `download-abis`, in download order.
pub const ABI_SOURCES: [AbiSource; 2] = [
    AbiSource { contract: "BondingManagerTarget", file_name: BONDING_MANAGER_ABI },
    AbiSource { contract: "RoundsManagerTarget", file_name: ROUNDS_MANAGER_ABI },
];

/// Base URL of the published Arbitrum mainnet deployments.
pub const DEPLOYMENTS_URL: &str =
    "https://raw.githubusercontent.com/livepeer/protocol/delta/deployments/arbitrumMainnet";

impl AbiSource {
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        format!("{}/{}.json", base.trim_end_matches('/'), self.contract)
    }
}

/// Pull the `abi` field out of a deployment record.
///
/// # Errors
///
/// Returns the JSON error if `body` is not a deployment record.
pub fn extract_abi(body: &[u8]) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_slice::<Deployment>(body).map(|deployment| deployment.abi)
}

/// Write `abi` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be written.
pub fn write_abi(path: &Path, abi: &serde_json::Value) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_vec_pretty(abi)?;
    fs::write(path, contents)?;
    Ok(path.to_owned())
}

/// Fetch every entry of [`ABI_SOURCES`] from `base_url` and save its ABI under `out_dir`.
///
/// Contracts are processed in order and the first failure stops the run. The failed contract's
/// file is not written; files saved before it are kept.
///
/// Returns the written paths.
///
/// # Errors
///
/// * [`DownloadError::Fetch`] if the request or body transfer fails.
/// * [`DownloadError::Status`] on a non-success response.
/// * [`DownloadError::Malformed`] if the body is not a deployment record.
/// * [`DownloadError::Write`] if the file cannot be saved.
pub async fn download_abis(
    client: &reqwest::Client,
    base_url: &str,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, DownloadError> {
    let mut written = Vec::with_capacity(ABI_SOURCES.len());

    for abi_source in ABI_SOURCES {
        let url = abi_source.url(base_url);
        info!(contract = abi_source.contract, url = %url, "Downloading deployment");

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|source| DownloadError::Fetch { url: url.clone(), source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status { url, status });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| DownloadError::Fetch { url: url.clone(), source })?;

        let abi = extract_abi(&body)
            .map_err(|source| DownloadError::Malformed { contract: abi_source.contract, source })?;
        let path = out_dir.join(abi_source.file_name);
        let path =
            write_abi(&path, &abi).map_err(|source| DownloadError::Write { path: path.clone(), source })?;

        info!(path = %path.display(), "Saved ABI");
        written.push(path);
    }

    Ok(written)
}
