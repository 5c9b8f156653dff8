use std::{path::PathBuf, time::Duration};

use alloy::primitives::Address;
use clap::Parser;

use crate::{
    ConfigError,
    abi::{BONDING_MANAGER, Contracts, ROUNDS_MANAGER},
    connection::DEFAULT_CONNECT_TIMEOUT,
    source::DEFAULT_POLL_INTERVAL,
};

/// Public Arbitrum One RPC used when no endpoints are given.
pub const DEFAULT_RPC_URL: &str = "https://arb1.arbitrum.io/rpc";
pub const DEFAULT_ABI_DIR: &str = "abis";

pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Where alerts go.
#[derive(Clone, PartialEq, Eq)]
pub enum NotifierConfig {
    Telegram { bot_token: String, chat_id: String },
    /// Alerts are only logged.
    Log,
}

impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierConfig::Telegram { chat_id, .. } => f
                .debug_struct("Telegram")
                .field("bot_token", &"<redacted>")
                .field("chat_id", chat_id)
                .finish(),
            NotifierConfig::Log => f.write_str("Log"),
        }
    }
}

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub orchestrator: Address,
    pub rpc_urls: Vec<String>,
    pub delay: Duration,
    pub notify_interval: Duration,
    pub connect_timeout: Duration,
    pub poll_interval: Duration,
    pub require_pubsub: bool,
    pub abi_dir: PathBuf,
    pub contracts: Contracts,
    pub notifier: NotifierConfig,
}

/// Alert when a Livepeer orchestrator misses its reward call.
#[derive(Parser, Debug, Clone)]
#[command(name = "reward-watcher", version)]
#[command(about = "Alert over Telegram when an orchestrator does not call reward in time")]
pub struct Cli {
    /// Orchestrator address to watch
    pub orchestrator: Address,

    /// RPC endpoints, tried in order until one answers
    #[arg(default_value = DEFAULT_RPC_URL)]
    pub rpc_urls: Vec<String>,

    /// Time to wait after a new round before warning (e.g. 2h, 30m)
    #[arg(long, default_value = "2h", value_parser = humantime::parse_duration)]
    pub delay: Duration,

    /// How often to repeat the warning while reward is not called (0s disables it)
    #[arg(long, default_value = "0s", value_parser = humantime::parse_duration)]
    pub notify_interval: Duration,

    /// Budget for finding a working RPC endpoint
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub connect_timeout: Duration,

    /// Log poll interval for endpoints without subscription support
    #[arg(long, default_value = "7s", value_parser = humantime::parse_duration)]
    pub poll_interval: Duration,

    /// Skip endpoints that cannot serve eth_subscribe
    #[arg(long)]
    pub require_pubsub: bool,

    /// Directory holding BondingManager.json and RoundsManager.json
    #[arg(long, default_value = DEFAULT_ABI_DIR)]
    pub abi_dir: PathBuf,

    /// BondingManager contract address
    #[arg(long, default_value_t = BONDING_MANAGER)]
    pub bonding_manager: Address,

    /// RoundsManager contract address
    #[arg(long, default_value_t = ROUNDS_MANAGER)]
    pub rounds_manager: Address,

    /// Telegram bot token
    #[arg(long, env = BOT_TOKEN_ENV, hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Telegram chat to send alerts to
    #[arg(long, env = CHAT_ID_ENV)]
    pub chat_id: Option<String>,

    /// Log alerts instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Validate the parsed arguments.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingEnv`] if Telegram credentials are missing or empty outside dry-run
    /// mode.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let notifier = if self.dry_run {
            NotifierConfig::Log
        } else {
            let bot_token = non_empty(self.bot_token).ok_or(ConfigError::MissingEnv(BOT_TOKEN_ENV))?;
            let chat_id = non_empty(self.chat_id).ok_or(ConfigError::MissingEnv(CHAT_ID_ENV))?;
            NotifierConfig::Telegram { bot_token, chat_id }
        };

        Ok(Config {
            orchestrator: self.orchestrator,
            rpc_urls: self.rpc_urls,
            delay: self.delay,
            notify_interval: self.notify_interval,
            connect_timeout: self.connect_timeout,
            poll_interval: self.poll_interval,
            require_pubsub: self.require_pubsub,
            abi_dir: self.abi_dir,
            contracts: Contracts {
                bonding_manager: self.bonding_manager,
                rounds_manager: self.rounds_manager,
            },
            notifier,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orchestrator: Address::ZERO,
            rpc_urls: vec![DEFAULT_RPC_URL.to_owned()],
            delay: crate::monitor::DEFAULT_DELAY,
            notify_interval: crate::monitor::DEFAULT_NOTIFY_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            require_pubsub: false,
            abi_dir: PathBuf::from(DEFAULT_ABI_DIR),
            contracts: Contracts::default(),
            notifier: NotifierConfig::Log,
        }
    }
}
