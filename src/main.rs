use std::process::ExitCode;

use clap::Parser;
use reward_watcher::{
    Cli, ConfigError, LogNotifier, NotifierConfig, TelegramNotifier, WatcherError, watch,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => return fail(e.into()),
    };

    let outcome = tokio::select! {
        result = run(config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

async fn run(config: reward_watcher::Config) -> Result<(), WatcherError> {
    match &config.notifier {
        NotifierConfig::Telegram { bot_token, chat_id } => {
            let notifier = TelegramNotifier::new(bot_token, chat_id.clone())
                .map_err(ConfigError::Notifier)?;
            watch(&config, notifier).await
        }
        NotifierConfig::Log => watch(&config, LogNotifier).await,
    }
}

fn fail(error: WatcherError) -> ExitCode {
    tracing::error!(error = %error, "Reward watcher stopped");
    ExitCode::from(error.exit_code())
}
