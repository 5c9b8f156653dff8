use crate::{
    Config, WatcherError, abi::WatchFilters, connection::ConnectionSelectorBuilder,
    monitor::RewardMonitor, notifier::Notifier, source::LogSubscriber,
};

/// Wire everything together and monitor until a subscription fails.
///
/// Startup order: load filters, select an endpoint, subscribe to both streams, run the loop.
/// Every startup failure is returned before any alert is sent.
///
/// # Errors
///
/// * [`WatcherError::Config`] if an ABI file is missing or invalid.
/// * [`WatcherError::Connectivity`] if no endpoint answers.
/// * [`WatcherError::Subscription`] if a subscription cannot be created, or once the running
///   loop stops.
pub async fn watch<T: Notifier>(config: &Config, notifier: T) -> Result<(), WatcherError> {
    let filters = WatchFilters::load(&config.abi_dir, config.orchestrator, config.contracts)?;

    let connection = ConnectionSelectorBuilder::new(config.rpc_urls.iter().cloned())
        .timeout(config.connect_timeout)
        .require_pubsub(config.require_pubsub)
        .build()
        .connect()
        .await?;
    let (provider, uri) = connection.into_parts();
    info!(uri = %uri, "Using RPC endpoint");

    let subscriber = LogSubscriber::new(provider).poll_interval(config.poll_interval);
    let rewards = subscriber.subscribe(&filters.reward.to_filter()).await?;
    let rounds = subscriber.subscribe(&filters.new_round.to_filter()).await?;

    let mut monitor = RewardMonitor::new(config.orchestrator, notifier)
        .delay(config.delay)
        .notify_interval(config.notify_interval);

    Err(monitor.run(rewards, rounds).await.into())
}
