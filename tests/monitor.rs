//! Behaviour of the running monitor loop, driven through channels on a paused clock.

use std::time::Duration;

use alloy::primitives::{Address, address};
use reward_watcher::{
    RewardMonitor, RoundPhase, SubscriptionError, assert_alerts,
    source::LogResult,
    test_utils::{RecordingNotifier, new_round_log, reward_log},
};
use tokio::{sync::mpsc, task::JoinHandle, time::advance};
use tokio_stream::wrappers::ReceiverStream;

const ORCHESTRATOR: Address = address!("0x847791cbf03be716a7fe9dc8c9affe17bd49ae5e");
const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

type Finished = (RewardMonitor<RecordingNotifier>, SubscriptionError);

struct Harness {
    rewards: mpsc::Sender<LogResult>,
    rounds: mpsc::Sender<LogResult>,
    notifier: RecordingNotifier,
    handle: JoinHandle<Finished>,
}

impl Harness {
    /// Spawn a monitor and let it enter its loop. The loop start is "now".
    async fn start(notifier: RecordingNotifier, delay: Duration, interval: Duration) -> Self {
        let (rewards, reward_rx) = mpsc::channel(16);
        let (rounds, round_rx) = mpsc::channel(16);

        let mut monitor =
            RewardMonitor::new(ORCHESTRATOR, notifier.clone()).delay(delay).notify_interval(interval);
        let handle = tokio::spawn(async move {
            let err = monitor.run(ReceiverStream::new(reward_rx), ReceiverStream::new(round_rx)).await;
            (monitor, err)
        });
        settle().await;

        Self { rewards, rounds, notifier, handle }
    }

    async fn new_round(&self, round: u64) -> anyhow::Result<()> {
        self.rounds.send(Ok(new_round_log(round, round * 100))).await?;
        settle().await;
        Ok(())
    }

    async fn reward(&self, block: u64) -> anyhow::Result<()> {
        self.rewards.send(Ok(reward_log(ORCHESTRATOR, block))).await?;
        settle().await;
        Ok(())
    }

    /// End the loop by closing the reward stream.
    async fn stop(self) -> anyhow::Result<Finished> {
        drop(self.rewards);
        Ok(self.handle.await?)
    }
}

/// Give the monitor task a chance to drain whatever is ready.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

async fn elapse(duration: Duration) {
    advance(duration).await;
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn delay_alert_fires_on_ticks_after_the_delay() -> anyhow::Result<()> {
    let h = Harness::start(RecordingNotifier::new(), HOUR, 30 * MINUTE).await;

    elapse(Duration::from_secs(1)).await;
    h.new_round(42).await?;

    // +30m and +60m: the round is younger than the delay
    elapse(30 * MINUTE - Duration::from_secs(1)).await;
    elapse(30 * MINUTE).await;
    assert_alerts!(h.notifier, []);

    // +90m
    elapse(30 * MINUTE).await;
    assert_alerts!(h.notifier, ["No reward called"]);

    // +120m, still overdue
    elapse(30 * MINUTE).await;
    assert_alerts!(h.notifier, ["in round 42 after 1h", "in round 42 after 1h"]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reward_within_the_delay_silences_the_round() -> anyhow::Result<()> {
    let h = Harness::start(RecordingNotifier::new(), HOUR, 30 * MINUTE).await;

    elapse(Duration::from_secs(1)).await;
    h.new_round(7).await?;
    elapse(10 * MINUTE).await;
    h.reward(701).await?;

    elapse(3 * HOUR).await;
    assert_alerts!(h.notifier, ["at block 701"]);

    let (monitor, _) = h.stop().await?;
    assert_eq!(monitor.state().phase(), RoundPhase::Satisfied);
    assert_eq!(monitor.state().current_round(), 7);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn new_round_rearms_the_delay_alert() -> anyhow::Result<()> {
    let h = Harness::start(RecordingNotifier::new(), HOUR, 30 * MINUTE).await;

    elapse(Duration::from_secs(1)).await;
    h.new_round(1).await?;
    h.reward(101).await?;

    elapse(30 * MINUTE).await;
    h.new_round(2).await?;
    elapse(90 * MINUTE).await;

    assert_alerts!(h.notifier, ["Reward called", "in round 2"]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn zero_interval_never_alerts_on_delay() -> anyhow::Result<()> {
    let h = Harness::start(RecordingNotifier::new(), HOUR, Duration::ZERO).await;

    h.new_round(3).await?;
    elapse(12 * HOUR).await;
    assert_alerts!(h.notifier, []);

    let (monitor, _) = h.stop().await?;
    assert_eq!(monitor.state().phase(), RoundPhase::Pending);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rounds_are_applied_in_stream_order() -> anyhow::Result<()> {
    let h = Harness::start(RecordingNotifier::new(), HOUR, Duration::ZERO).await;

    h.rounds.send(Ok(new_round_log(10, 1))).await?;
    h.rounds.send(Ok(new_round_log(11, 2))).await?;
    h.rounds.send(Ok(new_round_log(12, 3))).await?;
    settle().await;

    let (monitor, _) = h.stop().await?;
    assert_eq!(monitor.state().current_round(), 12);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn subscription_error_alerts_once_and_stops() -> anyhow::Result<()> {
    let h = Harness::start(RecordingNotifier::new(), HOUR, 30 * MINUTE).await;

    h.new_round(5).await?;
    h.rounds.send(Err(SubscriptionError::Lagged(4))).await?;
    settle().await;

    assert!(h.handle.is_finished());
    let (_, err) = h.handle.await?;
    assert!(matches!(err, SubscriptionError::Lagged(4)));
    assert_alerts!(h.notifier, ["⚠️ NewRound subscription error"]);

    // Nothing is listening any more
    assert!(h.rounds.send(Ok(new_round_log(6, 600))).await.is_err());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn closed_stream_is_a_subscription_error() -> anyhow::Result<()> {
    let h = Harness::start(RecordingNotifier::new(), HOUR, 30 * MINUTE).await;
    let notifier = h.notifier.clone();

    let (_, err) = h.stop().await?;

    assert!(matches!(err, SubscriptionError::Closed));
    assert_alerts!(notifier, ["⚠️ Reward subscription error: subscription closed"]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_delivery_keeps_the_loop_running() -> anyhow::Result<()> {
    let h = Harness::start(RecordingNotifier::failing(), HOUR, 30 * MINUTE).await;

    h.new_round(8).await?;
    for _ in 0..4 {
        elapse(30 * MINUTE).await;
    }
    h.reward(801).await?;
    h.new_round(9).await?;

    // Overdue ticks at +60m, +90m and +120m, then the reward
    assert_eq!(h.notifier.attempts(), 4);
    assert!(!h.handle.is_finished());

    let notifier = h.notifier.clone();
    let (monitor, _) = h.stop().await?;
    assert_eq!(monitor.state().current_round(), 9);
    assert_eq!(monitor.state().phase(), RoundPhase::Pending);
    assert_eq!(notifier.attempts(), 5);
    assert_alerts!(notifier, []);

    Ok(())
}
