use reward_watcher::{SubscriptionError, source::LogResult, test_utils::new_round_log};
use tokio::sync::mpsc;

mod channel_state_enum {
    use reward_watcher::source::ChannelState;

    #[test]
    fn open_state() {
        assert!(ChannelState::Open.is_open());
        assert!(!ChannelState::Open.is_closed());
    }

    #[test]
    fn closed_state() {
        assert!(ChannelState::Closed.is_closed());
        assert!(!ChannelState::Closed.is_open());
    }

    #[test]
    fn channel_state_debug_format() {
        assert_eq!(format!("{:?}", ChannelState::Open), "Open");
        assert_eq!(format!("{:?}", ChannelState::Closed), "Closed");
    }
}

mod try_stream {
    use super::*;
    use reward_watcher::source::{ChannelState, TryStream};

    #[tokio::test]
    async fn try_stream_returns_open_when_receiver_exists() {
        let (tx, _rx) = mpsc::channel::<LogResult>(10);

        let result = tx.try_stream(new_round_log(1, 1)).await;

        assert_eq!(result, ChannelState::Open);
    }

    #[tokio::test]
    async fn try_stream_returns_closed_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel::<LogResult>(10);
        drop(rx);

        let result = tx.try_stream(SubscriptionError::Closed).await;

        assert_eq!(result, ChannelState::Closed);
    }

    #[tokio::test]
    async fn logs_and_errors_arrive_as_results() {
        let (tx, mut rx) = mpsc::channel::<LogResult>(10);

        assert!(tx.try_stream(new_round_log(3, 30)).await.is_open());
        assert!(tx.try_stream(SubscriptionError::Lagged(1)).await.is_open());

        let log = rx.recv().await.unwrap().unwrap();
        assert_eq!(log, new_round_log(3, 30));
        assert!(matches!(rx.recv().await, Some(Err(SubscriptionError::Lagged(1)))));
    }
}
