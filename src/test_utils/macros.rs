/// Asserts that the next item of a log stream is `Ok` and equal to the expected log.
#[macro_export]
macro_rules! assert_next {
    ($stream: expr, $expected: expr) => {
        $crate::assert_next!($stream, $expected, timeout = 5)
    };
    ($stream: expr, $expected: expr, timeout = $secs: expr) => {
        let message = tokio::time::timeout(
            std::time::Duration::from_secs($secs),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await
        .expect("timed out");
        let expected = $expected;
        match message {
            std::option::Option::Some(std::result::Result::Ok(log)) => {
                assert_eq!(log, expected, "Expected {:?}, got {:?}", expected, log);
            }
            std::option::Option::Some(std::result::Result::Err(e)) => {
                panic!("Expected Ok({:?}), got Err({:?})", expected, e);
            }
            std::option::Option::None => {
                panic!("Expected Ok({:?}), but channel was closed", expected);
            }
        }
    };
}

/// Asserts that the next item of a log stream is an error matching the pattern.
#[macro_export]
macro_rules! assert_failed {
    ($stream: expr, $pattern: pat) => {
        $crate::assert_failed!($stream, $pattern, timeout = 5)
    };
    ($stream: expr, $pattern: pat, timeout = $secs: expr) => {
        let message = tokio::time::timeout(
            std::time::Duration::from_secs($secs),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await
        .expect("timed out");
        match message {
            std::option::Option::Some(std::result::Result::Err(e)) => {
                assert!(matches!(e, $pattern), "Unexpected error {:?}", e);
            }
            other => panic!("Expected an error, got {:?}", other),
        }
    };
}

#[macro_export]
macro_rules! assert_closed {
    ($stream: expr) => {
        $crate::assert_closed!($stream, timeout = 5)
    };
    ($stream: expr, timeout = $secs: expr) => {
        let message = tokio::time::timeout(
            std::time::Duration::from_secs($secs),
            tokio_stream::StreamExt::next(&mut $stream),
        )
        .await
        .expect("timed out");
        assert!(message.is_none())
    };
}

#[macro_export]
macro_rules! assert_empty {
    ($stream: expr) => {{
        let inner = $stream.into_inner();
        assert!(inner.is_empty(), "Stream should have no pending messages");
        tokio_stream::wrappers::ReceiverStream::new(inner)
    }};
}

/// Asserts that a [`RecordingNotifier`](crate::test_utils::RecordingNotifier) has delivered
/// exactly the listed alerts, in order.
///
/// Each expected entry is a substring of the corresponding message, so tests can match on the
/// stable part of an alert (`"in round 7"`) without spelling out addresses or hashes.
///
/// # Panics
///
/// * **Count mismatch**: more or fewer alerts were delivered than listed.
/// * **Content mismatch**: a delivered alert does not contain the expected text.
///
/// On panic, the message lists every delivered alert.
#[macro_export]
macro_rules! assert_alerts {
    ($notifier: expr, [$($expected: expr),* $(,)?]) => {{
        let delivered = $notifier.messages();
        let expected: &[&str] = &[$($expected),*];
        assert_eq!(
            delivered.len(),
            expected.len(),
            "Expected {} alerts, delivered:\n{:#?}",
            expected.len(),
            delivered
        );
        for (message, needle) in delivered.iter().zip(expected) {
            assert!(
                message.contains(needle),
                "Alert {:?} does not contain {:?}\nDelivered:\n{:#?}",
                message,
                needle,
                delivered
            );
        }
    }};
}
