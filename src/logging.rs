//! Internal logging macros routed through `tracing` under the `reward_watcher` target.
//!
//! With the `tracing` feature disabled every call expands to a no-op that still evaluates
//! field expressions by reference, so call sites compile identically in both configurations.

#[doc(hidden)]
#[macro_export]
#[cfg(feature = "tracing")]
macro_rules! __watcher_log {
    ($level:ident, $($arg:tt)*) => {
        ::tracing::$level!(target: "reward_watcher", $($arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "tracing"))]
macro_rules! __watcher_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::__trace_consume!($($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__watcher_log!(error, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__watcher_log!(warn, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__watcher_log!(info, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::__watcher_log!(debug, $($arg)*)
    };
}

#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::__watcher_log!(trace, $($arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "tracing"))]
macro_rules! __trace_consume {
    () => {
        ()
    };
    (, $($rest:tt)*) => {
        $crate::__trace_consume!($($rest)*)
    };
    // field = %expr
    ($field:ident = % $value:expr $(, $($rest:tt)*)?) => {
        { let _ = &$value; $crate::__trace_consume!($($($rest)*)?); }
    };
    // field = ?expr
    ($field:ident = ? $value:expr $(, $($rest:tt)*)?) => {
        { let _ = &$value; $crate::__trace_consume!($($($rest)*)?); }
    };
    // field = expr
    ($field:ident = $value:expr $(, $($rest:tt)*)?) => {
        { let _ = &$value; $crate::__trace_consume!($($($rest)*)?); }
    };
    ($lit:literal $($rest:tt)*) => {
        $crate::__trace_consume!($($rest)*)
    };
    // positional format arguments
    ($value:expr $(, $($rest:tt)*)?) => {
        { let _ = &$value; $crate::__trace_consume!($($($rest)*)?); }
    };
}
