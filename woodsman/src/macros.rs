/// Initializes the global logger with explicit [`Options`], or from the
/// environment when called with no arguments. First initialization wins;
/// later calls are ignored.
///
/// [`Options`]: crate::Options
#[macro_export]
macro_rules! init {
    () => {{
        let _ = $crate::try_init($crate::Options::from_env());
    }};
    ($opts:expr) => {{
        let _ = $crate::try_init($opts);
    }};
}

/// Logs through the global logger at the given severity, capturing the
/// invocation site for the record header.
#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
    ($severity:expr, $($args:tt)*) => {
        $crate::logger().print_at(
            $severity,
            $crate::CallSite::new(file!(), line!()),
            format_args!($($args)*),
        )
    };
}

/// Info level log
#[macro_export]
macro_rules! info {
    ($($args:tt)*) => ( $crate::log_at!($crate::Severity::Info, $($args)*) );
}

/// Warning level log
#[macro_export]
macro_rules! warning {
    ($($args:tt)*) => ( $crate::log_at!($crate::Severity::Warning, $($args)*) );
}

/// Error level log
#[macro_export]
macro_rules! error {
    ($($args:tt)*) => ( $crate::log_at!($crate::Severity::Error, $($args)*) );
}

/// Fatal level log; flushes and syncs all sinks and runs the exit hook.
#[macro_export]
macro_rules! fatal {
    ($($args:tt)*) => ( $crate::log_at!($crate::Severity::Fatal, $($args)*) );
}

/// Evaluates the verbosity gate for the invocation site and returns the
/// conditionally-active [`Verbose`] guard.
///
/// [`Verbose`]: crate::Verbose
#[macro_export]
macro_rules! v {
    ($level:expr) => {
        $crate::logger().v_at($crate::Level($level), $crate::CallSite::new(file!(), line!()))
    };
}
