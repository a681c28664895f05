//! Call-site macros.
//!
//! Every logging macro checks [`Logger::is_level`](crate::Logger::is_level)
//! before a [`Sink`](crate::Sink) is created, so a rejected statement costs
//! one comparison and its fragments are never evaluated.
//!
//! ```ignore
//! let root = logtree::Logger::root("app");
//! let net = logtree::Logger::child("net", &root);
//! logtree::log_warning!(net, "retrying ", host, " after ", delay_ms, "ms");
//! ```

/// Path of the enclosing function, e.g. `my_crate::net::connect`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

/// [`Location`](crate::Location) of the macro invocation.
#[macro_export]
macro_rules! location {
    () => {
        $crate::Location::new(file!(), line!(), $crate::function_name!())
    };
}

/// Logs the concatenated `Display` text of the fragments at `level`.
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr $(, $fragment:expr)* $(,)?) => {{
        let logger: &$crate::Logger<'_> = &$logger;
        let level: $crate::Severity = $level;
        if logger.is_level(level) {
            #[allow(unused_mut, unused_variables)]
            let mut sink = logger.log(level, $crate::location!());
            $( sink.push(&$fragment); )*
        }
    }};
}

#[macro_export]
macro_rules! log_trace {
    ($logger:expr $(, $fragment:expr)* $(,)?) => {
        $crate::log_at!($logger, $crate::Severity::Trace $(, $fragment)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr $(, $fragment:expr)* $(,)?) => {
        $crate::log_at!($logger, $crate::Severity::Debug $(, $fragment)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr $(, $fragment:expr)* $(,)?) => {
        $crate::log_at!($logger, $crate::Severity::Info $(, $fragment)*)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr $(, $fragment:expr)* $(,)?) => {
        $crate::log_at!($logger, $crate::Severity::Warning $(, $fragment)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr $(, $fragment:expr)* $(,)?) => {
        $crate::log_at!($logger, $crate::Severity::Error $(, $fragment)*)
    };
}

/// Logs at [`Severity::Fatal`](crate::Severity::Fatal). Once accepted, the
/// line is written and flushed and the process aborts (or the nearest fatal
/// hook runs).
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr $(, $fragment:expr)* $(,)?) => {
        $crate::log_at!($logger, $crate::Severity::Fatal $(, $fragment)*)
    };
}

/// Traces entry and exit of the enclosing scope at trace level.
#[macro_export]
macro_rules! trace_scope {
    ($logger:expr, $name:ident) => {
        let _trace_scope = $crate::Tracer::new(&$logger, $crate::location!(), stringify!($name));
    };
    ($logger:expr, $name:expr) => {
        let _trace_scope = $crate::Tracer::new(&$logger, $crate::location!(), $name);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_assert_failed {
    ($logger:expr, ($($what:expr),+), ()) => {
        $crate::log_fatal!($logger, "ASSERTION FAILED: " $(, $what)+)
    };
    ($logger:expr, ($($what:expr),+), ($($fragment:expr),+)) => {
        $crate::log_fatal!($logger, "ASSERTION FAILED: " $(, $what)+, ": " $(, $fragment)+)
    };
}

/// Logs `ASSERTION FAILED: <cond>: <fragments>` at fatal level when `cond`
/// is false. Only checked with `debug_assertions`.
#[macro_export]
macro_rules! log_assert {
    ($logger:expr, $cond:expr $(, $fragment:expr)* $(,)?) => {{
        if cfg!(debug_assertions) && !$cond {
            $crate::__log_assert_failed!($logger, (stringify!($cond)), ($($fragment),*));
        }
    }};
}

#[macro_export]
macro_rules! log_assert_eq {
    ($logger:expr, $left:expr, $right:expr $(, $fragment:expr)* $(,)?) => {{
        if cfg!(debug_assertions) {
            match (&$left, &$right) {
                (left, right) => {
                    if !(*left == *right) {
                        $crate::__log_assert_failed!(
                            $logger,
                            (
                                stringify!($left),
                                " == ",
                                stringify!($right),
                                " (left: ",
                                format_args!("{:?}", left),
                                ", right: ",
                                format_args!("{:?}", right),
                                ")"
                            ),
                            ($($fragment),*)
                        );
                    }
                }
            }
        }
    }};
}

#[macro_export]
macro_rules! log_assert_ne {
    ($logger:expr, $left:expr, $right:expr $(, $fragment:expr)* $(,)?) => {{
        if cfg!(debug_assertions) {
            match (&$left, &$right) {
                (left, right) => {
                    if *left == *right {
                        $crate::__log_assert_failed!(
                            $logger,
                            (
                                stringify!($left),
                                " != ",
                                stringify!($right),
                                " (both: ",
                                format_args!("{:?}", left),
                                ")"
                            ),
                            ($($fragment),*)
                        );
                    }
                }
            }
        }
    }};
}

/// Asserts that an `Option` holds a value.
#[macro_export]
macro_rules! log_assert_some {
    ($logger:expr, $option:expr $(, $fragment:expr)* $(,)?) => {{
        if cfg!(debug_assertions) && ::core::option::Option::is_none(&$option) {
            $crate::__log_assert_failed!(
                $logger,
                (stringify!($option), " is None"),
                ($($fragment),*)
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use crate::{destinations::SharedBuffer, Logger, Severity};

    fn capture(format: &str) -> (Logger<'static>, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let logger = Logger::with_destination("root", Box::new(buffer.clone()));
        logger.set_format(format);
        (logger, buffer)
    }

    fn fatal_counter(logger: &Logger<'_>) -> Rc<Cell<usize>> {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        logger.set_fatal_hook(move || counter.set(counter.get() + 1));
        calls
    }

    #[test]
    fn function_name_is_enclosing_fn() {
        let name = function_name!();
        assert!(name.ends_with("::function_name_is_enclosing_fn"), "{name}");
    }

    #[test]
    fn location_points_at_the_call() {
        let (root, buffer) = capture("%F:%C %P");
        let line = line!() + 1;
        log_info!(root, "x");

        assert_eq!(
            buffer.lines(),
            [format!("{}:{} {}", file!(), line, function_name!())]
        );
    }

    #[test]
    fn fragments_stream_in_order() {
        let (root, buffer) = capture("%S");
        let y = 3.14;
        log_info!(root, "x=", 5, " y=", y);

        assert_eq!(buffer.lines(), ["x=5 y=3.14"]);
    }

    #[test]
    #[deny(unused_variables)]
    fn level_macros_use_their_severity() {
        let (root, buffer) = capture("%L");
        root.set_level(Severity::Trace);
        let calls = fatal_counter(&root);

        log_trace!(root);
        log_debug!(root);
        log_info!(root);
        log_warning!(root);
        log_error!(root);
        log_fatal!(root);
        log_at!(&root, Severity::Info);

        assert_eq!(
            buffer.lines(),
            ["TRACE", "DEBUG", "INFO", "WARNING", "ERROR", "FATAL", "INFO"]
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn rejected_fragments_are_not_evaluated() {
        let (root, buffer) = capture("%S");
        let evaluated = Cell::new(false);
        let expensive = || {
            evaluated.set(true);
            "costly"
        };

        log_debug!(root, expensive());

        assert!(!evaluated.get());
        assert_eq!(buffer.writes(), 0);
    }

    #[test]
    fn fatal_through_rejecting_logger_is_a_no_op() {
        let (root, buffer) = capture("%S");
        let calls = fatal_counter(&root);
        root.set_enabled(false);

        log_fatal!(root, "no");

        assert!(buffer.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn trace_scope_brackets_block() {
        let (root, buffer) = capture("%S");
        root.set_level(Severity::Trace);

        {
            trace_scope!(root, startup);
            log_info!(root, "inside");
        }

        assert_eq!(
            buffer.lines(),
            ["entering startup", "inside", "leaving startup"]
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    fn assertions_log_fatal_on_failure() {
        let (root, buffer) = capture("%L %S");
        let calls = fatal_counter(&root);
        let missing: Option<u8> = None;

        log_assert!(root, 1 + 1 == 2, "math");
        log_assert!(root, 2 < 1, "order ", 7);
        log_assert!(root, false);
        log_assert_eq!(root, 2 + 2, 5, "sum");
        log_assert_ne!(root, 1, 1);
        log_assert_some!(root, Some(1));
        log_assert_some!(root, missing, "need a value");

        assert_eq!(
            buffer.lines(),
            [
                "FATAL ASSERTION FAILED: 2 < 1: order 7",
                "FATAL ASSERTION FAILED: false",
                "FATAL ASSERTION FAILED: 2 + 2 == 5 (left: 4, right: 5): sum",
                "FATAL ASSERTION FAILED: 1 != 1 (both: 1)",
                "FATAL ASSERTION FAILED: missing is None: need a value",
            ]
        );
        assert_eq!(calls.get(), 5);
    }
}
