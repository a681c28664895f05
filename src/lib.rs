//! Hierarchical loggers that filter, format and write text lines.
//!
//! A [`Logger`] is either a root, which owns an output destination, or a
//! child that borrows its parent. A statement is filtered once, at the logger
//! it is issued on. Accepted statements stream their fragments into a
//! [`Sink`], and when the sink goes out of scope the message is forwarded up
//! to the root, rendered with the root's format template and written.
//!
//! ```ignore
//! use logtree::{log_info, log_trace, Logger, Severity};
//!
//! let root = Logger::root("app");
//! root.set_level(Severity::Error);
//!
//! let db = Logger::child("db", &root);
//! db.set_level(Severity::Trace);
//!
//! // Written: only `db`'s threshold is consulted.
//! log_trace!(db, "opened ", 3, " connections");
//! // Dropped: `root` itself only accepts errors.
//! log_info!(root, "ready");
//! ```

#[macro_use]
mod macros;

pub mod config;
pub mod destinations;
pub mod formatters;
mod logger;
mod severity;
mod sink;
mod tracer;

pub use config::{ColorMode, Config};
pub use formatters::LogFormatter;
pub use logger::{Builder, Logger};
pub use severity::Severity;
pub use sink::{Location, Record, Sink};
pub use tracer::Tracer;
