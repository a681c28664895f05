use core::fmt::{self, Display, Write};

use crate::{logger::Logger, severity::Severity};

/// Source position of a log statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

impl Location {
    pub fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }
}

/// Everything the renderer needs to produce one line.
#[derive(Clone, Copy)]
pub struct Record<'a> {
    level: Severity,
    origin: &'a Logger<'a>,
    location: Location,
    message: &'a str,
}

impl<'a> Record<'a> {
    pub fn new(
        level: Severity,
        origin: &'a Logger<'a>,
        location: Location,
        message: &'a str,
    ) -> Self {
        Self {
            level,
            origin,
            location,
            message,
        }
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    /// The logger the statement was issued on, not the one writing it.
    pub fn origin(&self) -> &'a Logger<'a> {
        self.origin
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn message(&self) -> &'a str {
        self.message
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("level", &self.level)
            .field("origin", &self.origin.name())
            .field("location", &self.location)
            .field("message", &self.message)
            .finish()
    }
}

/// Accumulates the fragments of a single log statement.
///
/// Streaming into a sink only appends to an in-memory buffer. Formatting and
/// I/O happen once, when the sink is dropped at the end of the statement. A
/// sink for [`Severity::Fatal`] runs the logger's terminal action after the
/// line has been written and flushed.
///
/// Callers are expected to check [`Logger::is_level`] before creating one;
/// the macros in this crate do that.
pub struct Sink<'a> {
    logger: &'a Logger<'a>,
    level: Severity,
    location: Location,
    message: String,
}

impl<'a> Sink<'a> {
    pub(crate) fn new(logger: &'a Logger<'a>, level: Severity, location: Location) -> Self {
        Self {
            logger,
            level,
            location,
            message: String::new(),
        }
    }

    /// Appends the `Display` text of `value`, with nothing inserted between
    /// fragments.
    pub fn push<T: Display + ?Sized>(&mut self, value: &T) -> &mut Self {
        // Only a misbehaving Display impl can fail here.
        let _ = write!(self.message, "{}", value);
        self
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    /// The text accumulated so far.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Write for Sink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.message.push_str(s);
        Ok(())
    }
}

impl Drop for Sink<'_> {
    fn drop(&mut self) {
        let message = std::mem::take(&mut self.message);
        let record = Record::new(self.level, self.logger, self.location, &message);

        // Destination failures are the destination's business.
        let _ = self.logger.write_log(&record);

        if self.level == Severity::Fatal {
            let _ = self.logger.flush();
            self.logger.terminate();
        }
    }
}
