use crate::{logger::Logger, severity::Severity, sink::Location};

/// Logs `entering <name>` when created and `leaving <name>` when dropped,
/// both at [`Severity::Trace`]. Usually created through [`trace_scope!`].
///
/// [`trace_scope!`]: crate::trace_scope
pub struct Tracer<'a> {
    logger: &'a Logger<'a>,
    location: Location,
    name: &'a str,
}

impl<'a> Tracer<'a> {
    pub fn new(logger: &'a Logger<'a>, location: Location, name: &'a str) -> Self {
        let tracer = Self {
            logger,
            location,
            name,
        };
        tracer.emit("entering ");
        tracer
    }

    fn emit(&self, verb: &str) {
        if self.logger.is_level(Severity::Trace) {
            self.logger
                .log(Severity::Trace, self.location)
                .push(verb)
                .push(self.name);
        }
    }
}

impl Drop for Tracer<'_> {
    fn drop(&mut self) {
        self.emit("leaving ");
    }
}
