use core::fmt;
use std::{
    cell::{Cell, RefCell},
    io::{self, IsTerminal, Write},
    path::PathBuf,
    rc::Rc,
};

use eyre::Context;

use crate::{
    config::{ColorMode, Config},
    destinations,
    formatters::{validate_datetime_format, LogFormatter, TemplateFormatter},
    severity::Severity,
    sink::{Location, Record, Sink},
};

enum Node<'a> {
    Root { destination: RefCell<Box<dyn Write>> },
    Child { parent: &'a Logger<'a> },
}

/// A named node in a tree of loggers.
///
/// A root logger owns the output destination. A child only knows its parent
/// and forwards every accepted message upward until it reaches the root,
/// which renders the line with its own format and writes it.
///
/// Filtering happens once, at the logger a statement is issued on: if
/// [`is_level`](Self::is_level) accepts it there, it is written regardless
/// of the thresholds of any ancestor.
///
/// All setters take `&self`, so a logger can be reconfigured while children
/// borrow it. Loggers are single-threaded (`!Sync`).
pub struct Logger<'a> {
    name: String,
    level: Cell<Severity>,
    enabled: Cell<bool>,
    format: RefCell<String>,
    datetime_format: RefCell<String>,
    use_ansi: Cell<bool>,
    formatter: RefCell<Option<Rc<dyn LogFormatter>>>,
    fatal_hook: RefCell<Option<Rc<dyn Fn()>>>,
    node: Node<'a>,
}

impl<'a> Logger<'a> {
    fn new(name: impl Into<String>, node: Node<'a>) -> Self {
        let config = Config::new();
        Self {
            name: name.into(),
            level: Cell::new(config.level),
            enabled: Cell::new(config.enabled),
            format: RefCell::new(config.format),
            datetime_format: RefCell::new(config.datetime_format),
            use_ansi: Cell::new(config.color.resolve(false)),
            formatter: RefCell::new(None),
            fatal_hook: RefCell::new(None),
            node,
        }
    }

    /// Creates a root logger writing to stdout.
    pub fn root(name: impl Into<String>) -> Self {
        Self::with_destination(name, destinations::stdout())
    }

    pub fn with_destination(name: impl Into<String>, destination: Box<dyn Write>) -> Self {
        Self::new(
            name,
            Node::Root {
                destination: RefCell::new(destination),
            },
        )
    }

    /// Creates a logger that forwards everything it accepts to `parent`.
    ///
    /// The child starts with default settings; nothing is inherited.
    pub fn child(name: impl Into<String>, parent: &'a Logger<'a>) -> Self {
        Self::new(name, Node::Child { parent })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&'a Logger<'a>> {
        match self.node {
            Node::Root { .. } => None,
            Node::Child { parent } => Some(parent),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.node, Node::Root { .. })
    }

    /// The root this logger's messages end up at.
    pub fn owner(&self) -> &Logger<'a> {
        let mut logger = self;
        while let Node::Child { parent } = logger.node {
            logger = parent;
        }
        logger
    }

    pub fn level(&self) -> Severity {
        self.level.get()
    }

    pub fn set_level(&self, level: Severity) {
        self.level.set(level);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// A disabled logger rejects every severity, `Fatal` included.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn format(&self) -> String {
        self.format.borrow().clone()
    }

    /// Sets the template used when this logger writes a line. Only has an
    /// effect on roots, since children never render.
    pub fn set_format(&self, format: impl Into<String>) {
        *self.format.borrow_mut() = format.into();
    }

    pub fn datetime_format(&self) -> String {
        self.datetime_format.borrow().clone()
    }

    pub fn set_datetime_format(&self, format: impl Into<String>) -> eyre::Result<()> {
        let format = format.into();
        validate_datetime_format(&format)?;
        *self.datetime_format.borrow_mut() = format;
        Ok(())
    }

    pub fn use_ansi(&self) -> bool {
        self.use_ansi.get()
    }

    pub fn set_ansi(&self, use_ansi: bool) {
        self.use_ansi.set(use_ansi);
    }

    /// Replaces template rendering with `formatter` when this logger writes
    /// a line.
    pub fn set_formatter(&self, formatter: impl LogFormatter + 'static) {
        *self.formatter.borrow_mut() = Some(Rc::new(formatter));
    }

    /// Goes back to rendering the format template.
    pub fn clear_formatter(&self) {
        *self.formatter.borrow_mut() = None;
    }

    /// Applies `config`. Without a known destination, [`ColorMode::Auto`]
    /// resolves to no colour; [`Builder::build`] resolves it against the
    /// destination it creates.
    pub fn apply_config(&self, config: &Config) -> eyre::Result<()> {
        self.set_datetime_format(config.datetime_format.clone())?;
        self.set_level(config.level);
        self.set_enabled(config.enabled);
        self.set_format(config.format.clone());
        self.set_ansi(config.color.resolve(false));
        Ok(())
    }

    /// Runs `hook` instead of aborting after a fatal message issued on this
    /// logger or any of its descendants without a hook of their own.
    ///
    /// If the hook returns, the caller carries on after the fatal statement.
    pub fn set_fatal_hook(&self, hook: impl Fn() + 'static) {
        *self.fatal_hook.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn clear_fatal_hook(&self) {
        *self.fatal_hook.borrow_mut() = None;
    }

    pub fn is_level(&self, level: Severity) -> bool {
        self.enabled.get() && level >= self.level.get()
    }

    /// Starts a log statement. The caller checks [`is_level`](Self::is_level)
    /// first; nothing is written until the returned sink is dropped.
    pub fn log(&self, level: Severity, location: Location) -> Sink<'_> {
        Sink::new(self, level, location)
    }

    /// Forwards `record` up to the root, which renders it with its own
    /// format and writes it as one newline-terminated line.
    pub fn write_log(&self, record: &Record<'_>) -> io::Result<()> {
        let destination = match &self.node {
            Node::Child { parent } => return parent.write_log(record),
            Node::Root { destination } => destination,
        };

        let formatter = self.formatter.borrow().clone();
        let mut line = match formatter {
            Some(formatter) => formatter.format(record),
            None => {
                let format = self.format.borrow();
                let datetime_format = self.datetime_format.borrow();
                TemplateFormatter::new(&format, &datetime_format, self.use_ansi.get())
                    .format(record)
            }
        };
        line.push('\n');

        let mut destination = destination.try_borrow_mut().map_err(busy)?;
        destination.write_all(line.as_bytes())
    }

    /// Flushes the destination of the owning root.
    pub fn flush(&self) -> io::Result<()> {
        match &self.owner().node {
            Node::Root { destination } => destination.try_borrow_mut().map_err(busy)?.flush(),
            Node::Child { .. } => Ok(()),
        }
    }

    /// Swaps the destination of a root, returning the previous one. Children
    /// can't own a destination, so the call is rejected for them.
    pub fn replace_destination(&self, destination: Box<dyn Write>) -> eyre::Result<Box<dyn Write>> {
        match &self.node {
            Node::Root { destination: current } => {
                let mut current = current
                    .try_borrow_mut()
                    .map_err(|_| eyre::eyre!("Destination of '{}' is in use", self.name))?;
                Ok(std::mem::replace(&mut *current, destination))
            }
            Node::Child { .. } => Err(eyre::eyre!(
                "Logger '{}' is a child of '{}' and can't own a destination",
                self.name,
                self.owner().name
            )),
        }
    }

    /// Runs the nearest fatal hook, walking up from this logger, or aborts
    /// the process when there is none.
    pub(crate) fn terminate(&self) {
        let mut logger = self;
        loop {
            // The hook may replace itself, so it runs outside the borrow.
            let hook = logger.fatal_hook.borrow().clone();
            if let Some(hook) = hook {
                hook();
                return;
            }

            match logger.node {
                Node::Child { parent } => logger = parent,
                Node::Root { .. } => std::process::abort(),
            }
        }
    }
}

fn busy<E>(_: E) -> io::Error {
    io::Error::new(io::ErrorKind::WouldBlock, "destination is already being written to")
}

impl fmt::Debug for Logger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level.get())
            .field("enabled", &self.enabled.get())
            .field("parent", &self.parent().map(|p| p.name()))
            .finish_non_exhaustive()
    }
}

enum DestinationChoice {
    Stdout,
    Stderr,
    File(PathBuf),
    Custom(Box<dyn Write>),
}

/// Assembles a logger from a [`Config`] plus explicit overrides.
pub struct Builder {
    name: String,
    config: Config,
    destination: Option<DestinationChoice>,
    formatter: Option<Rc<dyn LogFormatter>>,
}

impl Builder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Config::new(),
            destination: None,
            formatter: None,
        }
    }

    pub fn with_config(self, config: Config) -> Self {
        Self { config, ..self }
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.config.level = level;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.config.format = format.into();
        self
    }

    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.config.datetime_format = format.into();
        self
    }

    pub fn with_color(mut self, color: ColorMode) -> Self {
        self.config.color = color;
        self
    }

    pub fn with_ansi(self, use_ansi: bool) -> Self {
        self.with_color(if use_ansi {
            ColorMode::Always
        } else {
            ColorMode::Never
        })
    }

    pub fn with_formatter(self, formatter: impl LogFormatter + 'static) -> Self {
        Self {
            formatter: Some(Rc::new(formatter)),
            ..self
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn with_stdout_destination(self) -> Self {
        Self {
            destination: Some(DestinationChoice::Stdout),
            ..self
        }
    }

    pub fn with_stderr_destination(self) -> Self {
        Self {
            destination: Some(DestinationChoice::Stderr),
            ..self
        }
    }

    pub fn with_file_destination(self, path: impl Into<PathBuf>) -> Self {
        Self {
            destination: Some(DestinationChoice::File(path.into())),
            ..self
        }
    }

    pub fn with_destination(self, destination: Box<dyn Write>) -> Self {
        Self {
            destination: Some(DestinationChoice::Custom(destination)),
            ..self
        }
    }

    /// Builds a root logger. Without an explicit destination it writes to
    /// stdout.
    ///
    /// [`ColorMode::Auto`] colours output only when the destination is a
    /// terminal; files and custom writers never are.
    pub fn build(self) -> eyre::Result<Logger<'static>> {
        let (destination, is_terminal): (Box<dyn Write>, bool) = match self.destination {
            None | Some(DestinationChoice::Stdout) => {
                (destinations::stdout(), io::stdout().is_terminal())
            }
            Some(DestinationChoice::Stderr) => {
                (destinations::stderr(), io::stderr().is_terminal())
            }
            Some(DestinationChoice::File(path)) => (Box::new(destinations::file(path)?), false),
            Some(DestinationChoice::Custom(destination)) => (destination, false),
        };

        let logger = Logger::with_destination(self.name, destination);
        logger
            .apply_config(&self.config)
            .wrap_err_with(|| format!("Failed configuring logger '{}'", logger.name))?;
        logger.set_ansi(self.config.color.resolve(is_terminal));
        *logger.formatter.borrow_mut() = self.formatter;
        Ok(logger)
    }

    pub fn build_child<'a>(self, parent: &'a Logger<'a>) -> eyre::Result<Logger<'a>> {
        if self.destination.is_some() {
            return Err(eyre::eyre!(
                "Logger '{}' has parent '{}' and can't be given a destination",
                self.name,
                parent.name()
            ));
        }

        let logger = Logger::child(self.name, parent);
        logger
            .apply_config(&self.config)
            .wrap_err_with(|| format!("Failed configuring logger '{}'", logger.name))?;
        *logger.formatter.borrow_mut() = self.formatter;
        Ok(logger)
    }
}
