use std::{fmt::Display, path::PathBuf};

use clap::{Args, ValueEnum};
use eyre::Context;
use logtree::{log_at, log_debug, log_trace, Builder, Config, Logger, Severity};

use super::{logger_path, parse_severity};

#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(short, long, default_value = "info", value_parser = parse_severity)]
    pub level: Severity,

    #[arg(
        short,
        long,
        value_parser = parse_threshold,
        help = "Threshold of the logger the message is issued on, or 'off' to disable it."
    )]
    pub threshold: Option<Threshold>,

    #[arg(
        long,
        default_value = "app",
        help = "Dotted logger path. The first segment is the root, the last one issues the message."
    )]
    pub logger: String,

    #[arg(short, long, help = "Format template of the root logger.")]
    pub format: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Output::Stdout)]
    pub output: Output,

    #[arg(long, required_if_eq("output", "file"))]
    pub file: Option<PathBuf>,

    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Threshold {
    Level(Severity),
    Off,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Output {
    Stdout,
    Stderr,
    File,
}

fn parse_threshold(value: &str) -> eyre::Result<Threshold> {
    if value.eq_ignore_ascii_case("off") {
        return Ok(Threshold::Off);
    }

    Ok(Threshold::Level(value.parse()?))
}

impl Display for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> at {}", self.logger, self.level)
    }
}

impl Cmd {
    pub fn run(&self, config: &Config, diagnostics: &Logger<'_>) -> eyre::Result<()> {
        let path = logger_path(&self.logger)?;
        let (root_name, children) = path
            .split_first()
            .ok_or_else(|| eyre::eyre!("Logger path can't be empty"))?;

        let mut builder = Builder::new(*root_name).with_config(config.clone());
        if let Some(format) = &self.format {
            builder = builder.with_format(format);
        }

        builder = match self.output {
            Output::Stdout => builder.with_stdout_destination(),
            Output::Stderr => builder.with_stderr_destination(),
            Output::File => {
                let file = self
                    .file
                    .clone()
                    .ok_or_else(|| eyre::eyre!("--file is required with --output file"))?;
                builder.with_file_destination(file)
            }
        };

        let root = builder
            .build()
            .with_context(|| format!("Failed building root logger '{}'", root_name))?;
        log_debug!(diagnostics, "built root '", root.name(), "'");

        self.emit_through(&root, children, config.level, diagnostics)
    }

    fn emit_through(
        &self,
        logger: &Logger<'_>,
        rest: &[&str],
        configured: Severity,
        diagnostics: &Logger<'_>,
    ) -> eyre::Result<()> {
        if let Some((name, rest)) = rest.split_first() {
            let child = Logger::child(*name, logger);
            log_trace!(diagnostics, "created child '", name, "' under '", logger.name(), "'");
            return self.emit_through(&child, rest, configured, diagnostics);
        }

        // The issuing logger is the only one that filters, so it takes the
        // configured threshold unless one was given explicitly.
        match self.threshold {
            Some(Threshold::Level(level)) => logger.set_level(level),
            Some(Threshold::Off) => logger.set_enabled(false),
            None => logger.set_level(configured),
        }

        log_debug!(
            diagnostics,
            "'",
            logger.name(),
            "' ",
            if logger.is_level(self.level) { "accepts " } else { "rejects " },
            self.level
        );

        log_at!(logger, self.level, self.message.join(" "));
        logger.flush().context("Failed flushing log destination")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_parsing() {
        assert_eq!(parse_threshold("OFF").unwrap(), Threshold::Off);
        assert_eq!(
            parse_threshold("debug").unwrap(),
            Threshold::Level(Severity::Debug)
        );
        assert!(parse_threshold("never").is_err());
    }
}
