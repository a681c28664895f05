use std::fmt::Display;

use clap::{Parser, Subcommand};
use eyre::Context;
use logtree::{log_debug, log_error, log_info, log_trace, Builder, Config, Logger, Severity};

mod emit;
mod levels;
mod render;

#[derive(Subcommand, Debug)]
pub enum LogtreeCmd {
    Emit(emit::Cmd),

    Levels(levels::Cmd),

    Render(render::Cmd),
}

impl Display for LogtreeCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogtreeCmd::Emit(cmd) => write!(f, "emit {}", cmd),
            LogtreeCmd::Levels(_cmd) => write!(f, "levels"),
            LogtreeCmd::Render(_cmd) => write!(f, "render"),
        }
    }
}

#[derive(Parser)]
#[command(version, long_version = "")]
#[command(about = "Emit and preview messages through a tree of loggers.", long_about = None, disable_help_subcommand = true)]
pub struct Logtree {
    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = "Write verbose messages to stderr for debugging.",
        display_order = 999
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: LogtreeCmd,
}

impl Logtree {
    fn diagnostics_level(&self) -> Option<Severity> {
        match self.verbose {
            0 => None,
            1 => Some(Severity::Error),
            2 => Some(Severity::Warning),
            3 => Some(Severity::Info),
            4 => Some(Severity::Debug),
            5_u8..=u8::MAX => Some(Severity::Trace),
        }
    }

    fn diagnostics(&self) -> eyre::Result<Logger<'static>> {
        let level = self.diagnostics_level();

        Builder::new("logtree")
            .with_level(level.unwrap_or(Severity::Fatal))
            .enabled(level.is_some())
            .with_format("[%T] %N %L: %S")
            .with_stderr_destination()
            .build()
            .context("Failed setting up diagnostics logger")
    }

    pub fn run(self) -> eyre::Result<()> {
        let diagnostics = self.diagnostics()?;
        let config = Config::from_env().context("Failed reading configuration from environment")?;

        log_info!(diagnostics, "running command ", &self.cmd);
        log_trace!(diagnostics, "configuration: ", format_args!("{:?}", config));

        let result = match &self.cmd {
            LogtreeCmd::Emit(emit) => emit.run(&config, &diagnostics),
            LogtreeCmd::Levels(levels) => levels.run(),
            LogtreeCmd::Render(render) => render.run(&config),
        };

        match &result {
            Ok(_) => log_debug!(diagnostics, "command ", &self.cmd, " finished"),
            Err(msg) => log_error!(
                diagnostics,
                "failed running command ",
                &self.cmd,
                ", error=",
                msg,
                " cause=",
                msg.root_cause()
            ),
        }

        result
    }
}

/// Splits a dotted logger path (`app.net.http`) into its segments.
pub(crate) fn logger_path(path: &str) -> eyre::Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(eyre::eyre!(
            "Invalid logger path '{}', segments can't be empty",
            path
        ));
    }

    Ok(segments)
}

pub(crate) fn parse_severity(value: &str) -> eyre::Result<Severity> {
    value.parse()
}
