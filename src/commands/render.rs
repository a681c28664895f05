use std::io::{self, IsTerminal};

use clap::Args;
use logtree::{destinations::SharedBuffer, log_at, Builder, Config, Severity};

use super::parse_severity;

/// Shows what a format template produces for this call site.
#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(short, long, help = "Template to preview. Defaults to the configured one.")]
    pub format: Option<String>,

    #[arg(short, long, default_value = "info", value_parser = parse_severity)]
    pub level: Severity,

    #[arg(long, default_value = "app")]
    pub logger: String,

    #[arg(num_args = 0..)]
    pub message: Vec<String>,
}

impl Cmd {
    pub fn run(&self, config: &Config) -> eyre::Result<()> {
        let buffer = SharedBuffer::new();
        let mut builder = Builder::new(&self.logger)
            .with_config(config.clone())
            .with_level(Severity::Trace)
            .with_destination(Box::new(buffer.clone()));
        if let Some(format) = &self.format {
            builder = builder.with_format(format);
        }
        let logger = builder.build()?;
        // The buffer is only a detour on the way to stdout.
        logger.set_ansi(config.color.resolve(io::stdout().is_terminal()));

        // Previews never abort, even for fatal.
        logger.set_fatal_hook(|| {});
        log_at!(logger, self.level, self.message.join(" "));

        print!("{}", buffer.contents());
        Ok(())
    }
}
