use std::{fmt, str::FromStr};

use eyre::Context;

use crate::{
    formatters::{validate_datetime_format, DEFAULT_DATETIME_FORMAT, DEFAULT_FORMAT},
    severity::Severity,
};

pub const LEVEL_VAR: &str = "LOGTREE_LEVEL";
pub const FORMAT_VAR: &str = "LOGTREE_FORMAT";
pub const DATETIME_FORMAT_VAR: &str = "LOGTREE_DATETIME_FORMAT";
pub const COLOR_VAR: &str = "LOGTREE_COLOR";

/// When a root colours the level of its lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colour only when the root writes to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn resolve(self, is_terminal: bool) -> bool {
        match self {
            Self::Auto => is_terminal,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl FromStr for ColorMode {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(eyre::eyre!(
                "Unknown color mode '{}', expected always, never or auto",
                s
            )),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        })
    }
}

/// Settings applied to a logger when it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub level: Severity,
    pub format: String,
    pub datetime_format: String,
    pub color: ColorMode,
    pub enabled: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            level: Severity::Info,
            format: DEFAULT_FORMAT.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            color: ColorMode::Never,
            enabled: true,
        }
    }

    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, starting from the defaults. Empty
    /// values count as unset. Colour defaults to [`ColorMode::Auto`] unless
    /// `NO_COLOR` is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let mut config = Self::new();

        if let Some(level) = get(LEVEL_VAR) {
            config.level = level
                .parse()
                .with_context(|| format!("Invalid {} value", LEVEL_VAR))?;
        }

        if let Some(format) = get(FORMAT_VAR) {
            config.format = format;
        }

        if let Some(datetime_format) = get(DATETIME_FORMAT_VAR) {
            validate_datetime_format(&datetime_format)
                .with_context(|| format!("Invalid {} value", DATETIME_FORMAT_VAR))?;
            config.datetime_format = datetime_format;
        }

        config.color = match get(COLOR_VAR) {
            Some(mode) => mode
                .parse()
                .with_context(|| format!("Invalid {} value", COLOR_VAR))?,
            None => ColorMode::Auto,
        };
        if config.color == ColorMode::Auto && get("NO_COLOR").is_some() {
            config.color = ColorMode::Never;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
