use core::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use yansi::Paint;

use crate::{severity::Severity, sink::Record};

pub const DEFAULT_FORMAT: &str = "[%F:%C %P] %N %L: %S";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Turns a record into one line of output, without the trailing newline.
///
/// Roots render with a [`TemplateFormatter`] built from their format unless
/// one is installed with [`Logger::set_formatter`](crate::Logger::set_formatter).
pub trait LogFormatter {
    fn format(&self, record: &Record<'_>) -> String;
}

/// Renders a format template against a [`Record`].
///
/// Recognised tokens:
///
/// | Token | Replaced with                       |
/// |-------|-------------------------------------|
/// | `%F`  | source file of the call site        |
/// | `%C`  | source line of the call site        |
/// | `%P`  | function of the call site           |
/// | `%N`  | name of the originating logger      |
/// | `%L`  | severity text                       |
/// | `%S`  | the composed message                |
/// | `%T`  | local time, using `datetime_format` |
///
/// Every other `%` sequence, and a `%` at the very end, is copied through
/// untouched.
pub struct TemplateFormatter<'t> {
    template: &'t str,
    datetime_format: &'t str,
    use_ansi: bool,
}

impl<'t> TemplateFormatter<'t> {
    pub fn new(template: &'t str, datetime_format: &'t str, use_ansi: bool) -> Self {
        Self {
            template,
            datetime_format,
            use_ansi,
        }
    }

    fn format_level(&self, out: &mut String, level: Severity) {
        let text = level.as_str();
        if !self.use_ansi {
            out.push_str(text);
            return;
        }

        let _ = match level {
            Severity::Trace => write!(out, "{}", text.dim()),
            Severity::Debug => write!(out, "{}", text.blue()),
            Severity::Info => write!(out, "{}", text.green()),
            Severity::Warning => write!(out, "{}", text.yellow()),
            Severity::Error => write!(out, "{}", text.red()),
            Severity::Fatal => write!(out, "{}", text.red().bold()),
        };
    }

    fn timestamp(&self, out: &mut String) {
        let time = chrono::Local::now().format(self.datetime_format);
        let _ = write!(out, "{}", time);
    }
}

impl LogFormatter for TemplateFormatter<'_> {
    fn format(&self, record: &Record<'_>) -> String {
        let mut out = String::with_capacity(self.template.len() + record.message().len());
        let mut chars = self.template.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }

            let location = record.location();
            match chars.next() {
                Some('F') => out.push_str(location.file),
                Some('C') => {
                    let _ = write!(out, "{}", location.line);
                }
                Some('P') => out.push_str(location.function),
                Some('N') => out.push_str(record.origin().name()),
                Some('L') => self.format_level(&mut out, record.level()),
                Some('S') => out.push_str(record.message()),
                Some('T') => self.timestamp(&mut out),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }

        out
    }
}

/// Rejects chrono format strings that would fail while rendering.
pub fn validate_datetime_format(format: &str) -> eyre::Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(eyre::eyre!("Invalid datetime format '{}'", format));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{logger::Logger, sink::Location};

    fn render(template: &str, level: Severity, message: &str) -> String {
        let logger = Logger::with_destination("net", Box::new(std::io::sink()));
        let location = Location::new("src/net.rs", 42, "net::connect");
        let record = Record::new(level, &logger, location, message);
        TemplateFormatter::new(template, DEFAULT_DATETIME_FORMAT, false).format(&record)
    }

    #[test]
    fn default_template() {
        assert_eq!(
            render(DEFAULT_FORMAT, Severity::Warning, "link down"),
            "[src/net.rs:42 net::connect] net WARNING: link down"
        );
    }

    #[test]
    fn every_token() {
        assert_eq!(
            render("%F|%C|%P|%N|%L|%S", Severity::Trace, "m"),
            "src/net.rs|42|net::connect|net|TRACE|m"
        );
    }

    #[test]
    fn unknown_tokens_pass_through() {
        assert_eq!(render("%Q %S %% 100%", Severity::Info, "x"), "%Q x %% 100%");
    }

    #[test]
    fn message_is_not_re_expanded() {
        assert_eq!(render("%S", Severity::Info, "50%N done"), "50%N done");
    }

    #[test]
    fn non_ascii_template() {
        assert_eq!(render("→ %L ← %S", Severity::Error, "ü"), "→ ERROR ← ü");
    }

    #[test]
    fn timestamp_uses_datetime_format() {
        let logger = Logger::with_destination("n", Box::new(std::io::sink()));
        let record = Record::new(Severity::Info, &logger, Location::new("f", 1, "p"), "");
        let out = TemplateFormatter::new("<%T>", "%Y", false).format(&record);

        let year = chrono::Local::now().format("%Y").to_string();
        assert_eq!(out, format!("<{}>", year));
    }

    #[test]
    fn ansi_keeps_level_text() {
        let logger = Logger::with_destination("n", Box::new(std::io::sink()));
        let record = Record::new(Severity::Warning, &logger, Location::new("f", 1, "p"), "");
        let out = TemplateFormatter::new("%L", DEFAULT_DATETIME_FORMAT, true).format(&record);

        assert!(out.contains("WARNING"));
    }

    #[test]
    fn datetime_format_validation() {
        assert!(validate_datetime_format("%H:%M:%S%.3f").is_ok());
        assert!(validate_datetime_format("%Q").is_err());
    }
}
