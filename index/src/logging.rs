//! Diagnostic logging for the registrar.
//!
//! Log lines go to standard error so they never mix with the
//! `repository: ...` failure message on standard output. Events use the
//! `event=<name> key=value` shape.

use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

/// Environment variable consulted when no level is given explicitly.
pub const LOG_ENV: &str = "REPOSITORY_LOG";

/// Level used when neither an explicit level nor [`LOG_ENV`] is set.
pub const DEFAULT_LEVEL: &str = "warn";

/// Picks the log specification: explicit level, then [`LOG_ENV`], then
/// [`DEFAULT_LEVEL`]. Blank values count as unset.
pub fn resolve_level(explicit: Option<&str>) -> String {
    pick_level(explicit, std::env::var(LOG_ENV).ok().as_deref())
}

fn pick_level(explicit: Option<&str>, from_env: Option<&str>) -> String {
    [explicit, from_env]
        .into_iter()
        .flatten()
        .find(|level| !level.trim().is_empty())
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

/// Starts the stderr logger.
///
/// The returned handle must be kept alive for the duration of the process.
///
/// # Errors
///
/// Returns a [`FlexiLoggerError`] if `level` is not a valid log
/// specification or the logger cannot be started.
pub fn init_logging(level: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_str(level)?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins() {
        assert_eq!(resolve_level(Some("debug")), "debug");
        assert_eq!(pick_level(Some("debug"), Some("info")), "debug");
    }

    #[test]
    fn environment_is_used_without_an_explicit_level() {
        assert_eq!(pick_level(None, Some("info")), "info");
        assert_eq!(pick_level(Some("  "), Some("info")), "info");
    }

    #[test]
    fn blank_levels_fall_back_to_the_default() {
        assert_eq!(pick_level(None, None), DEFAULT_LEVEL);
        assert_eq!(pick_level(Some("  "), None), DEFAULT_LEVEL);
        assert_eq!(pick_level(Some(""), Some(" \t")), DEFAULT_LEVEL);
    }
}
