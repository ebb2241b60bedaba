//! tracing setup shared by the server and the desktop app.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    #[default]
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    #[must_use]
    pub fn to_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter used when `RUST_LOG` is unset. Covers request logs from tower-http too.
    #[must_use]
    pub fn default_filter(self) -> String {
        let level = self.to_level();
        format!("feedbackhub={level},tower_http={level}")
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbosity`.
/// Calling this more than once is harmless.
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false));

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level(), Level::INFO);
        assert_eq!(Verbosity::Verbose.to_level(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level(), Level::TRACE);
    }

    #[test]
    fn test_default_filter_includes_http_layer() {
        assert_eq!(
            Verbosity::Verbose.default_filter(),
            "feedbackhub=DEBUG,tower_http=DEBUG"
        );
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Trace);
    }
}
