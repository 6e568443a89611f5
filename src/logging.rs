//! Tracing subscriber setup
//!
//! Diagnostics go to stderr so stdout stays clean for `--json` output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given verbosity
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "pinreq=debug,info"
    } else {
        "pinreq=info"
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the flags.
pub fn init_logger(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "pinreq=info");
        assert_eq!(default_directive(true, false), "pinreq=debug,info");
        assert_eq!(default_directive(false, true), "warn");
        assert_eq!(default_directive(true, true), "warn");
    }

    #[test]
    fn test_init_logger_twice() {
        init_logger(false, true);
        init_logger(true, false);
    }
}
