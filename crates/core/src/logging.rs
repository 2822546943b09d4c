//! Tracing subscriber setup
//!
//! Output goes to stderr so it never mixes with command results on stdout.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `level` is the default directive; `RUST_LOG` can still narrow or widen it.
/// Returns `false` when a subscriber was already installed, which happens
/// when the host calls setup more than once.
pub fn init(level: &str) -> bool {
    let level: Level = level.parse().unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_repeatable() {
        init("debug");
        assert!(!init("info"));
    }
}
