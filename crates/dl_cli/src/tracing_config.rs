//! Tracing setup for `dlc`.
//!
//! The subscriber is only installed when `DLC_LOG` (or `RUST_LOG`) is set:
//!
//! ```bash
//! DLC_LOG=debug dlc desugar input.ts
//! DLC_LOG=dl_desugar=trace dlc check input.ts
//! ```

use tracing_subscriber::EnvFilter;

/// `DLC_LOG` takes precedence over `RUST_LOG`; both use the same syntax.
fn build_filter() -> EnvFilter {
    match std::env::var("DLC_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber. Output goes to stderr so it never mixes
/// with emitted code on stdout.
pub fn init_tracing() {
    if std::env::var_os("DLC_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr)
        .init();
}
