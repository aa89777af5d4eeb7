//! Ambient logging setup. A convenience for binaries embedding this crate
//! (see `telnet-client-cli`); library users composing `telnet-client` into a
//! larger application are expected to install their own `tracing` subscriber.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::{Error, ErrorKind};

/// Install a `tracing-subscriber` `fmt` layer writing to stderr, with
/// `default_level` as the default directive, further overridable by
/// `RUST_LOG`.
///
/// # Errors
/// Returns [`ErrorKind::InvalidArgument`] if the `RUST_LOG` environment
/// variable is set but fails to parse.
pub fn init(default_level: LevelFilter) -> Result<(), Error> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env()
        .map_err(|e| ErrorKind::InvalidArgument(format!("invalid RUST_LOG directive: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    Ok(())
}
