use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::CliError;

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub(crate) fn init_logging(verbose: bool, json: bool) -> Result<(), CliError> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}
