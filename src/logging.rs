//! Logger set-up for the scenario runner and tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Default level for the crate's own targets.
#[must_use]
pub const fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialises the global logger from `RUST_LOG`.
///
/// Without `RUST_LOG` the guard and noise logs are shown at debug level when
/// `verbose` is set and at info level otherwise. Calling this more than once
/// keeps the first logger, so tests may call it freely.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_level(verbose).to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    if builder.try_init().is_err() {
        log::trace!("logger already initialised");
    }
}
