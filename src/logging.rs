//! Log setup.
//!
//! The crate logs through the `log` facade. Hosts that don't install their
//! own logger call [`init`], which sets up `env_logger`; `RUST_LOG` still
//! overrides the filter. The debug flag in the settings switches output on
//! and off at runtime through [`set_debug_mode`].

use log::LevelFilter;

/// Installs `env_logger` at the level matching `debug_mode`.
///
/// Safe to call more than once; later calls only adjust the level.
pub fn init(debug_mode: bool) {
    let result = env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already installed");
    }
    set_debug_mode(debug_mode);
}

/// Shows debug output when enabled, silences logging otherwise
pub fn set_debug_mode(enabled: bool) {
    log::set_max_level(level_for(enabled));
    log::info!("Debug mode {}", if enabled { "enabled" } else { "disabled" });
}

fn level_for(debug_mode: bool) -> LevelFilter {
    if debug_mode {
        LevelFilter::Debug
    } else {
        LevelFilter::Off
    }
}
