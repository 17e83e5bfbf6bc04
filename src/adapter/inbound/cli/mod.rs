//! CLI module graph.

pub mod analyze;
pub mod command;
pub mod config;
pub mod options;
pub mod output;

use crate::infrastructure::config::settings::Config;

/// Install the tracing subscriber for a command that loaded a config.
///
/// `-q`/`-v` override the configured level; `RUST_LOG` overrides both.
pub(crate) fn init_logging(config: &Config) {
    let level = output::log_level_override().unwrap_or(config.logging.level.as_str());
    config.logging.init_with_level(level);
}
