//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key; defaults sit below all
/// file and environment sources.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("sync.interval_secs", 300)?
        .set_default("sync.stop_on_fatal", false)?
        .set_default("sync.prefilter", false)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
