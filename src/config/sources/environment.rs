//! Environment source: FOLDSYNC_SOURCE, FOLDSYNC_REPLICA, FOLDSYNC_SYNC__INTERVAL_SECS, ...

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "FOLDSYNC";

/// Add environment overrides. Nested keys use a double underscore.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
