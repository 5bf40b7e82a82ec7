//! Explicit config file source: the path given with `--config`

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::{File, FileFormat};
use std::path::Path;

/// Add a config file that must exist.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    config_path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !config_path.exists() {
        return Err(ConfigError::NotFound(format!(
            "configuration file {}",
            config_path.display()
        )));
    }
    Ok(builder.add_source(File::from(config_path).format(FileFormat::Toml).required(true)))
}
