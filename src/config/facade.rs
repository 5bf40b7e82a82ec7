//! Config facade: single entry point for loading layered configuration.

use super::merge::merge_policy;
use super::sources::{environment, explicit_file, global_file};
use super::MirrorConfig;
use crate::error::ApiError;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, then the global config file, then environment overrides.
    pub fn load() -> Result<MirrorConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder);
        let config: MirrorConfig = builder.build()?.try_deserialize()?;
        debug!("Loaded configuration from global sources");
        Ok(config)
    }

    /// Load defaults, then the global config file, then `config_path` (which
    /// must exist), then environment overrides.
    pub fn load_from_file(config_path: &Path) -> Result<MirrorConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = explicit_file::add_to_builder(builder, config_path)?;
        let builder = environment::add_to_builder(builder);
        let config: MirrorConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %config_path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load from `config_path` when given, otherwise from global sources.
    pub fn load_optional(config_path: Option<&Path>) -> Result<MirrorConfig, ApiError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }
}
