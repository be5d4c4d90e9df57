use std::path::Path;

use crate::{
    conf::DecoderConfig,
    core::RowblockError::{self, ConfigParsingError},
};
use config::Config as CConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub decoder: DecoderConfig,
}

impl Config {
    pub fn from_str(toml_str: &str) -> Result<Config, RowblockError> {
        Self::load(CConfig::builder().add_source(config::File::from_str(
            toml_str,
            config::FileFormat::Toml,
        )))
    }

    pub fn from_file(path: &Path) -> Result<Config, RowblockError> {
        Self::load(
            CConfig::builder()
                .add_source(config::File::from(path).format(config::FileFormat::Toml)),
        )
    }

    fn load(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Config, RowblockError> {
        builder
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))
    }
}
