mod config;
mod decoder;

pub use config::Config;
pub use decoder::DecoderConfig;
