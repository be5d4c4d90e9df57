use std::path::PathBuf;

use clap::Parser;
use log::kv::{ToValue, Value};

#[derive(Parser, Debug, PartialEq)]
#[command(version, about = "Decode captured Avro row blocks into Arrow columns")]
pub struct CliArgs {
    /// Avro record schema (JSON) describing every captured block.
    #[arg(short, long)]
    pub schema: PathBuf,
    /// Capture file with length-prefixed row blocks.
    #[arg(long)]
    pub capture: PathBuf,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Size of the rayon pool used for byte materialization.
    #[arg(short, long)]
    pub threads: Option<usize>,
}

impl ToValue for CliArgs {
    fn to_value(&self) -> Value<'_> {
        Value::from_debug(self)
    }
}
