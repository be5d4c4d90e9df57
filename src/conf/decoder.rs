use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DecoderConfig {
    /// Copy byte columns with rayon instead of on the calling thread.
    #[serde(default = "DecoderConfig::default_parallel_materialize")]
    pub parallel_materialize: bool,
    /// Byte columns smaller than this are always copied sequentially.
    #[serde(default = "DecoderConfig::default_parallel_min_bytes")]
    pub parallel_min_bytes: usize,
}

impl DecoderConfig {
    fn default_parallel_materialize() -> bool {
        true
    }

    fn default_parallel_min_bytes() -> usize {
        64 * 1024
    }

    pub fn sequential() -> Self {
        Self {
            parallel_materialize: false,
            ..Self::default()
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            parallel_materialize: Self::default_parallel_materialize(),
            parallel_min_bytes: Self::default_parallel_min_bytes(),
        }
    }
}
