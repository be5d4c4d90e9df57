//! Capture files: row blocks persisted for repeatable decoding runs.

mod format;
mod read;
mod write;

pub use read::{CaptureBlocks, CaptureReader};
pub use write::CaptureWriter;
