use std::io::Write;

use crate::core::RowblockError;
use crate::decode::RowBlock;

use super::format::{MAGIC, VERSION};

/// Appends row blocks to a capture stream.
///
/// Format: `[RBLK magic][version u32 LE]` followed by one frame per block,
/// `[row_count u32 LE][payload_len u32 LE][payload]`.
pub struct CaptureWriter<W: Write> {
    inner: W,
    blocks: usize,
}

impl<W: Write> CaptureWriter<W> {
    /// Write the stream header.
    pub fn new(mut inner: W) -> Result<Self, RowblockError> {
        inner.write_all(MAGIC)?;
        inner.write_all(&VERSION.to_le_bytes())?;
        Ok(Self { inner, blocks: 0 })
    }

    pub fn write_block(&mut self, block: &RowBlock<'_>) -> Result<(), RowblockError> {
        let payload_len = u32::try_from(block.payload.len()).map_err(|_| {
            RowblockError::CaptureError(format!(
                "block payload of {} bytes does not fit a frame",
                block.payload.len()
            ))
        })?;
        self.inner.write_all(&block.row_count.to_le_bytes())?;
        self.inner.write_all(&payload_len.to_le_bytes())?;
        self.inner.write_all(block.payload)?;
        self.blocks += 1;
        Ok(())
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn finish(mut self) -> Result<W, RowblockError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
