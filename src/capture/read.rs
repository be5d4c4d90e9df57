use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::core::RowblockError;
use crate::decode::RowBlock;

use super::format::{FRAME_HEADER_SIZE, HEADER_SIZE, MAGIC, VERSION, read_u32_le};

/// Memory-mapped capture file. Blocks borrow the mapping, so payloads are
/// never copied before decoding.
#[derive(Debug)]
pub struct CaptureReader {
    mmap: Mmap,
}

impl CaptureReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RowblockError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(RowblockError::CaptureError(format!(
                "{}: empty capture file",
                path.display()
            )));
        }
        // SAFETY: the file is opened read-only and we treat the mapping as immutable.
        let mmap = unsafe { Mmap::map(&file) }?;
        let reader = Self { mmap };
        reader.check_header()?;
        Ok(reader)
    }

    fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    fn check_header(&self) -> Result<(), RowblockError> {
        let data = self.bytes();
        if data.len() < HEADER_SIZE {
            return Err(RowblockError::CaptureError(format!(
                "file too small: {} bytes, minimum {HEADER_SIZE}",
                data.len()
            )));
        }
        if &data[0..4] != MAGIC {
            return Err(RowblockError::CaptureError(format!(
                "bad magic: expected RBLK, got {:?}",
                &data[0..4]
            )));
        }
        match read_u32_le(data, 4) {
            Some(VERSION) => Ok(()),
            other => Err(RowblockError::CaptureError(format!(
                "unsupported version: {other:?}, expected {VERSION}"
            ))),
        }
    }

    /// Iterate over the captured blocks in file order.
    pub fn blocks(&self) -> CaptureBlocks<'_> {
        CaptureBlocks {
            data: self.bytes(),
            position: HEADER_SIZE,
        }
    }
}

pub struct CaptureBlocks<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> CaptureBlocks<'a> {
    fn next_block(&mut self) -> Result<RowBlock<'a>, RowblockError> {
        let frame = self.position;
        let truncated = |what: &str| {
            RowblockError::CaptureError(format!("frame at byte {frame} truncated at {what}"))
        };

        let row_count = read_u32_le(self.data, frame).ok_or_else(|| truncated("row_count"))?;
        let payload_len =
            read_u32_le(self.data, frame + 4).ok_or_else(|| truncated("payload_len"))? as usize;
        let start = frame + FRAME_HEADER_SIZE;
        let payload = self
            .data
            .get(start..start + payload_len)
            .ok_or_else(|| truncated("payload"))?;

        self.position = start + payload_len;
        Ok(RowBlock::new(row_count, payload))
    }
}

impl<'a> Iterator for CaptureBlocks<'a> {
    type Item = Result<RowBlock<'a>, RowblockError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.data.len() {
            return None;
        }
        let block = self.next_block();
        if block.is_err() {
            // A broken frame ends the stream; later bytes have no known boundary.
            self.position = self.data.len();
        }
        Some(block)
    }
}
