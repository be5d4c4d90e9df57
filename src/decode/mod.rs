//! Avro row blocks to Arrow column buffers.
//!
//! Decoding runs in two phases. [`BlockDecoder::walk`] reads every field of
//! every row in order, filling primitive columns directly and recording the
//! payload range of each byte-like value. [`PendingBlock::materialize`] then
//! copies those ranges into contiguous buffers, optionally on the rayon pool.
//! [`PendingBlock::assemble`] packages the result as [`ColumnBuffers`].

mod assemble;
mod bitmap;
mod block;
mod materialize;
mod reader;

pub use assemble::{ColumnBuffers, DecodedBlock};
pub use bitmap::{Bitmap, RotatingMask};
pub use block::{BlockDecoder, PendingBlock, RowBlock};
pub use reader::Cursor;
