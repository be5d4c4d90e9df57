use std::ops::Range;

use rayon::prelude::*;

use crate::conf::DecoderConfig;
use crate::decode::block::{PendingBlock, PendingColumn};

impl PendingBlock<'_> {
    /// Copy every byte-like value out of the payload into its column's
    /// contiguous data buffer.
    ///
    /// Source and destination ranges were fixed by the walk, so rows and
    /// columns copy independently and the result is the same whether or not
    /// rayon is used.
    pub fn materialize(&mut self, config: &DecoderConfig) {
        let payload = self.payload;
        if config.parallel_materialize {
            self.columns
                .par_iter_mut()
                .for_each(|column| column.materialize(payload, config));
        } else {
            self.columns
                .iter_mut()
                .for_each(|column| column.materialize(payload, config));
        }
    }
}

impl PendingColumn {
    fn materialize(&mut self, payload: &[u8], config: &DecoderConfig) {
        let PendingColumn::Bytes {
            offsets,
            starts,
            data,
            ..
        } = self
        else {
            return;
        };
        if data.is_some() {
            return;
        }

        let rows = starts.len();
        let mut dest = vec![0u8; offsets[rows] as usize];
        if config.parallel_materialize && dest.len() >= config.parallel_min_bytes {
            copy_parallel(payload, starts, offsets, &mut dest);
        } else {
            copy_rows(payload, starts, offsets, 0..rows, &mut dest);
        }
        *data = Some(dest);
    }
}

/// Copy `rows` into `dest`, which begins at `offsets[rows.start]`.
fn copy_rows(
    payload: &[u8],
    starts: &[usize],
    offsets: &[i32],
    rows: Range<usize>,
    dest: &mut [u8],
) {
    let base = offsets[rows.start] as usize;
    for row in rows {
        let begin = offsets[row] as usize - base;
        let end = offsets[row + 1] as usize - base;
        let src = starts[row];
        dest[begin..end].copy_from_slice(&payload[src..src + (end - begin)]);
    }
}

/// Split rows into chunks, carve the destination at the chunk boundaries and
/// copy the chunks on the rayon pool.
fn copy_parallel(payload: &[u8], starts: &[usize], offsets: &[i32], dest: &mut [u8]) {
    let rows = starts.len();
    if rows == 0 {
        return;
    }
    let chunk_rows = rows.div_ceil(rayon::current_num_threads() * 4).max(1);

    let mut tasks: Vec<(Range<usize>, &mut [u8])> =
        Vec::with_capacity(rows.div_ceil(chunk_rows));
    let mut rest = dest;
    let mut row = 0;
    while row < rows {
        let end = (row + chunk_rows).min(rows);
        let span = (offsets[end] - offsets[row]) as usize;
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(span);
        tasks.push((row..end, head));
        rest = tail;
        row = end;
    }

    tasks
        .into_par_iter()
        .for_each(|(range, chunk)| copy_rows(payload, starts, offsets, range, chunk));
}
