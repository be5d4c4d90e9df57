use arrow::datatypes::SchemaRef;
use log::debug;

use crate::conf::DecoderConfig;
use crate::core::RowblockError;
use crate::decode::assemble::DecodedBlock;
use crate::decode::bitmap::{Bitmap, RotatingMask};
use crate::decode::reader::Cursor;
use crate::plan::{ColumnDescriptor, ColumnKind, ColumnPlan};

/// One batch of Avro-encoded rows sharing a schema.
#[derive(Debug, Clone, Copy)]
pub struct RowBlock<'a> {
    pub row_count: u32,
    pub payload: &'a [u8],
}

impl<'a> RowBlock<'a> {
    pub fn new(row_count: u32, payload: &'a [u8]) -> Self {
        Self { row_count, payload }
    }
}

/// Per-column state produced by the sequential walk.
///
/// Byte-like columns only record where each value lives in the payload;
/// `data` stays `None` until the copy pass runs.
pub(crate) enum PendingColumn {
    Int64 {
        validity: Bitmap,
        values: Vec<i64>,
    },
    Float64 {
        validity: Bitmap,
        values: Vec<f64>,
    },
    Bool {
        validity: Bitmap,
        values: Bitmap,
    },
    Bytes {
        validity: Bitmap,
        offsets: Vec<i32>,
        starts: Vec<usize>,
        data: Option<Vec<u8>>,
    },
}

impl PendingColumn {
    fn new(descriptor: &ColumnDescriptor, rows: usize) -> Self {
        let validity = Bitmap::new(rows);
        match descriptor.kind {
            ColumnKind::Int64 => PendingColumn::Int64 {
                validity,
                values: vec![0; rows],
            },
            ColumnKind::Float64 => PendingColumn::Float64 {
                validity,
                values: vec![0.0; rows],
            },
            ColumnKind::Bool => PendingColumn::Bool {
                validity,
                values: Bitmap::new(rows),
            },
            ColumnKind::Bytes | ColumnKind::Utf8 => PendingColumn::Bytes {
                validity,
                offsets: vec![0; rows + 1],
                starts: vec![0; rows],
                data: None,
            },
        }
    }

    /// Read this column's value for `row`, or record a null when `present` is false.
    #[inline]
    fn push(
        &mut self,
        cursor: &mut Cursor<'_>,
        row: usize,
        marker: u8,
        present: bool,
    ) -> Result<(), RowblockError> {
        let byte = row / 8;
        match self {
            PendingColumn::Int64 { validity, values } => {
                if present {
                    values[row] = cursor.read_long()?;
                    validity.or_mask(byte, marker);
                }
            }
            PendingColumn::Float64 { validity, values } => {
                if present {
                    values[row] = cursor.read_double()?;
                    validity.or_mask(byte, marker);
                }
            }
            PendingColumn::Bool { validity, values } => {
                if present {
                    let value_mask = if cursor.read_boolean()? { 0xFF } else { 0x00 };
                    values.or_mask(byte, value_mask & marker);
                    validity.or_mask(byte, marker);
                }
            }
            PendingColumn::Bytes {
                validity,
                offsets,
                starts,
                ..
            } => {
                let end = if present {
                    let position = cursor.position();
                    let (start, len) = cursor.read_bytes_range()?;
                    starts[row] = start;
                    validity.or_mask(byte, marker);
                    i32::try_from(len)
                        .ok()
                        .and_then(|len| offsets[row].checked_add(len))
                        .ok_or(RowblockError::MalformedLength {
                            position,
                            length: len as i64,
                        })?
                } else {
                    offsets[row]
                };
                offsets[row + 1] = end;
            }
        }
        Ok(())
    }
}

/// Output of the sequential walk: primitive columns are final, byte-like
/// columns still reference the payload.
pub struct PendingBlock<'a> {
    pub(crate) payload: &'a [u8],
    pub(crate) row_count: usize,
    pub(crate) schema: SchemaRef,
    pub(crate) columns: Vec<PendingColumn>,
}

impl PendingBlock<'_> {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Whether every byte-like column has been copied out of the payload.
    pub fn is_materialized(&self) -> bool {
        self.columns.iter().all(|c| match c {
            PendingColumn::Bytes { data, .. } => data.is_some(),
            _ => true,
        })
    }
}

/// Decodes row blocks for one [`ColumnPlan`].
///
/// The decoder holds no per-block state, so a single instance (and the plan
/// it borrows) can serve many threads at once.
#[derive(Debug, Clone)]
pub struct BlockDecoder<'p> {
    plan: &'p ColumnPlan,
    config: DecoderConfig,
}

impl<'p> BlockDecoder<'p> {
    pub fn new(plan: &'p ColumnPlan, config: DecoderConfig) -> Self {
        Self { plan, config }
    }

    pub fn plan(&self) -> &ColumnPlan {
        self.plan
    }

    /// Decode a whole block: walk, copy byte columns, assemble.
    ///
    /// Any read past the end of the payload fails the entire block; no
    /// partially filled buffers are returned.
    pub fn decode(&self, block: &RowBlock<'_>) -> Result<DecodedBlock, RowblockError> {
        let mut pending = self.walk(block)?;
        pending.materialize(&self.config);
        let decoded = pending.assemble()?;
        debug!(
            "Decoded block: {} rows, {} payload bytes, {} columns",
            block.row_count,
            block.payload.len(),
            self.plan.len()
        );
        Ok(decoded)
    }

    /// Sequential first pass over every field of every row.
    ///
    /// Each field starts where the previous one ended, so this pass cannot be
    /// split. Byte-like values are located but not copied.
    pub fn walk<'a>(&self, block: &RowBlock<'a>) -> Result<PendingBlock<'a>, RowblockError> {
        let rows = block.row_count as usize;
        let descriptors = self.plan.columns();
        // Every field takes at least one byte, so a row count above the
        // payload length cannot be satisfied. Fail before sizing buffers by it.
        let len = block.payload.len();
        if !descriptors.is_empty() && rows > len {
            return Err(RowblockError::TruncatedInput {
                position: len,
                needed: rows - len,
                len,
            });
        }
        let mut columns: Vec<PendingColumn> = descriptors
            .iter()
            .map(|d| PendingColumn::new(d, rows))
            .collect();

        let mut cursor = Cursor::new(block.payload);
        let mut mask = RotatingMask::new();
        for row in 0..rows {
            let marker = mask.advance();
            for (descriptor, column) in descriptors.iter().zip(columns.iter_mut()) {
                // Branch 0 of a ["null", T] union is null; any other branch is present.
                let present = !descriptor.nullable || cursor.read_long()? != 0;
                column.push(&mut cursor, row, marker, present)?;
            }
        }

        if cursor.remaining() > 0 {
            debug!(
                "Block has {} trailing bytes after {} rows",
                cursor.remaining(),
                rows
            );
        }

        Ok(PendingBlock {
            payload: block.payload,
            row_count: rows,
            schema: self.plan.arrow_schema(),
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::BlockBuilder;

    fn plan() -> ColumnPlan {
        ColumnPlan::new(vec![
            ColumnDescriptor::new("n", ColumnKind::Int64, true),
            ColumnDescriptor::new("s", ColumnKind::Bytes, true),
        ])
        .unwrap()
    }

    #[test]
    fn test_walk_records_ranges_without_copying() {
        let plan = plan();
        let mut builder = BlockBuilder::new();
        builder.row().long(Some(5)).bytes(Some(b"hi"));
        builder.row().long(None).bytes(None);
        builder.row().long(Some(-3)).bytes(Some(b""));
        let (rows, payload) = builder.finish();

        let decoder = BlockDecoder::new(&plan, DecoderConfig::sequential());
        let pending = decoder.walk(&RowBlock::new(rows, &payload)).unwrap();
        assert_eq!(pending.row_count(), 3);
        assert!(!pending.is_materialized());

        match &pending.columns[1] {
            PendingColumn::Bytes {
                offsets,
                starts,
                data,
                validity,
            } => {
                assert_eq!(offsets, &vec![0, 2, 2, 2]);
                assert_eq!(&payload[starts[0]..starts[0] + 2], b"hi");
                assert!(data.is_none());
                assert_eq!(validity.as_bytes(), &[0b101]);
            }
            _ => panic!("expected a bytes column"),
        }
    }

    #[test]
    fn test_non_nullable_fields_have_no_tag() {
        let plan = ColumnPlan::new(vec![
            ColumnDescriptor::new("n", ColumnKind::Int64, false),
            ColumnDescriptor::new("b", ColumnKind::Bool, false),
        ])
        .unwrap();
        let mut builder = BlockBuilder::new();
        builder.row().required_long(7).required_boolean(true);
        builder.row().required_long(-7).required_boolean(false);
        let (rows, payload) = builder.finish();
        assert_eq!(payload, vec![14, 1, 13, 0]);

        let decoder = BlockDecoder::new(&plan, DecoderConfig::sequential());
        let pending = decoder.walk(&RowBlock::new(rows, &payload)).unwrap();
        match &pending.columns[0] {
            PendingColumn::Int64 { validity, values } => {
                assert_eq!(values, &vec![7, -7]);
                assert_eq!(validity.as_bytes(), &[0b11]);
            }
            _ => panic!("expected an int64 column"),
        }
        match &pending.columns[1] {
            PendingColumn::Bool { validity, values } => {
                assert_eq!(values.as_bytes(), &[0b01]);
                assert_eq!(validity.as_bytes(), &[0b11]);
            }
            _ => panic!("expected a bool column"),
        }
    }

    #[test]
    fn test_empty_block() {
        let plan = plan();
        let decoder = BlockDecoder::new(&plan, DecoderConfig::default());
        let pending = decoder.walk(&RowBlock::new(0, &[])).unwrap();
        assert_eq!(pending.row_count(), 0);
        match &pending.columns[1] {
            PendingColumn::Bytes { offsets, .. } => assert_eq!(offsets, &vec![0]),
            _ => panic!("expected a bytes column"),
        }
    }

    #[test]
    fn test_missing_rows_are_truncation() {
        let plan = plan();
        let mut builder = BlockBuilder::new();
        builder.row().long(Some(1)).bytes(Some(b"a"));
        let (_, payload) = builder.finish();

        let decoder = BlockDecoder::new(&plan, DecoderConfig::default());
        let result = decoder.walk(&RowBlock::new(2, &payload));
        assert!(matches!(
            result,
            Err(RowblockError::TruncatedInput { position: 5, .. })
        ));
    }

    #[test]
    fn test_offset_overflow_is_malformed() {
        let descriptor = ColumnDescriptor::new("s", ColumnKind::Bytes, true);
        let mut column = PendingColumn::new(&descriptor, 1);
        if let PendingColumn::Bytes { offsets, .. } = &mut column {
            *offsets = vec![i32::MAX - 1, 0];
        }
        let payload = [0x04, b'a', b'b'];
        let mut cursor = Cursor::new(&payload);
        assert_eq!(
            column.push(&mut cursor, 0, 0x01, true),
            Err(RowblockError::MalformedLength {
                position: 0,
                length: 2
            })
        );
    }

    #[test]
    fn test_row_count_beyond_payload() {
        let plan = plan();
        let decoder = BlockDecoder::new(&plan, DecoderConfig::default());
        assert_eq!(
            decoder.walk(&RowBlock::new(4, &[0x00, 0x00])).err(),
            Some(RowblockError::TruncatedInput {
                position: 2,
                needed: 2,
                len: 2
            })
        );
    }

    #[test]
    fn test_negative_length_is_malformed() {
        let plan = plan();
        // row 0: n = null, s = present with zigzag length -1
        let payload = [0x00, 0x02, 0x01];
        let decoder = BlockDecoder::new(&plan, DecoderConfig::default());
        assert_eq!(
            decoder.walk(&RowBlock::new(1, &payload)).err(),
            Some(RowblockError::MalformedLength {
                position: 2,
                length: -1
            })
        );
    }
}
