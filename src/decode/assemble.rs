use arrow::array::{ArrayData, ArrayRef, make_array};
use arrow::buffer::Buffer;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use bytemuck::cast_slice;

use crate::core::RowblockError;
use crate::decode::bitmap::Bitmap;
use crate::decode::block::{PendingBlock, PendingColumn};

/// Final buffers of one column, laid out exactly as Arrow expects them.
///
/// - validity: LSB-first, 1 = present, `ceil(rows / 8)` bytes.
/// - primitive data: `rows` native values; null slots hold zero.
/// - boolean data: bit-packed like validity.
/// - byte-like data: `rows + 1` offsets followed by the concatenated values.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnBuffers {
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
        data: Vec<u8>,
    },
}

impl ColumnBuffers {
    pub fn validity(&self) -> &Bitmap {
        match self {
            ColumnBuffers::Int64 { validity, .. }
            | ColumnBuffers::Float64 { validity, .. }
            | ColumnBuffers::Bool { validity, .. }
            | ColumnBuffers::Bytes { validity, .. } => validity,
        }
    }

    /// Raw data buffer bytes.
    pub fn data(&self) -> &[u8] {
        match self {
            ColumnBuffers::Int64 { values, .. } => cast_slice(values),
            ColumnBuffers::Float64 { values, .. } => cast_slice(values),
            ColumnBuffers::Bool { values, .. } => values.as_bytes(),
            ColumnBuffers::Bytes { data, .. } => data.as_slice(),
        }
    }

    pub fn offsets(&self) -> Option<&[i32]> {
        match self {
            ColumnBuffers::Bytes { offsets, .. } => Some(offsets.as_slice()),
            _ => None,
        }
    }

    pub fn null_count(&self) -> usize {
        let validity = self.validity();
        validity.len() - validity.count_set()
    }

    /// Hand the buffers to Arrow without copying them.
    pub fn into_array_data(self, data_type: DataType) -> Result<ArrayData, RowblockError> {
        let (validity, buffers) = match self {
            ColumnBuffers::Int64 { validity, values } => {
                (validity, vec![Buffer::from_vec(values)])
            }
            ColumnBuffers::Float64 { validity, values } => {
                (validity, vec![Buffer::from_vec(values)])
            }
            ColumnBuffers::Bool { validity, values } => {
                (validity, vec![Buffer::from_vec(values.into_bytes())])
            }
            ColumnBuffers::Bytes {
                validity,
                offsets,
                data,
            } => (
                validity,
                vec![Buffer::from_vec(offsets), Buffer::from_vec(data)],
            ),
        };
        let data = ArrayData::builder(data_type)
            .len(validity.len())
            .null_bit_buffer(Some(Buffer::from_vec(validity.into_bytes())))
            .buffers(buffers)
            .build()?;
        Ok(data)
    }
}

impl PendingBlock<'_> {
    /// Package the column buffers. Fails if a byte-like column was never
    /// materialized.
    pub fn assemble(self) -> Result<DecodedBlock, RowblockError> {
        let columns = self
            .columns
            .into_iter()
            .zip(self.schema.fields().iter())
            .map(|(column, field)| match column {
                PendingColumn::Int64 { validity, values } => {
                    Ok(ColumnBuffers::Int64 { validity, values })
                }
                PendingColumn::Float64 { validity, values } => {
                    Ok(ColumnBuffers::Float64 { validity, values })
                }
                PendingColumn::Bool { validity, values } => {
                    Ok(ColumnBuffers::Bool { validity, values })
                }
                PendingColumn::Bytes {
                    validity,
                    offsets,
                    data: Some(data),
                    ..
                } => Ok(ColumnBuffers::Bytes {
                    validity,
                    offsets,
                    data,
                }),
                PendingColumn::Bytes { data: None, .. } => {
                    Err(RowblockError::NotMaterialized(field.name().clone()))
                }
            })
            .collect::<Result<Vec<_>, RowblockError>>()?;

        Ok(DecodedBlock {
            schema: self.schema,
            row_count: self.row_count,
            columns,
        })
    }
}

/// A fully decoded block: one [`ColumnBuffers`] per plan column.
#[derive(Debug, Clone)]
pub struct DecodedBlock {
    schema: SchemaRef,
    row_count: usize,
    columns: Vec<ColumnBuffers>,
}

impl DecodedBlock {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn columns(&self) -> &[ColumnBuffers] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnBuffers> {
        self.columns.get(idx)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ColumnBuffers> {
        let (idx, _) = self.schema.column_with_name(name)?;
        self.columns.get(idx)
    }

    pub fn into_arrays(self) -> Result<Vec<ArrayRef>, RowblockError> {
        self.columns
            .into_iter()
            .zip(self.schema.fields().iter())
            .map(|(column, field)| -> Result<ArrayRef, RowblockError> {
                let data = column.into_array_data(field.data_type().clone())?;
                Ok(make_array(data))
            })
            .collect()
    }

    pub fn into_record_batch(self) -> Result<RecordBatch, RowblockError> {
        let schema = self.schema.clone();
        let options = RecordBatchOptions::new().with_row_count(Some(self.row_count));
        let arrays = self.into_arrays()?;
        Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
    }
}
