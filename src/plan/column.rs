use std::sync::Arc;

use ahash::AHashMap;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use log::info;

use crate::core::RowblockError;

/// Physical decode strategy for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int64,
    Float64,
    Bool,
    /// Opaque byte run, exposed as Arrow Binary.
    Bytes,
    /// Byte run holding UTF-8 text, exposed as Arrow Utf8.
    Utf8,
}

impl ColumnKind {
    /// Kinds decoded through the two-pass offsets + copy path.
    pub fn is_byte_like(&self) -> bool {
        matches!(self, ColumnKind::Bytes | ColumnKind::Utf8)
    }
}

impl From<ColumnKind> for DataType {
    fn from(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Int64 => DataType::Int64,
            ColumnKind::Float64 => DataType::Float64,
            ColumnKind::Bool => DataType::Boolean,
            ColumnKind::Bytes => DataType::Binary,
            ColumnKind::Utf8 => DataType::Utf8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    /// Nullable fields carry a `["null", T]` union tag before every value.
    pub nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, kind: ColumnKind, nullable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable,
        }
    }

    pub fn field(&self) -> Field {
        Field::new(&self.name, DataType::from(self.kind), self.nullable)
    }
}

/// Ordered, immutable list of columns matching the wire field order.
///
/// Built once per schema and shared read-only by any number of concurrent
/// block decodes.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    columns: Vec<ColumnDescriptor>,
    by_name: AHashMap<String, usize>,
    schema: SchemaRef,
}

impl ColumnPlan {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, RowblockError> {
        let mut by_name = AHashMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if by_name.insert(column.name.clone(), idx).is_some() {
                return Err(RowblockError::SchemaParsingError(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        let fields: Vec<Field> = columns.iter().map(ColumnDescriptor::field).collect();
        let schema = Arc::new(Schema::new(fields));

        info!(
            "Built column plan with {} columns ({} byte-like)",
            columns.len(),
            columns.iter().filter(|c| c.kind.is_byte_like()).count()
        );
        Ok(Self {
            columns,
            by_name,
            schema,
        })
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Arrow schema whose fields line up with the decoded columns.
    pub fn arrow_schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}
