mod avro;
mod column;

pub use column::{ColumnDescriptor, ColumnKind, ColumnPlan};
