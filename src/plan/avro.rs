use serde::Deserialize;
use serde_json::Value;

use crate::core::RowblockError;
use crate::plan::{ColumnDescriptor, ColumnKind, ColumnPlan};

#[derive(Deserialize)]
struct RecordSchema {
    #[serde(rename = "type")]
    kind: String,
    fields: Vec<FieldSchema>,
}

#[derive(Deserialize)]
struct FieldSchema {
    name: String,
    #[serde(rename = "type")]
    decl: Value,
}

impl ColumnPlan {
    /// Build a plan from an Avro record schema in its JSON form.
    ///
    /// Every field must be a supported primitive, either bare or wrapped in a
    /// `["null", T]` union. Anything else fails here so that decoding never
    /// meets a field it cannot read.
    pub fn from_avro_json(json: &str) -> Result<ColumnPlan, RowblockError> {
        let record: RecordSchema = serde_json::from_str(json)
            .map_err(|e| RowblockError::SchemaParsingError(e.to_string()))?;
        if record.kind != "record" {
            return Err(RowblockError::SchemaParsingError(format!(
                "expected a record schema, got '{}'",
                record.kind
            )));
        }

        let columns = record
            .fields
            .iter()
            .map(|field| {
                let (kind, nullable) = resolve_field(&field.name, &field.decl)?;
                Ok(ColumnDescriptor::new(&field.name, kind, nullable))
            })
            .collect::<Result<Vec<_>, RowblockError>>()?;
        ColumnPlan::new(columns)
    }
}

fn resolve_field(column: &str, decl: &Value) -> Result<(ColumnKind, bool), RowblockError> {
    match decl {
        Value::Array(branches) => match branches.as_slice() {
            [Value::String(null), value] if null == "null" => {
                Ok((resolve_value(column, value, decl)?, true))
            }
            _ => Err(unsupported(column, decl)),
        },
        _ => Ok((resolve_value(column, decl, decl)?, false)),
    }
}

fn resolve_value(column: &str, value: &Value, decl: &Value) -> Result<ColumnKind, RowblockError> {
    let name = match value {
        Value::String(name) => name.as_str(),
        // `{"type": "long"}` is the long form of a primitive; logical types are not.
        Value::Object(map) if !map.contains_key("logicalType") => match map.get("type") {
            Some(Value::String(name)) => name.as_str(),
            _ => return Err(unsupported(column, decl)),
        },
        _ => return Err(unsupported(column, decl)),
    };
    match name {
        "long" | "int" => Ok(ColumnKind::Int64),
        "double" => Ok(ColumnKind::Float64),
        "boolean" => Ok(ColumnKind::Bool),
        "bytes" => Ok(ColumnKind::Bytes),
        "string" => Ok(ColumnKind::Utf8),
        _ => Err(unsupported(column, decl)),
    }
}

fn unsupported(column: &str, decl: &Value) -> RowblockError {
    RowblockError::UnsupportedColumnType {
        column: column.to_string(),
        declared: decl.to_string(),
    }
}
