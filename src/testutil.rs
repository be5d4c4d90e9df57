//! Test and benchmark utilities.
//!
//! This module is only available in tests or when the `testutil` feature is
//! enabled. It writes the wire format that the decoder reads.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::plan::{ColumnDescriptor, ColumnKind, ColumnPlan};

/// Append `value` as a zigzag varint.
pub fn encode_long(buf: &mut Vec<u8>, value: i64) {
    let mut n = ((value << 1) ^ (value >> 63)) as u64;
    while n >= 0x80 {
        buf.push((n as u8 & 0x7F) | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
}

pub fn encode_double(buf: &mut Vec<u8>, value: f64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn encode_bytes(buf: &mut Vec<u8>, value: &[u8]) {
    encode_long(buf, value.len() as i64);
    buf.extend_from_slice(value);
}

/// Row-by-row writer for hand-made blocks.
///
/// Nullable setters write the `["null", T]` union tag; `required_*` setters
/// write the bare value.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    rows: u32,
    buf: Vec<u8>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&mut self) -> &mut Self {
        self.rows += 1;
        self
    }

    fn tag(&mut self, present: bool) {
        encode_long(&mut self.buf, if present { 1 } else { 0 });
    }

    pub fn long(&mut self, value: Option<i64>) -> &mut Self {
        self.tag(value.is_some());
        if let Some(v) = value {
            encode_long(&mut self.buf, v);
        }
        self
    }

    pub fn double(&mut self, value: Option<f64>) -> &mut Self {
        self.tag(value.is_some());
        if let Some(v) = value {
            encode_double(&mut self.buf, v);
        }
        self
    }

    pub fn boolean(&mut self, value: Option<bool>) -> &mut Self {
        self.tag(value.is_some());
        if let Some(v) = value {
            self.buf.push(v as u8);
        }
        self
    }

    pub fn bytes(&mut self, value: Option<&[u8]>) -> &mut Self {
        self.tag(value.is_some());
        if let Some(v) = value {
            encode_bytes(&mut self.buf, v);
        }
        self
    }

    pub fn required_long(&mut self, value: i64) -> &mut Self {
        encode_long(&mut self.buf, value);
        self
    }

    pub fn required_double(&mut self, value: f64) -> &mut Self {
        encode_double(&mut self.buf, value);
        self
    }

    pub fn required_boolean(&mut self, value: bool) -> &mut Self {
        self.buf.push(value as u8);
        self
    }

    pub fn required_bytes(&mut self, value: &[u8]) -> &mut Self {
        encode_bytes(&mut self.buf, value);
        self
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Row count and payload.
    pub fn finish(self) -> (u32, Vec<u8>) {
        (self.rows, self.buf)
    }
}

/// Deterministic random block for `plan`. Nullable columns are null for
/// roughly one row in `null_every`.
pub fn generate_block(
    plan: &ColumnPlan,
    rows: u32,
    null_every: u32,
    seed: u64,
) -> (u32, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = BlockBuilder::new();
    for _ in 0..rows {
        builder.row();
        for column in plan.columns() {
            let is_null = column.nullable && null_every > 0 && rng.gen_range(0..null_every) == 0;
            write_random_value(&mut builder, column, is_null, &mut rng);
        }
    }
    builder.finish()
}

fn write_random_value(
    builder: &mut BlockBuilder,
    column: &ColumnDescriptor,
    is_null: bool,
    rng: &mut StdRng,
) {
    match (column.kind, column.nullable) {
        (ColumnKind::Int64, true) => {
            let v = rng.gen_range(i64::MIN..=i64::MAX);
            builder.long(Some(v).filter(|_| !is_null));
        }
        (ColumnKind::Int64, false) => {
            builder.required_long(rng.gen_range(i64::MIN..=i64::MAX));
        }
        (ColumnKind::Float64, true) => {
            let v = rng.gen_range(-1.0e9..1.0e9);
            builder.double(Some(v).filter(|_| !is_null));
        }
        (ColumnKind::Float64, false) => {
            builder.required_double(rng.gen_range(-1.0e9..1.0e9));
        }
        (ColumnKind::Bool, true) => {
            let v = rng.gen_bool(0.5);
            builder.boolean(Some(v).filter(|_| !is_null));
        }
        (ColumnKind::Bool, false) => {
            builder.required_boolean(rng.gen_bool(0.5));
        }
        (ColumnKind::Bytes | ColumnKind::Utf8, nullable) => {
            let len = rng.gen_range(0..24);
            let value: Vec<u8> = (0..len).map(|_| rng.sample(Alphanumeric)).collect();
            if nullable {
                builder.bytes(Some(value.as_slice()).filter(|_| !is_null));
            } else {
                builder.required_bytes(&value);
            }
        }
    }
}

/// Scalar-only plan, the shape of the `easy_scalars` sample table.
pub fn scalar_plan() -> ColumnPlan {
    ColumnPlan::new(vec![
        ColumnDescriptor::new("int_col", ColumnKind::Int64, true),
        ColumnDescriptor::new("float_col", ColumnKind::Float64, true),
        ColumnDescriptor::new("bool_col", ColumnKind::Bool, true),
    ])
    .expect("static plan is valid")
}

/// String-heavy plan, the shape of the `usa_names` sample table.
pub fn names_plan() -> ColumnPlan {
    ColumnPlan::new(vec![
        ColumnDescriptor::new("state", ColumnKind::Utf8, true),
        ColumnDescriptor::new("gender", ColumnKind::Utf8, true),
        ColumnDescriptor::new("year", ColumnKind::Int64, true),
        ColumnDescriptor::new("name", ColumnKind::Utf8, true),
        ColumnDescriptor::new("number", ColumnKind::Int64, true),
    ])
    .expect("static plan is valid")
}
