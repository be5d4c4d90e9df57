use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::{debug, info};

use rowblock::capture::CaptureReader;
use rowblock::conf::Config;
use rowblock::core::{CliArgs, setup_logging};
use rowblock::decode::BlockDecoder;
use rowblock::plan::ColumnPlan;

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = CliArgs::parse();
    info!(args = &args; "Rowblock started.");

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("cannot configure rayon pool")?;
    }

    let schema = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("cannot read schema {}", args.schema.display()))?;
    let plan = ColumnPlan::from_avro_json(&schema)?;
    let decoder = BlockDecoder::new(&plan, config.decoder.clone());
    let capture = CaptureReader::open(&args.capture)?;

    let started = Instant::now();
    let mut blocks = 0usize;
    let mut rows = 0usize;
    let mut bytes = 0usize;
    let mut nulls = vec![0usize; plan.len()];
    for block in capture.blocks() {
        let block = block?;
        let decoded = decoder
            .decode(&block)
            .with_context(|| format!("block {blocks} failed to decode"))?;
        for (count, column) in nulls.iter_mut().zip(decoded.columns()) {
            *count += column.null_count();
        }
        blocks += 1;
        rows += decoded.row_count();
        bytes += block.payload.len();

        let batch = decoded.into_record_batch()?;
        debug!(
            "Block {}: {} rows, {} columns, {} bytes in arrow buffers",
            blocks,
            batch.num_rows(),
            batch.num_columns(),
            batch.get_array_memory_size()
        );
    }

    let elapsed = started.elapsed();
    info!(
        "Decoded {} blocks, {} rows, {} payload bytes in {:?}",
        blocks, rows, bytes, elapsed
    );
    for (column, count) in plan.columns().iter().zip(&nulls) {
        info!("Column '{}' ({:?}): {} nulls", column.name, column.kind, count);
    }
    Ok(())
}
