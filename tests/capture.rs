use std::fs::File;
use std::io::BufWriter;

use arrow::array::{Array, Int64Array, StringArray};
use tempfile::TempDir;

use rowblock::capture::{CaptureReader, CaptureWriter};
use rowblock::conf::DecoderConfig;
use rowblock::decode::{BlockDecoder, RowBlock};
use rowblock::testutil::{BlockBuilder, generate_block, names_plan};

#[test]
fn test_replay_generated_blocks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("names.rblk");
    let plan = names_plan();

    let blocks: Vec<(u32, Vec<u8>)> = (0..5)
        .map(|i| generate_block(&plan, 100 * (i + 1), 4, i as u64))
        .collect();
    let mut writer = CaptureWriter::new(BufWriter::new(File::create(&path).unwrap())).unwrap();
    for (rows, payload) in &blocks {
        writer.write_block(&RowBlock::new(*rows, payload)).unwrap();
    }
    assert_eq!(writer.blocks(), 5);
    writer.finish().unwrap();

    let reader = CaptureReader::open(&path).unwrap();
    let decoder = BlockDecoder::new(&plan, DecoderConfig::default());
    let mut total_rows = 0;
    for (block, (rows, payload)) in reader.blocks().zip(&blocks) {
        let block = block.unwrap();
        assert_eq!(block.row_count, *rows);
        assert_eq!(block.payload, payload.as_slice());

        let batch = decoder.decode(&block).unwrap().into_record_batch().unwrap();
        assert_eq!(batch.num_rows(), *rows as usize);
        assert_eq!(batch.num_columns(), 5);
        total_rows += batch.num_rows();
    }
    assert_eq!(total_rows, 1500);
}

#[test]
fn test_replay_decodes_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("small.rblk");
    let plan = names_plan();

    let mut builder = BlockBuilder::new();
    builder
        .row()
        .bytes(Some(b"CA"))
        .bytes(Some(b"F"))
        .long(Some(1910))
        .bytes(Some(b"Mary"))
        .long(Some(295));
    builder
        .row()
        .bytes(Some(b"TX"))
        .bytes(None)
        .long(Some(1911))
        .bytes(Some(b"Ruth"))
        .long(None);
    let (rows, payload) = builder.finish();

    let mut writer = CaptureWriter::new(File::create(&path).unwrap()).unwrap();
    writer.write_block(&RowBlock::new(rows, &payload)).unwrap();
    writer.finish().unwrap();

    let reader = CaptureReader::open(&path).unwrap();
    let block = reader.blocks().next().unwrap().unwrap();
    let batch = BlockDecoder::new(&plan, DecoderConfig::sequential())
        .decode(&block)
        .unwrap()
        .into_record_batch()
        .unwrap();

    let names = batch
        .column_by_name("name")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(names.value(0), "Mary");
    assert_eq!(names.value(1), "Ruth");

    let gender = batch.column(1);
    assert!(gender.is_valid(0));
    assert!(gender.is_null(1));

    let number = batch
        .column(4)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(number.iter().collect::<Vec<_>>(), vec![Some(295), None]);
}
