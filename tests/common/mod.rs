//! Shared helpers for integration tests: NPZ fixture construction and
//! Parquet read-back.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use npyz::WriterBuilder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use zip::write::SimpleFileOptions;

/// Serialize values into `.npy` bytes with the element type's default dtype
pub fn npy_nd<T: npyz::AutoSerialize>(shape: &[u64], values: &[T]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = npyz::WriteOptions::new()
            .default_dtype()
            .shape(shape)
            .writer(&mut buf)
            .begin_nd()
            .expect("begin npy writer");
        for value in values {
            writer.push(value).expect("push value");
        }
        writer.finish().expect("finish npy writer");
    }
    buf
}

/// Hand-built v1 `.npy` bytes, for dtypes the writer API does not cover
/// (record types, byte strings, unsupported kinds).
pub fn raw_npy(descr: &str, shape: &[usize], payload: &[u8]) -> Vec<u8> {
    raw_npy_ordered(descr, shape, payload, false)
}

/// Like [`raw_npy`], with an explicit `fortran_order` flag
pub fn raw_npy_ordered(descr: &str, shape: &[usize], payload: &[u8], fortran: bool) -> Vec<u8> {
    let shape_str = match shape {
        [only] => format!("({only},)"),
        dims => format!(
            "({})",
            dims.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    let order = if fortran { "True" } else { "False" };
    let mut header =
        format!("{{'descr': {descr}, 'fortran_order': {order}, 'shape': {shape_str}, }}");
    let unpadded = 10 + header.len() + 1;
    let pad = (64 - unpadded % 64) % 64;
    header.push_str(&" ".repeat(pad));
    header.push('\n');

    let mut out = Vec::new();
    out.extend_from_slice(b"\x93NUMPY\x01\x00");
    out.extend_from_slice(&u16::try_from(header.len()).unwrap().to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Write an NPZ archive with the given dataset entries (`.npy` suffix is
/// appended to each name).
pub fn write_npz(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = File::create(path).expect("create npz");
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in entries {
        zip.start_file(format!("{name}.npy"), options)
            .expect("start entry");
        zip.write_all(bytes).expect("write entry");
    }
    zip.finish().expect("finish npz");
}

/// Write a ZIP archive with one non-array entry, i.e. a container without
/// any datasets.
pub fn write_empty_npz(path: &Path) {
    let file = File::create(path).expect("create npz");
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("readme.txt", options).expect("start entry");
    zip.write_all(b"no arrays here").expect("write entry");
    zip.finish().expect("finish npz");
}

/// Read a Parquet file back into its schema and record batches
pub fn read_parquet(path: &Path) -> (SchemaRef, Vec<RecordBatch>) {
    let file = File::open(path).expect("open parquet");
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).expect("parquet reader");
    let schema = builder.schema().clone();
    let reader = builder.build().expect("build parquet reader");
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .expect("read record batches");
    (schema, batches)
}

/// Total row count of a Parquet file
pub fn parquet_row_count(path: &Path) -> usize {
    let (_, batches) = read_parquet(path);
    batches.iter().map(RecordBatch::num_rows).sum()
}

/// Sorted `{stem}_part_*.parquet` paths inside `dir`
pub fn part_files(dir: &Path, stem: &str) -> Vec<PathBuf> {
    let prefix = format!("{stem}_part_");
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("read output dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".parquet"))
        })
        .collect();
    files.sort();
    files
}
