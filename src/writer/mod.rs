//! Writing one dataset as a sequence of Snappy-compressed Parquet files.
//!
//! Each planned row range becomes exactly one output file; each file is
//! opened, written and closed within its own iteration. The first failed
//! range abandons the dataset's remaining chunks and leaves earlier files
//! in place.

use std::fs::File;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float32Array, Float64Array, Int8Array, Int16Array, Int32Array, Int64Array,
    StringArray, UInt8Array, UInt16Array, UInt32Array, UInt64Array,
};
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::chunk::chunk_ranges;
use crate::container::Dataset;
use crate::error::{ConvertError, Result};
use crate::schema::{ByteOrder, ColumnSpec, ColumnarType, map_simple};
use crate::utils::sanitize_dataset_name;

/// Outcome of writing one dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteSummary {
    /// Number of output files produced
    pub files: usize,
    /// Total rows written across all files
    pub rows: usize,
}

/// Write all rows of `dataset` into `out_dir`, one Parquet file per planned
/// chunk of `rows_per_chunk` rows.
///
/// Output files are named `{sanitized}_part_{NNNN}.parquet` with a dense,
/// zero-based sequence that follows row order. Columns appear in the order
/// given by `columns`.
///
/// # Errors
/// Fails if any column's type falls outside the mapping table, if the
/// payload does not match the resolved layout, or on any Arrow/Parquet/IO
/// error. Files already written for earlier chunks are left in place.
pub fn write_dataset(
    dataset: &Dataset,
    columns: &[ColumnSpec],
    rows_per_chunk: usize,
    out_dir: &Path,
) -> Result<WriteSummary> {
    let schema = build_arrow_schema(columns)?;
    let stride: usize = columns.iter().map(|c| c.ty.size).sum();
    let total_rows = dataset.rows();
    validate_payload(dataset, columns, stride, total_rows)?;

    let stem = sanitize_dataset_name(dataset.name());
    let mut summary = WriteSummary::default();
    for (seq, range) in chunk_ranges(total_rows, rows_per_chunk).enumerate() {
        let arrays = columns
            .iter()
            .map(|column| decode_column(dataset.payload(), stride, &range, column))
            .collect::<Result<Vec<_>>>()?;
        let batch = RecordBatch::try_new(Arc::clone(&schema), arrays)?;

        let path = out_dir.join(format!("{stem}_part_{seq:04}.parquet"));
        write_chunk_file(&path, &schema, &batch)?;
        log::info!(
            "wrote rows {}..{} of dataset '{}' to {}",
            range.start,
            range.end,
            dataset.name(),
            path.display()
        );
        summary.files += 1;
        summary.rows += range.len();
    }
    Ok(summary)
}

/// Arrow schema for the resolved columns, in order; all columns are
/// non-nullable since the source arrays carry no null information.
fn build_arrow_schema(columns: &[ColumnSpec]) -> Result<SchemaRef> {
    let fields = columns
        .iter()
        .map(|column| {
            let data_type = map_simple(&column.ty)?.to_arrow();
            Ok(Field::new(&column.name, data_type, false))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Arc::new(Schema::new(fields)))
}

/// Check the payload length and column offsets once, so the decode loops
/// can index without further bounds concerns.
fn validate_payload(
    dataset: &Dataset,
    columns: &[ColumnSpec],
    stride: usize,
    total_rows: usize,
) -> Result<()> {
    if dataset.payload().len() != total_rows * stride {
        return Err(ConvertError::Npy(format!(
            "{}: payload holds {} bytes, expected {} rows of {} bytes",
            dataset.name(),
            dataset.payload().len(),
            total_rows,
            stride
        )));
    }
    for column in columns {
        if column.offset + column.ty.size > stride {
            return Err(ConvertError::UnsupportedLayout(format!(
                "column '{}' extends past the row boundary",
                column.name
            )));
        }
    }
    Ok(())
}

fn write_chunk_file(path: &Path, schema: &SchemaRef, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, Arc::clone(schema), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

macro_rules! decode_primitive {
    ($ty:ty, $array:ty, $payload:expr, $stride:expr, $range:expr, $column:expr) => {{
        const WIDTH: usize = std::mem::size_of::<$ty>();
        let mut values = Vec::with_capacity($range.len());
        for row in $range.clone() {
            let at = row * $stride + $column.offset;
            let mut buf = [0u8; WIDTH];
            buf.copy_from_slice(&$payload[at..at + WIDTH]);
            values.push(match $column.ty.byte_order {
                ByteOrder::Little => <$ty>::from_le_bytes(buf),
                ByteOrder::Big => <$ty>::from_be_bytes(buf),
            });
        }
        Arc::new(<$array>::from(values)) as ArrayRef
    }};
}

/// Decode one column of the given row range into a typed Arrow array.
///
/// Byte strings are NUL-trimmed and decoded as UTF-8 with replacement
/// characters for invalid sequences; decoding never fails.
fn decode_column(
    payload: &[u8],
    stride: usize,
    range: &Range<usize>,
    column: &ColumnSpec,
) -> Result<ArrayRef> {
    let array = match map_simple(&column.ty)? {
        ColumnarType::Int8 => decode_primitive!(i8, Int8Array, payload, stride, range, column),
        ColumnarType::Int16 => decode_primitive!(i16, Int16Array, payload, stride, range, column),
        ColumnarType::Int32 => decode_primitive!(i32, Int32Array, payload, stride, range, column),
        ColumnarType::Int64 => decode_primitive!(i64, Int64Array, payload, stride, range, column),
        ColumnarType::UInt8 => decode_primitive!(u8, UInt8Array, payload, stride, range, column),
        ColumnarType::UInt16 => {
            decode_primitive!(u16, UInt16Array, payload, stride, range, column)
        }
        ColumnarType::UInt32 => {
            decode_primitive!(u32, UInt32Array, payload, stride, range, column)
        }
        ColumnarType::UInt64 => {
            decode_primitive!(u64, UInt64Array, payload, stride, range, column)
        }
        ColumnarType::Float32 => {
            decode_primitive!(f32, Float32Array, payload, stride, range, column)
        }
        ColumnarType::Float64 => {
            decode_primitive!(f64, Float64Array, payload, stride, range, column)
        }
        ColumnarType::Utf8 => decode_byte_strings(payload, stride, range, column),
    };
    Ok(array)
}

fn decode_byte_strings(
    payload: &[u8],
    stride: usize,
    range: &Range<usize>,
    column: &ColumnSpec,
) -> ArrayRef {
    let width = column.ty.size;
    let mut values = Vec::with_capacity(range.len());
    for row in range.clone() {
        let at = row * stride + column.offset;
        let raw = &payload[at..at + width];
        // NumPy pads fixed-length byte strings with trailing NULs.
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        values.push(String::from_utf8_lossy(&raw[..end]).into_owned());
    }
    Arc::new(StringArray::from(values)) as ArrayRef
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ElementKind, SimpleType};

    fn column(descr: &str, offset: usize) -> ColumnSpec {
        ColumnSpec {
            name: "c".into(),
            ty: SimpleType::parse(descr).unwrap(),
            offset,
        }
    }

    #[test]
    fn decodes_little_and_big_endian() {
        let payload: Vec<u8> = [1i32, -2, 3]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let array = decode_column(&payload, 4, &(0..3), &column("<i4", 0)).unwrap();
        let ints = array.as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(&ints.values()[..], &[1, -2, 3]);

        let payload: Vec<u8> = [10i32, 20].iter().flat_map(|v| v.to_be_bytes()).collect();
        let array = decode_column(&payload, 4, &(0..2), &column(">i4", 0)).unwrap();
        let ints = array.as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(&ints.values()[..], &[10, 20]);
    }

    #[test]
    fn decodes_strided_record_field() {
        // Rows of (u8 tag, f64 value): pick out the value column.
        let mut payload = Vec::new();
        for (tag, value) in [(1u8, 0.5f64), (2, 1.5)] {
            payload.push(tag);
            payload.extend_from_slice(&value.to_le_bytes());
        }
        let array = decode_column(&payload, 9, &(0..2), &column("<f8", 1)).unwrap();
        let floats = array.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(&floats.values()[..], &[0.5, 1.5]);
    }

    #[test]
    fn byte_strings_trim_nul_padding_and_replace_invalid_utf8() {
        let payload = [b"abc\0\0".as_slice(), b"\xffZ\0\0\0".as_slice()].concat();
        let array = decode_column(&payload, 5, &(0..2), &column("|S5", 0)).unwrap();
        let strings = array.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(strings.value(0), "abc");
        assert_eq!(strings.value(1), "\u{FFFD}Z");
    }

    #[test]
    fn embedded_nul_is_kept_when_followed_by_data() {
        let payload = b"a\0b\0".to_vec();
        let array = decode_column(&payload, 4, &(0..1), &column("|S4", 0)).unwrap();
        let strings = array.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(strings.value(0), "a\0b");
    }

    #[test]
    fn unsupported_column_type_is_rejected() {
        let spec = ColumnSpec {
            name: "half".into(),
            ty: SimpleType {
                kind: ElementKind::Float,
                size: 2,
                byte_order: ByteOrder::Little,
            },
            offset: 0,
        };
        assert!(matches!(
            decode_column(&[0u8; 4], 2, &(0..2), &spec),
            Err(ConvertError::UnsupportedType { kind: 'f', size: 2 })
        ));
    }
}
