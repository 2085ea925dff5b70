//! Element type model and mapping to the columnar output type system.
//!
//! Datasets describe their elements with NumPy dtype descriptor strings
//! (`<i8`, `>f4`, `|S16`, or an ordered list of named fields for record
//! arrays). This module parses those descriptors into the crate's own
//! [`ElementType`] model and maps each simple element type onto a closed
//! [`ColumnarType`] enumeration backed by Arrow data types.

pub mod layout;

use std::fmt;

use arrow::datatypes::DataType;

use crate::error::{ConvertError, Result};

pub use layout::{ColumnSpec, resolve_columns};

/// Kind of a simple element type, mirroring the NumPy dtype kind character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Signed integer (`i`)
    Signed,
    /// Unsigned integer (`u`)
    Unsigned,
    /// IEEE floating point (`f`)
    Float,
    /// Fixed-length byte string (`S`)
    Bytes,
}

impl ElementKind {
    /// The NumPy kind character for this kind
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Signed => 'i',
            Self::Unsigned => 'u',
            Self::Float => 'f',
            Self::Bytes => 'S',
        }
    }
}

/// Byte order of a stored element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian (`<`, `=` on all supported targets, and `|`)
    Little,
    /// Big-endian (`>`)
    Big,
}

/// A simple (non-record) element type: kind, width in bytes, byte order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleType {
    /// Element kind
    pub kind: ElementKind,
    /// Width of one element in bytes
    pub size: usize,
    /// Stored byte order
    pub byte_order: ByteOrder,
}

impl SimpleType {
    /// Parse a NumPy descriptor string such as `<i8`, `>f4` or `|S16`.
    ///
    /// Kind characters outside the supported set (booleans, objects,
    /// complex numbers, datetimes, ...) and zero-width elements are
    /// rejected with [`ConvertError::UnsupportedType`], so the caller can
    /// skip the offending dataset and keep going.
    pub fn parse(descr: &str) -> Result<Self> {
        let mut chars = descr.chars();
        let order = chars
            .next()
            .ok_or_else(|| ConvertError::Npy(format!("empty type descriptor '{descr}'")))?;
        let byte_order = match order {
            '<' | '|' | '=' => ByteOrder::Little,
            '>' => ByteOrder::Big,
            _ => {
                return Err(ConvertError::Npy(format!(
                    "type descriptor '{descr}' has no byte-order prefix"
                )));
            }
        };
        let kind_ch = chars
            .next()
            .ok_or_else(|| ConvertError::Npy(format!("truncated type descriptor '{descr}'")))?;
        let size: usize = chars
            .as_str()
            .parse()
            .map_err(|_| ConvertError::Npy(format!("bad element size in descriptor '{descr}'")))?;

        let kind = match kind_ch {
            'i' => ElementKind::Signed,
            'u' => ElementKind::Unsigned,
            'f' => ElementKind::Float,
            'S' | 'a' => ElementKind::Bytes,
            other => return Err(ConvertError::UnsupportedType { kind: other, size }),
        };
        if size == 0 {
            return Err(ConvertError::UnsupportedType {
                kind: kind.code(),
                size,
            });
        }
        Ok(Self {
            kind,
            size,
            byte_order,
        })
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.byte_order {
            ByteOrder::Little => '<',
            ByteOrder::Big => '>',
        };
        write!(f, "{order}{}{}", self.kind.code(), self.size)
    }
}

/// A named field of a record element type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordField {
    /// Declared field name
    pub name: String,
    /// Field element type
    pub ty: SimpleType,
}

/// Element type of a dataset: one simple type, or an ordered record of
/// named simple fields. Field order is significant and preserved end-to-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// All elements share one simple type
    Simple(SimpleType),
    /// Record layout with named sub-fields in declared order
    Record(Vec<RecordField>),
}

impl ElementType {
    /// Width in bytes of one element (for records: the packed record size)
    #[must_use]
    pub fn item_byte_width(&self) -> usize {
        match self {
            Self::Simple(ty) => ty.size,
            Self::Record(fields) => fields.iter().map(|f| f.ty.size).sum(),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(ty) => write!(f, "{ty}"),
            Self::Record(fields) => {
                write!(f, "[")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Target columnar type for one output column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnarType {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// UTF-8 string (from fixed-length byte strings, decoded lossily)
    Utf8,
}

impl ColumnarType {
    /// The Arrow data type this columnar type is stored as
    #[must_use]
    pub fn to_arrow(self) -> DataType {
        match self {
            Self::Int8 => DataType::Int8,
            Self::Int16 => DataType::Int16,
            Self::Int32 => DataType::Int32,
            Self::Int64 => DataType::Int64,
            Self::UInt8 => DataType::UInt8,
            Self::UInt16 => DataType::UInt16,
            Self::UInt32 => DataType::UInt32,
            Self::UInt64 => DataType::UInt64,
            Self::Float32 => DataType::Float32,
            Self::Float64 => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
        }
    }
}

/// Map a simple element type onto the columnar type system.
///
/// Integers of width 1/2/4/8 and floats of width 4/8 map to the matching
/// Arrow-backed type; fixed-length byte strings of any width map to UTF-8
/// strings. Every other combination returns
/// [`ConvertError::UnsupportedType`]; this function never panics.
pub fn map_simple(ty: &SimpleType) -> Result<ColumnarType> {
    let mapped = match (ty.kind, ty.size) {
        (ElementKind::Signed, 1) => ColumnarType::Int8,
        (ElementKind::Signed, 2) => ColumnarType::Int16,
        (ElementKind::Signed, 4) => ColumnarType::Int32,
        (ElementKind::Signed, 8) => ColumnarType::Int64,
        (ElementKind::Unsigned, 1) => ColumnarType::UInt8,
        (ElementKind::Unsigned, 2) => ColumnarType::UInt16,
        (ElementKind::Unsigned, 4) => ColumnarType::UInt32,
        (ElementKind::Unsigned, 8) => ColumnarType::UInt64,
        (ElementKind::Float, 4) => ColumnarType::Float32,
        (ElementKind::Float, 8) => ColumnarType::Float64,
        (ElementKind::Bytes, size) if size > 0 => ColumnarType::Utf8,
        (kind, size) => {
            return Err(ConvertError::UnsupportedType {
                kind: kind.code(),
                size,
            });
        }
    };
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_descriptors() {
        let ty = SimpleType::parse("<i8").unwrap();
        assert_eq!(ty.kind, ElementKind::Signed);
        assert_eq!(ty.size, 8);
        assert_eq!(ty.byte_order, ByteOrder::Little);

        let ty = SimpleType::parse(">f4").unwrap();
        assert_eq!(ty.kind, ElementKind::Float);
        assert_eq!(ty.byte_order, ByteOrder::Big);

        let ty = SimpleType::parse("|S16").unwrap();
        assert_eq!(ty.kind, ElementKind::Bytes);
        assert_eq!(ty.size, 16);
    }

    #[test]
    fn rejects_unknown_kinds() {
        for descr in ["|b1", "<c16", "|O8", "<M8", "|V4"] {
            match SimpleType::parse(descr) {
                Err(ConvertError::UnsupportedType { .. }) => {}
                other => panic!("expected UnsupportedType for {descr}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_zero_width() {
        assert!(matches!(
            SimpleType::parse("|S0"),
            Err(ConvertError::UnsupportedType { kind: 'S', size: 0 })
        ));
    }

    #[test]
    fn rejects_malformed_descriptors() {
        for descr in ["", "<", "<i", "<iX", "i8"] {
            assert!(SimpleType::parse(descr).is_err(), "descr {descr:?}");
        }
    }

    #[test]
    fn maps_supported_types() {
        let cases = [
            ("<i1", ColumnarType::Int8),
            ("<i2", ColumnarType::Int16),
            ("<i4", ColumnarType::Int32),
            ("<i8", ColumnarType::Int64),
            ("<u1", ColumnarType::UInt8),
            ("<u2", ColumnarType::UInt16),
            ("<u4", ColumnarType::UInt32),
            ("<u8", ColumnarType::UInt64),
            ("<f4", ColumnarType::Float32),
            ("<f8", ColumnarType::Float64),
            ("|S1", ColumnarType::Utf8),
            ("|S255", ColumnarType::Utf8),
        ];
        for (descr, expected) in cases {
            let ty = SimpleType::parse(descr).unwrap();
            assert_eq!(map_simple(&ty).unwrap(), expected, "descr {descr}");
        }
    }

    #[test]
    fn rejects_unsupported_widths() {
        // Half floats and odd integer widths fall outside the mapping table.
        for (kind, size) in [
            (ElementKind::Float, 2),
            (ElementKind::Float, 16),
            (ElementKind::Signed, 3),
            (ElementKind::Unsigned, 16),
        ] {
            let ty = SimpleType {
                kind,
                size,
                byte_order: ByteOrder::Little,
            };
            match map_simple(&ty) {
                Err(ConvertError::UnsupportedType { kind: k, size: s }) => {
                    assert_eq!(k, kind.code());
                    assert_eq!(s, size);
                }
                other => panic!("expected UnsupportedType, got {other:?}"),
            }
        }
    }

    #[test]
    fn record_width_is_sum_of_fields() {
        let record = ElementType::Record(vec![
            RecordField {
                name: "ts".into(),
                ty: SimpleType::parse("<i8").unwrap(),
            },
            RecordField {
                name: "px".into(),
                ty: SimpleType::parse("<f4").unwrap(),
            },
        ]);
        assert_eq!(record.item_byte_width(), 12);
        assert_eq!(record.to_string(), "[ts: <i8, px: <f4]");
    }
}
