//! Reading datasets out of an NPZ container.
//!
//! An NPZ container is a ZIP archive whose entries are NumPy `.npy` arrays;
//! entry names may contain `/` separators, giving datasets hierarchical,
//! path-like names. This module owns all archive and `.npy` handling:
//! discovery returns a flat, order-preserving list of dataset entries, and
//! loading turns one entry into a [`Dataset`] with the crate's own element
//! type model and a validated row-major payload.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use zip::ZipArchive;

use crate::error::{ConvertError, Result};
use crate::schema::{ElementType, RecordField, SimpleType};

/// Suffix identifying array entries inside the archive
const NPY_SUFFIX: &str = ".npy";

/// One discovered dataset: hierarchical name plus the archive entry name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    /// Hierarchical dataset name (entry name without the `.npy` suffix)
    pub name: String,
    /// Exact archive entry name
    pub entry_name: String,
}

/// Shape and element type of a dataset, readable without loading its payload
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    /// Dimension sizes, outermost first
    pub shape: Vec<usize>,
    /// Element type
    pub element_type: ElementType,
}

/// A fully loaded dataset: metadata plus row-major payload bytes
#[derive(Debug)]
pub struct Dataset {
    name: String,
    shape: Vec<usize>,
    element_type: ElementType,
    payload: Vec<u8>,
}

impl Dataset {
    /// Hierarchical dataset name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension sizes, outermost first
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Element type descriptor
    #[must_use]
    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    /// Number of rows (size of the outermost dimension)
    #[must_use]
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Row-major payload bytes, exactly `rows * row stride` long
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// An opened, read-only NPZ container.
///
/// The underlying archive is held for the lifetime of this value and
/// released exactly once when it is dropped, on every exit path.
pub struct NpzContainer {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl NpzContainer {
    /// Open a container file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Path this container was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every array entry in the container, paired with its hierarchical
    /// name, in a stable name-sorted order over the slash-separated
    /// namespace. Non-array entries are pure groupings and are not returned.
    #[must_use]
    pub fn discover(&self) -> Vec<DatasetEntry> {
        self.archive
            .file_names()
            .filter(|name| name.ends_with(NPY_SUFFIX))
            .map(str::to_owned)
            .sorted()
            .map(|entry_name| {
                let name = entry_name
                    .strip_suffix(NPY_SUFFIX)
                    .unwrap_or(&entry_name)
                    .to_owned();
                DatasetEntry { name, entry_name }
            })
            .collect()
    }

    /// Read just the header of an entry: shape and element type.
    ///
    /// Used for inventory logging before conversion starts; the payload is
    /// not decompressed beyond what header parsing consumes.
    pub fn peek(&mut self, entry: &DatasetEntry) -> Result<DatasetInfo> {
        let mut file = self.archive.by_name(&entry.entry_name)?;
        let npy = npyz::NpyFile::new(&mut file)
            .map_err(|e| ConvertError::Npy(format!("{}: {e}", entry.name)))?;
        let shape: Vec<usize> = npy.shape().iter().map(|&d| d as usize).collect();
        let element_type = element_type_from_dtype(&npy.dtype())?;
        Ok(DatasetInfo {
            shape,
            element_type,
        })
    }

    /// Load one dataset fully: parse the header, derive the element type,
    /// and slice out the validated payload bytes.
    pub fn load_dataset(&mut self, entry: &DatasetEntry) -> Result<Dataset> {
        let mut file = self.archive.by_name(&entry.entry_name)?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;
        drop(file);
        parse_npy(&entry.name, &raw)
    }
}

/// Parse the raw bytes of a `.npy` entry into a [`Dataset`]
fn parse_npy(name: &str, raw: &[u8]) -> Result<Dataset> {
    let npy =
        npyz::NpyFile::new(raw).map_err(|e| ConvertError::Npy(format!("{name}: {e}")))?;
    let shape: Vec<usize> = npy.shape().iter().map(|&d| d as usize).collect();
    if shape.len() > 1 && matches!(npy.order(), npyz::Order::Fortran) {
        return Err(ConvertError::UnsupportedLayout(
            "column-major (Fortran-order) array".into(),
        ));
    }
    let element_type = element_type_from_dtype(&npy.dtype())?;

    let data_offset = npy_data_offset(raw)?;
    let expected = shape.iter().product::<usize>() * element_type.item_byte_width();
    let data = &raw[data_offset..];
    if data.len() < expected {
        return Err(ConvertError::Npy(format!(
            "{name}: payload holds {} bytes, expected {expected}",
            data.len()
        )));
    }
    Ok(Dataset {
        name: name.to_owned(),
        shape,
        element_type,
        payload: data[..expected].to_vec(),
    })
}

/// Convert a parsed npy dtype into the crate's element type model
fn element_type_from_dtype(dtype: &npyz::DType) -> Result<ElementType> {
    match dtype {
        npyz::DType::Plain(type_str) => Ok(ElementType::Simple(SimpleType::parse(
            &type_str.to_string(),
        )?)),
        npyz::DType::Record(fields) => {
            if fields.is_empty() {
                return Err(ConvertError::UnsupportedLayout(
                    "record type with no fields".into(),
                ));
            }
            let fields = fields
                .iter()
                .map(|field| match &field.dtype {
                    npyz::DType::Plain(type_str) => Ok(RecordField {
                        name: field.name.clone(),
                        ty: SimpleType::parse(&type_str.to_string())?,
                    }),
                    _ => Err(ConvertError::UnsupportedLayout(format!(
                        "nested type in record field '{}'",
                        field.name
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ElementType::Record(fields))
        }
        _ => Err(ConvertError::UnsupportedLayout(
            "non-scalar element dtype".into(),
        )),
    }
}

/// Offset of the payload within a raw `.npy` byte stream.
///
/// Format version 1 stores the header length as a little-endian u16 at
/// offset 8; versions 2 and 3 use a u32.
fn npy_data_offset(raw: &[u8]) -> Result<usize> {
    const MAGIC: &[u8] = b"\x93NUMPY";
    if raw.len() < 10 || &raw[..6] != MAGIC {
        return Err(ConvertError::Npy("missing npy magic".into()));
    }
    let (header_len, prefix) = if raw[6] == 1 {
        (u16::from_le_bytes([raw[8], raw[9]]) as usize, 10)
    } else {
        if raw.len() < 12 {
            return Err(ConvertError::Npy("truncated npy header".into()));
        }
        (
            u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]) as usize,
            12,
        )
    };
    let offset = prefix + header_len;
    if offset > raw.len() {
        return Err(ConvertError::Npy("truncated npy header".into()));
    }
    Ok(offset)
}
