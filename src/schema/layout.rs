//! Column layout resolution for a dataset.
//!
//! Record datasets expose their declared fields in order; unstructured
//! datasets get one synthesized column per trailing dimension, named
//! positionally (`col0`, `col1`, ...). A 1-D unstructured dataset is a
//! single `col0` column.

use crate::error::{ConvertError, Result};
use crate::schema::{ElementType, SimpleType};

/// One resolved output column: name, simple type, byte offset within a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Output column name (declared field name or synthesized `colN`)
    pub name: String,
    /// Simple element type of the column
    pub ty: SimpleType,
    /// Byte offset of this column's value within one row
    pub offset: usize,
}

/// Resolve the output columns for a dataset with the given element type and
/// shape, in the order they must appear in every output file.
///
/// Datasets this converter cannot lay out as flat columns (scalars, arrays
/// of more than two dimensions, multi-dimensional record arrays) are
/// rejected with [`ConvertError::UnsupportedLayout`].
pub fn resolve_columns(element_type: &ElementType, shape: &[usize]) -> Result<Vec<ColumnSpec>> {
    match element_type {
        ElementType::Record(fields) => {
            if shape.is_empty() {
                return Err(ConvertError::UnsupportedLayout(
                    "scalar dataset has no rows".into(),
                ));
            }
            if shape.len() > 1 {
                return Err(ConvertError::UnsupportedLayout(format!(
                    "{}-dimensional record array",
                    shape.len()
                )));
            }
            let mut offset = 0;
            let mut columns = Vec::with_capacity(fields.len());
            for field in fields {
                columns.push(ColumnSpec {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    offset,
                });
                offset += field.ty.size;
            }
            Ok(columns)
        }
        ElementType::Simple(ty) => match shape.len() {
            0 => Err(ConvertError::UnsupportedLayout(
                "scalar dataset has no rows".into(),
            )),
            1 => Ok(vec![ColumnSpec {
                name: "col0".into(),
                ty: ty.clone(),
                offset: 0,
            }]),
            2 => {
                if shape[1] == 0 {
                    return Err(ConvertError::UnsupportedLayout(
                        "dataset has zero columns".into(),
                    ));
                }
                Ok((0..shape[1])
                    .map(|i| ColumnSpec {
                        name: format!("col{i}"),
                        ty: ty.clone(),
                        offset: i * ty.size,
                    })
                    .collect())
            }
            n => Err(ConvertError::UnsupportedLayout(format!(
                "{n}-dimensional dataset"
            ))),
        },
    }
}
