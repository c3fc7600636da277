//! Projection item value types.
//!
//! The reader and estimator produce `ProjectionItem`s; the writer and the
//! projector builder consume them read-only. Items are never mutated in
//! place; any update builds a new item.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamedMatrixError {
    #[error("matrix has {actual} columns but the column name list has {expected} entries")]
    ColumnCountMismatch { expected: usize, actual: usize },
}

/// A matrix with named columns (and optionally named rows).
///
/// Invariant, checked at construction: the column name list has exactly one
/// entry per data column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedMatrix {
    row_names: Option<Vec<String>>,
    col_names: Vec<String>,
    data: DMatrix<f64>,
}

impl NamedMatrix {
    pub fn new(col_names: Vec<String>, data: DMatrix<f64>) -> Result<Self, NamedMatrixError> {
        if col_names.len() != data.ncols() {
            return Err(NamedMatrixError::ColumnCountMismatch {
                expected: col_names.len(),
                actual: data.ncols(),
            });
        }
        Ok(Self {
            row_names: None,
            col_names,
            data,
        })
    }

    pub fn with_row_names(mut self, row_names: Vec<String>) -> Self {
        self.row_names = Some(row_names);
        self
    }

    pub fn row_count(&self) -> usize {
        self.data.nrows()
    }

    pub fn col_count(&self) -> usize {
        self.data.ncols()
    }

    pub fn row_names(&self) -> Option<&[String]> {
        self.row_names.as_deref()
    }

    pub fn col_names(&self) -> &[String] {
        &self.col_names
    }

    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }
}

/// What a projection item models, as persisted by its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    None,
    /// A field pattern at a fixed time point; also the generic code for
    /// data-derived vectors.
    Field,
    DipoleFixed,
    DipoleRotating,
    HomogeneousGradient,
    HomogeneousField,
    EegAvref,
    /// Unrecognized code, kept losslessly.
    Other(i32),
}

impl ItemKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ItemKind::None,
            1 => ItemKind::Field,
            2 => ItemKind::DipoleFixed,
            3 => ItemKind::DipoleRotating,
            4 => ItemKind::HomogeneousGradient,
            5 => ItemKind::HomogeneousField,
            10 => ItemKind::EegAvref,
            other => ItemKind::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ItemKind::None => 0,
            ItemKind::Field => 1,
            ItemKind::DipoleFixed => 2,
            ItemKind::DipoleRotating => 3,
            ItemKind::HomogeneousGradient => 4,
            ItemKind::HomogeneousField => 5,
            ItemKind::EegAvref => 10,
            ItemKind::Other(code) => code,
        }
    }
}

/// One projection record: a set of artifact-direction vectors in channel space.
///
/// `description` is never empty for items produced by this crate; the reader
/// fails rather than emit an undescribed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionItem {
    pub kind: ItemKind,
    /// Whether the item participates in projector construction.
    pub active: bool,
    pub description: String,
    pub matrix: NamedMatrix,
}

impl ProjectionItem {
    pub fn new(
        kind: ItemKind,
        active: bool,
        description: impl Into<String>,
        matrix: NamedMatrix,
    ) -> Self {
        Self {
            kind,
            active,
            description: description.into(),
            matrix,
        }
    }
}
