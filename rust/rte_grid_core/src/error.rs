//! Error types for the grid core and its host document.

use thiserror::Error;

use crate::grid::Axis;
use crate::host::Path;

/// Errors surfaced by grid queries, grid mutations and the host tree.
///
/// `IndexOutOfRange` and `InvalidPath` are argument errors the command layer
/// should reject. `CorruptGrid` means an earlier edit broke the span
/// invariants; it is always reported before any node is touched.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },

    #[error("path {0:?} does not address a grid cell")]
    InvalidPath(Path),

    #[error("corrupt grid at ({row}, {col}): {reason}")]
    CorruptGrid {
        row: usize,
        col: usize,
        reason: String,
    },

    #[error("no node at path {0:?}")]
    PathNotFound(Path),

    #[error("node at {path:?} is not a {expected}")]
    NodeKindMismatch { path: Path, expected: &'static str },

    #[error("no grid encloses path {0:?}")]
    NotAGrid(Path),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridError {
    pub(crate) fn corrupt(row: usize, col: usize, reason: impl Into<String>) -> Self {
        GridError::CorruptGrid { row, col, reason: reason.into() }
    }

    /// True for invariant violations, as opposed to bad arguments.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, GridError::CorruptGrid { .. })
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
