//! Logical grid coordinates, selection rectangles and their normalisation.

use core::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// One of the two grid axes. Row operations work along `Row`, column
/// operations along `Col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Col,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Row => Axis::Col,
            Axis::Col => Axis::Row,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Row => "row",
            Axis::Col => "col",
        })
    }
}

/// A `(row, col)` position in the logical grid, 0-indexed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct CellPoint {
    pub row: usize,
    pub col: usize,
}

impl CellPoint {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Component along `axis`.
    #[inline]
    pub fn along(self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.row,
            Axis::Col => self.col,
        }
    }

    /// Point built from a component along `axis` and one across it.
    #[inline]
    pub fn on(axis: Axis, along: usize, across: usize) -> Self {
        match axis {
            Axis::Row => Self::new(along, across),
            Axis::Col => Self::new(across, along),
        }
    }

    #[inline]
    pub fn with(self, axis: Axis, value: usize) -> Self {
        Self::on(axis, value, self.along(axis.cross()))
    }
}

impl From<(usize, usize)> for CellPoint {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// A grid-relative selection. The two ends are unordered until passed
/// through [`edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridSelection {
    pub start: CellPoint,
    pub end: CellPoint,
}

impl GridSelection {
    pub fn new(start: impl Into<CellPoint>, end: impl Into<CellPoint>) -> Self {
        Self { start: start.into(), end: end.into() }
    }

    pub fn point(p: impl Into<CellPoint>) -> Self {
        let p = p.into();
        Self { start: p, end: p }
    }

    /// Inclusive rectangle spanned by the two ends.
    pub fn rect(&self) -> Rect {
        let sel = edges(self);
        Rect::between(sel.start, sel.end)
    }
}

/// Normalise a selection so `start` is the top-left corner and `end` the
/// bottom-right one. Coordinates are unsigned, so they are already clamped
/// at zero.
pub fn edges(sel: &GridSelection) -> GridSelection {
    let (a, b) = (sel.start, sel.end);
    GridSelection {
        start: CellPoint::new(a.row.min(b.row), a.col.min(b.col)),
        end: CellPoint::new(a.row.max(b.row), a.col.max(b.col)),
    }
}

pub fn equal(a: CellPoint, b: CellPoint) -> bool {
    a == b
}

/// The `(row, col)` named by the last two components of a cell path.
pub fn to_point(path: &[usize]) -> Result<CellPoint> {
    match path {
        [.., row, col] => Ok(CellPoint::new(*row, *col)),
        _ => Err(GridError::InvalidPath(path.to_vec())),
    }
}

/// Half-open rectangle `[row, row + rows) × [col, col + cols)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Rect {
    pub const fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self { row, col, rows, cols }
    }

    /// Rectangle covering both inclusive corners.
    pub fn between(a: CellPoint, b: CellPoint) -> Self {
        let (top, bottom) = (a.row.min(b.row), a.row.max(b.row));
        let (left, right) = (a.col.min(b.col), a.col.max(b.col));
        Self::new(top, left, bottom - top + 1, right - left + 1)
    }

    pub fn start(&self) -> CellPoint {
        CellPoint::new(self.row, self.col)
    }

    /// Bottom-right position inside the rectangle.
    pub fn last(&self) -> CellPoint {
        CellPoint::new(
            (self.row + self.rows).saturating_sub(1),
            (self.col + self.cols).saturating_sub(1),
        )
    }

    pub fn end_row(&self) -> usize {
        self.row + self.rows
    }

    pub fn end_col(&self) -> usize {
        self.col + self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Line range covered along `axis`.
    pub fn lines(&self, axis: Axis) -> Range<usize> {
        match axis {
            Axis::Row => self.row..self.end_row(),
            Axis::Col => self.col..self.end_col(),
        }
    }

    pub fn contains(&self, p: CellPoint) -> bool {
        (self.row..self.end_row()).contains(&p.row) && (self.col..self.end_col()).contains(&p.col)
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.row >= self.row
            && other.col >= self.col
            && other.end_row() <= self.end_row()
            && other.end_col() <= self.end_col()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.row < other.end_row()
            && other.row < self.end_row()
            && self.col < other.end_col()
            && other.col < self.end_col()
    }

    /// Overlap of the two rectangles; empty when they do not meet.
    pub fn intersection_with(&self, other: &Rect) -> Rect {
        let row = self.row.max(other.row);
        let col = self.col.max(other.col);
        let end_row = self.end_row().min(other.end_row());
        let end_col = self.end_col().min(other.end_col());
        if row >= end_row || col >= end_col {
            return Rect::new(row, col, 0, 0);
        }
        Rect::new(row, col, end_row - row, end_col - col)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let row = self.row.min(other.row);
        let col = self.col.min(other.col);
        Rect::new(
            row,
            col,
            self.end_row().max(other.end_row()) - row,
            self.end_col().max(other.end_col()) - col,
        )
    }

    /// Positions in row-major order.
    pub fn points(&self) -> impl Iterator<Item = CellPoint> {
        let cols = self.col..self.end_col();
        (self.row..self.end_row())
            .flat_map(move |r| cols.clone().map(move |c| CellPoint::new(r, c)))
    }
}
