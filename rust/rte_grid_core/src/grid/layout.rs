//! Span resolution over a snapshot of a grid's cell matrix.

use std::collections::HashSet;

use serde::Serialize;

use super::point::{Axis, CellPoint, Rect};
use crate::doc::{CellProps, Node, Span};
use crate::error::{GridError, Result};
use crate::host::HostTree;

/// What a single tree position holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Anchor { rowspan: usize, colspan: usize },
    Placeholder(Span),
}

impl Slot {
    pub const UNIT: Slot = Slot::Anchor { rowspan: 1, colspan: 1 };

    pub fn from_props(props: &CellProps) -> Self {
        match props.span {
            Some(span) => Slot::Placeholder(span),
            None => Slot::Anchor {
                rowspan: props.rowspan as usize,
                colspan: props.colspan as usize,
            },
        }
    }

    pub fn to_props(self) -> CellProps {
        match self {
            Slot::Anchor { rowspan, colspan } => CellProps::anchor(rowspan as u32, colspan as u32),
            Slot::Placeholder(span) => CellProps::placeholder(span),
        }
    }
}

/// A content-owning cell and the rectangle it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Anchor {
    pub point: CellPoint,
    pub rowspan: usize,
    pub colspan: usize,
}

impl Anchor {
    pub fn new(point: CellPoint, rowspan: usize, colspan: usize) -> Self {
        Self { point, rowspan, colspan }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.point.row, self.point.col, self.rowspan, self.colspan)
    }

    /// Larger than 1×1.
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }

    /// First line and extent along `axis`.
    pub fn extent(&self, axis: Axis) -> (usize, usize) {
        match axis {
            Axis::Row => (self.point.row, self.rowspan),
            Axis::Col => (self.point.col, self.colspan),
        }
    }

    pub fn with_extent(self, axis: Axis, start: usize, len: usize) -> Self {
        let point = self.point.with(axis, start);
        match axis {
            Axis::Row => Self::new(point, len, self.colspan),
            Axis::Col => Self::new(point, self.rowspan, len),
        }
    }
}

/// Row-major snapshot of every cell entry in one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    slots: Vec<Vec<Slot>>,
    cols: usize,
}

impl GridLayout {
    /// Snapshot the grid at `at`. Rows of unequal length are reported as
    /// corruption; span consistency is left to [`GridLayout::validate`].
    /// A grid without rows takes its column count from its column widths.
    pub fn read<H: HostTree + ?Sized>(host: &H, at: &[usize]) -> Result<Self> {
        let declared_cols = match host.get_node_at_path(at)? {
            Node::Grid(props) => props.cols_width.len(),
            _ => return Err(GridError::NotAGrid(at.to_vec())),
        };
        let mut slots = Vec::new();
        let mut path = at.to_vec();
        for r in 0..host.child_count(at)? {
            path.push(r);
            if !matches!(host.get_node_at_path(&path)?, Node::Row(_)) {
                return Err(GridError::NodeKindMismatch { path, expected: "row" });
            }
            let mut row = Vec::new();
            for c in 0..host.child_count(&path)? {
                path.push(c);
                match host.get_node_at_path(&path)? {
                    Node::Cell(props) => row.push(Slot::from_props(props)),
                    _ => return Err(GridError::NodeKindMismatch { path, expected: "cell" }),
                }
                path.pop();
            }
            slots.push(row);
            path.pop();
        }
        if slots.is_empty() {
            return Ok(Self { slots, cols: declared_cols });
        }
        Self::from_slots(slots)
    }

    /// Snapshot and check every span invariant.
    pub fn load<H: HostTree + ?Sized>(host: &H, at: &[usize]) -> Result<Self> {
        let layout = Self::read(host, at)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_slots(slots: Vec<Vec<Slot>>) -> Result<Self> {
        let cols = slots.first().map_or(0, Vec::len);
        if let Some((r, row)) = slots.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(GridError::corrupt(
                r,
                row.len().min(cols),
                format!("row has {} cells, expected {}", row.len(), cols),
            ));
        }
        Ok(Self { slots, cols })
    }

    /// Layout of a `rows × cols` grid in which `merged` are the only
    /// anchors larger than 1×1. Callers pass disjoint in-bounds rectangles.
    pub fn from_anchors(rows: usize, cols: usize, merged: &[Anchor]) -> Self {
        let mut slots = vec![vec![Slot::UNIT; cols]; rows];
        for anchor in merged {
            for p in anchor.rect().points() {
                let Some(slot) = slots.get_mut(p.row).and_then(|row| row.get_mut(p.col)) else {
                    continue;
                };
                *slot = if p == anchor.point {
                    Slot::Anchor { rowspan: anchor.rowspan, colspan: anchor.colspan }
                } else {
                    Slot::Placeholder(Span::new(p.row - anchor.point.row, p.col - anchor.point.col))
                };
            }
        }
        Self { slots, cols }
    }

    pub fn row_count(&self) -> usize {
        self.slots.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Number of lines along `axis`.
    pub fn count(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.row_count(),
            Axis::Col => self.col_count(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.row_count(), self.col_count())
    }

    pub fn slot(&self, p: CellPoint) -> Option<Slot> {
        self.slots.get(p.row).and_then(|row| row.get(p.col)).copied()
    }

    fn check_bounds(&self, p: CellPoint) -> Result<()> {
        if p.row >= self.row_count() {
            return Err(GridError::IndexOutOfRange {
                axis: Axis::Row,
                index: p.row,
                len: self.row_count(),
            });
        }
        if p.col >= self.col_count() {
            return Err(GridError::IndexOutOfRange {
                axis: Axis::Col,
                index: p.col,
                len: self.col_count(),
            });
        }
        Ok(())
    }

    /// The anchor owning `p`, following a placeholder's span one hop.
    pub fn resolve_anchor(&self, p: CellPoint) -> Result<Anchor> {
        self.check_bounds(p)?;
        let (anchor_point, slot) = match self.slot(p) {
            Some(Slot::Placeholder(span)) => {
                let target = match (p.row.checked_sub(span.row), p.col.checked_sub(span.col)) {
                    (Some(row), Some(col)) => CellPoint::new(row, col),
                    _ => return Err(GridError::corrupt(p.row, p.col, "span points before the grid")),
                };
                (target, self.slot(target))
            }
            slot => (p, slot),
        };
        match slot {
            Some(Slot::Anchor { rowspan, colspan }) => {
                let anchor = Anchor::new(anchor_point, rowspan, colspan);
                if rowspan == 0 || colspan == 0 {
                    return Err(GridError::corrupt(anchor_point.row, anchor_point.col, "zero span"));
                }
                if !anchor.rect().contains(p) {
                    return Err(GridError::corrupt(p.row, p.col, "anchor does not cover placeholder"));
                }
                Ok(anchor)
            }
            Some(Slot::Placeholder(_)) => {
                Err(GridError::corrupt(p.row, p.col, "span resolves to another placeholder"))
            }
            None => Err(GridError::corrupt(p.row, p.col, "span points outside the grid")),
        }
    }

    /// Distinct anchors intersecting `rect`, each with the position it was
    /// first met at in a row-major scan.
    pub fn cells_in_rect(&self, rect: &Rect) -> Result<Vec<(Anchor, CellPoint)>> {
        let mut seen = HashSet::new();
        let mut cells = Vec::new();
        for p in rect.points() {
            if self.slot(p).is_none() {
                continue;
            }
            let anchor = self.resolve_anchor(p)?;
            if seen.insert(anchor.point) {
                cells.push((anchor, p));
            }
        }
        Ok(cells)
    }

    /// Smallest rectangle containing `rect` that no anchor crosses.
    pub fn close_rect(&self, rect: &Rect) -> Result<Rect> {
        let mut closed = *rect;
        loop {
            let mut grown = closed;
            for (anchor, _) in self.cells_in_rect(&closed)? {
                grown = grown.union(&anchor.rect());
            }
            if grown == closed {
                return Ok(closed);
            }
            closed = grown;
        }
    }

    /// Every anchor larger than 1×1, in row-major order.
    pub fn merged_anchors(&self) -> Result<Vec<Anchor>> {
        Ok(self
            .cells_in_rect(&self.bounds())?
            .into_iter()
            .map(|(anchor, _)| anchor)
            .filter(Anchor::is_merged)
            .collect())
    }

    /// Check the coverage invariant: every placeholder resolves to an anchor
    /// that covers it, and every anchor's rectangle is in bounds and made of
    /// its own placeholders only.
    pub fn validate(&self) -> Result<()> {
        for p in self.bounds().points() {
            match self.slot(p) {
                Some(Slot::Anchor { rowspan, colspan }) => {
                    if rowspan == 0 || colspan == 0 {
                        return Err(GridError::corrupt(p.row, p.col, "zero span"));
                    }
                    let anchor = Anchor::new(p, rowspan, colspan);
                    if !self.bounds().contains_rect(&anchor.rect()) {
                        return Err(GridError::corrupt(p.row, p.col, "anchor extends past the grid"));
                    }
                    for q in anchor.rect().points().filter(|&q| q != p) {
                        if !matches!(self.slot(q), Some(Slot::Placeholder(_)))
                            || self.resolve_anchor(q)?.point != p
                        {
                            return Err(GridError::corrupt(q.row, q.col, "overlapping anchors"));
                        }
                    }
                }
                Some(Slot::Placeholder(_)) => {
                    self.resolve_anchor(p)?;
                }
                None => {}
            }
        }
        Ok(())
    }
}
