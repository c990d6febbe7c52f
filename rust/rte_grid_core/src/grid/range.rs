//! Legal source/destination ranges for row and column moves.
//!
//! Destinations are gap indices in pre-move numbering: `to = k` means
//! "insert before line `k`", `to = count` means "append".

use serde::{Deserialize, Serialize};

use super::layout::GridLayout;
use super::point::{Axis, CellPoint, Rect};
use crate::error::{GridError, Result};

/// A row/column move as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Line the user grabbed.
    pub line: usize,
    /// Destination gap.
    pub to: usize,
}

impl MoveRequest {
    pub fn new(line: usize, to: usize) -> Self {
        Self { line, to }
    }
}

/// A span-safe move: lines `start..=end` go to gap `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRange {
    pub start: usize,
    pub end: usize,
    pub to: usize,
    pub is_backward: bool,
}

impl MoveRange {
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// First index the moved block occupies after the move.
    pub fn destination(&self) -> usize {
        if self.is_backward {
            self.to
        } else {
            self.to - self.len()
        }
    }

    /// Post-move index of pre-move line `i`.
    pub fn map_index(&self, i: usize) -> usize {
        let n = self.len();
        if (self.start..=self.end).contains(&i) {
            self.destination() + (i - self.start)
        } else if self.is_backward && (self.to..self.start).contains(&i) {
            i + n
        } else if !self.is_backward && (self.end + 1..self.to).contains(&i) {
            i - n
        } else {
            i
        }
    }
}

/// Expand `request.line` to the smallest block of lines no anchor crosses
/// and check that `request.to` can receive it.
///
/// Returns `None` when the move is illegal or would change nothing: `to`
/// inside or at either edge of the block, or inside another merged block.
pub fn get_range_of_move(
    layout: &GridLayout,
    axis: Axis,
    request: MoveRequest,
) -> Result<Option<MoveRange>> {
    let count = layout.count(axis);
    if request.line >= count {
        return Err(GridError::IndexOutOfRange { axis, index: request.line, len: count });
    }
    if request.to > count {
        return Err(GridError::IndexOutOfRange { axis, index: request.to, len: count + 1 });
    }

    let across = layout.count(axis.cross());
    let band = |start: usize, len: usize| match axis {
        Axis::Row => Rect::new(start, 0, len, across),
        Axis::Col => Rect::new(0, start, across, len),
    };
    let block = layout.close_rect(&band(request.line, 1))?;
    let lines = block.lines(axis);
    let (start, end) = (lines.start, lines.end - 1);

    if (start..=end + 1).contains(&request.to) {
        tracing::trace!(target: "rte_grid.range", %axis, start, end, to = request.to, "move is a no-op");
        return Ok(None);
    }
    if request.to < count {
        for k in 0..across {
            let anchor = layout.resolve_anchor(CellPoint::on(axis, request.to, k))?;
            if anchor.point.along(axis) < request.to {
                tracing::trace!(
                    target: "rte_grid.range",
                    %axis,
                    to = request.to,
                    anchor_row = anchor.point.row,
                    anchor_col = anchor.point.col,
                    "destination splits a merged cell"
                );
                return Ok(None);
            }
        }
    }

    Ok(Some(MoveRange { start, end, to: request.to, is_backward: request.to < start }))
}

pub fn get_range_of_move_row(layout: &GridLayout, request: MoveRequest) -> Result<Option<MoveRange>> {
    get_range_of_move(layout, Axis::Row, request)
}

pub fn get_range_of_move_col(layout: &GridLayout, request: MoveRequest) -> Result<Option<MoveRange>> {
    get_range_of_move(layout, Axis::Col, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layout::tests::layout;
    use pretty_assertions::assert_eq;

    fn rows4() -> GridLayout {
        // rows 1..=2 share a vertically merged cell
        layout(&["a a", "A2x1 a", "p1.0 a", "a a"])
    }

    #[test]
    fn plain_row_moves() {
        let g = layout(&["a", "a", "a"]);
        let r = get_range_of_move_row(&g, MoveRequest::new(2, 0)).unwrap().unwrap();
        assert_eq!(r, MoveRange { start: 2, end: 2, to: 0, is_backward: true });
        let r = get_range_of_move_row(&g, MoveRequest::new(0, 3)).unwrap().unwrap();
        assert_eq!(r, MoveRange { start: 0, end: 0, to: 3, is_backward: false });
        assert_eq!(r.destination(), 2);
    }

    #[test]
    fn adjacent_destinations_are_no_ops() {
        let g = layout(&["a", "a", "a"]);
        assert_eq!(get_range_of_move_row(&g, MoveRequest::new(1, 1)).unwrap(), None);
        assert_eq!(get_range_of_move_row(&g, MoveRequest::new(1, 2)).unwrap(), None);
    }

    #[test]
    fn grabbing_a_merged_row_moves_the_whole_block() {
        let g = rows4();
        let r = get_range_of_move_row(&g, MoveRequest::new(2, 0)).unwrap().unwrap();
        assert_eq!((r.start, r.end, r.len()), (1, 2, 2));
        assert!(r.is_backward);
        let r = get_range_of_move_row(&g, MoveRequest::new(1, 4)).unwrap().unwrap();
        assert_eq!((r.start, r.end, r.destination()), (1, 2, 2));
    }

    #[test]
    fn destination_inside_own_block_is_rejected() {
        let g = rows4();
        assert_eq!(get_range_of_move_row(&g, MoveRequest::new(1, 2)).unwrap(), None);
        assert_eq!(get_range_of_move_row(&g, MoveRequest::new(2, 3)).unwrap(), None);
    }

    #[test]
    fn destination_inside_other_block_is_rejected() {
        let g = rows4();
        assert_eq!(get_range_of_move_row(&g, MoveRequest::new(0, 2)).unwrap(), None);
        assert_eq!(get_range_of_move_row(&g, MoveRequest::new(3, 2)).unwrap(), None);
        assert!(get_range_of_move_row(&g, MoveRequest::new(3, 1)).unwrap().is_some());
    }

    #[test]
    fn merged_columns_move_together() {
        let g = layout(&["A1x2 p0.1 a"]);
        assert_eq!(get_range_of_move_col(&g, MoveRequest::new(0, 1)).unwrap(), None);
        let r = get_range_of_move_col(&g, MoveRequest::new(1, 3)).unwrap().unwrap();
        assert_eq!((r.start, r.end, r.to, r.is_backward), (0, 1, 3, false));
    }

    #[test]
    fn out_of_range_requests_error() {
        let g = layout(&["a a"]);
        assert!(matches!(
            get_range_of_move_row(&g, MoveRequest::new(1, 0)),
            Err(GridError::IndexOutOfRange { axis: Axis::Row, .. })
        ));
        assert!(get_range_of_move_col(&g, MoveRequest::new(0, 3)).is_err());
    }

    #[test]
    fn map_index_matches_a_block_move() {
        let r = MoveRange { start: 1, end: 2, to: 5, is_backward: false };
        let mapped: Vec<_> = (0..5).map(|i| r.map_index(i)).collect();
        assert_eq!(mapped, [0, 3, 4, 1, 2]);
        let r = MoveRange { start: 3, end: 4, to: 0, is_backward: true };
        let mapped: Vec<_> = (0..5).map(|i| r.map_index(i)).collect();
        assert_eq!(mapped, [2, 3, 4, 0, 1]);
    }
}
