//! Grid (table) model: coordinates, span resolution, selection analysis and
//! move planning.
//!
//! The functions in this module work against any [`HostTree`]: they take the
//! path of a grid node, snapshot it into a [`GridLayout`] and answer from
//! that snapshot. The pure layout-level versions live in the submodules.

pub mod layout;
pub mod point;
pub mod range;
pub mod select;

pub use layout::{Anchor, GridLayout, Slot};
pub use point::{edges, equal, to_point, Axis, CellPoint, GridSelection, Rect};
pub use range::{MoveRange, MoveRequest};
pub use select::Selected;

use crate::doc::Node;
use crate::error::Result;
use crate::host::{HostTree, Path};
use crate::selection::{Point, SelectionRange};

/// Nearest grid enclosing `path`, `path` itself included.
pub fn find_grid<H: HostTree + ?Sized>(host: &H, path: &[usize]) -> Option<Path> {
    (0..=path.len())
        .rev()
        .map(|len| &path[..len])
        .find(|prefix| matches!(host.get_node_at_path(prefix), Ok(Node::Grid(_))))
        .map(<[usize]>::to_vec)
}

/// The host selection expressed in cells of the grid at `at`, when both of
/// its ends lie inside that grid.
pub fn grid_selection<H: HostTree + ?Sized>(host: &H, at: &[usize]) -> Option<GridSelection> {
    let range = host.selection()?;
    let cell = |p: &Point| -> Option<CellPoint> {
        if !p.path.starts_with(at) {
            return None;
        }
        p.path.get(..at.len() + 2).and_then(|cell_path| to_point(cell_path).ok())
    };
    Some(GridSelection { start: cell(&range.anchor)?, end: cell(&range.focus)? })
}

pub fn row_count<H: HostTree + ?Sized>(host: &H, at: &[usize]) -> Result<usize> {
    Ok(GridLayout::read(host, at)?.row_count())
}

pub fn col_count<H: HostTree + ?Sized>(host: &H, at: &[usize]) -> Result<usize> {
    Ok(GridLayout::read(host, at)?.col_count())
}

pub fn resolve_anchor<H: HostTree + ?Sized>(host: &H, at: &[usize], p: CellPoint) -> Result<Anchor> {
    GridLayout::read(host, at)?.resolve_anchor(p)
}

pub fn cells_in_rect<H: HostTree + ?Sized>(
    host: &H,
    at: &[usize],
    rect: &Rect,
) -> Result<Vec<(Anchor, CellPoint)>> {
    GridLayout::read(host, at)?.cells_in_rect(rect)
}

pub fn get_selected<H: HostTree + ?Sized>(
    host: &H,
    at: &[usize],
    selection: Option<&GridSelection>,
) -> Result<Selected> {
    select::get_selected(&GridLayout::read(host, at)?, selection)
}

pub fn can_merge<H: HostTree + ?Sized>(host: &H, at: &[usize], selection: &GridSelection) -> Result<bool> {
    select::can_merge(&GridLayout::read(host, at)?, selection)
}

pub fn can_split<H: HostTree + ?Sized>(host: &H, at: &[usize], selection: &GridSelection) -> Result<bool> {
    select::can_split(&GridLayout::read(host, at)?, selection)
}

pub fn get_range_of_move_row<H: HostTree + ?Sized>(
    host: &H,
    at: &[usize],
    request: MoveRequest,
) -> Result<Option<MoveRange>> {
    range::get_range_of_move_row(&GridLayout::read(host, at)?, request)
}

pub fn get_range_of_move_col<H: HostTree + ?Sized>(
    host: &H,
    at: &[usize],
    request: MoveRequest,
) -> Result<Option<MoveRange>> {
    range::get_range_of_move_col(&GridLayout::read(host, at)?, request)
}

pub(crate) fn row_path(at: &[usize], row: usize) -> Path {
    let mut path = at.to_vec();
    path.push(row);
    path
}

pub(crate) fn cell_path(at: &[usize], p: CellPoint) -> Path {
    let mut path = at.to_vec();
    path.extend([p.row, p.col]);
    path
}

/// Start of the first block inside the cell at `p`.
pub(crate) fn cell_start<H: HostTree + ?Sized>(host: &H, at: &[usize], p: CellPoint) -> Result<Point> {
    let mut path = cell_path(at, p);
    if host.child_count(&path)? > 0 {
        path.push(0);
    }
    Ok(Point::new(path, 0))
}

/// End of the last block inside the cell at `p`.
pub(crate) fn cell_end<H: HostTree + ?Sized>(host: &H, at: &[usize], p: CellPoint) -> Result<Point> {
    let mut path = cell_path(at, p);
    let children = host.child_count(&path)?;
    if children == 0 {
        return Ok(Point::new(path, 0));
    }
    path.push(children - 1);
    let offset = host.get_node_at_path(&path)?.text().map_or(0, |t| t.chars().count());
    Ok(Point::new(path, offset))
}

/// Select from the start of the cell at `from` to the end of the cell at `to`.
pub(crate) fn select_cells<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    from: CellPoint,
    to: CellPoint,
) -> Result<()> {
    let range = SelectionRange::new(cell_start(host, at, from)?, cell_end(host, at, to)?);
    host.select_range(range);
    Ok(())
}

/// Collapse the cursor at the start of the cell at `p`.
pub(crate) fn select_cell<H: HostTree + ?Sized>(host: &mut H, at: &[usize], p: CellPoint) -> Result<()> {
    let point = cell_start(host, at, p)?;
    host.select_range(SelectionRange::collapsed(point));
    Ok(())
}
