//! Structural grid edits: insert, remove and move whole rows or columns,
//! merge and split cells.
//!
//! Every operation follows the same shape:
//! 1. snapshot and validate the grid (any `CorruptGrid` or index error is
//!    raised here, before the tree is touched);
//! 2. compute the target layout from the merged anchors;
//! 3. apply the node-level change through the host primitives;
//! 4. rewrite cell properties wherever they differ from the target;
//! 5. place the cursor.
//!
//! Spans are relative offsets, so a placeholder only needs rewriting when the
//! distance to its anchor changes. Moves of whole blocks never change it.

use crate::config::GridConfig;
use crate::doc::{GridProps, Node, NodeRecord, RowProps};
use crate::error::{GridError, Result};
use crate::grid::range::get_range_of_move;
use crate::grid::{
    cell_path, row_path, select_cell, select_cells, Anchor, Axis, CellPoint, GridLayout,
    GridSelection, MoveRange, MoveRequest, Slot,
};
use crate::host::{HostTree, Path};

/// Insert a `rows × cols` grid of empty unit cells at `at` and put the cursor
/// in its first cell.
pub fn insert_grid<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    rows: usize,
    cols: usize,
    config: &GridConfig,
) -> Result<Path> {
    let row = || {
        let props = RowProps { height: config.default_row_height, content_height: None };
        NodeRecord::row(props, (0..cols).map(|_| NodeRecord::unit_cell()).collect())
    };
    let props = GridProps { cols_width: vec![config.default_col_width; cols] };
    let grid = NodeRecord::grid(props, (0..rows).map(|_| row()).collect());
    host.insert_nodes(at, vec![grid])?;
    tracing::debug!(target: "rte_grid.ops", ?at, rows, cols, "grid inserted");
    if rows > 0 && cols > 0 {
        select_cell(host, at, CellPoint::new(0, 0))?;
    }
    Ok(at.to_vec())
}

/// Insert a row of unit cells before row `index` (`index == row_count`
/// appends). Merged cells crossing the new row grow to include it.
pub fn insert_row<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    index: usize,
    template: &RowProps,
    default_height: Option<u32>,
) -> Result<()> {
    let _span = tracing::debug_span!("grid.insert_row", index).entered();
    let layout = GridLayout::load(host, at)?;
    let (rows, cols) = (layout.row_count(), layout.col_count());
    check_insert_index(Axis::Row, index, rows)?;

    let merged = grown_for_insert(&layout.merged_anchors()?, Axis::Row, index);
    let target = GridLayout::from_anchors(rows + 1, cols, &merged);

    let mut props = template.clone();
    if props.height.is_none() {
        props.height = default_height;
    }
    let cells = (0..cols).map(|_| NodeRecord::unit_cell()).collect();
    host.insert_nodes(&row_path(at, index), vec![NodeRecord::row(props, cells)])?;
    sync_cells(host, at, &target)?;

    tracing::debug!(target: "rte_grid.ops", index, rows = rows + 1, cols, "row inserted");
    finish(host, at, &target, Axis::Row, index)
}

/// Insert a column of unit cells before column `index`, with `width`
/// spliced into the grid's column widths.
pub fn insert_col<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    index: usize,
    width: u32,
) -> Result<()> {
    let _span = tracing::debug_span!("grid.insert_col", index, width).entered();
    let layout = GridLayout::load(host, at)?;
    let (rows, cols) = (layout.row_count(), layout.col_count());
    check_insert_index(Axis::Col, index, cols)?;

    let merged = grown_for_insert(&layout.merged_anchors()?, Axis::Col, index);
    let target = GridLayout::from_anchors(rows, cols + 1, &merged);

    for r in 0..rows {
        host.insert_nodes(&cell_path(at, CellPoint::new(r, index)), vec![NodeRecord::unit_cell()])?;
    }
    let mut props = grid_props(host, at)?;
    if !props.cols_width.is_empty() || cols == 0 {
        let i = index.min(props.cols_width.len());
        props.cols_width.insert(i, width);
        host.set_node_properties(at, Node::Grid(props))?;
    }
    sync_cells(host, at, &target)?;

    tracing::debug!(target: "rte_grid.ops", index, rows, cols = cols + 1, "column inserted");
    finish(host, at, &target, Axis::Col, index)
}

/// Remove row `index`. Merged cells crossing it shrink; a merged cell whose
/// first row is removed moves down one row, taking its content along.
pub fn remove_row<H: HostTree + ?Sized>(host: &mut H, at: &[usize], index: usize) -> Result<()> {
    let _span = tracing::debug_span!("grid.remove_row", index).entered();
    let layout = GridLayout::load(host, at)?;
    let (rows, cols) = (layout.row_count(), layout.col_count());
    check_index(Axis::Row, index, rows)?;

    let merged = layout.merged_anchors()?;
    let target = GridLayout::from_anchors(rows - 1, cols, &shrunk_for_remove(&merged, Axis::Row, index));

    rehome_anchors(host, at, &merged, Axis::Row, index)?;
    host.remove_nodes(&row_path(at, index))?;
    sync_cells(host, at, &target)?;

    tracing::debug!(target: "rte_grid.ops", index, rows = rows - 1, cols, "row removed");
    finish(host, at, &target, Axis::Row, index.min(rows.saturating_sub(2)))
}

/// Column mirror of [`remove_row`]; also drops the column's width.
pub fn remove_col<H: HostTree + ?Sized>(host: &mut H, at: &[usize], index: usize) -> Result<()> {
    let _span = tracing::debug_span!("grid.remove_col", index).entered();
    let layout = GridLayout::load(host, at)?;
    let (rows, cols) = (layout.row_count(), layout.col_count());
    check_index(Axis::Col, index, cols)?;

    let merged = layout.merged_anchors()?;
    let target = GridLayout::from_anchors(rows, cols - 1, &shrunk_for_remove(&merged, Axis::Col, index));

    rehome_anchors(host, at, &merged, Axis::Col, index)?;
    for r in 0..rows {
        host.remove_nodes(&cell_path(at, CellPoint::new(r, index)))?;
    }
    let mut props = grid_props(host, at)?;
    if index < props.cols_width.len() {
        props.cols_width.remove(index);
        host.set_node_properties(at, Node::Grid(props))?;
    }
    sync_cells(host, at, &target)?;

    tracing::debug!(target: "rte_grid.ops", index, rows, cols = cols - 1, "column removed");
    finish(host, at, &target, Axis::Col, index.min(cols.saturating_sub(2)))
}

/// Move the block of rows around `request.line` to gap `request.to`.
/// Returns the range that was moved, or `None` when the planner rejects the
/// move; a rejected move leaves the grid and the cursor untouched.
pub fn move_row<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    request: MoveRequest,
) -> Result<Option<MoveRange>> {
    move_lines(host, at, Axis::Row, request)
}

/// Column mirror of [`move_row`]; column widths travel with their columns.
pub fn move_col<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    request: MoveRequest,
) -> Result<Option<MoveRange>> {
    move_lines(host, at, Axis::Col, request)
}

fn move_lines<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    axis: Axis,
    request: MoveRequest,
) -> Result<Option<MoveRange>> {
    let _span = tracing::debug_span!("grid.move", %axis, line = request.line, to = request.to).entered();
    let layout = GridLayout::load(host, at)?;
    let Some(range) = get_range_of_move(&layout, axis, request)? else {
        tracing::debug!(target: "rte_grid.ops", %axis, line = request.line, to = request.to, "move rejected");
        return Ok(None);
    };

    let merged: Vec<Anchor> = layout
        .merged_anchors()?
        .into_iter()
        .map(|a| {
            let (start, len) = a.extent(axis);
            a.with_extent(axis, range.map_index(start), len)
        })
        .collect();
    let target = GridLayout::from_anchors(layout.row_count(), layout.col_count(), &merged);

    let across = layout.count(axis.cross());
    for i in 0..range.len() {
        let (from, to) = if range.is_backward {
            (range.start + i, range.to + i)
        } else {
            (range.start, range.to - 1)
        };
        match axis {
            Axis::Row => host.move_nodes(&row_path(at, from), &row_path(at, to))?,
            Axis::Col => {
                for r in 0..across {
                    host.move_nodes(
                        &cell_path(at, CellPoint::new(r, from)),
                        &cell_path(at, CellPoint::new(r, to)),
                    )?;
                }
            }
        }
    }
    if axis == Axis::Col {
        let mut props = grid_props(host, at)?;
        if props.cols_width.len() == layout.col_count() {
            let mut widths = props.cols_width.clone();
            for (i, w) in props.cols_width.iter().enumerate() {
                widths[range.map_index(i)] = *w;
            }
            props.cols_width = widths;
            host.set_node_properties(at, Node::Grid(props))?;
        }
    }
    sync_cells(host, at, &target)?;

    tracing::debug!(
        target: "rte_grid.ops",
        %axis,
        start = range.start,
        end = range.end,
        to = range.to,
        backward = range.is_backward,
        "lines moved"
    );
    finish(host, at, &target, axis, range.destination())?;
    Ok(Some(range))
}

/// Merge every cell under the selection's bounding box into its top-left
/// cell. The box is first grown to whole merged cells. Content is appended
/// in row-major order of each anchor's top-left position.
///
/// Returns the new anchor, or `None` (no change) when fewer than two cells
/// are covered.
pub fn merge_cell<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    selection: &GridSelection,
) -> Result<Option<Anchor>> {
    let _span = tracing::debug_span!("grid.merge_cell").entered();
    let layout = GridLayout::load(host, at)?;
    let rect = selection.rect().intersection_with(&layout.bounds());
    if rect.is_empty() {
        return Ok(None);
    }
    let rect = layout.close_rect(&rect)?;
    let mut cells: Vec<Anchor> = layout.cells_in_rect(&rect)?.into_iter().map(|(a, _)| a).collect();
    if cells.len() < 2 {
        tracing::debug!(target: "rte_grid.ops", count = cells.len(), "nothing to merge");
        return Ok(None);
    }
    cells.sort_by_key(|a| a.point);

    let merged = Anchor::new(rect.start(), rect.rows, rect.cols);
    if cells.first().map(|a| a.point) != Some(merged.point) {
        return Err(GridError::corrupt(rect.row, rect.col, "merge box does not start at an anchor"));
    }
    let mut anchors: Vec<Anchor> = layout
        .merged_anchors()?
        .into_iter()
        .filter(|a| !rect.contains_rect(&a.rect()))
        .collect();
    anchors.push(merged);
    let target = GridLayout::from_anchors(layout.row_count(), layout.col_count(), &anchors);

    let into = cell_path(at, merged.point);
    for absorbed in &cells[1..] {
        move_children(host, &cell_path(at, absorbed.point), &into, false)?;
    }
    sync_cells(host, at, &target)?;

    tracing::debug!(
        target: "rte_grid.ops",
        row = merged.point.row,
        col = merged.point.col,
        rowspan = merged.rowspan,
        colspan = merged.colspan,
        absorbed = cells.len() - 1,
        "cells merged"
    );
    debug_check(host, at);
    select_cells(host, at, merged.point, merged.point)?;
    Ok(Some(merged))
}

/// Split every merged cell the selection touches back into unit cells. The
/// anchor keeps its content; the other positions become empty cells.
///
/// Returns the anchors that were split; empty when nothing changed.
pub fn split_cell<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    selection: &GridSelection,
) -> Result<Vec<Anchor>> {
    let _span = tracing::debug_span!("grid.split_cell").entered();
    let layout = GridLayout::load(host, at)?;
    let rect = selection.rect().intersection_with(&layout.bounds());
    let split: Vec<Anchor> = layout
        .cells_in_rect(&rect)?
        .into_iter()
        .map(|(a, _)| a)
        .filter(Anchor::is_merged)
        .collect();
    let (Some(first), Some(last)) = (split.first(), split.last()) else {
        tracing::debug!(target: "rte_grid.ops", "nothing to split");
        return Ok(Vec::new());
    };

    let anchors: Vec<Anchor> = layout
        .merged_anchors()?
        .into_iter()
        .filter(|a| !split.contains(a))
        .collect();
    let target = GridLayout::from_anchors(layout.row_count(), layout.col_count(), &anchors);
    sync_cells(host, at, &target)?;

    tracing::debug!(target: "rte_grid.ops", count = split.len(), "cells split");
    debug_check(host, at);
    select_cells(host, at, first.point, last.rect().last())?;
    Ok(split)
}

fn check_insert_index(axis: Axis, index: usize, count: usize) -> Result<()> {
    if index > count {
        return Err(GridError::IndexOutOfRange { axis, index, len: count });
    }
    Ok(())
}

fn check_index(axis: Axis, index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(GridError::IndexOutOfRange { axis, index, len: count });
    }
    Ok(())
}

fn grid_props<H: HostTree + ?Sized>(host: &H, at: &[usize]) -> Result<GridProps> {
    match host.get_node_at_path(at)? {
        Node::Grid(props) => Ok(props.clone()),
        _ => Err(GridError::NotAGrid(at.to_vec())),
    }
}

/// Merged anchors after inserting a line before `index`.
fn grown_for_insert(merged: &[Anchor], axis: Axis, index: usize) -> Vec<Anchor> {
    merged
        .iter()
        .map(|a| {
            let (start, len) = a.extent(axis);
            if start >= index {
                a.with_extent(axis, start + 1, len)
            } else if index < start + len {
                a.with_extent(axis, start, len + 1)
            } else {
                *a
            }
        })
        .collect()
}

/// Merged anchors after removing line `index`. Anchors that lived only on
/// that line disappear with it.
fn shrunk_for_remove(merged: &[Anchor], axis: Axis, index: usize) -> Vec<Anchor> {
    merged
        .iter()
        .filter_map(|a| {
            let (start, len) = a.extent(axis);
            if start + len <= index {
                Some(*a)
            } else if start > index {
                Some(a.with_extent(axis, start - 1, len))
            } else if len > 1 {
                Some(a.with_extent(axis, start, len - 1))
            } else {
                None
            }
        })
        .collect()
}

/// Before line `index` goes away, hand the content of every merged anchor
/// that starts on it to the placeholder on the next line, which becomes the
/// anchor once the line is removed.
fn rehome_anchors<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    merged: &[Anchor],
    axis: Axis,
    index: usize,
) -> Result<()> {
    for anchor in merged {
        let (start, len) = anchor.extent(axis);
        if start != index || len < 2 {
            continue;
        }
        let heir = anchor.point.with(axis, index + 1);
        tracing::trace!(
            target: "rte_grid.ops",
            from_row = anchor.point.row,
            from_col = anchor.point.col,
            to_row = heir.row,
            to_col = heir.col,
            "re-homing anchor"
        );
        move_children(host, &cell_path(at, anchor.point), &cell_path(at, heir), true)?;
    }
    Ok(())
}

fn child(path: &[usize], index: usize) -> Path {
    let mut p = path.to_vec();
    p.push(index);
    p
}

/// Move all children of `from` to the end of `to`, optionally dropping what
/// `to` held first.
fn move_children<H: HostTree + ?Sized>(
    host: &mut H,
    from: &[usize],
    to: &[usize],
    replace: bool,
) -> Result<()> {
    if replace {
        for _ in 0..host.child_count(to)? {
            host.remove_nodes(&child(to, 0))?;
        }
    }
    let mut next = host.child_count(to)?;
    for _ in 0..host.child_count(from)? {
        host.move_nodes(&child(from, 0), &child(to, next))?;
        next += 1;
    }
    Ok(())
}

/// Rewrite cell properties that differ from `target`, and give every cell
/// left without children an empty paragraph.
fn sync_cells<H: HostTree + ?Sized>(host: &mut H, at: &[usize], target: &GridLayout) -> Result<()> {
    let mut rewritten = 0usize;
    for p in target.bounds().points() {
        let path = cell_path(at, p);
        let want = target.slot(p).unwrap_or(Slot::UNIT).to_props();
        let current = match host.get_node_at_path(&path)? {
            Node::Cell(props) => props,
            _ => return Err(GridError::NodeKindMismatch { path, expected: "cell" }),
        };
        if *current != want {
            host.set_node_properties(&path, Node::Cell(want))?;
            rewritten += 1;
        }
        if host.child_count(&path)? == 0 {
            host.insert_nodes(&child(&path, 0), vec![NodeRecord::paragraph("")])?;
        }
    }
    tracing::trace!(target: "rte_grid.ops", rewritten, "cell properties synced");
    Ok(())
}

/// Post-edit invariant check, active in debug builds.
fn debug_check<H: HostTree + ?Sized>(host: &H, at: &[usize]) {
    if cfg!(debug_assertions) {
        if let Err(err) = GridLayout::load(host, at) {
            panic!("grid at {at:?} broken by a structural edit: {err}");
        }
    }
}

/// Check the result and put the cursor at the start of `line`, or clear it
/// when the grid has no cells left.
fn finish<H: HostTree + ?Sized>(
    host: &mut H,
    at: &[usize],
    target: &GridLayout,
    axis: Axis,
    line: usize,
) -> Result<()> {
    debug_check(host, at);
    if target.row_count() == 0 || target.col_count() == 0 {
        host.deselect();
        return Ok(());
    }
    let anchor = target.resolve_anchor(CellPoint::on(axis, line, 0))?;
    select_cell(host, at, anchor.point)
}
