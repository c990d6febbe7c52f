//! What a grid selection covers, and whether it can be merged or split.

use serde::Serialize;

use super::layout::{Anchor, GridLayout};
use super::point::{Axis, GridSelection};
use crate::error::Result;

/// Facts about the cells a selection touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selected {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub cells: Vec<Anchor>,
    /// The selection covers whole rows (every column).
    pub row_full: bool,
    /// The selection covers whole columns (every row).
    pub col_full: bool,
    pub all_full: bool,
    pub count: usize,
}

/// Compute [`Selected`] for `selection`, or the empty result when there is
/// no grid selection.
///
/// The rectangle is first closed over the anchors it touches, so a
/// partially selected merged cell contributes all of its rows and columns.
pub fn get_selected(layout: &GridLayout, selection: Option<&GridSelection>) -> Result<Selected> {
    let Some(selection) = selection else {
        return Ok(Selected::default());
    };
    let rect = selection.rect().intersection_with(&layout.bounds());
    if rect.is_empty() {
        return Ok(Selected::default());
    }
    let rect = layout.close_rect(&rect)?;
    let cells: Vec<Anchor> = layout.cells_in_rect(&rect)?.into_iter().map(|(a, _)| a).collect();
    let row_full = rect.col == 0 && rect.end_col() == layout.col_count();
    let col_full = rect.row == 0 && rect.end_row() == layout.row_count();
    Ok(Selected {
        rows: rect.lines(Axis::Row).collect(),
        cols: rect.lines(Axis::Col).collect(),
        count: cells.len(),
        cells,
        row_full,
        col_full,
        all_full: row_full && col_full,
    })
}

/// More than one distinct anchor lies under the selection's bounding box.
pub fn can_merge(layout: &GridLayout, selection: &GridSelection) -> Result<bool> {
    Ok(get_selected(layout, Some(selection))?.count > 1)
}

/// Some anchor touched by the selection spans more than one position.
pub fn can_split(layout: &GridLayout, selection: &GridSelection) -> Result<bool> {
    let rect = selection.rect().intersection_with(&layout.bounds());
    Ok(layout
        .cells_in_rect(&rect)?
        .iter()
        .any(|(anchor, _)| anchor.is_merged()))
}
