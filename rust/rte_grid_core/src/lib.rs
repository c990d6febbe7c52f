pub mod config;
pub mod doc;
pub mod error;
pub mod grid;
pub mod history;
pub mod host;
pub mod ops;
pub mod selection;

pub use config::GridConfig;
pub use doc::{CellProps, Doc, GridProps, Node, NodeRecord, RowProps, Span};
pub use error::{GridError, Result};
pub use grid::{Anchor, Axis, CellPoint, GridLayout, GridSelection, MoveRange, MoveRequest, Rect, Selected};
pub use history::History;
pub use host::{HostTree, Path};
pub use selection::{Point, SelectionRange};

/// Document, history and configuration behind the editor bindings.
///
/// Grid operations take any path inside the target grid. Each mutating call
/// is atomic: on error the document is restored to its state before the call
/// and nothing is recorded in history.
#[derive(Debug, Default)]
pub struct EditorCore {
    pub doc: Doc,
    pub history: History,
    pub config: GridConfig,
}

impl EditorCore {
    pub fn new_empty() -> Self {
        Self::with_config(GridConfig::default())
    }

    pub fn with_config(config: GridConfig) -> Self {
        Self { doc: Doc::default(), history: History::with_limit(config.history_limit), config }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let doc = Doc::from_json(json)?;
        Ok(Self { doc, ..Self::new_empty() })
    }

    pub fn to_json(&self) -> String {
        self.doc.to_json()
    }

    /// The grid enclosing `path`.
    pub fn grid_at(&self, path: &[usize]) -> Result<Path> {
        grid::find_grid(&self.doc, path).ok_or_else(|| GridError::NotAGrid(path.to_vec()))
    }

    /// The grid holding the selection anchor, if any.
    pub fn current_grid(&self) -> Option<Path> {
        let range = self.doc.selection()?;
        grid::find_grid(&self.doc, &range.anchor.path)
    }

    /// The current selection as cells of the grid it lies in.
    pub fn current_selection(&self) -> Option<(Path, GridSelection)> {
        let at = self.current_grid()?;
        let selection = grid::grid_selection(&self.doc, &at)?;
        Some((at, selection))
    }

    fn transact<T>(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut Doc, &GridConfig) -> Result<T>,
    ) -> Result<T> {
        let before = self.doc.clone();
        match op(&mut self.doc, &self.config) {
            Ok(value) => {
                if self.config.track_history && self.doc != before {
                    self.history.record(before);
                }
                Ok(value)
            }
            Err(err) => {
                if err.is_corrupt() {
                    tracing::error!(target: "rte_grid.editor", op = name, error = %err, "corrupt grid, edit rolled back");
                } else {
                    tracing::warn!(target: "rte_grid.editor", op = name, error = %err, "edit rejected");
                }
                self.doc = before;
                Err(err)
            }
        }
    }

    /// Insert a `rows × cols` grid at top-level block `index`.
    pub fn insert_grid(&mut self, index: usize, rows: usize, cols: usize) -> Result<Path> {
        self.transact("insert_grid", |doc, config| ops::insert_grid(doc, &[index], rows, cols, config))
    }

    /// Insert a row before `index`, styled like the row it is inserted next to.
    pub fn insert_row(&mut self, path: &[usize], index: usize) -> Result<()> {
        let at = self.grid_at(path)?;
        self.transact("insert_row", |doc, config| {
            let template = row_template(doc, &at, index)?;
            ops::insert_row(doc, &at, index, &template, config.default_row_height)
        })
    }

    /// Insert a column before `index`; `width` falls back to the configured
    /// default.
    pub fn insert_col(&mut self, path: &[usize], index: usize, width: Option<u32>) -> Result<()> {
        let at = self.grid_at(path)?;
        self.transact("insert_col", |doc, config| {
            ops::insert_col(doc, &at, index, width.unwrap_or(config.default_col_width))
        })
    }

    pub fn remove_row(&mut self, path: &[usize], index: usize) -> Result<()> {
        let at = self.grid_at(path)?;
        self.transact("remove_row", |doc, _| ops::remove_row(doc, &at, index))
    }

    pub fn remove_col(&mut self, path: &[usize], index: usize) -> Result<()> {
        let at = self.grid_at(path)?;
        self.transact("remove_col", |doc, _| ops::remove_col(doc, &at, index))
    }

    pub fn move_row(&mut self, path: &[usize], line: usize, to: usize) -> Result<Option<MoveRange>> {
        let at = self.grid_at(path)?;
        self.transact("move_row", |doc, _| ops::move_row(doc, &at, MoveRequest::new(line, to)))
    }

    pub fn move_col(&mut self, path: &[usize], line: usize, to: usize) -> Result<Option<MoveRange>> {
        let at = self.grid_at(path)?;
        self.transact("move_col", |doc, _| ops::move_col(doc, &at, MoveRequest::new(line, to)))
    }

    /// Merge the cells under the current selection. Returns whether anything
    /// changed.
    pub fn merge_cell(&mut self) -> Result<bool> {
        let Some((at, selection)) = self.current_selection() else {
            return Ok(false);
        };
        self.transact("merge_cell", |doc, _| ops::merge_cell(doc, &at, &selection))
            .map(|merged| merged.is_some())
    }

    /// Split the merged cells under the current selection. Returns whether
    /// anything changed.
    pub fn split_cell(&mut self) -> Result<bool> {
        let Some((at, selection)) = self.current_selection() else {
            return Ok(false);
        };
        self.transact("split_cell", |doc, _| ops::split_cell(doc, &at, &selection))
            .map(|split| !split.is_empty())
    }

    pub fn selected(&self) -> Result<Selected> {
        match self.current_selection() {
            Some((at, selection)) => grid::get_selected(&self.doc, &at, Some(&selection)),
            None => Ok(Selected::default()),
        }
    }

    pub fn can_merge(&self) -> Result<bool> {
        match self.current_selection() {
            Some((at, selection)) => grid::can_merge(&self.doc, &at, &selection),
            None => Ok(false),
        }
    }

    pub fn can_split(&self) -> Result<bool> {
        match self.current_selection() {
            Some((at, selection)) => grid::can_split(&self.doc, &at, &selection),
            None => Ok(false),
        }
    }

    /// Select from the start of cell `start` to the end of cell `end` in the
    /// grid enclosing `path`. Selection changes are not recorded in history.
    pub fn select_cells(&mut self, path: &[usize], start: CellPoint, end: CellPoint) -> Result<()> {
        let at = self.grid_at(path)?;
        let layout = GridLayout::load(&self.doc, &at)?;
        layout.resolve_anchor(start)?;
        layout.resolve_anchor(end)?;
        grid::select_cells(&mut self.doc, &at, start, end)
    }

    /// Replace the content of the cell owning `p` with one paragraph.
    pub fn set_cell_text(&mut self, path: &[usize], p: CellPoint, text: &str) -> Result<()> {
        let at = self.grid_at(path)?;
        self.transact("set_cell_text", |doc, _| {
            let anchor = GridLayout::load(doc, &at)?.resolve_anchor(p)?;
            let mut cell = at.clone();
            cell.extend([anchor.point.row, anchor.point.col]);
            let mut first = cell.clone();
            first.push(0);
            for _ in 0..doc.child_count(&cell)? {
                doc.remove_nodes(&first)?;
            }
            doc.insert_nodes(&first, vec![NodeRecord::paragraph(text)])
        })
    }

    // History
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.doc)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.doc)
    }
}

/// Properties for a row inserted at `index`: those of the row it displaces,
/// or of the last row when appending.
fn row_template(doc: &Doc, at: &[usize], index: usize) -> Result<RowProps> {
    let rows = doc.child_count(at)?;
    if rows == 0 {
        return Ok(RowProps::default());
    }
    let mut path = at.to_vec();
    path.push(index.min(rows - 1));
    match doc.get_node_at_path(&path)? {
        Node::Row(props) => Ok(RowProps { height: props.height, content_height: None }),
        _ => Ok(RowProps::default()),
    }
}
