use wasm_bindgen::prelude::*;
use rte_grid_core::{CellPoint, EditorCore, GridConfig, GridError};

fn js_err(err: GridError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct Editor {
    core: EditorCore,
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        Editor { core: EditorCore::new_empty() }
    }

    pub fn new_empty() -> Editor { Self::new() }

    pub fn with_config(config_json: String) -> Result<Editor, JsValue> {
        let config = GridConfig::from_json(&config_json).map_err(js_err)?;
        Ok(Editor { core: EditorCore::with_config(config) })
    }

    pub fn from_json(json: String) -> Editor {
        let core = EditorCore::from_json(&json).unwrap_or_else(|_| EditorCore::new_empty());
        Editor { core }
    }

    pub fn to_json(&self) -> String { self.core.to_json() }

    // Grid ops; `grid_idx` is the grid's top-level block index
    pub fn insert_grid(&mut self, at: u32, rows: u32, cols: u32) -> Result<(), JsValue> {
        self.core.insert_grid(at as usize, rows as usize, cols as usize).map(|_| ()).map_err(js_err)
    }
    pub fn insert_row_at(&mut self, grid_idx: u32, at: u32) -> Result<(), JsValue> {
        self.core.insert_row(&[grid_idx as usize], at as usize).map_err(js_err)
    }
    pub fn insert_col_at(&mut self, grid_idx: u32, at: u32, width: Option<u32>) -> Result<(), JsValue> {
        self.core.insert_col(&[grid_idx as usize], at as usize, width).map_err(js_err)
    }
    pub fn remove_row_at(&mut self, grid_idx: u32, at: u32) -> Result<(), JsValue> {
        self.core.remove_row(&[grid_idx as usize], at as usize).map_err(js_err)
    }
    pub fn remove_col_at(&mut self, grid_idx: u32, at: u32) -> Result<(), JsValue> {
        self.core.remove_col(&[grid_idx as usize], at as usize).map_err(js_err)
    }
    /// Returns false when the move was rejected.
    pub fn move_row_at(&mut self, grid_idx: u32, line: u32, to: u32) -> Result<bool, JsValue> {
        self.core.move_row(&[grid_idx as usize], line as usize, to as usize).map(|r| r.is_some()).map_err(js_err)
    }
    pub fn move_col_at(&mut self, grid_idx: u32, line: u32, to: u32) -> Result<bool, JsValue> {
        self.core.move_col(&[grid_idx as usize], line as usize, to as usize).map(|r| r.is_some()).map_err(js_err)
    }
    pub fn set_cell_text_at(&mut self, grid_idx: u32, r: u32, c: u32, text: String) -> Result<(), JsValue> {
        self.core.set_cell_text(&[grid_idx as usize], CellPoint::new(r as usize, c as usize), &text).map_err(js_err)
    }

    // Selection-driven ops
    pub fn select_cells(&mut self, grid_idx: u32, sr: u32, sc: u32, er: u32, ec: u32) -> Result<(), JsValue> {
        let start = CellPoint::new(sr as usize, sc as usize);
        let end = CellPoint::new(er as usize, ec as usize);
        self.core.select_cells(&[grid_idx as usize], start, end).map_err(js_err)
    }
    pub fn merge_cell(&mut self) -> Result<bool, JsValue> { self.core.merge_cell().map_err(js_err) }
    pub fn split_cell(&mut self) -> Result<bool, JsValue> { self.core.split_cell().map_err(js_err) }
    pub fn can_merge(&self) -> bool { self.core.can_merge().unwrap_or(false) }
    pub fn can_split(&self) -> bool { self.core.can_split().unwrap_or(false) }
    /// JSON description of the cells under the selection.
    pub fn selected(&self) -> Result<String, JsValue> {
        let selected = self.core.selected().map_err(js_err)?;
        serde_json::to_string(&selected).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // History
    pub fn undo(&mut self) -> bool { self.core.undo() }
    pub fn redo(&mut self) -> bool { self.core.redo() }
}

impl Default for Editor {
    fn default() -> Self { Self::new() }
}
