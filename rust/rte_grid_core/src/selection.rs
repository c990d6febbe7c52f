//! Host cursor/selection model: two `(path, offset)` points.

use serde::{Deserialize, Serialize};

use crate::host::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SelectionRange {
    pub anchor: Point,
    pub focus: Point,
}

impl SelectionRange {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self { anchor: point.clone(), focus: point }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}
