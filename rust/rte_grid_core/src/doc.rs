//! Document tree structures and helpers.
//!
//! The live document is an arena of slots addressed by [`NodeId`]; paths are
//! resolved by walking child lists from the root. On the wire the same tree
//! is a plain nesting of [`NodeRecord`]s.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::selection::SelectionRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Document,
    Paragraph {
        #[serde(default)]
        text: String,
    },
    Heading {
        level: u8,
        #[serde(default)]
        text: String,
    },
    Grid(GridProps),
    Row(RowProps),
    Cell(CellProps),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Document => "document",
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::Grid(_) => "grid",
            Node::Row(_) => "row",
            Node::Cell(_) => "cell",
        }
    }

    /// Text carried by a text block, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Paragraph { text } | Node::Heading { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GridProps {
    /// Optional per-column widths in pixels. Empty means auto layout.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cols_width: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RowProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellProps {
    #[serde(default = "one")]
    pub rowspan: u32,
    #[serde(default = "one")]
    pub colspan: u32,
    /// Set on placeholder cells only: backward offset to the anchor cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

fn one() -> u32 {
    1
}

impl Default for CellProps {
    fn default() -> Self {
        Self { rowspan: 1, colspan: 1, span: None }
    }
}

impl CellProps {
    pub fn anchor(rowspan: u32, colspan: u32) -> Self {
        Self { rowspan, colspan, span: None }
    }

    pub fn placeholder(span: Span) -> Self {
        Self { rowspan: 1, colspan: 1, span: Some(span) }
    }

    pub fn is_placeholder(&self) -> bool {
        self.span.is_some()
    }
}

/// Offset from a placeholder back to its anchor: `anchor = position - span`.
///
/// Serialised as `[dRow, dCol]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Span {
    pub row: usize,
    pub col: usize,
}

impl Span {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<[usize; 2]> for Span {
    fn from([row, col]: [usize; 2]) -> Self {
        Span { row, col }
    }
}

impl From<Span> for [usize; 2] {
    fn from(span: Span) -> Self {
        [span.row, span.col]
    }
}

/// A node together with its subtree, as stored in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(flatten)]
    pub node: Node,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn new(node: Node, children: Vec<NodeRecord>) -> Self {
        Self { node, children }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(Node::Paragraph { text: text.into() }, Vec::new())
    }

    /// A 1×1 anchor cell holding one empty paragraph.
    pub fn unit_cell() -> Self {
        Self::new(Node::Cell(CellProps::default()), vec![Self::paragraph("")])
    }

    /// An anchor cell holding one paragraph per entry of `texts`.
    pub fn text_cell<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        let children: Vec<_> = texts.into_iter().map(Self::paragraph).collect();
        Self::new(Node::Cell(CellProps::default()), children)
    }

    pub fn placeholder_cell(span: Span) -> Self {
        Self::new(Node::Cell(CellProps::placeholder(span)), vec![Self::paragraph("")])
    }

    pub fn row(props: RowProps, cells: Vec<NodeRecord>) -> Self {
        Self::new(Node::Row(props), cells)
    }

    pub fn grid(props: GridProps, rows: Vec<NodeRecord>) -> Self {
        Self::new(Node::Grid(props), rows)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    node: Node,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Doc {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    root: NodeId,
    pub(crate) selection: Option<SelectionRange>,
}

impl Default for Doc {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
struct DocRecord {
    #[serde(default)]
    children: Vec<NodeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selection: Option<SelectionRange>,
}

impl Doc {
    pub fn new() -> Self {
        let root = Slot { node: Node::Document, children: Vec::new() };
        Self { slots: vec![Some(root)], free: Vec::new(), root: NodeId(0), selection: None }
    }

    /// Build a document whose top-level blocks are `blocks`.
    pub fn from_records(blocks: Vec<NodeRecord>) -> Self {
        let mut doc = Self::new();
        let ids: Vec<NodeId> = blocks.into_iter().map(|b| doc.alloc(b)).collect();
        if let Some(root) = doc.slot_mut(doc.root) {
            root.children = ids;
        }
        doc
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let record: DocRecord = serde_json::from_str(json)?;
        let mut doc = Self::from_records(record.children);
        doc.selection = record.selection;
        Ok(doc)
    }

    pub fn to_json(&self) -> String {
        let record = DocRecord { children: self.blocks(), selection: self.selection.clone() };
        serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string())
    }

    /// Top-level blocks as records.
    pub fn blocks(&self) -> Vec<NodeRecord> {
        self.children_of(self.root).iter().filter_map(|&id| self.record_of(id)).collect()
    }

    /// Snapshot of the subtree at `path`.
    pub fn record(&self, path: &[usize]) -> Result<NodeRecord> {
        let id = self.resolve(path)?;
        self.record_of(id).ok_or_else(|| GridError::PathNotFound(path.to_vec()))
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children_of(self.root).is_empty()
    }

    pub(crate) fn resolve(&self, path: &[usize]) -> Result<NodeId> {
        let mut id = self.root;
        for &index in path {
            id = *self
                .children_of(id)
                .get(index)
                .ok_or_else(|| GridError::PathNotFound(path.to_vec()))?;
        }
        Ok(id)
    }

    pub(crate) fn node_of(&self, id: NodeId) -> Option<&Node> {
        self.slot(id).map(|s| &s.node)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slot_mut(id).map(|s| &mut s.node)
    }

    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn children_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        self.slot_mut(id).map(|s| &mut s.children)
    }

    pub(crate) fn alloc(&mut self, record: NodeRecord) -> NodeId {
        let children = record.children.into_iter().map(|c| self.alloc(c)).collect();
        let slot = Slot { node: record.node, children };
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(slot));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Release `id` and everything below it.
    pub(crate) fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        self.free.push(id.0);
        for child in slot.children {
            self.release(child);
        }
    }

    fn record_of(&self, id: NodeId) -> Option<NodeRecord> {
        let slot = self.slot(id)?;
        let children = slot.children.iter().filter_map(|&c| self.record_of(c)).collect();
        Some(NodeRecord { node: slot.node.clone(), children })
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }
}
