//! The host-tree contract the grid core edits through, and its
//! implementation for [`Doc`].
//!
//! Paths are child-index sequences from the document root; `[]` is the root.
//! The grid core never holds node handles across calls: every operation
//! receives the tree, reads what it needs by path and edits it with the
//! primitives below.

use crate::doc::{Doc, Node, NodeRecord};
use crate::error::{GridError, Result};
use crate::selection::SelectionRange;

pub type Path = Vec<usize>;

pub trait HostTree {
    fn get_node_at_path(&self, path: &[usize]) -> Result<&Node>;

    fn child_count(&self, path: &[usize]) -> Result<usize>;

    /// Insert `nodes` as consecutive siblings starting at `at`.
    fn insert_nodes(&mut self, at: &[usize], nodes: Vec<NodeRecord>) -> Result<()>;

    /// Remove the node at `at` together with its subtree.
    fn remove_nodes(&mut self, at: &[usize]) -> Result<()>;

    /// Detach the node at `from` and re-attach it so that it ends up at `to`.
    /// `to` is read against the tree after the detach.
    fn move_nodes(&mut self, from: &[usize], to: &[usize]) -> Result<()>;

    /// Replace the properties of the node at `at`. Children are untouched and
    /// the node kind must not change.
    fn set_node_properties(&mut self, at: &[usize], props: Node) -> Result<()>;

    fn selection(&self) -> Option<&SelectionRange>;

    fn select_range(&mut self, range: SelectionRange);

    fn deselect(&mut self);
}

fn split_parent(path: &[usize]) -> Result<(&[usize], usize)> {
    match path.split_last() {
        Some((&index, parent)) => Ok((parent, index)),
        None => Err(GridError::PathNotFound(path.to_vec())),
    }
}

impl HostTree for Doc {
    fn get_node_at_path(&self, path: &[usize]) -> Result<&Node> {
        let id = self.resolve(path)?;
        self.node_of(id).ok_or_else(|| GridError::PathNotFound(path.to_vec()))
    }

    fn child_count(&self, path: &[usize]) -> Result<usize> {
        let id = self.resolve(path)?;
        Ok(self.children_of(id).len())
    }

    fn insert_nodes(&mut self, at: &[usize], nodes: Vec<NodeRecord>) -> Result<()> {
        let (parent, index) = split_parent(at)?;
        let parent_id = self.resolve(parent)?;
        if index > self.children_of(parent_id).len() {
            return Err(GridError::PathNotFound(at.to_vec()));
        }
        let ids: Vec<_> = nodes.into_iter().map(|n| self.alloc(n)).collect();
        let children = self
            .children_mut(parent_id)
            .ok_or_else(|| GridError::PathNotFound(parent.to_vec()))?;
        children.splice(index..index, ids);
        Ok(())
    }

    fn remove_nodes(&mut self, at: &[usize]) -> Result<()> {
        let (parent, index) = split_parent(at)?;
        let parent_id = self.resolve(parent)?;
        let children = self
            .children_mut(parent_id)
            .ok_or_else(|| GridError::PathNotFound(parent.to_vec()))?;
        if index >= children.len() {
            return Err(GridError::PathNotFound(at.to_vec()));
        }
        let id = children.remove(index);
        self.release(id);
        Ok(())
    }

    fn move_nodes(&mut self, from: &[usize], to: &[usize]) -> Result<()> {
        if to.len() > from.len() && to.starts_with(from) {
            return Err(GridError::PathNotFound(to.to_vec()));
        }
        let (from_parent, from_index) = split_parent(from)?;
        let (to_parent, to_index) = split_parent(to)?;
        let id = self.resolve(from)?;
        let from_parent_id = self.resolve(from_parent)?;
        if let Some(children) = self.children_mut(from_parent_id) {
            children.remove(from_index);
        }

        let placed = self.resolve(to_parent).and_then(|parent_id| {
            let children = self
                .children_mut(parent_id)
                .ok_or_else(|| GridError::PathNotFound(to.to_vec()))?;
            if to_index > children.len() {
                return Err(GridError::PathNotFound(to.to_vec()));
            }
            children.insert(to_index, id);
            Ok(())
        });
        if placed.is_err() {
            // Put the node back where it was.
            if let Some(children) = self.children_mut(from_parent_id) {
                children.insert(from_index, id);
            }
        }
        placed
    }

    fn set_node_properties(&mut self, at: &[usize], props: Node) -> Result<()> {
        let id = self.resolve(at)?;
        let node = self.node_mut(id).ok_or_else(|| GridError::PathNotFound(at.to_vec()))?;
        if std::mem::discriminant(node) != std::mem::discriminant(&props) {
            return Err(GridError::NodeKindMismatch { path: at.to_vec(), expected: node.kind() });
        }
        *node = props;
        Ok(())
    }

    fn selection(&self) -> Option<&SelectionRange> {
        self.selection.as_ref()
    }

    fn select_range(&mut self, range: SelectionRange) {
        self.selection = Some(range);
    }

    fn deselect(&mut self) {
        self.selection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{CellProps, GridProps, RowProps};
    use pretty_assertions::assert_eq;

    fn texts(doc: &Doc) -> Vec<String> {
        doc.blocks()
            .iter()
            .map(|b| b.node.text().unwrap_or_default().to_string())
            .collect()
    }

    fn doc_abc() -> Doc {
        Doc::from_records(vec![
            NodeRecord::paragraph("a"),
            NodeRecord::paragraph("b"),
            NodeRecord::paragraph("c"),
        ])
    }

    #[test]
    fn insert_and_remove() {
        let mut doc = doc_abc();
        doc.insert_nodes(&[1], vec![NodeRecord::paragraph("x"), NodeRecord::paragraph("y")])
            .unwrap();
        assert_eq!(texts(&doc), ["a", "x", "y", "b", "c"]);
        doc.remove_nodes(&[0]).unwrap();
        assert_eq!(texts(&doc), ["x", "y", "b", "c"]);
        assert!(doc.remove_nodes(&[9]).is_err());
        assert!(doc.insert_nodes(&[9], vec![]).is_err());
    }

    #[test]
    fn move_forward_and_backward_use_final_paths() {
        let mut doc = doc_abc();
        doc.move_nodes(&[0], &[2]).unwrap();
        assert_eq!(texts(&doc), ["b", "c", "a"]);
        doc.move_nodes(&[2], &[0]).unwrap();
        assert_eq!(texts(&doc), ["a", "b", "c"]);
        assert!(doc.move_nodes(&[0], &[3]).is_err());
        assert_eq!(texts(&doc), ["a", "b", "c"]);
    }

    #[test]
    fn move_between_parents() {
        let cell = |t: &str| NodeRecord::text_cell([t]);
        let row = NodeRecord::row(RowProps::default(), vec![cell("l"), cell("r")]);
        let mut doc = Doc::from_records(vec![NodeRecord::grid(GridProps::default(), vec![row])]);
        doc.move_nodes(&[0, 0, 1, 0], &[0, 0, 0, 1]).unwrap();
        assert_eq!(doc.child_count(&[0, 0, 0]).unwrap(), 2);
        assert_eq!(doc.child_count(&[0, 0, 1]).unwrap(), 0);
        let moved = doc.get_node_at_path(&[0, 0, 0, 1]).unwrap();
        assert_eq!(moved.text(), Some("r"));
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let mut doc = Doc::from_records(vec![NodeRecord::unit_cell()]);
        assert!(doc.move_nodes(&[0], &[0, 0]).is_err());
    }

    #[test]
    fn set_props_keeps_kind() {
        let mut doc = Doc::from_records(vec![NodeRecord::unit_cell()]);
        doc.set_node_properties(&[0], Node::Cell(CellProps::anchor(2, 1))).unwrap();
        assert_eq!(doc.get_node_at_path(&[0]).unwrap(), &Node::Cell(CellProps::anchor(2, 1)));
        let err = doc
            .set_node_properties(&[0], Node::Paragraph { text: String::new() })
            .unwrap_err();
        assert!(matches!(err, GridError::NodeKindMismatch { .. }));
    }
}
