use pretty_assertions::assert_eq;
use rte_grid_core::grid::{self, Slot};
use rte_grid_core::ops;
use rte_grid_core::{
    Anchor, CellPoint, CellProps, Doc, GridLayout, GridProps, GridSelection, HostTree, MoveRange,
    MoveRequest, Node, NodeRecord, Point, RowProps, SelectionRange, Span,
};
use tracing_test::traced_test;

fn cell(text: &str) -> NodeRecord {
    NodeRecord::text_cell([text])
}

fn anchor(rowspan: u32, colspan: u32, text: &str) -> NodeRecord {
    NodeRecord::new(Node::Cell(CellProps::anchor(rowspan, colspan)), vec![NodeRecord::paragraph(text)])
}

fn ph(row: usize, col: usize) -> NodeRecord {
    NodeRecord::placeholder_cell(Span::new(row, col))
}

fn grid_doc(cols_width: Vec<u32>, rows: Vec<Vec<NodeRecord>>) -> Doc {
    let rows = rows.into_iter().map(|cells| NodeRecord::row(RowProps::default(), cells)).collect();
    Doc::from_records(vec![NodeRecord::grid(GridProps { cols_width }, rows)])
}

/// Cell contents, paragraphs joined with `|`.
fn texts(doc: &Doc) -> Vec<Vec<String>> {
    doc.record(&[0])
        .unwrap()
        .children
        .iter()
        .map(|row| {
            row.children
                .iter()
                .map(|cell| {
                    let parts: Vec<&str> = cell.children.iter().filter_map(|p| p.node.text()).collect();
                    parts.join("|")
                })
                .collect()
        })
        .collect()
}

fn widths(doc: &Doc) -> Vec<u32> {
    match doc.get_node_at_path(&[0]).unwrap() {
        Node::Grid(props) => props.cols_width.clone(),
        other => panic!("expected grid, got {other:?}"),
    }
}

fn layout(doc: &Doc) -> GridLayout {
    GridLayout::load(doc, &[0]).unwrap()
}

fn pt(row: usize, col: usize) -> CellPoint {
    CellPoint::new(row, col)
}

fn cursor(path: &[usize]) -> Option<SelectionRange> {
    Some(SelectionRange::collapsed(Point::new(path.to_vec(), 0)))
}

#[test]
fn insert_col_at_front_splices_width() {
    let mut doc = grid_doc(vec![35, 36, 37], vec![vec![cell("a"), cell("b"), cell("c")]]);
    ops::insert_col(&mut doc, &[0], 0, 40).unwrap();
    assert_eq!(widths(&doc), [40, 35, 36, 37]);
    assert_eq!(texts(&doc), [["", "a", "b", "c"]]);
    assert_eq!(doc.selection().cloned(), cursor(&[0, 0, 0, 0]));
}

#[test]
fn can_split_on_placeholder_but_not_unit_cell() {
    let doc = grid_doc(vec![], vec![vec![anchor(1, 2, "ab"), ph(0, 1), cell("c")]]);
    assert!(grid::can_split(&doc, &[0], &GridSelection::point((0, 1))).unwrap());
    assert!(!grid::can_split(&doc, &[0], &GridSelection::point((0, 2))).unwrap());
}

#[test]
fn merge_one_row_of_three() {
    let mut doc = grid_doc(vec![], vec![vec![cell("x"), cell("y"), cell("z")]]);
    let merged = ops::merge_cell(&mut doc, &[0], &GridSelection::new((0, 0), (0, 2))).unwrap();
    assert_eq!(merged, Some(Anchor::new(pt(0, 0), 1, 3)));

    let g = layout(&doc);
    assert_eq!(g.slot(pt(0, 0)), Some(Slot::Anchor { rowspan: 1, colspan: 3 }));
    assert_eq!(g.slot(pt(0, 1)), Some(Slot::Placeholder(Span::new(0, 1))));
    assert_eq!(g.slot(pt(0, 2)), Some(Slot::Placeholder(Span::new(0, 2))));
    assert_eq!(g.resolve_anchor(pt(0, 2)).unwrap().point, pt(0, 0));
    assert_eq!(texts(&doc), [["x|y|z", "", ""]]);

    let range = doc.selection().unwrap();
    assert_eq!(range.anchor, Point::new(vec![0, 0, 0, 0], 0));
    assert_eq!(range.focus, Point::new(vec![0, 0, 0, 2], 1));
}

#[test]
fn move_col_inside_merged_block_is_a_no_op() {
    let mut doc = grid_doc(vec![10, 20, 30], vec![vec![anchor(1, 2, "ab"), ph(0, 1), cell("c")]]);
    doc.select_range(SelectionRange::collapsed(Point::new(vec![0, 0, 2, 0], 0)));
    let before = doc.clone();
    assert_eq!(ops::move_col(&mut doc, &[0], MoveRequest::new(0, 1)).unwrap(), None);
    assert_eq!(doc, before);
    assert_eq!(widths(&doc), [10, 20, 30]);
}

#[test]
fn merge_grows_to_cover_crossed_cells() {
    let mut doc = grid_doc(
        vec![],
        vec![vec![anchor(2, 1, "m"), cell("b"), cell("c")], vec![ph(1, 0), cell("e"), cell("f")]],
    );
    let merged = ops::merge_cell(&mut doc, &[0], &GridSelection::new((0, 0), (0, 1))).unwrap();
    assert_eq!(merged, Some(Anchor::new(pt(0, 0), 2, 2)));
    assert_eq!(texts(&doc), [["m|b|e", "", "c"], ["", "", "f"]]);
    assert_eq!(layout(&doc).merged_anchors().unwrap(), [Anchor::new(pt(0, 0), 2, 2)]);
}

#[test]
fn merge_of_a_single_cell_changes_nothing() {
    let mut doc = grid_doc(vec![], vec![vec![anchor(1, 2, "ab"), ph(0, 1)]]);
    let before = doc.clone();
    assert_eq!(ops::merge_cell(&mut doc, &[0], &GridSelection::point((0, 1))).unwrap(), None);
    assert_eq!(doc, before);
}

#[test]
fn split_restores_unit_cells_and_keeps_content_in_anchor() {
    let mut doc = grid_doc(vec![], vec![vec![anchor(2, 2, "big"), ph(0, 1)], vec![ph(1, 0), ph(1, 1)]]);
    let split = ops::split_cell(&mut doc, &[0], &GridSelection::point((1, 1))).unwrap();
    assert_eq!(split, [Anchor::new(pt(0, 0), 2, 2)]);
    assert!(layout(&doc).merged_anchors().unwrap().is_empty());
    assert_eq!(texts(&doc), [["big", ""], ["", ""]]);
    let range = doc.selection().unwrap();
    assert_eq!(range.anchor, Point::new(vec![0, 0, 0, 0], 0));
    assert_eq!(range.focus, Point::new(vec![0, 1, 1, 0], 0));

    let after = doc.clone();
    assert!(ops::split_cell(&mut doc, &[0], &GridSelection::point((1, 1))).unwrap().is_empty());
    assert_eq!(doc, after);
}

#[test]
fn insert_row_through_a_span_extends_it() {
    let mut doc = grid_doc(vec![], vec![vec![anchor(2, 1, "m"), cell("b")], vec![ph(1, 0), cell("d")]]);
    ops::insert_row(&mut doc, &[0], 1, &RowProps::default(), Some(24)).unwrap();
    let g = layout(&doc);
    assert_eq!(g.merged_anchors().unwrap(), [Anchor::new(pt(0, 0), 3, 1)]);
    assert_eq!(g.slot(pt(1, 0)), Some(Slot::Placeholder(Span::new(1, 0))));
    assert_eq!(g.slot(pt(2, 0)), Some(Slot::Placeholder(Span::new(2, 0))));
    assert_eq!(texts(&doc), [["m", "b"], ["", ""], ["", "d"]]);
    assert_eq!(
        doc.get_node_at_path(&[0, 1]).unwrap(),
        &Node::Row(RowProps { height: Some(24), content_height: None })
    );
    // The new row's first cell belongs to the merged cell, so the cursor lands on it.
    assert_eq!(doc.selection().cloned(), cursor(&[0, 0, 0, 0]));
}

#[test]
fn insert_row_below_a_span_leaves_it_alone() {
    let mut doc = grid_doc(vec![], vec![vec![anchor(2, 1, "m"), cell("b")], vec![ph(1, 0), cell("d")]]);
    ops::insert_row(&mut doc, &[0], 2, &RowProps::default(), None).unwrap();
    assert_eq!(layout(&doc).merged_anchors().unwrap(), [Anchor::new(pt(0, 0), 2, 1)]);
    assert_eq!(doc.selection().cloned(), cursor(&[0, 2, 0, 0]));
}

#[test]
fn remove_row_through_anchor_moves_content_down() {
    let mut doc = grid_doc(
        vec![],
        vec![
            vec![anchor(3, 1, "top"), cell("b")],
            vec![ph(1, 0), cell("d")],
            vec![ph(2, 0), cell("f")],
        ],
    );
    ops::remove_row(&mut doc, &[0], 0).unwrap();
    let g = layout(&doc);
    assert_eq!(g.merged_anchors().unwrap(), [Anchor::new(pt(0, 0), 2, 1)]);
    assert_eq!(g.slot(pt(1, 0)), Some(Slot::Placeholder(Span::new(1, 0))));
    assert_eq!(texts(&doc), [["top", "d"], ["", "f"]]);
    assert_eq!(doc.selection().cloned(), cursor(&[0, 0, 0, 0]));
}

#[test]
fn remove_col_through_span_shrinks_it() {
    let mut doc = grid_doc(vec![1, 2, 3], vec![vec![anchor(1, 3, "x"), ph(0, 1), ph(0, 2)]]);
    ops::remove_col(&mut doc, &[0], 1).unwrap();
    let g = layout(&doc);
    assert_eq!(g.merged_anchors().unwrap(), [Anchor::new(pt(0, 0), 1, 2)]);
    assert_eq!(g.slot(pt(0, 1)), Some(Slot::Placeholder(Span::new(0, 1))));
    assert_eq!(widths(&doc), [1, 3]);
}

#[test]
fn removing_the_last_row_empties_the_grid() {
    let mut doc = grid_doc(vec![10, 20], vec![vec![cell("a"), cell("b")]]);
    doc.select_range(SelectionRange::collapsed(Point::new(vec![0, 0, 1, 0], 0)));
    ops::remove_row(&mut doc, &[0], 0).unwrap();
    assert_eq!(grid::row_count(&doc, &[0]).unwrap(), 0);
    assert_eq!(doc.selection(), None);

    ops::insert_row(&mut doc, &[0], 0, &RowProps::default(), None).unwrap();
    assert_eq!(texts(&doc), [["", ""]]);
}

#[test]
fn removing_the_last_col_empties_every_row() {
    let mut doc = grid_doc(vec![10], vec![vec![cell("a")], vec![cell("b")]]);
    ops::remove_col(&mut doc, &[0], 0).unwrap();
    assert_eq!(grid::col_count(&doc, &[0]).unwrap(), 0);
    assert_eq!(grid::row_count(&doc, &[0]).unwrap(), 2);
    assert!(widths(&doc).is_empty());
    assert_eq!(doc.selection(), None);
}

#[test]
fn move_row_carries_the_whole_merged_block() {
    let mut doc = grid_doc(
        vec![],
        vec![
            vec![cell("a"), cell("b")],
            vec![anchor(2, 1, "m"), cell("c")],
            vec![ph(1, 0), cell("d")],
        ],
    );
    let moved = ops::move_row(&mut doc, &[0], MoveRequest::new(2, 0)).unwrap();
    assert_eq!(moved, Some(MoveRange { start: 1, end: 2, to: 0, is_backward: true }));
    assert_eq!(texts(&doc), [["m", "c"], ["", "d"], ["a", "b"]]);
    assert_eq!(layout(&doc).merged_anchors().unwrap(), [Anchor::new(pt(0, 0), 2, 1)]);
    assert_eq!(doc.selection().cloned(), cursor(&[0, 0, 0, 0]));
}

#[test]
fn move_col_forward_reorders_widths() {
    let mut doc = grid_doc(vec![1, 2, 3], vec![vec![cell("a"), cell("b"), cell("c")]]);
    let moved = ops::move_col(&mut doc, &[0], MoveRequest::new(0, 3)).unwrap().unwrap();
    assert_eq!(moved.destination(), 2);
    assert_eq!(texts(&doc), [["b", "c", "a"]]);
    assert_eq!(widths(&doc), [2, 3, 1]);
    assert_eq!(doc.selection().cloned(), cursor(&[0, 0, 2, 0]));
}

#[test]
fn move_into_another_merged_block_is_rejected() {
    let mut doc = grid_doc(
        vec![],
        vec![vec![cell("a")], vec![anchor(2, 1, "m")], vec![ph(1, 0)]],
    );
    let before = doc.clone();
    assert_eq!(ops::move_row(&mut doc, &[0], MoveRequest::new(0, 2)).unwrap(), None);
    assert_eq!(doc, before);
}

#[test]
fn corrupt_grid_fails_before_any_edit() {
    let mut doc = grid_doc(vec![], vec![vec![cell("a"), ph(0, 2)]]);
    let before = doc.clone();
    let err = ops::insert_row(&mut doc, &[0], 0, &RowProps::default(), None).unwrap_err();
    assert!(err.is_corrupt());
    assert_eq!(doc, before);
    assert!(ops::merge_cell(&mut doc, &[0], &GridSelection::new((0, 0), (0, 1))).is_err());
    assert_eq!(doc, before);
}

#[test]
fn out_of_range_indices_are_rejected() {
    let mut doc = grid_doc(vec![], vec![vec![cell("a")]]);
    assert!(ops::remove_row(&mut doc, &[0], 1).is_err());
    assert!(ops::insert_col(&mut doc, &[0], 2, 10).is_err());
    assert!(ops::move_col(&mut doc, &[0], MoveRequest::new(0, 2)).is_err());
    assert_eq!(texts(&doc), [["a"]]);
}

#[traced_test]
#[test]
fn structural_edits_are_logged() {
    let mut doc = grid_doc(vec![], vec![vec![cell("x"), cell("y")]]);
    ops::merge_cell(&mut doc, &[0], &GridSelection::new((0, 0), (0, 1))).unwrap();
    assert!(logs_contain("cells merged"));
    ops::move_row(&mut doc, &[0], MoveRequest::new(0, 0)).unwrap();
    assert!(logs_contain("move is a no-op"));
}
