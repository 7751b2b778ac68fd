use annotkit_core::{EditorError, Point, Rect};
use annotkit_editor::{AnnotationEditor, MarkArrow, MarkRectangle, Modifiers, Shape, Tool};

fn editor_with_two() -> AnnotationEditor {
    let mut editor = AnnotationEditor::new(800, 600, None);
    editor.set_tool(Tool::Rectangle);
    editor.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
    editor.pointer_up(Point::new(50.0, 40.0));
    editor.set_tool(Tool::Arrow);
    editor.pointer_down(Point::new(100.0, 100.0), Modifiers::NONE);
    editor.pointer_up(Point::new(200.0, 150.0));
    editor
}

fn shapes(editor: &AnnotationEditor) -> Vec<Shape> {
    editor
        .document()
        .annotations()
        .map(|a| a.shape.clone())
        .collect()
}

#[test]
fn test_paste_offsets_and_selects_copies() {
    let mut editor = editor_with_two();
    let originals: Vec<_> = editor.document().annotations().map(|a| a.id).collect();
    editor.select_all();
    assert_eq!(editor.copy(), 2);
    let steps = editor.history().undo_count();

    let pasted = editor.paste().unwrap();

    assert_eq!(pasted.len(), 2);
    assert!(pasted.iter().all(|id| !originals.contains(id)));
    assert_eq!(editor.selection().ids(), pasted.as_slice());
    assert_eq!(editor.history().undo_count(), steps + 1);
    assert_eq!(editor.history().undo_label(), Some("Paste"));

    let all = shapes(&editor);
    assert_eq!(
        all[2],
        Shape::Rectangle(MarkRectangle::new(Rect::new(20.0, 20.0, 40.0, 30.0)))
    );
    assert_eq!(
        all[3],
        Shape::Arrow(MarkArrow::new(Point::new(110.0, 110.0), Point::new(210.0, 160.0)))
    );

    editor.undo().unwrap();
    assert_eq!(editor.document().annotation_count(), 2);
    assert!(editor.selection().is_empty());
}

#[test]
fn test_repeated_paste_cascades() {
    let mut editor = editor_with_two();
    editor.select_all();
    editor.copy();
    editor.paste().unwrap();
    let second = editor.paste().unwrap();

    let shape = &editor.document().annotation(second[0]).unwrap().shape;
    assert_eq!(
        *shape,
        Shape::Rectangle(MarkRectangle::new(Rect::new(30.0, 30.0, 40.0, 30.0)))
    );
    assert_eq!(editor.document().annotation_count(), 6);
}

#[test]
fn test_clipboard_is_a_snapshot() {
    let mut editor = editor_with_two();
    let first = editor.document().annotations().next().unwrap().id;
    editor.select(first);
    editor.copy();
    editor.delete_selected().unwrap();

    let pasted = editor.paste().unwrap();
    assert_eq!(pasted.len(), 1);
    assert_eq!(
        editor.document().annotation(pasted[0]).unwrap().shape,
        Shape::Rectangle(MarkRectangle::new(Rect::new(20.0, 20.0, 40.0, 30.0)))
    );
}

#[test]
fn test_cut_removes_then_paste_restores_offset() {
    let mut editor = editor_with_two();
    editor.select_all();
    assert_eq!(editor.cut().unwrap(), 2);
    assert_eq!(editor.document().annotation_count(), 0);
    assert_eq!(editor.session().clipboard().len(), 2);

    editor.paste().unwrap();
    assert_eq!(editor.document().annotation_count(), 2);
    assert_eq!(editor.selection().len(), 2);
}

#[test]
fn test_paste_with_empty_clipboard_does_nothing() {
    let mut editor = editor_with_two();
    let steps = editor.history().undo_count();
    assert!(editor.paste().unwrap().is_empty());
    assert_eq!(editor.history().undo_count(), steps);
}

#[test]
fn test_failed_cut_leaves_clipboard_alone() {
    let mut editor = editor_with_two();
    let first = editor.document().annotations().next().unwrap().id;
    editor.select(first);
    editor.copy();
    editor.paste().unwrap();

    editor.select_all();
    let layer = editor.document().default_layer_id();
    editor.set_layer_locked(layer, true).unwrap();

    assert_eq!(editor.cut(), Err(EditorError::LockedLayer { layer }));
    assert_eq!(editor.document().annotation_count(), 3);
    assert_eq!(editor.selection().len(), 3);
    assert_eq!(editor.session().clipboard().len(), 1);

    editor.set_layer_locked(layer, false).unwrap();
    let pasted = editor.paste().unwrap();
    assert_eq!(
        editor.document().annotation(pasted[0]).unwrap().shape,
        Shape::Rectangle(MarkRectangle::new(Rect::new(30.0, 30.0, 40.0, 30.0)))
    );
}
