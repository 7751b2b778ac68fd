use annotkit_core::{EditorError, Rect, Style};
use annotkit_editor::{
    AnnotationDraft, CommandHistory, Document, DocumentCommand, MarkRectangle, Shape,
};

fn rect_draft(x: f64, y: f64) -> AnnotationDraft {
    AnnotationDraft::new(
        Shape::Rectangle(MarkRectangle::new(Rect::new(x, y, 20.0, 20.0))),
        Style::default(),
    )
}

fn setup() -> (Document, CommandHistory) {
    (Document::new(800, 600), CommandHistory::new())
}

#[test]
fn test_delete_last_layer_fails() {
    let (mut doc, mut history) = setup();
    let err = history
        .execute(DocumentCommand::delete_layer(doc.default_layer_id()), &mut doc)
        .unwrap_err();
    assert_eq!(err, EditorError::LastLayer);
    assert_eq!(doc.layer_count(), 1);
}

#[test]
fn test_default_layer_is_not_deletable() {
    let (mut doc, mut history) = setup();
    history
        .execute(DocumentCommand::create_layer("Notes"), &mut doc)
        .unwrap();
    let default = doc.default_layer_id();
    let err = history
        .execute(DocumentCommand::delete_layer(default), &mut doc)
        .unwrap_err();
    assert!(matches!(err, EditorError::DefaultLayer { layer } if layer == default));
    assert_eq!(doc.layer_count(), 2);
}

#[test]
fn test_add_to_locked_layer_fails() {
    let (mut doc, mut history) = setup();
    let layer = doc.default_layer_id();
    history
        .execute(DocumentCommand::add_annotation(layer, rect_draft(0.0, 0.0)), &mut doc)
        .unwrap();
    history
        .execute(DocumentCommand::set_layer_locked(layer, true), &mut doc)
        .unwrap();

    let err = history
        .execute(DocumentCommand::add_annotation(layer, rect_draft(50.0, 50.0)), &mut doc)
        .unwrap_err();
    assert!(err.is_locked());
    assert_eq!(doc.layer(layer).map(|l| l.annotation_count()), Some(1));
}

#[test]
fn test_locked_layer_refuses_edits_and_removal() {
    let (mut doc, mut history) = setup();
    let layer = doc.default_layer_id();
    let id = history
        .execute(DocumentCommand::add_annotation(layer, rect_draft(0.0, 0.0)), &mut doc)
        .unwrap()
        .created_ids()[0];
    history
        .execute(DocumentCommand::set_layer_locked(layer, true), &mut doc)
        .unwrap();

    let err = history
        .execute(DocumentCommand::remove_annotation(id), &mut doc)
        .unwrap_err();
    assert!(err.is_locked());
    let moved = DocumentCommand::move_annotations(&doc, &[id], annotkit_core::Vector::new(5.0, 5.0))
        .unwrap();
    assert!(history.execute(moved, &mut doc).is_err());
    assert!(doc.contains(id));
}

#[test]
fn test_delete_layer_takes_annotations_and_undo_restores_them() {
    let (mut doc, mut history) = setup();
    let notes = history
        .execute(DocumentCommand::create_layer("Notes"), &mut doc)
        .unwrap()
        .created_layer()
        .unwrap();
    let a = history
        .execute(DocumentCommand::add_annotation(notes, rect_draft(0.0, 0.0)), &mut doc)
        .unwrap()
        .created_ids()[0];
    let b = history
        .execute(DocumentCommand::add_annotation(notes, rect_draft(30.0, 0.0)), &mut doc)
        .unwrap()
        .created_ids()[0];

    history
        .execute(DocumentCommand::delete_layer(notes), &mut doc)
        .unwrap();
    assert!(doc.layer(notes).is_none());
    assert_eq!(doc.annotation_count(), 0);

    history.undo(&mut doc).unwrap();
    assert_eq!(doc.layer(notes).map(|l| l.annotation_ids().to_vec()), Some(vec![a, b]));
    assert_eq!(doc.layer(notes).map(|l| l.order), Some(1));
}

#[test]
fn test_reorder_renumbers_densely() {
    let (mut doc, mut history) = setup();
    let default = doc.default_layer_id();
    for name in ["B", "C", "D"] {
        history
            .execute(DocumentCommand::create_layer(name), &mut doc)
            .unwrap();
    }
    history
        .execute(DocumentCommand::reorder_layer(default, 2), &mut doc)
        .unwrap();

    let orders: Vec<_> = doc.layers().iter().map(|l| l.order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
    assert_eq!(doc.layer(default).map(|l| l.order), Some(2));

    history.undo(&mut doc).unwrap();
    assert_eq!(doc.layer(default).map(|l| l.order), Some(0));
}

#[test]
fn test_rename_layer_round_trip() {
    let (mut doc, mut history) = setup();
    let layer = doc.default_layer_id();
    history
        .execute(DocumentCommand::rename_layer(layer, "Review"), &mut doc)
        .unwrap();
    assert_eq!(doc.layer(layer).map(|l| l.name.as_str()), Some("Review"));
    history.undo(&mut doc).unwrap();
    assert_eq!(doc.layer(layer).map(|l| l.name.as_str()), Some("Default"));
}

#[test]
fn test_move_to_locked_layer_fails() {
    let (mut doc, mut history) = setup();
    let default = doc.default_layer_id();
    let id = history
        .execute(DocumentCommand::add_annotation(default, rect_draft(0.0, 0.0)), &mut doc)
        .unwrap()
        .created_ids()[0];
    let locked = history
        .execute(DocumentCommand::create_layer("Locked"), &mut doc)
        .unwrap()
        .created_layer()
        .unwrap();
    history
        .execute(DocumentCommand::set_layer_locked(locked, true), &mut doc)
        .unwrap();

    let err = history
        .execute(DocumentCommand::move_to_layer(id, locked), &mut doc)
        .unwrap_err();
    assert!(err.is_locked());
    assert_eq!(doc.layer_of(id).map(|l| l.id), Some(default));
}

#[test]
fn test_layer_ids_are_never_reused() {
    let (mut doc, mut history) = setup();
    let first = history
        .execute(DocumentCommand::create_layer("Temp"), &mut doc)
        .unwrap()
        .created_layer()
        .unwrap();
    history.undo(&mut doc).unwrap();
    let second = history
        .execute(DocumentCommand::create_layer("Temp"), &mut doc)
        .unwrap()
        .created_layer()
        .unwrap();
    assert_ne!(first, second);
}
