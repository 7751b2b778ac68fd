use annotkit_core::{Point, Rect, Style, Vector};
use annotkit_editor::{
    Annotation, AnnotationDraft, AnnotationPatch, CommandHistory, Document, DocumentCommand,
    Layer, MarkRectangle, Shape,
};
use proptest::prelude::*;

fn rect_draft(x: f64, y: f64, w: f64, h: f64) -> AnnotationDraft {
    AnnotationDraft::new(
        Shape::Rectangle(MarkRectangle::new(Rect::new(x, y, w, h))),
        Style::default(),
    )
}

#[test]
fn test_rectangle_undo_redo_scenario() {
    let mut doc = Document::new(800, 600);
    let mut history = CommandHistory::new();
    let layer = doc.default_layer_id();

    let id = history
        .execute(
            DocumentCommand::add_annotation(layer, rect_draft(10.0, 10.0, 40.0, 40.0)),
            &mut doc,
        )
        .unwrap()
        .created_ids()[0];
    assert_eq!(doc.annotation_count(), 1);

    assert!(history.undo(&mut doc).unwrap());
    assert_eq!(doc.annotation_count(), 0);

    assert!(history.redo(&mut doc).unwrap());
    assert_eq!(doc.annotation_count(), 1);
    let restored = doc.annotation(id).expect("same id after redo");
    assert_eq!(
        restored.bounds(),
        Rect::from_corners(Point::new(10.0, 10.0), Point::new(50.0, 50.0))
    );
}

#[test]
fn test_history_is_bounded_to_one_hundred() {
    let mut doc = Document::new(800, 600);
    let mut history = CommandHistory::new();
    let layer = doc.default_layer_id();

    for i in 0..150 {
        let x = f64::from(i);
        history
            .execute(
                DocumentCommand::add_annotation(layer, rect_draft(x, x, 10.0, 10.0)),
                &mut doc,
            )
            .unwrap();
    }
    assert_eq!(history.undo_count(), 100);

    let mut undone = 0;
    while history.undo(&mut doc).unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 100);
    assert!(!history.can_undo());
    // The 50 evicted commands stay applied.
    assert_eq!(doc.annotation_count(), 50);
}

#[test]
fn test_new_command_clears_redo() {
    let mut doc = Document::new(800, 600);
    let mut history = CommandHistory::new();
    let layer = doc.default_layer_id();

    history
        .execute(DocumentCommand::add_annotation(layer, rect_draft(0.0, 0.0, 5.0, 5.0)), &mut doc)
        .unwrap();
    history.undo(&mut doc).unwrap();
    assert!(history.can_redo());

    history
        .execute(DocumentCommand::add_annotation(layer, rect_draft(1.0, 1.0, 5.0, 5.0)), &mut doc)
        .unwrap();
    assert!(!history.can_redo());
    assert_eq!(history.undo_label(), Some("Add Annotation"));
}

#[test]
fn test_failed_command_is_not_recorded() {
    let mut doc = Document::new(800, 600);
    let mut history = CommandHistory::new();
    let before = doc.clone();

    let result = history.execute(DocumentCommand::delete_layer(doc.default_layer_id()), &mut doc);
    assert!(result.is_err());
    assert_eq!(history.undo_count(), 0);
    assert_eq!(history.revision(), 0);
    assert_eq!(doc, before);
}

#[test]
fn test_recording_refuses_undo() {
    let mut doc = Document::new(800, 600);
    let mut history = CommandHistory::new();
    let layer = doc.default_layer_id();
    history
        .execute(DocumentCommand::add_annotation(layer, rect_draft(0.0, 0.0, 5.0, 5.0)), &mut doc)
        .unwrap();

    history.begin_recording("Move");
    assert!(!history.undo(&mut doc).unwrap());
    assert_eq!(doc.annotation_count(), 1);
    history.end_recording();
    assert!(history.undo(&mut doc).unwrap());
}

#[derive(Debug, Clone)]
enum Op {
    Add { x: f64, y: f64, w: f64, h: f64 },
    Move { pick: usize, dx: f64, dy: f64 },
    Resize { pick: usize, w: f64, h: f64 },
    Restyle { pick: usize, width: f64 },
    Remove { pick: usize },
    CreateLayer,
    HideTop,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0..500.0, 0.0..500.0, 2.0..100.0, 2.0..100.0)
            .prop_map(|(x, y, w, h)| Op::Add { x, y, w, h }),
        (any::<usize>(), -50.0..50.0, -50.0..50.0)
            .prop_map(|(pick, dx, dy)| Op::Move { pick, dx, dy }),
        (any::<usize>(), 2.0..200.0, 2.0..200.0).prop_map(|(pick, w, h)| Op::Resize { pick, w, h }),
        (any::<usize>(), 0.5..10.0).prop_map(|(pick, width)| Op::Restyle { pick, width }),
        any::<usize>().prop_map(|pick| Op::Remove { pick }),
        Just(Op::CreateLayer),
        Just(Op::HideTop),
    ]
}

fn pick(doc: &Document, pick: usize) -> Option<annotkit_core::AnnotationId> {
    let count = doc.annotation_count();
    if count == 0 {
        return None;
    }
    doc.annotations().nth(pick % count).map(|a| a.id)
}

/// Layers and annotations in paint order. Id counters are left out: undo
/// never hands ids back.
fn content(doc: &Document) -> (Vec<Layer>, Vec<Annotation>) {
    (doc.layers().to_vec(), doc.annotations().cloned().collect())
}

fn command_for(doc: &Document, op: &Op) -> Option<DocumentCommand> {
    let top = doc.layers().last().map(|l| l.id)?;
    match *op {
        Op::Add { x, y, w, h } => Some(DocumentCommand::add_annotation(top, rect_draft(x, y, w, h))),
        Op::Move { pick: p, dx, dy } => {
            let id = pick(doc, p)?;
            DocumentCommand::move_annotations(doc, &[id], Vector::new(dx, dy)).ok()
        }
        Op::Resize { pick: p, w, h } => {
            let id = pick(doc, p)?;
            let b = doc.annotation(id)?.bounds();
            DocumentCommand::resize_annotation(doc, id, Rect::new(b.x, b.y, w, h)).ok()
        }
        Op::Restyle { pick: p, width } => {
            let id = pick(doc, p)?;
            let style = Style {
                stroke_width: width,
                ..Style::default()
            };
            Some(DocumentCommand::update_annotation(id, AnnotationPatch::new().style(style)))
        }
        Op::Remove { pick: p } => Some(DocumentCommand::remove_annotation(pick(doc, p)?)),
        Op::CreateLayer => Some(DocumentCommand::create_layer("Extra")),
        Op::HideTop => Some(DocumentCommand::set_layer_visibility(top, false)),
    }
}

proptest! {
    #[test]
    fn prop_undo_redo_round_trip(ops in prop::collection::vec(op(), 1..40)) {
        let mut doc = Document::new(800, 600);
        let mut history = CommandHistory::new();

        for op in &ops {
            let Some(command) = command_for(&doc, op) else { continue };
            let before = content(&doc);
            if history.execute(command, &mut doc).is_err() {
                prop_assert_eq!(content(&doc), before);
                continue;
            }
            let after = doc.clone();

            prop_assert!(history.undo(&mut doc).unwrap());
            prop_assert_eq!(content(&doc), before);
            prop_assert!(history.redo(&mut doc).unwrap());
            prop_assert_eq!(&doc, &after);
        }
    }

    #[test]
    fn prop_full_undo_restores_empty_document(ops in prop::collection::vec(op(), 1..30)) {
        let mut doc = Document::new(800, 600);
        let initial = doc.clone();
        let mut history = CommandHistory::new();
        for op in &ops {
            if let Some(command) = command_for(&doc, op) {
                let _ = history.execute(command, &mut doc);
            }
        }
        while history.undo(&mut doc).unwrap() {}
        prop_assert_eq!(doc.annotation_count(), 0);
        prop_assert_eq!(doc.layers(), initial.layers());
    }
}
