use annotkit_core::{AnnotationId, LayerId, Point, Rect, Style};
use annotkit_editor::{
    AnnotationDraft, CommandHistory, Document, DocumentCommand, MarkFreehand, MarkRectangle,
    SelectionManager, Shape,
};

struct Fixture {
    doc: Document,
    history: CommandHistory,
}

impl Fixture {
    fn new() -> Self {
        Self {
            doc: Document::new(800, 600),
            history: CommandHistory::new(),
        }
    }

    fn layer(&mut self, name: &str) -> LayerId {
        self.history
            .execute(DocumentCommand::create_layer(name), &mut self.doc)
            .unwrap()
            .created_layer()
            .unwrap()
    }

    fn add(&mut self, layer: LayerId, shape: Shape) -> AnnotationId {
        self.history
            .execute(
                DocumentCommand::add_annotation(layer, AnnotationDraft::new(shape, Style::default())),
                &mut self.doc,
            )
            .unwrap()
            .created_ids()[0]
    }

    fn rect(&mut self, layer: LayerId, x: f64, y: f64, w: f64, h: f64) -> AnnotationId {
        self.add(layer, Shape::Rectangle(MarkRectangle::new(Rect::new(x, y, w, h))))
    }
}

#[test]
fn test_marquee_selects_intersecting_on_selectable_layers() {
    let mut f = Fixture::new();
    let default = f.doc.default_layer_id();
    let inside = f.rect(default, 10.0, 10.0, 20.0, 20.0);
    let _outside = f.rect(default, 200.0, 200.0, 10.0, 10.0);
    let overlapping = f.rect(default, 90.0, 90.0, 50.0, 50.0);
    let touching = f.rect(default, 100.0, 40.0, 10.0, 10.0);
    // Bounding box overlaps the marquee but no sample lies inside it.
    let _diagonal = f.add(
        default,
        Shape::Freehand(MarkFreehand::from_points(
            &[Point::new(150.0, -50.0), Point::new(-50.0, 150.0)],
            2.0,
        )),
    );

    let hidden = f.layer("Hidden");
    let _on_hidden = f.rect(hidden, 10.0, 10.0, 20.0, 20.0);
    f.history
        .execute(DocumentCommand::set_layer_visibility(hidden, false), &mut f.doc)
        .unwrap();

    let locked = f.layer("Locked");
    let _on_locked = f.rect(locked, 10.0, 10.0, 20.0, 20.0);
    f.history
        .execute(DocumentCommand::set_layer_locked(locked, true), &mut f.doc)
        .unwrap();

    let mut selection = SelectionManager::new();
    let count = selection.select_by_marquee(&f.doc, Rect::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(count, 3);
    assert_eq!(selection.ids(), &[inside, overlapping, touching]);
    assert_eq!(selection.primary(), Some(inside));
}

#[test]
fn test_freehand_marquee_needs_a_point_inside() {
    let mut f = Fixture::new();
    let default = f.doc.default_layer_id();
    let path = f.add(
        default,
        Shape::Freehand(MarkFreehand::from_points(
            &[Point::new(150.0, -50.0), Point::new(50.0, 50.0), Point::new(-50.0, 150.0)],
            2.0,
        )),
    );
    let mut selection = SelectionManager::new();
    selection.select_by_marquee(&f.doc, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(selection.ids(), &[path]);
}

#[test]
fn test_toggle_keeps_primary_order() {
    let mut f = Fixture::new();
    let default = f.doc.default_layer_id();
    let a = f.rect(default, 0.0, 0.0, 10.0, 10.0);
    let b = f.rect(default, 20.0, 0.0, 10.0, 10.0);
    let c = f.rect(default, 40.0, 0.0, 10.0, 10.0);

    let mut selection = SelectionManager::new();
    assert!(selection.select_single(&f.doc, a));
    assert!(selection.toggle(&f.doc, b));
    assert!(selection.toggle(&f.doc, c));
    assert_eq!(selection.ids(), &[a, b, c]);

    assert!(selection.toggle(&f.doc, a));
    assert_eq!(selection.primary(), Some(b));
    assert!(selection.clear());
    assert!(!selection.clear());
}

#[test]
fn test_hidden_layer_refuses_new_selection_but_keeps_existing() {
    let mut f = Fixture::new();
    let notes = f.layer("Notes");
    let a = f.rect(notes, 0.0, 0.0, 10.0, 10.0);
    let b = f.rect(notes, 20.0, 0.0, 10.0, 10.0);

    let mut selection = SelectionManager::new();
    selection.select_single(&f.doc, a);
    f.history
        .execute(DocumentCommand::set_layer_visibility(notes, false), &mut f.doc)
        .unwrap();

    assert!(!selection.toggle(&f.doc, b));
    assert_eq!(selection.ids(), &[a]);
    assert!(selection.visible_ids(&f.doc).is_empty());

    f.history.undo(&mut f.doc).unwrap();
    assert_eq!(selection.visible_ids(&f.doc), vec![a]);
}

#[test]
fn test_delete_selected_is_one_step() {
    let mut f = Fixture::new();
    let default = f.doc.default_layer_id();
    let a = f.rect(default, 0.0, 0.0, 10.0, 10.0);
    let b = f.rect(default, 20.0, 0.0, 10.0, 10.0);
    let steps = f.history.undo_count();

    let mut selection = SelectionManager::new();
    selection.select_many(&f.doc, &[a, b]);
    assert_eq!(selection.delete_selected(&mut f.doc, &mut f.history).unwrap(), 2);
    assert_eq!(f.doc.annotation_count(), 0);
    assert!(selection.is_empty());
    assert_eq!(f.history.undo_count(), steps + 1);

    f.history.undo(&mut f.doc).unwrap();
    assert!(f.doc.contains(a) && f.doc.contains(b));
}

#[test]
fn test_prune_drops_removed_ids() {
    let mut f = Fixture::new();
    let default = f.doc.default_layer_id();
    let a = f.rect(default, 0.0, 0.0, 10.0, 10.0);
    let mut selection = SelectionManager::new();
    selection.select_single(&f.doc, a);

    f.history.undo(&mut f.doc).unwrap();
    assert!(selection.prune(&f.doc));
    assert!(selection.is_empty());
}
