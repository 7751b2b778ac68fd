use annotkit_core::{EditorError, EditorEvent, EventCategory, EventFilter, LayerId, Point};
use annotkit_editor::{AnnotationEditor, Document, InteractionOutcome, Key, Modifiers, Tool};
use std::cell::RefCell;
use std::rc::Rc;

fn recorder(editor: &mut AnnotationEditor, filter: EventFilter) -> Rc<RefCell<Vec<EditorEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    editor.subscribe(filter, move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn draw_rect(editor: &mut AnnotationEditor) -> InteractionOutcome {
    editor.set_tool(Tool::Rectangle);
    editor.pointer_down(Point::new(10.0, 10.0), Modifiers::NONE);
    editor.pointer_move(Point::new(40.0, 40.0));
    editor.pointer_up(Point::new(60.0, 60.0))
}

#[test]
fn test_drawing_publishes_document_and_selection_events() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    let events = recorder(&mut editor, EventFilter::All);

    let outcome = draw_rect(&mut editor);
    let InteractionOutcome::Committed { created } = outcome else {
        panic!("expected a commit, got {:?}", outcome);
    };

    assert_eq!(
        *events.borrow(),
        vec![
            EditorEvent::DocumentChanged { revision: 1 },
            EditorEvent::SelectionChanged {
                primary: Some(created[0]),
                count: 1
            },
        ]
    );
}

#[test]
fn test_filtered_subscription_and_unsubscribe() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let id = editor.subscribe(
        EventFilter::Categories(vec![EventCategory::Viewport]),
        move |event| sink.borrow_mut().push(event.clone()),
    );

    draw_rect(&mut editor);
    editor.wheel(Point::new(100.0, 100.0), -1.0, Modifiers::CTRL);
    assert_eq!(events.borrow().len(), 1);
    assert!(matches!(events.borrow()[0], EditorEvent::ViewportChanged { .. }));

    assert!(editor.unsubscribe(id));
    editor.zoom_in();
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn test_ctrl_s_hands_snapshot_to_save_handler() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    draw_rect(&mut editor);
    let saved = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&saved);
    editor.on_save(move |doc: &Document| *slot.borrow_mut() = Some(doc.clone()));
    let events = recorder(&mut editor, EventFilter::All);

    let outcome = editor.key_down(Key::Char('s'), Modifiers::CTRL);

    assert_eq!(outcome, InteractionOutcome::SaveRequested);
    assert_eq!(saved.borrow().as_ref(), Some(editor.document()));
    assert!(events.borrow().contains(&EditorEvent::SaveRequested));
}

#[test]
fn test_request_save_without_handler() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    assert!(!editor.request_save());
    assert_eq!(editor.save(), *editor.document());
}

#[test]
fn test_visible_selection_hides_handles_of_hidden_layers() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    let layer = editor.create_layer("Review").unwrap();
    editor.set_active_layer(layer).unwrap();
    let InteractionOutcome::Committed { created } = draw_rect(&mut editor) else {
        panic!("expected a commit");
    };
    assert_eq!(editor.document().layer_of(created[0]).map(|l| l.id), Some(layer));

    editor.set_layer_visibility(layer, false).unwrap();
    assert_eq!(editor.selection().ids(), created.as_slice());
    assert!(editor.visible_selection().is_empty());

    editor.undo().unwrap();
    assert_eq!(editor.visible_selection(), created);
}

#[test]
fn test_active_layer_falls_back_after_delete() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    let layer = editor.create_layer("Scratch").unwrap();
    editor.set_active_layer(layer).unwrap();
    editor.delete_layer(layer).unwrap();
    assert_eq!(editor.active_layer(), editor.document().default_layer_id());
}

#[test]
fn test_load_resets_history_and_selection() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    draw_rect(&mut editor);
    let events = recorder(&mut editor, EventFilter::All);

    editor.load(Document::new(1024, 768));

    assert!(!editor.history().can_undo());
    assert!(editor.selection().is_empty());
    assert_eq!(editor.document().image_width(), 1024);
    let events = events.borrow();
    assert!(events
        .iter()
        .any(|e| matches!(e, EditorEvent::DocumentChanged { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, EditorEvent::SelectionChanged { count: 0, .. })));
}

#[test]
fn test_rejected_command_publishes_feedback() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    let events = recorder(&mut editor, EventFilter::All);
    let default = editor.document().default_layer_id();

    assert!(editor.delete_layer(default).is_err());

    assert_eq!(
        *events.borrow(),
        vec![EditorEvent::CommandRejected {
            reason: "Cannot delete the last remaining layer".to_string()
        }]
    );
    assert_eq!(editor.document().layer_count(), 1);
}

#[test]
fn test_locked_draw_publishes_rejection() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    let layer = editor.active_layer();
    editor.set_layer_locked(layer, true).unwrap();
    let events = recorder(&mut editor, EventFilter::All);

    let outcome = draw_rect(&mut editor);

    assert!(matches!(outcome, InteractionOutcome::Rejected(_)));
    assert!(events
        .borrow()
        .iter()
        .any(|e| matches!(e, EditorEvent::CommandRejected { .. })));
    assert_eq!(editor.document().annotation_count(), 0);
}

#[test]
fn test_copy_and_active_layer_go_through_event_tracking() {
    let mut editor = AnnotationEditor::new(800, 600, None);
    draw_rect(&mut editor);
    let events = recorder(&mut editor, EventFilter::All);

    assert_eq!(editor.copy(), 1);
    assert!(events.borrow().is_empty());

    let missing = LayerId(99);
    assert_eq!(
        editor.set_active_layer(missing),
        Err(EditorError::LayerNotFound { id: missing })
    );
    assert_eq!(
        *events.borrow(),
        vec![EditorEvent::CommandRejected {
            reason: "Layer L99 not found".to_string()
        }]
    );
    assert_eq!(editor.active_layer(), editor.document().default_layer_id());
}
