use annotkit_core::{AnnotationId, EditorError, Point, Rect};
use annotkit_editor::{
    InteractionController, InteractionOutcome, InteractionState, Key, MarkRectangle, Modifiers,
    Preview, Session, Shape, ShapeKind, Tool,
};
use annotkit_settings::EditorConfig;

fn setup() -> (Session, InteractionController) {
    (
        Session::new(800, 600, EditorConfig::default()),
        InteractionController::new(),
    )
}

fn add_rect(session: &mut Session, x: f64, y: f64, w: f64, h: f64) -> AnnotationId {
    session
        .add_annotation(Shape::Rectangle(MarkRectangle::new(Rect::new(x, y, w, h))))
        .unwrap()
}

fn rect_of(session: &Session, id: AnnotationId) -> Rect {
    match &session.document().annotation(id).unwrap().shape {
        Shape::Rectangle(r) => r.rect,
        other => panic!("expected a rectangle, got {:?}", other),
    }
}

fn assert_rect_close(actual: Rect, expected: Rect) {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.width, expected.width)
            && close(actual.height, expected.height),
        "{:?} != {:?}",
        actual,
        expected
    );
}

fn click(ctl: &mut InteractionController, session: &mut Session, p: Point, mods: Modifiers) {
    ctl.pointer_down(session, p, mods);
    ctl.pointer_up(session, p);
}

#[test]
fn test_freehand_coalesces_dense_samples() {
    let (mut s, mut ctl) = setup();
    ctl.set_tool(&mut s, Tool::Freehand);

    ctl.pointer_down(&mut s, Point::new(0.0, 0.0), Modifiers::NONE);
    for i in 1..=500 {
        ctl.pointer_move(&mut s, Point::new(f64::from(i) * 0.1, 0.0));
    }
    let outcome = ctl.pointer_up(&mut s, Point::new(50.0, 0.0));

    let InteractionOutcome::Committed { created } = outcome else {
        panic!("expected a commit, got {:?}", outcome);
    };
    let Shape::Freehand(path) = &s.document().annotation(created[0]).unwrap().shape else {
        panic!("expected a freehand path");
    };
    assert!(path.len() > 2);
    for pair in path.points.windows(2) {
        assert!(pair[0].distance_to(pair[1]) >= 2.0 - 1e-9);
    }
}

#[test]
fn test_move_drag_is_one_undoable_step() {
    let (mut s, mut ctl) = setup();
    let id = add_rect(&mut s, 10.0, 10.0, 40.0, 40.0);
    let steps = s.history().undo_count();

    ctl.pointer_down(&mut s, Point::new(30.0, 30.0), Modifiers::NONE);
    assert!(s.selection().contains(id));
    ctl.pointer_move(&mut s, Point::new(45.0, 40.0));
    // Ghosts only: the document keeps the original until release.
    assert!(matches!(ctl.preview(), Preview::Ghosts(g) if g.len() == 1));
    assert_rect_close(rect_of(&s, id), Rect::new(10.0, 10.0, 40.0, 40.0));

    let outcome = ctl.pointer_up(&mut s, Point::new(60.0, 50.0));
    assert!(matches!(outcome, InteractionOutcome::Committed { .. }));
    assert_rect_close(rect_of(&s, id), Rect::new(40.0, 30.0, 40.0, 40.0));
    assert_eq!(s.history().undo_count(), steps + 1);
    assert_eq!(s.history().undo_label(), Some("Move"));

    s.undo().unwrap();
    assert_rect_close(rect_of(&s, id), Rect::new(10.0, 10.0, 40.0, 40.0));
}

#[test]
fn test_click_without_movement_only_selects() {
    let (mut s, mut ctl) = setup();
    let id = add_rect(&mut s, 10.0, 10.0, 40.0, 40.0);
    let steps = s.history().undo_count();

    let down = ctl.pointer_down(&mut s, Point::new(30.0, 30.0), Modifiers::NONE);
    assert_eq!(down, InteractionOutcome::SelectionChanged);
    let up = ctl.pointer_up(&mut s, Point::new(30.0, 30.0));
    assert_eq!(up, InteractionOutcome::Ignored);
    assert_eq!(s.selection().ids(), &[id]);
    assert_eq!(s.history().undo_count(), steps);
}

#[test]
fn test_resize_from_bottom_right_handle() {
    let (mut s, mut ctl) = setup();
    let id = add_rect(&mut s, 10.0, 10.0, 40.0, 40.0);
    click(&mut ctl, &mut s, Point::new(30.0, 30.0), Modifiers::NONE);

    ctl.pointer_down(&mut s, Point::new(50.0, 50.0), Modifiers::NONE);
    assert!(ctl.state().is_dragging());
    let outcome = ctl.pointer_up(&mut s, Point::new(70.0, 90.0));

    assert!(matches!(outcome, InteractionOutcome::Committed { .. }));
    assert_rect_close(rect_of(&s, id), Rect::new(10.0, 10.0, 60.0, 80.0));
    assert_eq!(s.history().undo_label(), Some("Resize"));
}

#[test]
fn test_shift_click_toggles_membership() {
    let (mut s, mut ctl) = setup();
    let a = add_rect(&mut s, 10.0, 10.0, 20.0, 20.0);
    let b = add_rect(&mut s, 100.0, 10.0, 20.0, 20.0);

    click(&mut ctl, &mut s, Point::new(20.0, 20.0), Modifiers::NONE);
    let outcome = ctl.pointer_down(&mut s, Point::new(110.0, 20.0), Modifiers::SHIFT);
    assert_eq!(outcome, InteractionOutcome::SelectionChanged);
    assert!(ctl.state().is_idle());
    assert_eq!(s.selection().ids(), &[a, b]);

    click(&mut ctl, &mut s, Point::new(20.0, 20.0), Modifiers::SHIFT);
    assert_eq!(s.selection().ids(), &[b]);
    assert_eq!(s.selection().primary(), Some(b));
}

#[test]
fn test_empty_click_clears_and_marquee_selects() {
    let (mut s, mut ctl) = setup();
    let a = add_rect(&mut s, 10.0, 10.0, 20.0, 20.0);
    let b = add_rect(&mut s, 100.0, 100.0, 20.0, 20.0);
    let _far = add_rect(&mut s, 500.0, 500.0, 20.0, 20.0);

    click(&mut ctl, &mut s, Point::new(20.0, 20.0), Modifiers::NONE);
    assert_eq!(s.selection().len(), 1);

    let down = ctl.pointer_down(&mut s, Point::new(300.0, 300.0), Modifiers::NONE);
    assert_eq!(down, InteractionOutcome::SelectionChanged);
    assert!(s.selection().is_empty());
    ctl.pointer_move(&mut s, Point::new(5.0, 5.0));
    assert!(matches!(ctl.preview(), Preview::Marquee(_)));

    let up = ctl.pointer_up(&mut s, Point::new(0.0, 0.0));
    assert_eq!(up, InteractionOutcome::SelectionChanged);
    assert_eq!(s.selection().ids(), &[a, b]);
    assert!(!s.history().is_recording());
}

#[test]
fn test_drawing_on_locked_layer_is_rejected() {
    let (mut s, mut ctl) = setup();
    let layer = s.active_layer();
    s.set_layer_locked(layer, true).unwrap();
    let steps = s.history().undo_count();

    ctl.set_tool(&mut s, Tool::Rectangle);
    ctl.pointer_down(&mut s, Point::new(10.0, 10.0), Modifiers::NONE);
    let outcome = ctl.pointer_up(&mut s, Point::new(80.0, 80.0));

    assert_eq!(
        outcome,
        InteractionOutcome::Rejected(EditorError::LockedLayer { layer })
    );
    assert_eq!(s.document().annotation_count(), 0);
    assert_eq!(s.history().undo_count(), steps);
    assert!(!s.history().is_recording());
}

#[test]
fn test_drawing_maps_through_viewport() {
    let (mut s, mut ctl) = setup();
    s.viewport_mut().zoom_to(2.0);
    ctl.set_tool(&mut s, Tool::Rectangle);

    ctl.pointer_down(&mut s, Point::new(0.0, 0.0), Modifiers::NONE);
    let outcome = ctl.pointer_up(&mut s, Point::new(100.0, 100.0));
    let InteractionOutcome::Committed { created } = outcome else {
        panic!("expected a commit, got {:?}", outcome);
    };
    assert_rect_close(rect_of(&s, created[0]), Rect::new(200.0, 150.0, 50.0, 50.0));
    assert_eq!(s.selection().ids(), created.as_slice());
}

#[test]
fn test_escape_and_leave_cancel_a_drag() {
    let (mut s, mut ctl) = setup();
    let id = add_rect(&mut s, 10.0, 10.0, 40.0, 40.0);
    let steps = s.history().undo_count();

    ctl.pointer_down(&mut s, Point::new(30.0, 30.0), Modifiers::NONE);
    ctl.pointer_move(&mut s, Point::new(90.0, 90.0));
    assert_eq!(
        ctl.key_down(&mut s, Key::Escape, Modifiers::NONE),
        InteractionOutcome::Cancelled
    );
    assert!(ctl.state().is_idle());
    assert_eq!(ctl.preview(), Preview::None);

    ctl.pointer_down(&mut s, Point::new(30.0, 30.0), Modifiers::NONE);
    ctl.pointer_move(&mut s, Point::new(90.0, 90.0));
    assert_eq!(ctl.pointer_leave(&mut s), InteractionOutcome::Cancelled);
    // A release after leaving does nothing.
    assert_eq!(
        ctl.pointer_up(&mut s, Point::new(90.0, 90.0)),
        InteractionOutcome::Ignored
    );

    assert_rect_close(rect_of(&s, id), Rect::new(10.0, 10.0, 40.0, 40.0));
    assert_eq!(s.history().undo_count(), steps);
    assert!(!s.history().is_recording());
}

#[test]
fn test_delete_key_removes_selection() {
    let (mut s, mut ctl) = setup();
    add_rect(&mut s, 10.0, 10.0, 20.0, 20.0);
    add_rect(&mut s, 100.0, 10.0, 20.0, 20.0);
    let steps = s.history().undo_count();

    ctl.key_down(&mut s, Key::Char('a'), Modifiers::CTRL);
    assert_eq!(s.selection().len(), 2);
    let outcome = ctl.key_down(&mut s, Key::Delete, Modifiers::NONE);

    assert!(matches!(outcome, InteractionOutcome::Committed { .. }));
    assert_eq!(s.document().annotation_count(), 0);
    assert_eq!(s.history().undo_count(), steps + 1);
    assert_eq!(
        ctl.key_down(&mut s, Key::Backspace, Modifiers::NONE),
        InteractionOutcome::Ignored
    );
}

#[test]
fn test_undo_redo_shortcuts() {
    let (mut s, mut ctl) = setup();
    add_rect(&mut s, 10.0, 10.0, 20.0, 20.0);

    let undo = ctl.key_down(&mut s, Key::Char('z'), Modifiers::CTRL);
    assert_eq!(undo, InteractionOutcome::HistoryMoved);
    assert_eq!(s.document().annotation_count(), 0);

    let redo = ctl.key_down(&mut s, Key::Char('Z'), Modifiers::CTRL_SHIFT);
    assert_eq!(redo, InteractionOutcome::HistoryMoved);
    assert_eq!(s.document().annotation_count(), 1);

    ctl.key_down(&mut s, Key::Char('z'), Modifiers::CTRL);
    let redo = ctl.key_down(&mut s, Key::Char('y'), Modifiers::CTRL);
    assert_eq!(redo, InteractionOutcome::HistoryMoved);
    assert_eq!(
        ctl.key_down(&mut s, Key::Char('y'), Modifiers::CTRL),
        InteractionOutcome::Ignored
    );
}

#[test]
fn test_clicked_callout_gets_default_box() {
    let (mut s, mut ctl) = setup();
    let size = s.config().default_font.size;
    ctl.set_tool(&mut s, Tool::Callout);

    ctl.pointer_down(&mut s, Point::new(100.0, 200.0), Modifiers::NONE);
    let outcome = ctl.pointer_up(&mut s, Point::new(100.0, 200.0));
    let expected = Rect::new(140.0, 120.0, 160.0, size * 2.5);
    assert_eq!(
        outcome,
        InteractionOutcome::ContentRequested {
            kind: ShapeKind::Callout,
            rect: expected
        }
    );
    assert!(matches!(ctl.state(), InteractionState::AwaitingContent { .. }));
    // Leaving the canvas keeps the pending placement.
    assert_eq!(ctl.pointer_leave(&mut s), InteractionOutcome::Ignored);

    let committed = ctl.confirm_content(&mut s, "Check this");
    let InteractionOutcome::Committed { created } = committed else {
        panic!("expected a commit, got {:?}", committed);
    };
    let Shape::Callout(callout) = &s.document().annotation(created[0]).unwrap().shape else {
        panic!("expected a callout");
    };
    assert_eq!(callout.anchor, Point::new(100.0, 200.0));
    assert_eq!(callout.rect, expected);
    assert_eq!(callout.content, "Check this");
}

#[test]
fn test_switching_tools_cancels_pending_content() {
    let (mut s, mut ctl) = setup();
    ctl.set_tool(&mut s, Tool::Text);
    click(&mut ctl, &mut s, Point::new(10.0, 10.0), Modifiers::NONE);
    assert!(!ctl.state().is_idle());

    assert_eq!(ctl.set_tool(&mut s, Tool::Select), InteractionOutcome::Cancelled);
    assert_eq!(ctl.tool(), Tool::Select);
    assert_eq!(ctl.confirm_content(&mut s, "late"), InteractionOutcome::Ignored);
    assert_eq!(s.document().annotation_count(), 0);
}
