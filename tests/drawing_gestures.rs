use bucket_paint::{Brush, Command, Document, Editor, ShapeKind, Tool, ToolController};
use egui::{pos2, Color32, Pos2};

fn drag(controller: &mut ToolController, path: &[Pos2], constrain: bool) -> Option<Command> {
    let (first, rest) = path.split_first()?;
    assert!(controller.press(*first, Brush::default()).is_none());
    let (last, middle) = rest.split_last()?;
    for point in middle {
        controller.drag(*point, constrain);
    }
    controller.release(*last, constrain)
}

#[test]
fn test_each_tool_adds_one_shape() {
    let mut editor = Editor::new(Document::new(200, 200, Some(Color32::WHITE)).unwrap());
    let path = [pos2(10.0, 10.0), pos2(40.0, 30.0), pos2(80.0, 60.0)];

    for tool in [Tool::Pen, Tool::Line, Tool::Rectangle, Tool::Ellipse] {
        let mut controller = ToolController::new(tool);
        let command = drag(&mut controller, &path, false).unwrap();
        assert!(editor.execute(&command).unwrap());
        assert!(controller.preview().is_none());
    }

    let shapes = editor.document().shapes();
    assert!(matches!(shapes[0].kind(), ShapeKind::Stroke(points) if points.len() == 3));
    assert_eq!(
        shapes[1].kind(),
        &ShapeKind::Line {
            start: pos2(10.0, 10.0),
            end: pos2(80.0, 60.0)
        }
    );
    assert!(matches!(shapes[2].kind(), ShapeKind::Rectangle { .. }));
    assert!(matches!(shapes[3].kind(), ShapeKind::Ellipse { .. }));
    assert_eq!(editor.history().len(), 5);
}

#[test]
fn test_shift_drag_makes_square() {
    let mut controller = ToolController::new(Tool::Rectangle);
    let command = drag(&mut controller, &[pos2(10.0, 10.0), pos2(50.0, 25.0)], true).unwrap();
    let Command::AddShape(shape) = command else {
        panic!("expected a shape, got {command:?}");
    };
    assert_eq!(
        shape.kind(),
        &ShapeKind::Rectangle {
            a: pos2(10.0, 10.0),
            b: pos2(50.0, 50.0)
        }
    );
}

#[test]
fn test_preview_is_not_part_of_document() {
    let mut editor = Editor::default();
    let mut controller = ToolController::new(Tool::Ellipse);
    controller.press(pos2(5.0, 5.0), Brush::default());
    controller.drag(pos2(60.0, 40.0), false);

    assert!(controller.is_active());
    assert!(controller.preview().is_some());
    assert!(editor.document().shapes().is_empty());

    controller.cancel();
    assert!(!controller.is_active());
    assert!(controller.release(pos2(60.0, 40.0), false).is_none());
    assert!(!editor.can_undo());
    assert!(editor.execute(&Command::Clear).is_ok_and(|changed| !changed));
}

#[test]
fn test_degenerate_gestures_add_nothing() {
    let mut controller = ToolController::new(Tool::Pen);
    assert!(drag(&mut controller, &[pos2(3.0, 3.0), pos2(3.0, 3.0)], false).is_none());

    controller.set_tool(Tool::Line);
    assert!(drag(&mut controller, &[pos2(3.0, 3.0), pos2(3.0, 3.0)], false).is_none());

    controller.set_tool(Tool::Rectangle);
    assert!(drag(&mut controller, &[pos2(3.0, 3.0), pos2(3.0, 3.0)], true).is_none());
}

#[test]
fn test_fill_tool_clicks_fill() {
    let mut editor = Editor::new(Document::new(50, 50, Some(Color32::WHITE)).unwrap());
    let mut controller = ToolController::new(Tool::Fill);
    let brush = Brush {
        bucket: Color32::BLUE,
        ..Brush::default()
    };
    let command = controller.press(pos2(25.0, 25.0), brush).unwrap();
    assert!(!controller.is_active());
    assert!(editor.execute(&command).unwrap());
    assert_eq!(
        editor.document().raster_layer().and_then(|layer| layer.get(0, 0)),
        Some([0, 0, 255, 255])
    );
}

#[test]
fn test_drag_released_off_canvas_leaves_document_unchanged() {
    let mut editor = Editor::new(Document::new(100, 100, Some(Color32::WHITE)).unwrap());
    let before = editor.document().clone();
    let mut controller = ToolController::new(Tool::Line);
    controller.press(pos2(10.0, 10.0), Brush::default());
    controller.drag(pos2(90.0, 60.0), false);
    controller.drag(pos2(140.0, 60.0), false);

    assert!(controller.release_at(None, false).is_none());
    assert!(!controller.is_active());
    assert_eq!(editor.document(), &before);
    assert!(!editor.can_undo());

    // The next gesture starts clean.
    controller.press(pos2(5.0, 5.0), Brush::default());
    let command = controller.release_at(Some(pos2(50.0, 5.0)), false).unwrap();
    assert!(editor.execute(&command).unwrap());
    assert_eq!(
        editor.document().shapes()[0].kind(),
        &ShapeKind::Line {
            start: pos2(5.0, 5.0),
            end: pos2(50.0, 5.0)
        }
    );
}
