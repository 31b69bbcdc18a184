use bucket_paint::{CanvasMeta, Command, Document, Editor, EditorError, Shape, ShapeKind};
use egui::{pos2, Color32};

fn drawing() -> Editor {
    let mut editor = Editor::new(Document::new(300, 200, Some(Color32::from_rgb(250, 240, 230))).unwrap());
    let shapes = [
        Shape::stroke_path(
            vec![pos2(1.0, 1.0), pos2(20.5, 30.0), pos2(40.0, 10.0)],
            Color32::from_rgb(0x22, 0x22, 0x22),
            3,
        )
        .unwrap(),
        Shape::line(pos2(0.0, 150.0), pos2(299.0, 150.0), Color32::BLUE, 2).unwrap(),
        Shape::rectangle(pos2(50.0, 20.0), pos2(120.0, 90.0), Color32::BLACK, 4, Some(Color32::YELLOW))
            .unwrap(),
        Shape::ellipse(pos2(150.0, 20.0), pos2(250.0, 120.0), Color32::RED, 1, None).unwrap(),
    ];
    for shape in shapes {
        editor.execute(&Command::AddShape(shape)).unwrap();
    }
    editor
}

#[test]
fn test_save_and_reload_keeps_shapes_and_meta() {
    let mut editor = drawing();
    editor
        .execute(&Command::Fill {
            at: pos2(10.0, 190.0),
            color: Color32::GREEN,
        })
        .unwrap();
    assert!(editor.document().raster_layer().is_some());
    let saved = editor.document().clone();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drawing.json");
    editor.save_project(&path).unwrap();

    let mut reopened = Editor::default();
    reopened.open_project(&path).unwrap();
    let doc = reopened.document();
    assert_eq!(doc.meta(), saved.meta());
    assert_eq!(doc.shapes(), saved.shapes());
    // Bucket fills live only in the raster layer, which is not saved.
    assert!(doc.raster_layer().is_none());
    assert!(!reopened.can_undo());
}

#[test]
fn test_project_json_layout() {
    let editor = drawing();
    let json: serde_json::Value = serde_json::from_str(&editor.project_json().unwrap()).unwrap();

    assert_eq!(json["meta"]["w"], 300);
    assert_eq!(json["meta"]["h"], 200);
    assert_eq!(json["meta"]["bg"], "#faf0e6");

    let shapes = json["shapes"].as_array().unwrap();
    let types: Vec<&str> = shapes.iter().map(|s| s["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["pen", "line", "rect", "oval"]);
    assert_eq!(shapes[0]["coords"].as_array().unwrap().len(), 6);
    assert_eq!(shapes[2]["fill"], "#ffff00");
    assert_eq!(shapes[2]["width"], 4);
    assert!(shapes[3]["fill"].is_null());
}

#[test]
fn test_transparent_background_is_null() {
    let mut editor = drawing();
    editor.execute(&Command::SetBackground(None)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&editor.project_json().unwrap()).unwrap();
    assert!(json["meta"]["bg"].is_null());

    let mut reopened = Editor::default();
    reopened.load_project(&editor.project_json().unwrap()).unwrap();
    assert_eq!(reopened.document().background(), None);
}

#[test]
fn test_legacy_bare_list_keeps_current_canvas() {
    let mut editor = Editor::new(Document::new(640, 480, Some(Color32::LIGHT_GRAY)).unwrap());
    let legacy = r##"[
        {"type": "rect", "coords": [10, 10, 60, 40], "stroke": "#ff0000", "width": 2.0, "fill": ""},
        {"type": "pen", "coords": [0, 0, 5, 5, 9, 2]}
    ]"##;
    editor.load_project(legacy).unwrap();

    let doc = editor.document();
    assert_eq!(
        doc.meta(),
        CanvasMeta {
            width: 640,
            height: 480,
            background: Some(Color32::LIGHT_GRAY),
        }
    );
    assert_eq!(doc.shapes().len(), 2);
    assert!(matches!(doc.shapes()[0].kind(), ShapeKind::Rectangle { .. }));
    assert_eq!(doc.shapes()[0].fill(), None);
    assert_eq!(doc.shapes()[1].stroke_color(), Color32::BLACK);
    assert_eq!(doc.shapes()[1].width(), 2);
}

#[test]
fn test_partial_meta_falls_back_per_key() {
    let mut editor = Editor::new(Document::new(640, 480, Some(Color32::WHITE)).unwrap());
    editor
        .load_project(r#"{"meta": {"w": 100}, "shapes": []}"#)
        .unwrap();
    let meta = editor.document().meta();
    assert_eq!((meta.width, meta.height), (100, 480));
    assert_eq!(meta.background, Some(Color32::WHITE));
}

#[test]
fn test_malformed_project_leaves_editor_unchanged() {
    let mut editor = drawing();
    let before = editor.document().clone();

    for bad in [
        "not json at all",
        r#"{"meta": {"w": 0, "h": 10}, "shapes": []}"#,
        r#"[{"type": "triangle", "coords": [0, 0, 1, 1]}]"#,
        r#"[{"type": "line", "coords": [0, 0, 1]}]"#,
        r#"[{"type": "rect", "coords": [0, 0, 5, 5], "stroke": "chartreuse-ish"}]"#,
    ] {
        assert!(editor.load_project(bad).is_err(), "{bad}");
        assert_eq!(editor.document(), &before, "{bad}");
        assert!(editor.can_undo());
    }
}

#[test]
fn test_unrelated_json_object_keeps_drawing() {
    let mut editor = drawing();
    let before = editor.document().clone();

    for other in ["{}", r#"{"name": "settings", "version": 3}"#] {
        let result = editor.load_project(other);
        assert!(matches!(result, Err(EditorError::Serialization(_))), "{other}");
        assert_eq!(editor.document(), &before, "{other}");
        assert_eq!(editor.document().shapes().len(), 4);
        assert!(editor.can_undo());
    }
}

#[test]
fn test_open_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor = Editor::default();
    let result = editor.open_project(&dir.path().join("missing.json"));
    assert!(matches!(result, Err(EditorError::Io(_))));
}

#[test]
fn test_shape_ids_survive_round_trip() {
    let editor = drawing();
    let mut reopened = Editor::default();
    reopened.load_project(&editor.project_json().unwrap()).unwrap();

    let ids = |editor: &Editor| -> Vec<_> {
        editor.document().shapes().iter().map(Shape::id).collect()
    };
    assert_eq!(ids(&reopened), ids(&editor));
}
