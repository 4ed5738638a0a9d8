use std::sync::Arc;

use egui::{Color32, pos2};
use guided_paint::arena::{StrokeId, TextId};
use guided_paint::command::{Command, CommandHistory};
use guided_paint::document::DocumentState;
use guided_paint::fill::{FillPatch, flood_region};
use guided_paint::point::Point;
use guided_paint::stroke::{Stroke, StrokeRef};
use guided_paint::text::{TextItem, TextStyle};
use guided_paint::tool::ToolKind;
use image::{Rgba, RgbaImage};

fn stroke(points: &[(f32, f32)]) -> StrokeRef {
    let points = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
    Arc::new(Stroke::new(points, Color32::RED, 3.0, ToolKind::Pencil).unwrap())
}

fn add_stroke(id: usize) -> Command {
    Command::AddStroke {
        id: StrokeId(id),
        stroke: stroke(&[(0.0, 0.0), (id as f32 * 10.0, 5.0)]),
    }
}

#[test]
fn undo_and_redo_of_a_single_stroke() {
    let mut doc = DocumentState::new(32, 32);
    let mut history = CommandHistory::new();
    let blank = doc.clone();

    history.execute(add_stroke(0), &mut doc).unwrap();
    let drawn = doc.clone();
    assert_eq!(doc.strokes().len(), 1);

    assert!(history.undo(&mut doc).unwrap());
    assert_eq!(doc.strokes().len(), 0);
    assert_eq!(doc, blank);

    assert!(history.redo(&mut doc).unwrap());
    assert_eq!(doc, drawn);
    assert!(Arc::ptr_eq(doc.stroke(StrokeId(0)).unwrap(), drawn.stroke(StrokeId(0)).unwrap()));
}

#[test]
fn empty_history_undo_and_redo_are_no_ops() {
    let mut doc = DocumentState::new(8, 8);
    let mut history = CommandHistory::new();
    assert!(!history.undo(&mut doc).unwrap());
    assert!(!history.redo(&mut doc).unwrap());
    assert!(doc.is_blank());
}

#[test]
fn pushing_after_undo_discards_the_redo_branch() {
    let mut doc = DocumentState::new(32, 32);
    let mut history = CommandHistory::new();

    history.execute(add_stroke(0), &mut doc).unwrap();
    history.execute(add_stroke(1), &mut doc).unwrap();
    history.undo(&mut doc).unwrap();
    assert!(history.can_redo());

    history.execute(add_stroke(2), &mut doc).unwrap();
    assert!(!history.can_redo());
    assert!(!history.redo(&mut doc).unwrap());
    assert_eq!(history.commands().len(), 2);
    assert_eq!(history.cursor(), Some(1));
    assert!(doc.stroke(StrokeId(1)).is_none());
    assert!(doc.stroke(StrokeId(2)).is_some());
}

#[test]
fn every_command_round_trips() {
    let size = 16;
    let mut doc = DocumentState::new(size, size);
    let mut history = CommandHistory::new();
    let item = TextItem::new(TextId(0), "cat", pos2(2.0, 2.0), TextStyle::default());
    history.execute(add_stroke(0), &mut doc).unwrap();
    history.execute(Command::AddText { item }, &mut doc).unwrap();

    let boundary = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]));
    let region = flood_region(Point::new(1.0, 1.0), &boundary, 64).unwrap();
    let commands = vec![
        Command::MoveText {
            id: TextId(0),
            from: pos2(2.0, 2.0),
            to: pos2(9.0, 4.0),
        },
        Command::EditText {
            id: TextId(0),
            from: "cat".into(),
            to: "dog".into(),
        },
        Command::StyleText {
            id: TextId(0),
            from: TextStyle::default(),
            to: TextStyle {
                bold: true,
                ..TextStyle::default()
            },
        },
        Command::Fill {
            patch: FillPatch::capture(region, doc.fill()),
            color: Color32::BLUE,
            opacity: 0.5,
        },
    ];

    for command in commands {
        let before = doc.clone();
        history.execute(command, &mut doc).unwrap();
        let after = doc.clone();
        assert_ne!(before, after);

        history.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
        history.redo(&mut doc).unwrap();
        assert_eq!(doc, after);
    }

    assert_eq!(doc.text(TextId(0)).unwrap().content, "dog");
    assert_eq!(doc.fill().get_pixel(0, 0).0, [0, 0, 255, 128]);
}

#[test]
fn clear_is_one_undoable_step() {
    let mut doc = DocumentState::new(8, 8);
    let mut history = CommandHistory::new();
    history.execute(add_stroke(0), &mut doc).unwrap();
    history.execute(add_stroke(1), &mut doc).unwrap();
    let before = doc.clone();

    history
        .execute(
            Command::Clear {
                previous: Box::new(doc.clone()),
            },
            &mut doc,
        )
        .unwrap();
    assert!(doc.is_blank());
    assert_eq!(doc.size(), (8, 8));

    history.undo(&mut doc).unwrap();
    assert_eq!(doc, before);
}

#[test]
fn inconsistent_commands_are_rejected_without_side_effects() {
    let mut doc = DocumentState::new(8, 8);
    let mut history = CommandHistory::new();
    let missing = Command::EditText {
        id: TextId(3),
        from: "a".into(),
        to: "b".into(),
    };
    assert!(history.execute(missing, &mut doc).is_err());
    assert!(!history.can_undo());

    history.execute(add_stroke(0), &mut doc).unwrap();
    assert!(history.execute(add_stroke(0), &mut doc).is_err());
    assert_eq!(history.commands().len(), 1);
}
