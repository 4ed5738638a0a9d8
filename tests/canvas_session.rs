use std::sync::Arc;

use egui::{Color32, pos2};
use guided_paint::arena::StrokeId;
use guided_paint::canvas::{CanvasDocument, DeferredAction, Dispatch};
use guided_paint::color::{HslColor, HslTolerance};
use guided_paint::error::StepError;
use guided_paint::event::{CanvasEvent, DocumentChange};
use guided_paint::input::InputEvent;
use guided_paint::point::Point;
use guided_paint::state::CanvasMode;
use guided_paint::step::{AreaFillGuide, AreaFillRubric, DotToDotRubric, Exercise, PixelBuffer, StepSpec};
use guided_paint::text::TextStyle;
use guided_paint::tool::{Constraints, ToolKind};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

type Recorded = Arc<Mutex<Vec<CanvasEvent>>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn record(canvas: &CanvasDocument) -> Recorded {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    canvas.subscribe(Box::new(move |event: &CanvasEvent| sink.lock().push(event.clone())));
    events
}

fn evaluations(events: &Recorded) -> Vec<(&'static str, bool)> {
    events
        .lock()
        .iter()
        .filter_map(|event| match event {
            CanvasEvent::Evaluated { exercise, result, .. } => Some((*exercise, result.pass)),
            _ => None,
        })
        .collect()
}

fn changes(events: &Recorded) -> Vec<DocumentChange> {
    events
        .lock()
        .iter()
        .filter_map(|event| match event {
            CanvasEvent::DocumentChanged { change, .. } => Some(*change),
            _ => None,
        })
        .collect()
}

fn down(canvas: &mut CanvasDocument, x: f32, y: f32) {
    canvas.handle_input(InputEvent::PointerDown { point: Point::new(x, y) });
}

fn drag(canvas: &mut CanvasDocument, points: &[(f32, f32)]) {
    canvas.handle_input(InputEvent::PointerDown {
        point: Point::new(points[0].0, points[0].1),
    });
    for &(x, y) in &points[1..] {
        canvas.handle_input(InputEvent::PointerMove { point: Point::new(x, y) });
    }
    let (x, y) = points[points.len() - 1];
    canvas.handle_input(InputEvent::PointerUp { point: Point::new(x, y) });
}

fn tap(canvas: &mut CanvasDocument, x: f32, y: f32) {
    drag(canvas, &[(x, y)]);
}

#[test]
fn a_stroke_gesture_commits_one_stroke() {
    init_logging();
    let mut canvas = CanvasDocument::new(64, 64);
    let events = record(&canvas);

    down(&mut canvas, 5.0, 5.0);
    assert_eq!(canvas.mode(), CanvasMode::GestureActive);
    canvas.handle_input(InputEvent::PointerMove { point: Point::new(10.0, 5.0) });
    assert_eq!(canvas.active_stroke().map(|s| s.len()), Some(2));
    canvas.handle_input(InputEvent::PointerUp { point: Point::new(20.0, 5.0) });

    assert_eq!(canvas.mode(), CanvasMode::Idle);
    assert_eq!(canvas.document().strokes().len(), 1);
    let (_, stroke) = canvas.document().strokes().iter().next().unwrap();
    assert_eq!(stroke.points().len(), 3);
    assert_eq!(stroke.tool(), ToolKind::Pencil);
    assert_eq!(changes(&events), vec![DocumentChange::Applied("add-stroke")]);

    let modes: Vec<_> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            CanvasEvent::StateChanged { old, new } => Some((*old, *new)),
            _ => None,
        })
        .collect();
    assert_eq!(
        modes,
        vec![
            (CanvasMode::Idle, CanvasMode::GestureActive),
            (CanvasMode::GestureActive, CanvasMode::Idle)
        ]
    );
}

#[test]
fn leaving_the_canvas_ends_a_gesture_like_a_release() {
    let mut canvas = CanvasDocument::new(64, 64);
    down(&mut canvas, 5.0, 5.0);
    canvas.handle_input(InputEvent::PointerLeave { point: Point::new(63.0, 5.0) });
    assert_eq!(canvas.mode(), CanvasMode::Idle);
    assert_eq!(canvas.document().strokes().len(), 1);

    down(&mut canvas, 5.0, 5.0);
    canvas.handle_input(InputEvent::PointerCancel);
    assert_eq!(canvas.mode(), CanvasMode::Idle);
    assert_eq!(canvas.document().strokes().len(), 2);
}

#[test]
fn a_second_pointer_down_does_not_restart_the_gesture() {
    let mut canvas = CanvasDocument::new(64, 64);
    down(&mut canvas, 5.0, 5.0);
    canvas.handle_input(InputEvent::PointerMove { point: Point::new(6.0, 6.0) });
    down(&mut canvas, 30.0, 30.0);
    assert_eq!(canvas.active_stroke().map(|s| s.len()), Some(2));

    canvas.handle_input(InputEvent::PointerMove { point: Point::new(7.0, 7.0) });
    canvas.handle_input(InputEvent::PointerUp { point: Point::new(7.0, 7.0) });
    assert_eq!(canvas.document().strokes().len(), 1);
    assert!(canvas.history().commands().len() == 1);
}

#[test]
fn mutations_during_a_gesture_wait_for_it_to_end() {
    init_logging();
    let mut canvas = CanvasDocument::new(32, 32);
    drag(&mut canvas, &[(1.0, 1.0), (8.0, 8.0)]);
    let events = record(&canvas);

    down(&mut canvas, 10.0, 10.0);
    assert_eq!(canvas.fill(Point::new(20.0, 20.0), Color32::RED, 1.0), Dispatch::Deferred);
    assert_eq!(canvas.undo(), Dispatch::Deferred);
    assert_eq!(canvas.deferred().len(), 2);
    assert!(matches!(canvas.deferred()[1], DeferredAction::Undo));
    assert!(canvas.document().fill().pixels().all(|p| p.0[3] == 0));
    assert!(changes(&events).is_empty());

    canvas.handle_input(InputEvent::PointerUp { point: Point::new(12.0, 12.0) });

    // The gesture's own stroke lands first, then the queue in request order.
    assert_eq!(
        changes(&events),
        vec![
            DocumentChange::Applied("add-stroke"),
            DocumentChange::Applied("fill"),
            DocumentChange::Undone("fill"),
        ]
    );
    assert!(canvas.deferred().is_empty());
    assert_eq!(canvas.document().strokes().len(), 2);
    assert!(canvas.document().fill().pixels().all(|p| p.0[3] == 0));
    assert!(canvas.history().can_redo());

    assert_eq!(canvas.redo(), Dispatch::Applied);
    assert_eq!(canvas.document().fill().get_pixel(0, 0).0, [255, 0, 0, 255]);
}

#[test]
fn undo_with_nothing_to_undo_is_ignored() {
    let mut canvas = CanvasDocument::new(8, 8);
    assert_eq!(canvas.undo(), Dispatch::Ignored);
    assert_eq!(canvas.redo(), Dispatch::Ignored);
    assert_eq!(canvas.clear(), Dispatch::Ignored);
    assert_eq!(canvas.revision(), 0);
}

#[test]
fn clear_wipes_everything_and_undoes_in_one_step() {
    let mut canvas = CanvasDocument::new(16, 16);
    drag(&mut canvas, &[(1.0, 1.0), (5.0, 5.0)]);
    canvas.add_text("sun", pos2(2.0, 2.0), TextStyle::default());
    canvas.fill(Point::new(8.0, 8.0), Color32::YELLOW, 1.0);
    let before = canvas.document().clone();

    assert_eq!(canvas.clear(), Dispatch::Applied);
    assert!(canvas.document().is_blank());

    assert_eq!(canvas.undo(), Dispatch::Applied);
    assert_eq!(*canvas.document(), before);
}

#[test]
fn text_annotations_are_edited_through_commands() {
    let mut canvas = CanvasDocument::new(128, 128);
    let id = canvas.add_text("hi", pos2(20.0, 20.0), TextStyle::default());
    assert_eq!(canvas.edit_text(id, "hello"), Dispatch::Applied);
    assert_eq!(canvas.edit_text(id, "hello"), Dispatch::Ignored);
    let bold = TextStyle {
        bold: true,
        ..TextStyle::default()
    };
    assert_eq!(canvas.style_text(id, bold), Dispatch::Applied);
    assert_eq!(canvas.move_text(id, pos2(30.0, 40.0)), Dispatch::Applied);

    let item = canvas.document().text(id).unwrap();
    assert_eq!(item.content, "hello");
    assert!(item.style.bold);
    assert_eq!(item.position, pos2(30.0, 40.0));

    canvas.undo();
    canvas.undo();
    canvas.undo();
    assert_eq!(canvas.document().text(id).unwrap().content, "hi");
    assert_eq!(canvas.document().text(id).unwrap().position, pos2(20.0, 20.0));
}

#[test]
fn dragging_overlapping_text_moves_the_newest() {
    let mut canvas = CanvasDocument::new(128, 128);
    let older = canvas.add_text("hi", pos2(20.0, 20.0), TextStyle::default());
    let newer = canvas.add_text("yo", pos2(22.0, 22.0), TextStyle::default());
    assert!(canvas.set_tool(ToolKind::Text));

    drag(&mut canvas, &[(25.0, 25.0), (35.0, 25.0)]);
    assert_eq!(canvas.document().text(newer).unwrap().position, pos2(32.0, 22.0));
    assert_eq!(canvas.document().text(older).unwrap().position, pos2(20.0, 20.0));
}

#[test]
fn text_added_during_a_gesture_has_an_id_right_away() {
    let mut canvas = CanvasDocument::new(64, 64);
    down(&mut canvas, 1.0, 1.0);
    let id = canvas.add_text("later", pos2(4.0, 4.0), TextStyle::default());
    assert!(canvas.document().text(id).is_none());
    assert_eq!(canvas.edit_text(id, "later still"), Dispatch::Deferred);

    canvas.handle_input(InputEvent::PointerUp { point: Point::new(2.0, 2.0) });
    assert_eq!(canvas.document().text(id).unwrap().content, "later still");
}

#[test]
fn dragging_a_text_item_records_a_move() {
    let mut canvas = CanvasDocument::new(128, 128);
    let id = canvas.add_text("hi", pos2(20.0, 20.0), TextStyle::default());
    assert!(canvas.set_tool(ToolKind::Text));

    drag(&mut canvas, &[(25.0, 25.0), (35.0, 30.0), (45.0, 35.0)]);
    assert_eq!(canvas.document().text(id).unwrap().position, pos2(40.0, 30.0));
    assert_eq!(canvas.history().commands().last().map(|c| c.name()), Some("move-text"));
    assert!(canvas.document().strokes().is_empty());

    canvas.undo();
    assert_eq!(canvas.document().text(id).unwrap().position, pos2(20.0, 20.0));

    // Pressing on empty canvas with the text tool does nothing.
    drag(&mut canvas, &[(100.0, 100.0), (110.0, 110.0)]);
    assert_eq!(canvas.history().commands().len(), 2);
}

#[test]
fn constraints_reject_tool_changes() {
    let mut canvas = CanvasDocument::new(64, 64);
    let step = StepSpec::new(Exercise::LayerOrder {
        guide: vec!["bg".into(), "fg".into()],
    })
    .with_constraints(Constraints {
        allowed_tool: Some(ToolKind::Brush),
        size_range_px: Some([2.0, 6.0]),
        locked_color: Some(Color32::RED),
        tool_locked: true,
    });
    canvas.load_step(step);

    assert_eq!(canvas.settings().tool, ToolKind::Brush);
    assert_eq!(canvas.settings().color, Color32::RED);
    assert!(!canvas.set_tool(ToolKind::Pencil));
    assert!(!canvas.set_color(Color32::BLUE));
    assert!(!canvas.set_width(10.0));
    assert!(canvas.set_width(5.0));
    assert_eq!(canvas.settings().width_px, 5.0);

    drag(&mut canvas, &[(1.0, 1.0), (9.0, 9.0)]);
    let (_, stroke) = canvas.document().strokes().iter().next().unwrap();
    assert_eq!(stroke.tool(), ToolKind::Brush);
    assert_eq!(stroke.color(), Color32::RED);
}

#[test]
fn stroke_path_steps_grade_every_stroke() {
    init_logging();
    let mut canvas = CanvasDocument::new(100, 100);
    canvas
        .load_step_json(
            r#"{
                "id": "line-1",
                "type": "stroke-path",
                "constraints": { "allowedTool": "pencil", "sizeRangePx": [2, 8] },
                "guide": [{ "x": 10, "y": 50 }, { "x": 90, "y": 50 }],
                "rubric": { "maxDistancePass": 18, "starThresholds": [8, 14, 22] }
            }"#,
        )
        .unwrap();
    assert_eq!(canvas.step().and_then(|s| s.id.as_deref()), Some("line-1"));
    let events = record(&canvas);

    drag(&mut canvas, &[(10.0, 52.0), (50.0, 51.0), (90.0, 52.0)]);
    drag(&mut canvas, &[(10.0, 80.0), (90.0, 80.0)]);

    assert_eq!(evaluations(&events), vec![("stroke-path", true), ("stroke-path", false)]);
    let stars: Vec<u8> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            CanvasEvent::Evaluated { step_id, result, .. } => {
                assert_eq!(step_id.as_deref(), Some("line-1"));
                Some(result.stars)
            }
            _ => None,
        })
        .collect();
    assert_eq!(stars, vec![3, 0]);
}

#[test]
fn dot_to_dot_grades_once_every_dot_is_tapped() {
    let mut canvas = CanvasDocument::new(100, 100);
    let targets = vec![Point::new(10.0, 10.0), Point::new(60.0, 10.0), Point::new(35.0, 50.0)];
    canvas.load_step(
        StepSpec::new(Exercise::DotToDot {
            guide: targets,
            rubric: DotToDotRubric { tolerance_px: 12.0 },
        })
        .with_constraints(Constraints {
            allowed_tool: Some(ToolKind::Tap),
            ..Constraints::default()
        }),
    );
    let events = record(&canvas);

    tap(&mut canvas, 12.0, 9.0);
    tap(&mut canvas, 58.0, 14.0);
    assert!(evaluations(&events).is_empty());
    tap(&mut canvas, 30.0, 55.0);
    assert_eq!(evaluations(&events), vec![("dot-to-dot", true)]);
    assert_eq!(canvas.taps().len(), 3);
    assert!(canvas.document().strokes().is_empty());

    canvas.reset_taps();
    tap(&mut canvas, 58.0, 14.0);
    tap(&mut canvas, 12.0, 9.0);
    tap(&mut canvas, 30.0, 55.0);
    assert_eq!(evaluations(&events), vec![("dot-to-dot", true), ("dot-to-dot", false)]);
}

#[test]
fn a_drifting_tap_is_not_recorded() {
    let mut canvas = CanvasDocument::new(100, 100);
    assert!(canvas.set_tool(ToolKind::Tap));
    drag(&mut canvas, &[(10.0, 10.0), (40.0, 10.0)]);
    assert!(canvas.taps().is_empty());
    tap(&mut canvas, 10.0, 10.0);
    assert_eq!(canvas.taps(), &[Point::new(10.0, 10.0)]);
}

#[test]
fn a_cancelled_tap_counts_like_a_release() {
    let mut canvas = CanvasDocument::new(100, 100);
    assert!(canvas.set_tool(ToolKind::Tap));
    down(&mut canvas, 10.0, 10.0);
    canvas.handle_input(InputEvent::PointerCancel);
    assert_eq!(canvas.mode(), CanvasMode::Idle);
    assert_eq!(canvas.taps(), &[Point::new(10.0, 10.0)]);
}

#[test]
fn taps_past_the_last_dot_are_dropped() {
    let mut canvas = CanvasDocument::new(100, 100);
    canvas.load_step(
        StepSpec::new(Exercise::DotToDot {
            guide: vec![Point::new(10.0, 10.0), Point::new(60.0, 10.0)],
            rubric: DotToDotRubric { tolerance_px: 12.0 },
        })
        .with_constraints(Constraints {
            allowed_tool: Some(ToolKind::Tap),
            ..Constraints::default()
        }),
    );
    let events = record(&canvas);

    tap(&mut canvas, 10.0, 10.0);
    tap(&mut canvas, 60.0, 10.0);
    tap(&mut canvas, 90.0, 90.0);
    assert_eq!(canvas.taps().len(), 2);
    assert_eq!(evaluations(&events), vec![("dot-to-dot", true)]);

    canvas.reset_taps();
    tap(&mut canvas, 10.0, 10.0);
    assert_eq!(canvas.taps().len(), 1);
}

fn split_canvas_step() -> StepSpec {
    let (w, h) = (20, 20);
    let mut boundary = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
    let mut mask = RgbaImage::new(w, h);
    for y in 0..h {
        boundary.put_pixel(10, y, Rgba([0, 0, 0, 255]));
        for x in 0..10 {
            mask.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    StepSpec::new(Exercise::AreaFill {
        guide: AreaFillGuide {
            mask: PixelBuffer(mask),
            target_hsl: HslColor::new(0.0, 100.0, 50.0),
            tolerance: HslTolerance::new(10.0, 8.0, 8.0),
            boundary: Some(PixelBuffer(boundary)),
        },
        rubric: AreaFillRubric {
            coverage_threshold: 0.95,
            coverage_star_thresholds: None,
        },
    })
}

#[test]
fn fill_tool_floods_inside_the_step_outline() {
    let mut canvas = CanvasDocument::new(20, 20);
    canvas.load_step(split_canvas_step());
    assert_eq!(canvas.evaluate_fill().map(|r| r.pass), Some(false));

    assert!(canvas.set_tool(ToolKind::Fill));
    assert!(canvas.set_color(Color32::RED));
    down(&mut canvas, 3.0, 3.0);
    canvas.handle_input(InputEvent::PointerUp { point: Point::new(3.0, 3.0) });

    assert_eq!(canvas.mode(), CanvasMode::Idle);
    let fill = canvas.document().fill();
    assert_eq!(fill.get_pixel(9, 19).0, [255, 0, 0, 255]);
    assert_eq!(fill.get_pixel(10, 0).0[3], 0);
    assert_eq!(fill.get_pixel(15, 5).0[3], 0);

    let result = canvas.evaluate_fill().unwrap();
    assert!(result.pass);
    assert_eq!(result.stars, 3);
    assert_eq!(result.distance_or_coverage, 1.0);

    canvas.undo();
    assert_eq!(canvas.evaluate_fill().map(|r| r.distance_or_coverage), Some(0.0));
}

#[test]
fn fills_seeded_on_the_outline_do_nothing() {
    let mut canvas = CanvasDocument::new(20, 20);
    canvas.load_step(split_canvas_step());
    assert_eq!(canvas.fill(Point::new(10.0, 4.0), Color32::RED, 1.0), Dispatch::Ignored);
    assert_eq!(canvas.fill(Point::new(40.0, 4.0), Color32::RED, 1.0), Dispatch::Ignored);
    assert!(!canvas.history().can_undo());
}

#[test]
fn host_fills_respect_the_step_constraints() {
    let mut canvas = CanvasDocument::new(20, 20);
    canvas.load_step(split_canvas_step().with_constraints(Constraints {
        locked_color: Some(Color32::RED),
        ..Constraints::default()
    }));
    assert_eq!(canvas.fill(Point::new(3.0, 3.0), Color32::BLUE, 1.0), Dispatch::Ignored);
    assert!(!canvas.history().can_undo());
    assert_eq!(canvas.fill(Point::new(3.0, 3.0), Color32::RED, 1.0), Dispatch::Applied);

    canvas.load_step(split_canvas_step().with_constraints(Constraints {
        allowed_tool: Some(ToolKind::Brush),
        ..Constraints::default()
    }));
    assert_eq!(canvas.fill(Point::new(15.0, 3.0), Color32::RED, 1.0), Dispatch::Ignored);
    assert_eq!(canvas.document().fill().get_pixel(15, 3).0[3], 0);
}

#[test]
fn layer_order_and_missing_steps() {
    let mut canvas = CanvasDocument::new(8, 8);
    let order = ["mid", "bg", "fg"].map(String::from);
    assert_eq!(canvas.evaluate_layer_order(&order), None);

    canvas.load_step(StepSpec::new(Exercise::LayerOrder {
        guide: vec!["bg".into(), "mid".into(), "fg".into()],
    }));
    let result = canvas.evaluate_layer_order(&order).unwrap();
    assert!(!result.pass);
    assert_eq!((result.score, result.stars), (0.0, 0));

    // A fill attempt against a layer-order step fails rather than erroring.
    assert_eq!(canvas.evaluate_fill().map(|r| r.pass), Some(false));
}

#[test]
fn malformed_steps_are_rejected() {
    let mut canvas = CanvasDocument::new(8, 8);
    let err = canvas
        .load_step_json(
            r#"{
                "type": "area-fill",
                "guide": {
                    "mask": { "width": 2, "height": 2, "rgba": [0, 0, 0, 0] },
                    "targetHsl": { "h": 0, "s": 100, "l": 50 },
                    "tolerance": { "h": 10, "s": 8, "l": 8 }
                },
                "rubric": { "coverageThreshold": 0.9 }
            }"#,
        )
        .unwrap_err();
    assert!(matches!(err, StepError::Json(_)));
    assert!(canvas.step().is_none());

    let err = canvas
        .load_step_json(r#"{ "type": "dot-to-dot", "guide": [], "rubric": { "tolerancePx": -1 } }"#)
        .unwrap_err();
    assert!(matches!(err, StepError::InvalidPayload(_)));
}

#[test]
fn snapshots_carry_the_document() {
    let mut canvas = CanvasDocument::new(16, 16);
    let events = record(&canvas);
    drag(&mut canvas, &[(1.0, 1.0), (2.0, 2.0)]);
    canvas.undo();

    let snapshots: Vec<_> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            CanvasEvent::DocumentChanged { snapshot, .. } => Some(snapshot.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].document_id, canvas.id());
    assert_eq!(snapshots[0].state.strokes().len(), 1);
    assert_eq!(snapshots[1].state.strokes().len(), 0);
    assert_eq!(snapshots[1].revision, canvas.revision());
    assert!(snapshots[1].taken_at_ms >= snapshots[0].taken_at_ms);
}

#[test]
fn trace_adherence_uses_the_configured_brightness() {
    let mut canvas = CanvasDocument::new(40, 40);
    let mut outline = RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 255]));
    for x in 0..40 {
        outline.put_pixel(x, 20, Rgba([80, 80, 80, 255]));
    }
    drag(&mut canvas, &[(0.0, 21.0), (20.0, 21.0), (39.0, 21.0)]);
    let (id, _) = canvas.document().strokes().iter().next().unwrap();

    assert_eq!(canvas.trace_adherence(id, &outline, 1), Some(1.0));
    assert_eq!(canvas.trace_adherence(id, &outline, 0), Some(0.0));
    assert_eq!(canvas.trace_adherence(StrokeId(7), &outline, 1), None);
}
