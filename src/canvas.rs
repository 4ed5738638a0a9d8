//! The canvas a learner works on.
//!
//! [`CanvasDocument`] owns the document, its history and the interaction state
//! machine. Every mutation goes through a [`Command`]; mutations requested
//! while a pointer gesture is open are queued and replayed, in order, as soon
//! as the gesture ends.

use egui::{Color32, Pos2};
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::arena::{IdAllocator, StrokeId, TextId};
use crate::command::{Command, CommandHistory};
use crate::config::EngineConfig;
use crate::document::DocumentState;
use crate::error::StepError;
use crate::evaluation::{EvaluationResult, trace_hit_ratio};
use crate::event::{CanvasEvent, CanvasListener, DocumentChange, DocumentSnapshot, EventBus};
use crate::fill::{FillPatch, flood_region};
use crate::ghost::{
    FrameScheduler, FrameStatus, GhostOptions, GhostOutcome, GhostPlayback, GhostPlayer,
    GhostSurface,
};
use crate::input::InputEvent;
use crate::point::Point;
use crate::state::{CanvasMode, CanvasState, Gesture};
use crate::step::{Attempt, Exercise, StepSpec};
use crate::stroke::{MutableStroke, StrokeRef};
use crate::text::{TextItem, TextStyle};
use crate::tool::{Constraints, ToolKind, ToolSettings};

/// A mutation requested while a gesture was open.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    Undo,
    Redo,
    Clear,
    Fill { seed: Point, color: Color32, opacity: f32 },
    AddText(TextItem),
    EditText { id: TextId, content: String },
    MoveText { id: TextId, to: Pos2 },
    StyleText { id: TextId, style: TextStyle },
}

impl DeferredAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Clear => "clear",
            Self::Fill { .. } => "fill",
            Self::AddText(_) => "add-text",
            Self::EditText { .. } => "edit-text",
            Self::MoveText { .. } => "move-text",
            Self::StyleText { .. } => "style-text",
        }
    }
}

/// What became of a mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The document changed
    Applied,
    /// Queued until the open gesture ends
    Deferred,
    /// Nothing to do, or the request was inconsistent
    Ignored,
}

/// One learner's canvas for one step.
///
/// `S` is the surface ghost playbacks are drawn onto; by default the ghost is
/// collected as egui shapes.
pub struct CanvasDocument<S = Vec<egui::Shape>> {
    id: Uuid,
    config: EngineConfig,
    document: DocumentState,
    history: CommandHistory,
    state: CanvasState,
    deferred: Vec<DeferredAction>,
    stroke_ids: IdAllocator<StrokeId>,
    text_ids: IdAllocator<TextId>,
    settings: ToolSettings,
    constraints: Constraints,
    step: Option<StepSpec>,
    taps: Vec<Point>,
    boundary: RgbaImage,
    revision: u64,
    events: EventBus,
    ghost: GhostPlayer<S>,
}

impl<S> std::fmt::Debug for CanvasDocument<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasDocument")
            .field("id", &self.id)
            .field("size", &self.document.size())
            .field("state", &self.state.mode())
            .field("strokes", &self.document.strokes().len())
            .field("texts", &self.document.texts().len())
            .field("history", &self.history.commands().len())
            .field("deferred", &self.deferred.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl CanvasDocument {
    /// A blank canvas with the default configuration, drawing ghosts as egui
    /// shapes.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, EngineConfig::default())
    }

    pub fn with_config(width: u32, height: u32, config: EngineConfig) -> Self {
        Self::with_surface(width, height, config, Vec::new())
    }

    /// Take the ghost segments drawn since the last call.
    pub fn take_ghost_shapes(&mut self) -> Vec<egui::Shape> {
        self.ghost.surface_mut().map(std::mem::take).unwrap_or_default()
    }
}

impl<S: GhostSurface> CanvasDocument<S> {
    pub fn with_surface(width: u32, height: u32, config: EngineConfig, surface: S) -> Self {
        let ghost = GhostPlayer::new(config.frame_interval_ms).with_surface(surface);
        Self::build(width, height, config, ghost)
    }

    /// A canvas that cannot show ghosts; playback requests resolve as skipped.
    pub fn without_surface(width: u32, height: u32, config: EngineConfig) -> Self {
        let ghost = GhostPlayer::new(config.frame_interval_ms);
        Self::build(width, height, config, ghost)
    }

    fn build(width: u32, height: u32, config: EngineConfig, ghost: GhostPlayer<S>) -> Self {
        let id = Uuid::new_v4();
        debug!("Created canvas {id} ({width}x{height})");
        Self {
            id,
            config,
            document: DocumentState::new(width, height),
            history: CommandHistory::new(),
            state: CanvasState::default(),
            deferred: Vec::new(),
            stroke_ids: IdAllocator::new(),
            text_ids: IdAllocator::new(),
            settings: ToolSettings::default(),
            constraints: Constraints::default(),
            step: None,
            taps: Vec::new(),
            boundary: open_boundary(width, height),
            revision: 0,
            events: EventBus::new(),
            ghost,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &DocumentState {
        &self.document
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn mode(&self) -> CanvasMode {
        self.state.mode()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.state.is_gesture_active()
    }

    /// Actions waiting for the open gesture to end.
    pub fn deferred(&self) -> &[DeferredAction] {
        &self.deferred
    }

    /// Points of the stroke being drawn, for live preview.
    pub fn active_stroke(&self) -> Option<&MutableStroke> {
        match self.state.gesture() {
            Some(Gesture::Stroke(stroke)) => Some(stroke),
            _ => None,
        }
    }

    /// Number of document changes so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn step(&self) -> Option<&StepSpec> {
        self.step.as_ref()
    }

    pub fn taps(&self) -> &[Point] {
        &self.taps
    }

    pub fn ghost_surface(&self) -> Option<&S> {
        self.ghost.surface()
    }

    pub fn ghost_surface_mut(&mut self) -> Option<&mut S> {
        self.ghost.surface_mut()
    }

    pub fn subscribe(&self, listener: Box<dyn CanvasListener>) {
        self.events.subscribe(listener);
    }

    /// Switch tools. Returns false, leaving the tool unchanged, when the
    /// step's constraints forbid it.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        if !self.constraints.allows_tool_change(self.settings.tool, tool) {
            warn!("Tool change to {} rejected by constraints", tool.name());
            return false;
        }
        self.settings.tool = tool;
        true
    }

    pub fn set_color(&mut self, color: Color32) -> bool {
        if !self.constraints.allows_color(color) {
            warn!("Color {color:?} rejected by constraints");
            return false;
        }
        self.settings.color = color;
        true
    }

    pub fn set_width(&mut self, width_px: f32) -> bool {
        if !(width_px.is_finite() && width_px > 0.0) || !self.constraints.allows_width(width_px) {
            warn!("Width {width_px} rejected by constraints");
            return false;
        }
        self.settings.width_px = width_px;
        true
    }

    /// Install a step: its constraints, its fill boundary and a fresh tap
    /// sequence. The document and history are left alone.
    pub fn load_step(&mut self, step: StepSpec) {
        let (width, height) = self.document.size();
        self.boundary = match &step.exercise {
            Exercise::AreaFill { guide, .. } => match &guide.boundary {
                Some(boundary) if boundary.0.dimensions() == (width, height) => boundary.0.clone(),
                Some(boundary) => {
                    warn!(
                        "Ignoring {}x{} fill boundary on a {width}x{height} canvas",
                        boundary.0.width(),
                        boundary.0.height()
                    );
                    open_boundary(width, height)
                }
                None => open_boundary(width, height),
            },
            _ => open_boundary(width, height),
        };
        self.constraints = step.constraints.clone();
        self.settings.conform_to(&self.constraints);
        self.taps.clear();
        info!(
            "Canvas {} loaded {} step {}",
            self.id,
            step.exercise.kind_name(),
            step.id.as_deref().unwrap_or("<unnamed>")
        );
        self.step = Some(step);
    }

    /// Parse, validate and install a step payload.
    pub fn load_step_json(&mut self, json: &str) -> Result<(), StepError> {
        let step = StepSpec::from_json_str(json)?;
        self.load_step(step);
        Ok(())
    }

    pub fn unload_step(&mut self) {
        let (width, height) = self.document.size();
        self.step = None;
        self.constraints = Constraints::default();
        self.boundary = open_boundary(width, height);
        self.taps.clear();
    }

    /// Replace the image flood fills are bounded by.
    pub fn set_fill_boundary(&mut self, boundary: RgbaImage) -> bool {
        if boundary.dimensions() != self.document.size() {
            warn!("Fill boundary size does not match the canvas");
            return false;
        }
        self.boundary = boundary;
        true
    }

    pub fn reset_taps(&mut self) {
        self.taps.clear();
    }

    /// Score the fill bitmap against an area-fill step.
    pub fn evaluate_fill(&self) -> Option<EvaluationResult> {
        self.grade(Attempt::Fill(self.document.fill()))
    }

    /// Score a submitted layer order against a layer-order step.
    pub fn evaluate_layer_order(&self, order: &[String]) -> Option<EvaluationResult> {
        self.grade(Attempt::Order(order))
    }

    /// Share of a committed stroke's points that follow a dark outline
    /// within `radius_px`.
    pub fn trace_adherence(&self, id: StrokeId, outline: &RgbaImage, radius_px: u32) -> Option<f32> {
        let stroke = self.document.stroke(id)?;
        Some(trace_hit_ratio(
            outline,
            stroke.points(),
            radius_px,
            self.config.trace_brightness,
        ))
    }

    fn grade(&self, attempt: Attempt<'_>) -> Option<EvaluationResult> {
        let Some(step) = &self.step else {
            debug!("No step loaded; attempt not graded");
            return None;
        };
        let result = step.evaluate(attempt, &self.config);
        info!(
            "{} attempt: pass={} score={:.3} stars={}",
            step.exercise.kind_name(),
            result.pass,
            result.score,
            result.stars
        );
        self.events.emit(CanvasEvent::Evaluated {
            step_id: step.id.clone(),
            exercise: step.exercise.kind_name(),
            result,
        });
        Some(result)
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { point } => self.pointer_down(point),
            InputEvent::PointerMove { point } => self.pointer_move(point),
            InputEvent::PointerUp { point } | InputEvent::PointerLeave { point } => {
                self.end_gesture(Some(point))
            }
            InputEvent::PointerCancel => self.end_gesture(None),
        }
    }

    fn pointer_down(&mut self, point: Point) {
        if self.state.is_gesture_active() {
            debug!("Ignoring pointer down during a gesture");
            return;
        }
        if self.state.is_playing_ghost() {
            self.cancel_ghost();
        }
        if !self.constraints.admits(&self.settings) {
            warn!("Dropping {} input that violates the step constraints", self.settings.tool.name());
            return;
        }

        let tool = self.settings.tool;
        let gesture = match tool {
            _ if tool.draws_strokes() => {
                let mut stroke = MutableStroke::new(&self.settings);
                stroke.add_point(point);
                Gesture::Stroke(stroke)
            }
            ToolKind::Fill => {
                let color = self.settings.color;
                self.fill(point, color, 1.0);
                return;
            }
            ToolKind::Tap => Gesture::Tap { down: point },
            ToolKind::Text => {
                let pos = point.pos();
                let Some(item) = self.document.text_at(pos) else {
                    return;
                };
                Gesture::TextDrag {
                    id: item.id,
                    origin: item.position,
                    grab_offset: item.position - pos,
                    current: item.position,
                }
            }
            _ => return,
        };
        debug!("Starting {} gesture", gesture.name());
        self.transition(CanvasState::GestureActive(gesture));
    }

    fn pointer_move(&mut self, point: Point) {
        match self.state.gesture_mut() {
            Some(Gesture::Stroke(stroke)) => stroke.add_point(point),
            Some(Gesture::TextDrag {
                grab_offset, current, ..
            }) => *current = point.pos() + *grab_offset,
            Some(Gesture::Tap { .. }) | None => {}
        }
    }

    /// Close the open gesture, commit its result, then replay whatever was
    /// deferred while it was open.
    fn end_gesture(&mut self, release: Option<Point>) {
        let gesture = match std::mem::take(&mut self.state) {
            CanvasState::GestureActive(gesture) => gesture,
            other => {
                self.state = other;
                return;
            }
        };
        self.events.emit(CanvasEvent::StateChanged {
            old: CanvasMode::GestureActive,
            new: CanvasMode::Idle,
        });

        match gesture {
            Gesture::Stroke(stroke) => self.finish_stroke(stroke, release),
            Gesture::Tap { down } => self.finish_tap(down, release.unwrap_or(down)),
            Gesture::TextDrag {
                id,
                origin,
                grab_offset,
                current,
            } => {
                let to = release.map_or(current, |p| p.pos() + grab_offset);
                if to != origin {
                    self.apply(Command::MoveText { id, from: origin, to });
                }
            }
        }

        let deferred = std::mem::take(&mut self.deferred);
        if !deferred.is_empty() {
            debug!("Replaying {} deferred action(s)", deferred.len());
        }
        for action in deferred {
            self.run(action);
        }
    }

    fn finish_stroke(&mut self, mut stroke: MutableStroke, release: Option<Point>) {
        if let Some(point) = release {
            if stroke.points().last().is_none_or(|last| last.pos() != point.pos()) {
                stroke.add_point(point);
            }
        }
        if stroke.len() < self.config.min_stroke_points {
            debug!("Discarding stroke with {} point(s)", stroke.len());
            return;
        }
        let Some(stroke) = stroke.freeze() else {
            return;
        };
        let id = self.stroke_ids.allocate();
        if self.apply(Command::AddStroke {
            id,
            stroke: StrokeRef::clone(&stroke),
        }) == Dispatch::Applied
            && matches!(self.step.as_ref().map(|s| &s.exercise), Some(Exercise::StrokePath { .. }))
        {
            self.grade(Attempt::Stroke(stroke.points()));
        }
    }

    fn finish_tap(&mut self, down: Point, up: Point) {
        if down.distance(&up) > self.config.tap_slop_px {
            debug!("Pointer drifted too far for a tap");
            return;
        }
        let target_count = match self.step.as_ref().map(|s| &s.exercise) {
            Some(Exercise::DotToDot { guide, .. }) => guide.len(),
            _ => {
                self.taps.push(up);
                return;
            }
        };
        if self.taps.len() >= target_count {
            debug!("Every dot already tapped; dropping extra tap");
            return;
        }
        self.taps.push(up);
        if self.taps.len() == target_count {
            self.grade(Attempt::Taps(&self.taps));
        }
    }

    pub fn undo(&mut self) -> Dispatch {
        self.dispatch(DeferredAction::Undo)
    }

    pub fn redo(&mut self) -> Dispatch {
        self.dispatch(DeferredAction::Redo)
    }

    /// Wipe strokes, texts and fill as one undoable step.
    pub fn clear(&mut self) -> Dispatch {
        self.dispatch(DeferredAction::Clear)
    }

    /// Flood fill the region around `seed`, bounded by the step's outline.
    /// Rejected when the step forbids the fill tool or locks another color.
    pub fn fill(&mut self, seed: Point, color: Color32, opacity: f32) -> Dispatch {
        if !self.constraints.allows_tool(ToolKind::Fill) || !self.constraints.allows_color(color) {
            warn!("Dropping fill that violates the step constraints");
            return Dispatch::Ignored;
        }
        self.dispatch(DeferredAction::Fill { seed, color, opacity })
    }

    /// Place a text annotation. The id is valid immediately, even when the
    /// insertion itself is deferred.
    pub fn add_text(&mut self, content: impl Into<String>, position: Pos2, style: TextStyle) -> TextId {
        let id = self.text_ids.allocate();
        self.dispatch(DeferredAction::AddText(TextItem::new(id, content, position, style)));
        id
    }

    pub fn edit_text(&mut self, id: TextId, content: impl Into<String>) -> Dispatch {
        self.dispatch(DeferredAction::EditText {
            id,
            content: content.into(),
        })
    }

    pub fn move_text(&mut self, id: TextId, to: Pos2) -> Dispatch {
        self.dispatch(DeferredAction::MoveText { id, to })
    }

    pub fn style_text(&mut self, id: TextId, style: TextStyle) -> Dispatch {
        self.dispatch(DeferredAction::StyleText { id, style })
    }

    fn dispatch(&mut self, action: DeferredAction) -> Dispatch {
        if self.state.is_gesture_active() {
            debug!("Deferring {} until the gesture ends", action.name());
            self.deferred.push(action);
            return Dispatch::Deferred;
        }
        self.run(action)
    }

    fn run(&mut self, action: DeferredAction) -> Dispatch {
        match action {
            DeferredAction::Undo => self.run_undo(),
            DeferredAction::Redo => self.run_redo(),
            DeferredAction::Clear => {
                if self.document.is_blank() {
                    return Dispatch::Ignored;
                }
                let previous = Box::new(self.document.clone());
                self.apply(Command::Clear { previous })
            }
            DeferredAction::Fill { seed, color, opacity } => match self.fill_patch(seed) {
                Some(patch) => self.apply(Command::Fill { patch, color, opacity }),
                None => Dispatch::Ignored,
            },
            DeferredAction::AddText(item) => self.apply(Command::AddText { item }),
            DeferredAction::EditText { id, content } => {
                let Some(item) = self.existing_text(id) else {
                    return Dispatch::Ignored;
                };
                if item.content == content {
                    return Dispatch::Ignored;
                }
                let from = item.content.clone();
                self.apply(Command::EditText { id, from, to: content })
            }
            DeferredAction::MoveText { id, to } => {
                let Some(item) = self.existing_text(id) else {
                    return Dispatch::Ignored;
                };
                if item.position == to {
                    return Dispatch::Ignored;
                }
                let from = item.position;
                self.apply(Command::MoveText { id, from, to })
            }
            DeferredAction::StyleText { id, style } => {
                let Some(item) = self.existing_text(id) else {
                    return Dispatch::Ignored;
                };
                if item.style == style {
                    return Dispatch::Ignored;
                }
                let from = item.style;
                self.apply(Command::StyleText { id, from, to: style })
            }
        }
    }

    fn existing_text(&self, id: TextId) -> Option<&TextItem> {
        let item = self.document.text(id);
        if item.is_none() {
            warn!("Text {id:?} does not exist");
        }
        item
    }

    fn fill_patch(&self, seed: Point) -> Option<FillPatch> {
        let Some(region) = flood_region(seed, &self.boundary, self.config.boundary_brightness) else {
            debug!("Fill at ({}, {}) hit a boundary or left the canvas", seed.x, seed.y);
            return None;
        };
        Some(FillPatch::capture(region, self.document.fill()))
    }

    fn apply(&mut self, command: Command) -> Dispatch {
        let name = command.name();
        match self.history.execute(command, &mut self.document) {
            Ok(()) => {
                self.notify(DocumentChange::Applied(name));
                Dispatch::Applied
            }
            Err(err) => {
                warn!("Skipping {name}: {err}");
                Dispatch::Ignored
            }
        }
    }

    fn run_undo(&mut self) -> Dispatch {
        let Some(name) = self.history.cursor().map(|i| self.history.commands()[i].name()) else {
            return Dispatch::Ignored;
        };
        match self.history.undo(&mut self.document) {
            Ok(true) => {
                self.notify(DocumentChange::Undone(name));
                Dispatch::Applied
            }
            Ok(false) | Err(_) => Dispatch::Ignored,
        }
    }

    fn run_redo(&mut self) -> Dispatch {
        let next = self.history.cursor().map_or(0, |i| i + 1);
        let Some(name) = self.history.commands().get(next).map(Command::name) else {
            return Dispatch::Ignored;
        };
        match self.history.redo(&mut self.document) {
            Ok(true) => {
                self.notify(DocumentChange::Redone(name));
                Dispatch::Applied
            }
            Ok(false) | Err(_) => Dispatch::Ignored,
        }
    }

    fn notify(&mut self, change: DocumentChange) {
        self.revision += 1;
        if self.events.listener_count() == 0 {
            return;
        }
        let snapshot = DocumentSnapshot::capture(self.id, self.revision, &self.document);
        self.events.emit(CanvasEvent::DocumentChanged { change, snapshot });
    }

    fn transition(&mut self, next: CanvasState) -> bool {
        let (old, new) = (self.state.mode(), next.mode());
        if !old.can_transition_to(new) {
            warn!("Invalid canvas transition {old:?} -> {new:?}");
            return false;
        }
        self.state = next;
        self.events.emit(CanvasEvent::StateChanged { old, new });
        true
    }

    /// Replay the loaded step's guide path.
    pub fn play_guide(&mut self, options: GhostOptions, scheduler: &mut dyn FrameScheduler) -> GhostPlayback {
        let path = match self.step.as_ref().map(|s| &s.exercise) {
            Some(Exercise::StrokePath { guide, .. } | Exercise::DotToDot { guide, .. }) => guide.clone(),
            _ => Vec::new(),
        };
        self.play_ghost(&path, options, scheduler)
    }

    /// Replay `path`. Any playback in progress is cancelled. During a gesture
    /// the request resolves as skipped.
    pub fn play_ghost(
        &mut self,
        path: &[Point],
        options: GhostOptions,
        scheduler: &mut dyn FrameScheduler,
    ) -> GhostPlayback {
        if self.state.is_gesture_active() {
            debug!("Ghost requested during a gesture; skipping");
            return GhostPlayback::resolved(self.ghost.generation(), GhostOutcome::Skipped);
        }

        let superseded = match self.state {
            CanvasState::PlayingGhost { generation } => Some(generation),
            _ => None,
        };
        let playback = self.ghost.play(path, options, scheduler);
        if let Some(generation) = superseded {
            self.events.emit(CanvasEvent::GhostFinished {
                generation,
                outcome: GhostOutcome::Cancelled,
            });
        }

        if self.ghost.is_playing() {
            self.transition(CanvasState::PlayingGhost {
                generation: playback.generation(),
            });
        } else {
            if superseded.is_some() {
                self.transition(CanvasState::Idle);
            }
            self.events.emit(CanvasEvent::GhostFinished {
                generation: playback.generation(),
                outcome: GhostOutcome::Skipped,
            });
        }
        playback
    }

    /// Advance a running ghost to `now_ms`.
    pub fn on_frame(&mut self, now_ms: f64, scheduler: &mut dyn FrameScheduler) -> FrameStatus {
        let status = self.ghost.on_frame(now_ms, scheduler);
        if status == FrameStatus::Finished {
            if let CanvasState::PlayingGhost { generation } = self.state {
                self.transition(CanvasState::Idle);
                self.events.emit(CanvasEvent::GhostFinished {
                    generation,
                    outcome: GhostOutcome::Completed,
                });
            }
        }
        status
    }

    /// Stop a running ghost. Returns whether one was playing.
    pub fn cancel_ghost(&mut self) -> bool {
        let CanvasState::PlayingGhost { generation } = self.state else {
            return false;
        };
        self.ghost.cancel();
        self.transition(CanvasState::Idle);
        self.events.emit(CanvasEvent::GhostFinished {
            generation,
            outcome: GhostOutcome::Cancelled,
        });
        true
    }
}

/// A boundary with no outline: fills flood the whole canvas.
fn open_boundary(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}
