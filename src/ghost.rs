//! Timed replay of a guide path.
//!
//! The player never waits on its own. The host calls [`GhostPlayer::on_frame`]
//! whenever a frame it asked for through a [`FrameScheduler`] arrives, and the
//! player draws the segments that became due since the previous frame.
//!
//! Unlike a fire-and-forget animation, every playback carries a generation
//! token: starting another playback or calling [`GhostPlayer::cancel`] retires
//! the current one, which then resolves as [`GhostOutcome::Cancelled`] and
//! draws nothing further.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use egui::Color32;
use futures::channel::oneshot;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_FRAME_INTERVAL_MS;
use crate::point::Point;

/// Something a ghost path can be drawn onto, one segment at a time.
pub trait GhostSurface {
    fn draw_segment(&mut self, from: Point, to: Point, options: &GhostOptions);
}

/// Collects the ghost as egui line shapes, ready for `Painter::extend`.
impl GhostSurface for Vec<egui::Shape> {
    fn draw_segment(&mut self, from: Point, to: Point, options: &GhostOptions) {
        self.push(egui::Shape::line_segment(
            [from.pos(), to.pos()],
            egui::Stroke::new(options.width_px, options.color),
        ));
    }
}

/// Asks the host for another animation frame.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

impl FrameScheduler for egui::Context {
    fn request_frame(&mut self) {
        self.request_repaint();
    }
}

/// A scheduler that only counts requests; the host polls it.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    pending: usize,
    total: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one outstanding request, if there is one.
    pub fn take_request(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Requests made over the scheduler's lifetime.
    pub fn total_requests(&self) -> usize {
        self.total
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending += 1;
        self.total += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GhostOptions {
    pub speed_multiplier: f32,
    pub color: Color32,
    pub width_px: f32,
}

impl Default for GhostOptions {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            color: Color32::from_rgba_unmultiplied(120, 120, 120, 160),
            width_px: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostOutcome {
    /// The whole path was drawn
    Completed,
    /// Nothing to play: empty path or no surface
    Skipped,
    /// Superseded by another playback or cancelled explicitly
    Cancelled,
}

/// What a frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// No playback in progress
    Idle,
    /// More frames are needed
    Running,
    /// The playback completed on this frame
    Finished,
}

/// Resolves when its playback completes, is skipped, or is cancelled.
#[derive(Debug)]
pub struct GhostPlayback {
    generation: u64,
    receiver: oneshot::Receiver<GhostOutcome>,
}

impl GhostPlayback {
    /// A playback that never started.
    pub(crate) fn resolved(generation: u64, outcome: GhostOutcome) -> Self {
        let (done, receiver) = oneshot::channel();
        let _ = done.send(outcome);
        Self { generation, receiver }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The outcome, if the playback has already resolved.
    pub fn try_outcome(&mut self) -> Option<GhostOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Some(GhostOutcome::Cancelled),
        }
    }
}

impl Future for GhostPlayback {
    type Output = GhostOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or(GhostOutcome::Cancelled))
    }
}

struct ActivePlayback {
    generation: u64,
    path: Vec<Point>,
    options: GhostOptions,
    total_ms: f64,
    started_ms: Option<f64>,
    drawn_index: usize,
    done: oneshot::Sender<GhostOutcome>,
}

impl ActivePlayback {
    fn resolve(self, outcome: GhostOutcome) {
        // The receiver may have been dropped by a caller that stopped caring.
        let _ = self.done.send(outcome);
    }
}

/// Replays guide paths onto a surface of type `S`.
pub struct GhostPlayer<S> {
    surface: Option<S>,
    frame_interval_ms: f64,
    generation: u64,
    active: Option<ActivePlayback>,
}

impl<S> std::fmt::Debug for GhostPlayer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GhostPlayer")
            .field("has_surface", &self.surface.is_some())
            .field("generation", &self.generation)
            .field("playing", &self.active.is_some())
            .finish()
    }
}

impl<S> Default for GhostPlayer<S> {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL_MS)
    }
}

impl<S> GhostPlayer<S> {
    pub fn new(frame_interval_ms: f64) -> Self {
        Self {
            surface: None,
            frame_interval_ms,
            generation: 0,
            active: None,
        }
    }

    pub fn with_surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn attach_surface(&mut self, surface: S) -> Option<S> {
        self.surface.replace(surface)
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Generation of the most recent playback request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Retire the current playback, if any. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        match self.active.take() {
            Some(active) => {
                debug!("Cancelled ghost playback {}", active.generation);
                active.resolve(GhostOutcome::Cancelled);
                true
            }
            None => false,
        }
    }
}

impl<S: GhostSurface> GhostPlayer<S> {
    /// Start replaying `path`. Any playback already running is cancelled.
    ///
    /// With an empty path or no attached surface the returned playback is
    /// already resolved and no frame is requested.
    pub fn play(
        &mut self,
        path: &[Point],
        options: GhostOptions,
        scheduler: &mut dyn FrameScheduler,
    ) -> GhostPlayback {
        self.cancel();
        let generation = self.generation;
        let (done, receiver) = oneshot::channel();
        let playback = GhostPlayback { generation, receiver };

        if path.is_empty() || self.surface.is_none() {
            debug!("Ghost playback {generation} skipped");
            let _ = done.send(GhostOutcome::Skipped);
            return playback;
        }

        let speed = if options.speed_multiplier.is_finite() && options.speed_multiplier > 0.0 {
            options.speed_multiplier as f64
        } else {
            warn!("Ignoring ghost speed multiplier {}", options.speed_multiplier);
            1.0
        };
        let total_ms = path.len() as f64 * (self.frame_interval_ms / speed);

        self.active = Some(ActivePlayback {
            generation,
            path: path.to_vec(),
            options,
            total_ms,
            started_ms: None,
            drawn_index: 0,
            done,
        });
        debug!(
            "Ghost playback {generation}: {} points over {total_ms:.0}ms",
            path.len()
        );
        scheduler.request_frame();
        playback
    }

    /// Advance the playback to `now_ms`, drawing only the segments that became
    /// due since the previous frame.
    pub fn on_frame(&mut self, now_ms: f64, scheduler: &mut dyn FrameScheduler) -> FrameStatus {
        let (Some(active), Some(surface)) = (self.active.as_mut(), self.surface.as_mut()) else {
            return FrameStatus::Idle;
        };

        let started = *active.started_ms.get_or_insert(now_ms);
        let fraction = if active.total_ms > 0.0 {
            ((now_ms - started) / active.total_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let len = active.path.len();
        let index = ((fraction * len as f64) as usize).min(len - 1);
        for i in active.drawn_index + 1..=index {
            surface.draw_segment(active.path[i - 1], active.path[i], &active.options);
        }
        active.drawn_index = active.drawn_index.max(index);

        if fraction >= 1.0 {
            if let Some(active) = self.active.take() {
                debug!("Ghost playback {} completed", active.generation);
                active.resolve(GhostOutcome::Completed);
            }
            return FrameStatus::Finished;
        }

        scheduler.request_frame();
        FrameStatus::Running
    }
}
