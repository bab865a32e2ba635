use std::fmt;

use serde::Serialize;

use crate::{
    animation::{AnimationController, AnimationPolicy, Progress},
    config::{IndicatorConfig, StyleParameters},
    geometry::{shape_geometry, Bounds, LineCap, PathSpec, ShapeKind},
    paint::{resolve_paint, PaintSpec},
    timeline::{Clock, SystemClock},
};

/// Everything a renderer needs to draw one frame of an indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub time: f64,
    pub progress: f32,
    pub stroke_width: f32,
    pub line_cap: LineCap,
    pub track: PathSpec,
    pub fill: PathSpec,
    pub paint: PaintSpec,
}

pub type FrameCallback = Box<dyn FnMut(&Frame)>;

/// Host-facing indicator: configuration, animation and the render callback
/// behind one handle. Dropping it cancels any running animation.
pub struct ProgressIndicator<C: Clock = SystemClock> {
    shape: ShapeKind,
    style: StyleParameters,
    bounds: Bounds,
    controller: AnimationController,
    clock: C,
    on_frame: Option<FrameCallback>,
    frames_emitted: u64,
}

impl<C: Clock> ProgressIndicator<C> {
    pub fn new(config: IndicatorConfig, bounds: Bounds, clock: C) -> Self {
        Self {
            shape: config.shape,
            style: config.style,
            bounds,
            controller: AnimationController::new(config.animation),
            clock,
            on_frame: None,
            frames_emitted: 0,
        }
    }

    pub fn configure(&mut self, shape: ShapeKind, style: StyleParameters) {
        self.shape = shape;
        self.style = style;
    }

    pub fn set_policy(&mut self, policy: AnimationPolicy) {
        self.controller.set_policy(policy);
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Registers the callback invoked for every emitted frame, replacing any
    /// previous one.
    pub fn on_frame(&mut self, callback: impl FnMut(&Frame) + 'static) {
        self.on_frame = Some(Box::new(callback));
    }

    /// Forwards an external progress update.
    pub fn set_target(&mut self, progress: f32) {
        let now = self.clock.now();
        if let Some(value) = self.controller.set_target(progress, now) {
            self.emit(value, now);
        }
    }

    /// Progress update that may skip the animation entirely.
    pub fn set_progress(&mut self, progress: f32, animated: bool) {
        let now = self.clock.now();
        if let Some(value) = self.controller.set_progress(progress, animated, now) {
            self.emit(value, now);
        }
    }

    /// Mount hook.
    pub fn start(&mut self) {
        let now = self.clock.now();
        tracing::debug!(shape = ?self.shape, now, "indicator mounted");
        match self.controller.start(now) {
            Some(value) => self.emit(value, now),
            // Draw the starting position before the first tick arrives.
            None => self.emit(self.controller.displayed(), now),
        }
    }

    /// Unmount hook.
    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    /// Frame cadence hook. Returns whether a frame was emitted.
    pub fn frame(&mut self) -> bool {
        let now = self.clock.now();
        match self.controller.tick(now) {
            Some(value) => {
                self.emit(value, now);
                true
            }
            None => false,
        }
    }

    /// Re-emits the current displayed value, e.g. after a resize.
    pub fn render_now(&mut self) {
        let now = self.clock.now();
        self.emit(self.controller.displayed(), now);
    }

    /// Builds the frame for `progress` without touching animation state.
    pub fn render(&self, progress: Progress) -> Frame {
        let geometry = shape_geometry(&self.shape, self.bounds, progress.get(), &self.style);
        let paint = resolve_paint(&self.shape, &geometry, &self.style);
        Frame {
            time: self.clock.now(),
            progress: progress.get(),
            stroke_width: self.style.effective_stroke_width(),
            line_cap: self.style.line_cap,
            track: geometry.track,
            fill: geometry.fill,
            paint,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.controller.is_running()
    }

    pub fn displayed(&self) -> Progress {
        self.controller.displayed()
    }

    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    pub fn shape(&self) -> &ShapeKind {
        &self.shape
    }

    pub fn style(&self) -> &StyleParameters {
        &self.style
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn emit(&mut self, value: Progress, now: f64) {
        if self.on_frame.is_none() {
            return;
        }

        let frame = Frame {
            time: now,
            ..self.render(value)
        };
        if let Some(callback) = self.on_frame.as_mut() {
            callback(&frame);
            self.frames_emitted += 1;
        }
    }
}

impl<C: Clock> Drop for ProgressIndicator<C> {
    fn drop(&mut self) {
        self.controller.cancel();
    }
}

impl<C: Clock> fmt::Debug for ProgressIndicator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressIndicator")
            .field("shape", &self.shape)
            .field("style", &self.style)
            .field("bounds", &self.bounds)
            .field("controller", &self.controller)
            .field("has_callback", &self.on_frame.is_some())
            .field("frames_emitted", &self.frames_emitted)
            .finish()
    }
}
