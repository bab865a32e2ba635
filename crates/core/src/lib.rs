//! Core library for animated progress indicators.
//!
//! One animation state machine and one stateless geometry provider serve all
//! four indicator shapes (horizontal, vertical, circular and arc). Host
//! toolkits drive a [`ProgressIndicator`] with a clock and receive
//! ready-to-stroke [`Frame`]s through a callback; drawing those frames is
//! left to the host.

pub mod animation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod paint;
pub mod render;
pub mod timeline;

pub use animation::{ease_in_out, AnimationController, AnimationPolicy, AnimationState, Progress};
pub use config::{IndicatorConfig, StyleParameters, DEFAULT_STROKE_WIDTH};
pub use error::{ProgressError, Result};
pub use geometry::{
    degrees_to_radians, shape_geometry, ArcSegment, Bounds, LineCap, PathSpec, Point,
    ShapeGeometry, ShapeKind,
};
pub use paint::{resolve_paint, Color, GradientStop, Paint, PaintSpec, Shadow};
pub use render::{Frame, FrameCallback, ProgressIndicator};
pub use timeline::{Clock, FrameClock, Generation, ScheduledTick, Scheduler, SystemClock};
