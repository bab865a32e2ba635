use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::config::StyleParameters;

const FULL_TURN_DEGREES: f32 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn lerp(&self, other: &Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Axis-aligned rectangle the indicator is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn mid_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height * 0.5
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// Zero, negative or non-finite extents cannot hold a path.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite());
        !finite || self.width <= 0.0 || self.height <= 0.0
    }

    fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Bounds> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for point in iter {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }
        Some(Bounds::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

/// Which indicator is drawn.
///
/// Angles are in degrees measured clockwise from 12 o'clock, so `Circular`
/// is the arc from 0 to 360.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Horizontal,
    Vertical,
    Circular,
    /// Partial circle from `start_angle` to `end_angle`, in degrees.
    /// `end_angle` may exceed 360 to wrap past the top.
    Arc { start_angle: f32, end_angle: f32 },
}

impl ShapeKind {
    pub const DEFAULT_ARC_START: f32 = 180.0;
    pub const DEFAULT_ARC_END: f32 = 360.0;

    pub fn arc(start_angle: f32, end_angle: f32) -> Self {
        ShapeKind::Arc {
            start_angle,
            end_angle,
        }
    }

    /// Start angle and sweep in degrees for the round shapes. Non-finite
    /// angles read as 0 and the sweep never exceeds one turn.
    pub fn angular_span(&self) -> Option<(f32, f32)> {
        match *self {
            ShapeKind::Circular => Some((0.0, FULL_TURN_DEGREES)),
            ShapeKind::Arc {
                start_angle,
                end_angle,
            } => {
                let start = finite_or_zero(start_angle);
                let end = finite_or_zero(end_angle);
                let sweep = (end - start).clamp(-FULL_TURN_DEGREES, FULL_TURN_DEGREES);
                Some((start, sweep))
            }
            ShapeKind::Horizontal | ShapeKind::Vertical => None,
        }
    }
}

/// Converts user-facing degrees (0 at the top, clockwise) to drawing radians.
///
/// Drawing radians start at the positive x-axis of a y-down surface, so
/// increasing angles run clockwise on screen.
pub fn degrees_to_radians(degrees: f32) -> f32 {
    (degrees - 90.0).to_radians()
}

/// Circular arc; it runs clockwise on screen when `end_angle > start_angle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub center: Point,
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl ArcSegment {
    pub fn sweep(&self) -> f32 {
        self.end_angle - self.start_angle
    }

    pub fn sweep_degrees(&self) -> f32 {
        self.sweep().to_degrees()
    }

    pub fn is_clockwise(&self) -> bool {
        self.end_angle >= self.start_angle
    }

    pub fn point_at(&self, angle: f32) -> Point {
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    pub fn length(&self) -> f32 {
        self.radius * self.sweep().abs()
    }

    fn bounding_box(&self) -> Option<Bounds> {
        let (low, high) = if self.is_clockwise() {
            (self.start_angle, self.end_angle)
        } else {
            (self.end_angle, self.start_angle)
        };

        // Extremes sit at the endpoints or at whichever quarter turns the
        // sweep crosses.
        let first_quarter = (low / FRAC_PI_2).ceil() as i32;
        let last_quarter = (high / FRAC_PI_2).floor() as i32;
        let quarters = (first_quarter..=last_quarter).map(|quarter| quarter as f32 * FRAC_PI_2);

        let angles = [low, high].into_iter().chain(quarters);
        Bounds::enclosing(angles.map(|angle| self.point_at(angle)))
    }
}

/// Renderable description of a stroked path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathSpec {
    /// Nothing to draw.
    #[default]
    Empty,
    Line { from: Point, to: Point },
    Arc(ArcSegment),
}

impl PathSpec {
    pub fn is_empty(&self) -> bool {
        matches!(self, PathSpec::Empty)
    }

    /// Stroke length along the centre line.
    pub fn length(&self) -> f32 {
        match self {
            PathSpec::Empty => 0.0,
            PathSpec::Line { from, to } => from.distance(to),
            PathSpec::Arc(arc) => arc.length(),
        }
    }

    pub fn bounding_box(&self) -> Option<Bounds> {
        match self {
            PathSpec::Empty => None,
            PathSpec::Line { from, to } => Bounds::enclosing([*from, *to]),
            PathSpec::Arc(arc) => arc.bounding_box(),
        }
    }

    /// Approximates the path with `segments + 1` evenly spaced points. Lines
    /// only ever need their two endpoints.
    pub fn flatten(&self, segments: usize) -> Vec<Point> {
        match self {
            PathSpec::Empty => Vec::new(),
            PathSpec::Line { from, to } => vec![*from, *to],
            PathSpec::Arc(arc) => {
                let segments = segments.max(1);
                (0..=segments)
                    .map(|step| {
                        let t = step as f32 / segments as f32;
                        arc.point_at(arc.start_angle + arc.sweep() * t)
                    })
                    .collect()
            }
        }
    }
}

/// Track and fill paths for a single render pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeGeometry {
    pub track: PathSpec,
    pub fill: PathSpec,
}

/// Computes the track (full extent) and fill (`progress` of the extent)
/// paths for `kind` laid out in `bounds`.
///
/// Pure function: identical arguments always produce identical output.
/// Degenerate bounds yield empty paths, and a zero progress yields an empty
/// fill.
pub fn shape_geometry(
    kind: &ShapeKind,
    bounds: Bounds,
    progress: f32,
    style: &StyleParameters,
) -> ShapeGeometry {
    if bounds.is_degenerate() {
        return ShapeGeometry::default();
    }

    let progress = unit(progress);
    let stroke = style.effective_stroke_width();

    match kind {
        ShapeKind::Horizontal => {
            let y = bounds.mid_y();
            let from = Point::new(bounds.x + stroke * 0.5, y);
            let to = Point::new(bounds.x + bounds.width - stroke * 0.5, y);
            line_geometry(from, to, progress)
        }
        ShapeKind::Vertical => {
            let x = bounds.mid_x();
            let from = Point::new(x, bounds.y + bounds.height - stroke * 0.5);
            let to = Point::new(x, bounds.y + stroke * 0.5);
            line_geometry(from, to, progress)
        }
        ShapeKind::Circular | ShapeKind::Arc { .. } => {
            let Some((start, sweep)) = kind.angular_span() else {
                return ShapeGeometry::default();
            };
            let radius = bounds.width.min(bounds.height) * 0.5 - stroke * 0.5;
            if radius <= 0.0 {
                return ShapeGeometry::default();
            }

            let track = ArcSegment {
                center: bounds.center(),
                radius,
                start_angle: degrees_to_radians(start),
                end_angle: degrees_to_radians(start + sweep),
            };
            let fill = if progress > 0.0 {
                PathSpec::Arc(ArcSegment {
                    end_angle: track.start_angle + track.sweep() * progress,
                    ..track
                })
            } else {
                PathSpec::Empty
            };

            ShapeGeometry {
                track: PathSpec::Arc(track),
                fill,
            }
        }
    }
}

fn line_geometry(from: Point, to: Point, progress: f32) -> ShapeGeometry {
    // Strokes wider than the bounds leave no room for a line.
    let inverted = (to.x - from.x) < 0.0 || (from.y - to.y) < 0.0;
    if inverted {
        return ShapeGeometry::default();
    }

    let fill = if progress > 0.0 {
        PathSpec::Line {
            from,
            to: from.lerp(&to, progress),
        }
    } else {
        PathSpec::Empty
    };

    ShapeGeometry {
        track: PathSpec::Line { from, to },
        fill,
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn style(stroke_width: f32) -> StyleParameters {
        StyleParameters::default().with_stroke_width(stroke_width)
    }

    fn arc_of(path: &PathSpec) -> ArcSegment {
        match path {
            PathSpec::Arc(arc) => *arc,
            other => panic!("expected an arc, got {other:?}"),
        }
    }

    #[test]
    fn horizontal_track_is_inset_by_half_stroke() {
        let geometry = shape_geometry(
            &ShapeKind::Horizontal,
            Bounds::from_size(200.0, 20.0),
            1.0,
            &style(8.0),
        );

        assert_eq!(
            geometry.track,
            PathSpec::Line {
                from: Point::new(4.0, 10.0),
                to: Point::new(196.0, 10.0),
            }
        );
        assert_eq!(geometry.fill, geometry.track);
    }

    #[test]
    fn horizontal_fill_is_truncated_track() {
        let geometry = shape_geometry(
            &ShapeKind::Horizontal,
            Bounds::from_size(208.0, 20.0),
            0.25,
            &style(8.0),
        );

        assert!((geometry.track.length() - 200.0).abs() < EPS);
        assert!((geometry.fill.length() - 50.0).abs() < EPS);
        match geometry.fill {
            PathSpec::Line { from, to } => {
                assert_eq!(from, Point::new(4.0, 10.0));
                assert!((to.x - 54.0).abs() < EPS);
            }
            other => panic!("unexpected fill {other:?}"),
        }
    }

    #[test]
    fn vertical_fill_grows_from_bottom() {
        let geometry = shape_geometry(
            &ShapeKind::Vertical,
            Bounds::from_size(10.0, 110.0),
            0.5,
            &style(10.0),
        );

        match (geometry.track, geometry.fill) {
            (PathSpec::Line { from: bottom, to: top }, PathSpec::Line { from, to }) => {
                assert_eq!(bottom, Point::new(5.0, 105.0));
                assert_eq!(top, Point::new(5.0, 5.0));
                assert_eq!(from, bottom);
                assert!((to.y - 55.0).abs() < EPS);
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn circular_quarter_spans_ninety_degrees_from_top() {
        let geometry = shape_geometry(
            &ShapeKind::Circular,
            Bounds::from_size(100.0, 120.0),
            0.25,
            &style(10.0),
        );

        let track = arc_of(&geometry.track);
        assert!((track.radius - 45.0).abs() < EPS);
        assert_eq!(track.center, Point::new(50.0, 60.0));
        assert!((track.sweep_degrees() - 360.0).abs() < EPS);

        let fill = arc_of(&geometry.fill);
        assert!((fill.start_angle + FRAC_PI_2).abs() < EPS);
        assert!((fill.sweep_degrees() - 90.0).abs() < EPS);

        let top = fill.point_at(fill.start_angle);
        assert!((top.x - 50.0).abs() < EPS);
        assert!((top.y - 15.0).abs() < EPS);
        // Clockwise on a y-down surface: a quarter turn lands on the right.
        let end = fill.point_at(fill.end_angle);
        assert!((end.x - 95.0).abs() < EPS);
        assert!((end.y - 60.0).abs() < EPS);
    }

    #[test]
    fn arc_half_progress_sweeps_half_the_span() {
        let kind = ShapeKind::arc(0.0, 270.0);
        let geometry = shape_geometry(&kind, Bounds::from_size(100.0, 100.0), 0.5, &style(8.0));

        let track = arc_of(&geometry.track);
        let fill = arc_of(&geometry.fill);
        assert!((track.sweep_degrees() - 270.0).abs() < EPS);
        assert!((fill.sweep_degrees() - 135.0).abs() < EPS);
        assert_eq!(fill.start_angle, track.start_angle);
    }

    #[test]
    fn arc_end_past_full_turn_wraps() {
        let kind = ShapeKind::arc(270.0, 450.0);
        let geometry = shape_geometry(&kind, Bounds::from_size(100.0, 100.0), 1.0, &style(8.0));

        let track = arc_of(&geometry.track);
        assert!((track.sweep_degrees() - 180.0).abs() < EPS);
        assert!((track.start_angle - 180f32.to_radians()).abs() < EPS);
    }

    #[test]
    fn arc_sweep_is_limited_to_one_turn() {
        let kind = ShapeKind::arc(0.0, 1000.0);
        let geometry = shape_geometry(&kind, Bounds::from_size(100.0, 100.0), 1.0, &style(8.0));
        assert!((arc_of(&geometry.track).sweep_degrees() - 360.0).abs() < EPS);
    }

    #[test]
    fn non_finite_angles_read_as_zero() {
        let kind = ShapeKind::arc(f32::NAN, 90.0);
        assert_eq!(kind.angular_span(), Some((0.0, 90.0)));
    }

    #[test]
    fn degenerate_bounds_produce_empty_paths() {
        for kind in [
            ShapeKind::Horizontal,
            ShapeKind::Vertical,
            ShapeKind::Circular,
            ShapeKind::arc(180.0, 360.0),
        ] {
            for bounds in [Bounds::from_size(0.0, 50.0), Bounds::from_size(50.0, 0.0)] {
                let geometry = shape_geometry(&kind, bounds, 0.5, &style(8.0));
                assert!(geometry.track.is_empty(), "{kind:?} {bounds:?}");
                assert!(geometry.fill.is_empty());
            }
        }
    }

    #[test]
    fn stroke_wider_than_circle_is_empty() {
        let geometry = shape_geometry(
            &ShapeKind::Circular,
            Bounds::from_size(10.0, 10.0),
            0.5,
            &style(12.0),
        );
        assert_eq!(geometry, ShapeGeometry::default());
    }

    #[test]
    fn zero_progress_has_no_fill() {
        let geometry = shape_geometry(
            &ShapeKind::Circular,
            Bounds::from_size(100.0, 100.0),
            0.0,
            &style(8.0),
        );
        assert!(!geometry.track.is_empty());
        assert!(geometry.fill.is_empty());
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let bounds = Bounds::from_size(100.0, 10.0);
        let over = shape_geometry(&ShapeKind::Horizontal, bounds, 3.0, &style(4.0));
        let full = shape_geometry(&ShapeKind::Horizontal, bounds, 1.0, &style(4.0));
        assert_eq!(over, full);

        let nan = shape_geometry(&ShapeKind::Horizontal, bounds, f32::NAN, &style(4.0));
        assert!(nan.fill.is_empty());
    }

    #[test]
    fn geometry_is_idempotent() {
        let kind = ShapeKind::arc(180.0, 360.0);
        let bounds = Bounds::new(3.0, 7.0, 120.0, 80.0);
        let style = style(6.0);

        let first = shape_geometry(&kind, bounds, 0.37, &style);
        let second = shape_geometry(&kind, bounds, 0.37, &style);
        assert_eq!(first, second);
    }

    #[test]
    fn arc_bounding_box_covers_crossed_extremes() {
        let arc = ArcSegment {
            center: Point::new(0.0, 0.0),
            radius: 10.0,
            start_angle: degrees_to_radians(270.0),
            end_angle: degrees_to_radians(450.0),
        };
        // Left, top and right of the circle, never below the centre.
        let bounds = PathSpec::Arc(arc).bounding_box().unwrap();
        assert!((bounds.x + 10.0).abs() < EPS);
        assert!((bounds.y + 10.0).abs() < EPS);
        assert!((bounds.width - 20.0).abs() < EPS);
        assert!((bounds.height - 10.0).abs() < EPS);
    }

    #[test]
    fn flatten_walks_the_arc() {
        let arc = ArcSegment {
            center: Point::ZERO,
            radius: 1.0,
            start_angle: 0.0,
            end_angle: std::f32::consts::PI,
        };
        let points = PathSpec::Arc(arc).flatten(4);
        assert_eq!(points.len(), 5);
        assert!((points[2].y - 1.0).abs() < EPS);
        assert!((PathSpec::Arc(arc).length() - std::f32::consts::PI).abs() < EPS);
    }
}
