use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    config::StyleParameters,
    geometry::{PathSpec, Point, ShapeGeometry, ShapeKind},
    ProgressError, Result,
};

/// RGBA colour with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLUE: Color = Color::rgb(0.0, 122.0 / 255.0, 1.0);
    pub const GRAY: Color = Color::rgb(142.0 / 255.0, 142.0 / 255.0, 147.0 / 255.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the same colour with its alpha replaced by `opacity`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self { a, ..self }
    }

    /// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA`. The leading `#` is optional.
    pub fn from_hex(input: &str) -> Result<Self> {
        let digits = input.trim().trim_start_matches('#');
        let invalid = || ProgressError::InvalidColor(input.to_string());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| -> Result<f32> {
            u8::from_str_radix(&digits[range], 16)
                .map(|value| value as f32 / 255.0)
                .map_err(|_| invalid())
        };

        match digits.len() {
            3 => {
                let mut expanded = [0.0; 3];
                for (index, slot) in expanded.iter_mut().enumerate() {
                    let nibble = u8::from_str_radix(&digits[index..index + 1], 16)
                        .map_err(|_| invalid())?;
                    *slot = (nibble * 17) as f32 / 255.0;
                }
                Ok(Self::rgb(expanded[0], expanded[1], expanded[2]))
            }
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        let byte = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        if byte(self.a) == 255 {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw).map_err(de::Error::custom)
    }
}

/// Drop shadow drawn beneath the fill. A glow is a shadow without offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Color,
    pub radius: f32,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
}

impl Shadow {
    pub fn new(color: Color, radius: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            color,
            radius: radius.max(0.0),
            offset_x,
            offset_y,
        }
    }

    pub fn glow(color: Color, radius: f32) -> Self {
        Self::new(color, radius, 0.0, 0.0)
    }
}

impl Default for Shadow {
    fn default() -> Self {
        Self::new(Color::BLACK, 4.0, 0.0, 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// How a path is stroked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Paint {
    Solid {
        color: Color,
    },
    /// Gradient interpolated along the segment `start -> end`.
    LinearGradient {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    /// Gradient interpolated by angle around `center`, beginning at
    /// `start_angle` and covering `sweep` radians.
    ConicGradient {
        center: Point,
        start_angle: f32,
        sweep: f32,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    pub fn is_gradient(&self) -> bool {
        !matches!(self, Paint::Solid { .. })
    }
}

/// Paint for both paths of an indicator plus the optional shadow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintSpec {
    pub track: Paint,
    pub fill: Paint,
    pub shadow: Option<Shadow>,
}

/// Spreads `colors` evenly over `[0, 1]`.
pub fn gradient_stops(colors: &[Color]) -> Vec<GradientStop> {
    let last = colors.len().saturating_sub(1).max(1) as f32;
    colors
        .iter()
        .enumerate()
        .map(|(index, color)| GradientStop {
            offset: index as f32 / last,
            color: *color,
        })
        .collect()
}

/// Picks the paint for the track and fill paths.
///
/// The track always uses the track colour. The fill uses a gradient whenever
/// at least two gradient colours are configured, independent of progress.
pub fn resolve_paint(kind: &ShapeKind, geometry: &ShapeGeometry, style: &StyleParameters) -> PaintSpec {
    let track = Paint::Solid {
        color: style.track_color,
    };

    let fill = match style.gradient_colors() {
        Some(colors) => gradient_paint(kind, geometry, colors),
        None => Paint::Solid {
            color: style.bar_color,
        },
    };

    PaintSpec {
        track,
        fill,
        shadow: style.shadow,
    }
}

fn gradient_paint(kind: &ShapeKind, geometry: &ShapeGeometry, colors: &[Color]) -> Paint {
    let stops = gradient_stops(colors);
    match kind {
        ShapeKind::Horizontal | ShapeKind::Vertical => {
            // Span the fill itself; an empty fill falls back to the track so
            // the gradient still has a direction.
            let (start, end) = match (&geometry.fill, &geometry.track) {
                (PathSpec::Line { from, to }, _) | (PathSpec::Empty, PathSpec::Line { from, to }) => {
                    (*from, *to)
                }
                _ => (Point::ZERO, Point::ZERO),
            };
            Paint::LinearGradient { start, end, stops }
        }
        ShapeKind::Circular | ShapeKind::Arc { .. } => match &geometry.track {
            PathSpec::Arc(arc) => Paint::ConicGradient {
                center: arc.center,
                start_angle: arc.start_angle,
                sweep: arc.sweep(),
                stops,
            },
            _ => Paint::ConicGradient {
                center: Point::ZERO,
                start_angle: 0.0,
                sweep: 0.0,
                stops,
            },
        },
    }
}
