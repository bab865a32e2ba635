use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    animation::AnimationPolicy,
    geometry::{LineCap, ShapeKind},
    paint::{Color, Shadow},
    Result,
};

/// Stroke width used whenever the configured one is unusable.
pub const DEFAULT_STROKE_WIDTH: f32 = 8.0;

/// Top-level configuration for one indicator instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default)]
    pub shape: ShapeKind,
    #[serde(default)]
    pub style: StyleParameters,
    #[serde(default)]
    pub animation: AnimationPolicy,
}

impl IndicatorConfig {
    pub fn new(shape: ShapeKind, style: StyleParameters, animation: AnimationPolicy) -> Self {
        Self {
            shape,
            style,
            animation,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Visual parameters read by the geometry and paint stages on every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleParameters {
    pub stroke_width: f32,
    pub line_cap: LineCap,
    pub bar_color: Color,
    pub track_color: Color,
    /// Takes precedence over `bar_color` once it holds two or more colours.
    pub gradient: Option<Vec<Color>>,
    pub shadow: Option<Shadow>,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            line_cap: LineCap::Round,
            bar_color: Color::BLUE,
            track_color: Color::GRAY.with_opacity(0.2),
            gradient: None,
            shadow: None,
        }
    }
}

impl StyleParameters {
    pub fn with_stroke_width(mut self, stroke_width: f32) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    pub fn with_line_cap(mut self, line_cap: LineCap) -> Self {
        self.line_cap = line_cap;
        self
    }

    pub fn with_bar_color(mut self, color: Color) -> Self {
        self.bar_color = color;
        self
    }

    pub fn with_track_color(mut self, color: Color) -> Self {
        self.track_color = color;
        self
    }

    pub fn with_gradient(mut self, colors: Vec<Color>) -> Self {
        self.gradient = Some(colors);
        self
    }

    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// The configured stroke width, or [`DEFAULT_STROKE_WIDTH`] when it is not
    /// a positive finite number.
    pub fn effective_stroke_width(&self) -> f32 {
        if self.stroke_width.is_finite() && self.stroke_width > 0.0 {
            self.stroke_width
        } else {
            DEFAULT_STROKE_WIDTH
        }
    }

    /// Gradient colours, only when there are enough of them to blend.
    pub fn gradient_colors(&self) -> Option<&[Color]> {
        self.gradient
            .as_deref()
            .filter(|colors| colors.len() >= 2)
    }
}
