//! Colors and linear color ramps.

use image::Rgba;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Multiply the color channels by `factor` (clamped to [0, 1]); alpha is kept.
    pub fn shaded(self, factor: f64) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f64 * f).round() as u8;
        Color::new(scale(self.r), scale(self.g), scale(self.b), self.a)
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        color.to_rgba()
    }
}

/// Linear color interpolation, `t` clamped to [0, 1].
///
/// `t == 0` returns `from` exactly and `t == 1` returns `to` exactly.
pub fn interpolate_color(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let lerp = |a: u8, b: u8| (a as f32 * t_inv + b as f32 * t).round() as u8;

    Color::new(
        lerp(from.r, to.r),
        lerp(from.g, to.g),
        lerp(from.b, to.b),
        lerp(from.a, to.a),
    )
}

/// Maps the interval between `start` and `end` linearly onto `from`..`to`.
///
/// `start` may be above `end`. A ramp whose interval has zero span, or whose
/// end is unknown, paints everything with `from`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    pub start: f32,
    pub end: Option<f32>,
    pub from: Color,
    pub to: Color,
}

impl ColorRamp {
    pub fn new(start: f32, end: Option<f32>, from: Color, to: Color) -> Self {
        Self { start, end, from, to }
    }

    pub fn span(&self) -> f32 {
        self.end.map(|end| (end - self.start).abs()).unwrap_or(0.0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }

    pub fn color(&self, value: f32) -> Color {
        let span = self.span();
        if span == 0.0 {
            return self.from;
        }
        interpolate_color(self.from, self.to, (value - self.start).abs() / span)
    }
}
