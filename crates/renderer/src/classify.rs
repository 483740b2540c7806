//! Dual-ramp elevation classification around a pivot.
//!
//! Values at or below the pivot fade from white (at the pivot) to green (at
//! the lowest inside value); values above it fade from white to red (at the
//! highest inside value). Each ramp is normalized over its own sub-range.

use relief_common::{ElevationGrid, Mask, ReliefError, ReliefResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::gradient::{Color, ColorRamp};

/// Which ramp a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RampSide {
    BelowPivot,
    AbovePivot,
}

impl RampSide {
    /// The pivot itself belongs to the lower ramp.
    #[inline]
    pub fn of(value: f32, pivot: f32) -> Self {
        if value <= pivot {
            RampSide::BelowPivot
        } else {
            RampSide::AbovePivot
        }
    }
}

/// Classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Elevation separating the two ramps.
    pub pivot: f32,

    /// Color at the pivot, shared by both ramps.
    pub pivot_color: Color,

    /// Color of the lowest value below the pivot.
    pub low_color: Color,

    /// Color of the highest value above the pivot.
    pub high_color: Color,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pivot: 0.0,
            pivot_color: Color::WHITE,
            low_color: Color::GREEN,
            high_color: Color::RED,
        }
    }
}

impl ClassifierConfig {
    /// Load classifier configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RELIEF_PIVOT") {
            if let Ok(pivot) = val.parse() {
                config.pivot = pivot;
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.pivot.is_finite() {
            return Err("pivot must be finite".to_string());
        }
        Ok(())
    }
}

/// Per-cell colors of a classified grid. `None` = not rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    width: usize,
    height: usize,
    colors: Vec<Option<Color>>,
    lower: ColorRamp,
    upper: ColorRamp,
}

impl Classification {
    /// Classification with no colored cell.
    pub fn empty(width: usize, height: usize, config: &ClassifierConfig) -> Self {
        Self {
            width,
            height,
            colors: vec![None; width * height],
            lower: ColorRamp::new(config.pivot, None, config.pivot_color, config.low_color),
            upper: ColorRamp::new(config.pivot, None, config.pivot_color, config.high_color),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.colors[row * self.width + col]
    }

    pub fn colors(&self) -> &[Option<Color>] {
        &self.colors
    }

    pub fn colored_count(&self) -> usize {
        self.colors.iter().filter(|c| c.is_some()).count()
    }

    pub fn ramp(&self, side: RampSide) -> &ColorRamp {
        match side {
            RampSide::BelowPivot => &self.lower,
            RampSide::AbovePivot => &self.upper,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElevationClassifier {
    config: ClassifierConfig,
}

impl ElevationClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Color every valid cell inside `mask`.
    pub fn classify(&self, grid: &ElevationGrid, mask: &Mask) -> ReliefResult<Classification> {
        if !mask.is_congruent(grid) {
            return Err(ReliefError::InvalidGrid(format!(
                "mask is {}x{} but grid is {}x{}",
                mask.width(),
                mask.height(),
                grid.width(),
                grid.height()
            )));
        }

        let pivot = self.config.pivot;
        let mut lowest: Option<f32> = None;
        let mut highest: Option<f32> = None;
        for (&value, &inside) in grid.data().iter().zip(mask.cells()) {
            if !inside || grid.is_nodata(value) {
                continue;
            }
            match RampSide::of(value, pivot) {
                RampSide::BelowPivot => lowest = Some(lowest.map_or(value, |m| m.min(value))),
                RampSide::AbovePivot => highest = Some(highest.map_or(value, |m| m.max(value))),
            }
        }

        let mut classification = Classification::empty(grid.width(), grid.height(), &self.config);
        classification.lower.end = lowest;
        classification.upper.end = highest;

        if lowest.is_none() && highest.is_none() {
            warn!("No valid elevation inside the boundary; nothing to classify");
            return Ok(classification);
        }
        if classification.lower.is_degenerate() && lowest.is_some() {
            warn!(pivot = pivot, "Lower ramp has zero span; cells painted with the pivot color");
        }
        if classification.upper.is_degenerate() && highest.is_some() {
            warn!(pivot = pivot, "Upper ramp has zero span; cells painted with the pivot color");
        }

        let (lower, upper) = (classification.lower, classification.upper);
        for ((color, &value), &inside) in classification
            .colors
            .iter_mut()
            .zip(grid.data())
            .zip(mask.cells())
        {
            if !inside || grid.is_nodata(value) {
                continue;
            }
            *color = Some(match RampSide::of(value, pivot) {
                RampSide::BelowPivot => lower.color(value),
                RampSide::AbovePivot => upper.color(value),
            });
        }

        debug!(
            pivot = pivot,
            lowest = ?lowest,
            highest = ?highest,
            colored = classification.colored_count(),
            "Classified elevation"
        );
        Ok(classification)
    }
}
