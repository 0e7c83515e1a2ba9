//! Encoder calibration and sample-to-world mapping.
//!
//! Samples arrive as text lines from the encoder. Each parsed sample widens a
//! running `[min, max]` window, is normalized through it, and is mapped into
//! a pair of world-space X bounds to produce the camera's target X.

use crate::state::Rect;
use crate::{FALLBACK_HALF_WIDTH, RANGE_EPSILON};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("unable to parse encoder value from message: {0:?}")]
    Unparsable(String),
    #[error("encoder value is not finite: {0:?}")]
    NotFinite(String),
}

/// Parse one line of the wire format: an ASCII decimal number with a `.`
/// decimal point, optionally surrounded by whitespace.
pub fn parse_sample(line: &str) -> Result<f32, SampleError> {
    let trimmed = line.trim();
    let value: f32 = trimmed
        .parse()
        .map_err(|_| SampleError::Unparsable(line.to_string()))?;
    if !value.is_finite() {
        return Err(SampleError::NotFinite(line.to_string()));
    }
    Ok(value)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Observed range of encoder samples.
///
/// Starts empty (`min = +inf`, `max = -inf`) and only ever widens, except
/// through [`CalibrationWindow::collapse_to`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationWindow {
    pub min: f32,
    pub max: f32,
}

impl Default for CalibrationWindow {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl CalibrationWindow {
    pub const EMPTY: Self = Self {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Both ends have seen a real sample.
    pub fn is_initialized(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn range(&self) -> f32 {
        self.max - self.min
    }

    /// Widen the window to include `sample`. Zero is the encoder's
    /// no-signal value and never lowers `min`. Returns `(min_changed,
    /// max_changed)`.
    pub fn observe(&mut self, sample: f32) -> (bool, bool) {
        let mut lowered = false;
        let mut raised = false;
        if sample != 0.0 && sample < self.min {
            self.min = sample;
            lowered = true;
        }
        if sample > self.max {
            self.max = sample;
            raised = true;
        }
        (lowered, raised)
    }

    pub fn collapse_to(&mut self, sample: f32) {
        self.min = sample;
        self.max = sample;
    }

    /// Normalized position of `sample` in the window, `0.5` while the window
    /// has no usable width.
    pub fn normalize(&self, sample: f32) -> f32 {
        if self.range() > RANGE_EPSILON {
            inverse_lerp(self.min, self.max, sample)
        } else {
            0.5
        }
    }
}

/// World-space X limits the camera target is mapped into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryPair {
    pub left: f32,
    pub right: f32,
}

impl BoundaryPair {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Bounds that keep a camera of the given half-width inside `reference`.
    pub fn inset(reference: &Rect, camera_half_width: f32) -> Self {
        Self {
            left: reference.min.x + camera_half_width,
            right: reference.max.x - camera_half_width,
        }
    }

    /// Last-resort window centred on the raw sample.
    pub fn around(sample: f32) -> Self {
        Self {
            left: sample - FALLBACK_HALF_WIDTH,
            right: sample + FALLBACK_HALF_WIDTH,
        }
    }

    pub fn at(&self, t: f32) -> f32 {
        lerp(self.left, self.right, t)
    }
}

/// Per-frame view of the scene the mapper needs to derive bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct MappingContext {
    pub reference_bounds: Option<Rect>,
    pub camera_half_width: Option<f32>,
}

/// Outcome of mapping one sample, mostly useful for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mapped {
    pub sample: f32,
    pub t: f32,
    pub bounds: BoundaryPair,
    pub target_x: f32,
}

/// Owns the calibration window, the boundary override and the current
/// camera target.
#[derive(Clone, Debug)]
pub struct EncoderMapper {
    pub window: CalibrationWindow,
    pub custom_bounds: Option<BoundaryPair>,
    pub invert: bool,
    last_sample: Option<f32>,
    target_x: f32,
}

impl EncoderMapper {
    pub fn new(initial_target_x: f32) -> Self {
        Self {
            window: CalibrationWindow::EMPTY,
            custom_bounds: None,
            invert: false,
            last_sample: None,
            target_x: initial_target_x,
        }
    }

    /// Most recent applied sample, `0` before the first one.
    pub fn last_sample(&self) -> f32 {
        self.last_sample.unwrap_or(0.0)
    }

    pub fn has_sample(&self) -> bool {
        self.last_sample.is_some()
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn set_target_x(&mut self, x: f32) {
        self.target_x = x;
    }

    pub fn resolve_bounds(&self, sample: f32, ctx: &MappingContext) -> BoundaryPair {
        if let Some(custom) = self.custom_bounds {
            return custom;
        }
        match (ctx.reference_bounds, ctx.camera_half_width) {
            (Some(reference), Some(half_width)) => BoundaryPair::inset(&reference, half_width),
            _ => BoundaryPair::around(sample),
        }
    }

    /// Feed one parsed sample through the window and update the target.
    pub fn apply(&mut self, sample: f32, ctx: &MappingContext) -> Mapped {
        self.last_sample = Some(sample);
        let (lowered, raised) = self.window.observe(sample);
        if lowered {
            log::debug!("updated min: {}", self.window.min);
        }
        if raised {
            log::debug!("updated max: {}", self.window.max);
        }

        let t = self.window.normalize(sample);
        let bounds = self.resolve_bounds(sample, ctx);
        let target_x = if self.invert {
            bounds.at(1.0 - t)
        } else {
            bounds.at(t)
        };
        self.target_x = target_x;
        Mapped {
            sample,
            t,
            bounds,
            target_x,
        }
    }

    /// Parse and apply one raw line. Parse failures leave all state untouched.
    pub fn apply_line(&mut self, line: &str, ctx: &MappingContext) -> Result<Mapped, SampleError> {
        let sample = parse_sample(line)?;
        Ok(self.apply(sample, ctx))
    }

    /// Re-zero the window on the most recent sample. Returns `false` when
    /// no sample has arrived yet and the window is left alone.
    pub fn recalibrate(&mut self) -> bool {
        let Some(sample) = self.last_sample else {
            log::warn!("no encoder value received yet; nothing to recalibrate");
            return false;
        };
        self.window.collapse_to(sample);
        log::info!("recalibrated min and max to {sample}");
        true
    }
}
