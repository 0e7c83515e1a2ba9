//! Frame-thread side of the encoder camera: drains raw lines, maps them to a
//! target X, smooths the camera toward it and snaps it to the pixel grid.

use crate::calibration::{BoundaryPair, EncoderMapper, MappingContext};
use crate::motion::{smooth_toward, snap_to_pixels};
use crate::prefs::PrefsStore;
use crate::state::{OrthoCamera, Rect};
use crate::{
    BOUND_STEPS, DEFAULT_BAUD_RATE, DEFAULT_PORT_NAME, DEFAULT_SMOOTHING_RATE, SMOOTHING_RATE_MAX,
};

pub const KEY_SERIAL_PORT: &str = "SerialPort";
pub const KEY_CUSTOM_LEFT_BOUND: &str = "CustomLeftBound";
pub const KEY_CUSTOM_RIGHT_BOUND: &str = "CustomRightBound";
pub const KEY_DYNAMIC_ENCODER_MIN: &str = "DynamicEncoderMin";
pub const KEY_DYNAMIC_ENCODER_MAX: &str = "DynamicEncoderMax";
pub const KEY_SMOOTHING_SPEED: &str = "SmoothingSpeed";
pub const KEY_INVERT_MOTION: &str = "InvertMotion";

/// The preset after `current` in `presets`, wrapping around. Values that are
/// not a preset go to the first one.
pub fn next_preset(current: f32, presets: &[f32]) -> f32 {
    let Some(&first) = presets.first() else {
        return current;
    };
    match presets.iter().position(|p| (p - current).abs() < 1e-4) {
        Some(i) => presets[(i + 1) % presets.len()],
        None => first,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundSide {
    Left,
    Right,
}

/// Counters for one drained batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub applied: usize,
    pub rejected: usize,
}

#[derive(Clone, Debug)]
pub struct CameraController {
    pub port_name: String,
    pub baud_rate: u32,
    pub smoothing_rate: f32,
    /// Bounds of the reference sprite the camera must stay inside.
    pub reference_bounds: Option<Rect>,
    /// Increment used by [`CameraController::adjust_bound`]; not persisted.
    bound_step: f32,
    mapper: EncoderMapper,
}

impl CameraController {
    pub fn new(camera: &OrthoCamera) -> Self {
        Self {
            port_name: DEFAULT_PORT_NAME.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            smoothing_rate: DEFAULT_SMOOTHING_RATE,
            reference_bounds: None,
            bound_step: BOUND_STEPS[0],
            mapper: EncoderMapper::new(camera.position.x),
        }
    }

    pub fn with_reference_bounds(mut self, bounds: Rect) -> Self {
        self.reference_bounds = Some(bounds);
        self
    }

    pub fn mapper(&self) -> &EncoderMapper {
        &self.mapper
    }

    pub fn target_x(&self) -> f32 {
        self.mapper.target_x()
    }

    pub fn last_sample(&self) -> f32 {
        self.mapper.last_sample()
    }

    pub fn invert(&self) -> bool {
        self.mapper.invert
    }

    pub fn custom_bounds(&self) -> Option<BoundaryPair> {
        self.mapper.custom_bounds
    }

    pub fn mapping_context(&self, camera: &OrthoCamera) -> MappingContext {
        MappingContext {
            reference_bounds: self.reference_bounds,
            camera_half_width: Some(camera.half_width()),
        }
    }

    /// Map every drained line in order. Unparsable lines are logged and
    /// skipped without touching calibration.
    pub fn process_lines<I, S>(&mut self, lines: I, camera: &OrthoCamera) -> BatchStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ctx = self.mapping_context(camera);
        let mut stats = BatchStats::default();
        for line in lines {
            let line = line.as_ref();
            log::debug!(
                "received: {line:?} min: {} max: {}",
                self.mapper.window.min,
                self.mapper.window.max
            );
            match self.mapper.apply_line(line, &ctx) {
                Ok(mapped) => {
                    log::trace!(
                        "target x {} (t {}, bounds {:?})",
                        mapped.target_x,
                        mapped.t,
                        mapped.bounds
                    );
                    stats.applied += 1;
                }
                Err(e) => {
                    log::warn!("{e}");
                    stats.rejected += 1;
                }
            }
        }
        stats
    }

    /// Smoothing step: move the camera X toward the target.
    pub fn update(&self, camera: &mut OrthoCamera, dt_sec: f32) {
        camera.position.x =
            smooth_toward(camera.position.x, self.mapper.target_x(), self.smoothing_rate, dt_sec);
    }

    /// Pixel snap; must run after [`CameraController::update`].
    pub fn late_update(&self, camera: &mut OrthoCamera) {
        camera.position = snap_to_pixels(camera.position, camera.ortho_size, camera.screen_height);
    }

    /// Shift the target directly, used for manual keyboard control.
    pub fn nudge_target(&mut self, dx: f32) {
        let x = self.mapper.target_x() + dx;
        self.mapper.set_target_x(x);
    }

    pub fn recalibrate(&mut self) -> bool {
        self.mapper.recalibrate()
    }

    pub fn set_custom_boundaries(&mut self, left: f32, right: f32) {
        self.mapper.custom_bounds = Some(BoundaryPair::new(left, right));
        log::info!("custom boundaries set. left: {left}, right: {right}");
    }

    pub fn clear_custom_boundaries(&mut self) {
        if self.mapper.custom_bounds.take().is_some() {
            log::info!("custom boundaries cleared");
        }
    }

    /// Enable the override if it is off, seeded from the bounds currently in
    /// effect so the target does not jump; disable it otherwise. Returns
    /// whether the override is now enabled.
    pub fn toggle_custom_boundaries(&mut self, camera: &OrthoCamera) -> bool {
        if self.mapper.custom_bounds.is_some() {
            self.clear_custom_boundaries();
            return false;
        }
        let ctx = self.mapping_context(camera);
        let seed = self.mapper.resolve_bounds(self.mapper.last_sample(), &ctx);
        self.set_custom_boundaries(seed.left, seed.right);
        true
    }

    pub fn bound_step(&self) -> f32 {
        self.bound_step
    }

    pub fn cycle_bound_step(&mut self) -> f32 {
        self.bound_step = next_preset(self.bound_step, &BOUND_STEPS);
        log::info!("boundary step: {}", self.bound_step);
        self.bound_step
    }

    /// Move one custom boundary by the current step. Returns the new value,
    /// or `None` while the override is disabled.
    pub fn adjust_bound(&mut self, side: BoundSide, raise: bool) -> Option<f32> {
        let delta = if raise { self.bound_step } else { -self.bound_step };
        let Some(bounds) = self.mapper.custom_bounds.as_mut() else {
            log::warn!("custom boundaries are disabled; enable them before adjusting");
            return None;
        };
        let value = match side {
            BoundSide::Left => &mut bounds.left,
            BoundSide::Right => &mut bounds.right,
        };
        *value += delta;
        log::info!("{side:?} boundary: {:.2}", *value);
        Some(*value)
    }

    pub fn set_smoothing_rate(&mut self, rate: f32) {
        self.smoothing_rate = rate.clamp(0.0, SMOOTHING_RATE_MAX);
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.mapper.invert = invert;
    }

    /// Record a new port name. Returns `false` (and changes nothing) when it
    /// is the port already in use; the caller reopens the link otherwise.
    pub fn request_port(&mut self, name: &str) -> bool {
        if name == self.port_name {
            log::warn!("port {name} is already in use. no changes made.");
            return false;
        }
        self.port_name = name.to_string();
        log::info!("changing port to: {name}");
        true
    }

    /// Log the current encoder and camera settings.
    pub fn report(&self) {
        if self.mapper.has_sample() {
            log::info!("last encoder value: {}", self.mapper.last_sample());
        } else {
            log::info!("last encoder value: none received");
        }
        log::info!(
            "port: {} at {} baud, invert: {}, smoothing: {:.2}",
            self.port_name,
            self.baud_rate,
            self.mapper.invert,
            self.smoothing_rate
        );
        match self.mapper.custom_bounds {
            Some(b) => log::info!(
                "custom boundaries: left {:.2}, right {:.2}, step {}",
                b.left,
                b.right,
                self.bound_step
            ),
            None => log::info!("custom boundaries: disabled"),
        }
    }

    /// Apply persisted settings over the current values.
    pub fn load(&mut self, prefs: &PrefsStore) {
        if let Some(port) = prefs.get_string(KEY_SERIAL_PORT) {
            self.port_name = port.to_string();
        }
        let left = prefs.get_float(KEY_CUSTOM_LEFT_BOUND);
        let right = prefs.get_float(KEY_CUSTOM_RIGHT_BOUND);
        if left.is_some() || right.is_some() {
            let current = self.mapper.custom_bounds.unwrap_or(BoundaryPair::new(0.0, 0.0));
            self.mapper.custom_bounds = Some(BoundaryPair::new(
                left.unwrap_or(current.left),
                right.unwrap_or(current.right),
            ));
        }
        if let Some(min) = prefs.get_float(KEY_DYNAMIC_ENCODER_MIN) {
            self.mapper.window.min = min;
        }
        if let Some(max) = prefs.get_float(KEY_DYNAMIC_ENCODER_MAX) {
            self.mapper.window.max = max;
        }
        if let Some(rate) = prefs.get_float(KEY_SMOOTHING_SPEED) {
            self.smoothing_rate = rate;
        }
        if let Some(invert) = prefs.get_int(KEY_INVERT_MOTION) {
            self.mapper.invert = invert == 1;
        }
        log::info!("camera settings loaded");
    }

    /// Write the current settings back. The boundary keys exist only while
    /// the override is enabled; an empty calibration window is not stored.
    pub fn save(&self, prefs: &mut PrefsStore) {
        prefs.set_string(KEY_SERIAL_PORT, self.port_name.clone());
        match self.mapper.custom_bounds {
            Some(bounds) => {
                prefs.set_float(KEY_CUSTOM_LEFT_BOUND, bounds.left);
                prefs.set_float(KEY_CUSTOM_RIGHT_BOUND, bounds.right);
            }
            None => {
                prefs.remove(KEY_CUSTOM_LEFT_BOUND);
                prefs.remove(KEY_CUSTOM_RIGHT_BOUND);
            }
        }
        prefs.set_float(KEY_DYNAMIC_ENCODER_MIN, self.mapper.window.min);
        prefs.set_float(KEY_DYNAMIC_ENCODER_MAX, self.mapper.window.max);
        prefs.set_float(KEY_SMOOTHING_SPEED, self.smoothing_rate);
        prefs.set_int(KEY_INVERT_MOTION, i32::from(self.mapper.invert));
    }
}
