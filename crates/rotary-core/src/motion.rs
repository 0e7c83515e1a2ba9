use glam::Vec3;

use crate::calibration::lerp;

/// First-order low-pass step toward `target`. The interpolation factor
/// `rate * dt` is clamped to `[0, 1]`.
#[inline]
pub fn smooth_toward(current: f32, target: f32, rate: f32, dt_sec: f32) -> f32 {
    lerp(current, target, rate * dt_sec)
}

/// World units covered by one screen pixel for an orthographic camera.
#[inline]
pub fn units_per_pixel(ortho_size: f32, screen_height: u32) -> Option<f32> {
    if screen_height == 0 || ortho_size <= 0.0 {
        return None;
    }
    Some(ortho_size * 2.0 / screen_height as f32)
}

#[inline]
pub fn snap(value: f32, unit: f32) -> f32 {
    (value / unit).round() * unit
}

/// Round X and Y to the pixel grid; Z is left alone.
pub fn snap_to_pixels(position: Vec3, ortho_size: f32, screen_height: u32) -> Vec3 {
    match units_per_pixel(ortho_size, screen_height) {
        Some(unit) => Vec3::new(snap(position.x, unit), snap(position.y, unit), position.z),
        None => position,
    }
}

/// Triangle wave bouncing between 0 and `length`.
#[inline]
pub fn ping_pong(t: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return 0.0;
    }
    let period = length * 2.0;
    let m = t.rem_euclid(period);
    length - (m - length).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_pong_bounces() {
        assert!((ping_pong(0.0, 5.0) - 0.0).abs() < 1e-6);
        assert!((ping_pong(3.0, 5.0) - 3.0).abs() < 1e-6);
        assert!((ping_pong(7.0, 5.0) - 3.0).abs() < 1e-6);
        assert!((ping_pong(10.0, 5.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_skips_snapping() {
        let p = Vec3::new(0.123, 0.456, 1.0);
        assert_eq!(snap_to_pixels(p, 5.0, 0), p);
    }
}
