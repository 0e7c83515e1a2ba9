use glam::Quat;

use crate::{ROTATION_SMOOTHNESS, ROTATION_SPEED};

/// Rotates an object along an ordered list of waypoint orientations. The
/// direction (`-1`, `0`, `1`) is set from outside, typically by
/// [`DirectionZones`].
#[derive(Clone, Debug)]
pub struct WaypointRotator {
    pub waypoints: Vec<Quat>,
    pub speed: f32,
    pub smoothness: f32,
    pub rotation: Quat,
    direction: i32,
    progress: f32,
}

impl WaypointRotator {
    pub fn new(waypoints: Vec<Quat>) -> Self {
        let rotation = waypoints.first().copied().unwrap_or(Quat::IDENTITY);
        Self {
            waypoints,
            speed: ROTATION_SPEED,
            smoothness: ROTATION_SMOOTHNESS,
            rotation,
            direction: 0,
            progress: 0.0,
        }
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn set_direction(&mut self, direction: i32) {
        self.direction = direction.signum();
    }

    /// Orientation along the path at `progress` in `[0, 1]`.
    pub fn target_rotation(&self, progress: f32) -> Quat {
        match self.waypoints.len() {
            0 => self.rotation,
            1 => self.waypoints[0],
            n => {
                let exact = progress.clamp(0.0, 1.0) * (n - 1) as f32;
                let a = (exact.floor() as usize).min(n - 1);
                let b = (a + 1).min(n - 1);
                let t = exact - a as f32;
                self.waypoints[a].slerp(self.waypoints[b], t)
            }
        }
    }

    pub fn tick(&mut self, dt_sec: f32) {
        self.progress =
            (self.progress + self.direction as f32 * self.speed * dt_sec).clamp(0.0, 1.0);
        let target = self.target_rotation(self.progress);
        let t = (self.smoothness * dt_sec).clamp(0.0, 1.0);
        self.rotation = self.rotation.slerp(target, t).normalize();
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionZone {
    pub min_x: f32,
    pub max_x: f32,
    pub direction: i32,
}

impl DirectionZone {
    pub fn new(min_x: f32, max_x: f32, direction: i32) -> Self {
        Self {
            min_x,
            max_x,
            direction,
        }
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }
}

/// X-interval triggers that steer a [`WaypointRotator`]. Entering a zone
/// sets the zone's direction; leaving it resets the direction to 0.
#[derive(Clone, Debug, Default)]
pub struct DirectionZones {
    zones: Vec<DirectionZone>,
    inside: Vec<bool>,
}

impl DirectionZones {
    pub fn new(zones: Vec<DirectionZone>) -> Self {
        let inside = vec![false; zones.len()];
        Self { zones, inside }
    }

    pub fn zones(&self) -> &[DirectionZone] {
        &self.zones
    }

    /// Check `camera_x` against every zone and forward the transitions to
    /// `rotator`. Exits are applied before enters so a hand-off between
    /// adjacent zones ends on the new zone's direction.
    pub fn update(&mut self, camera_x: f32, rotator: &mut WaypointRotator) {
        let mut entered = Vec::new();
        for (zone, inside) in self.zones.iter().zip(self.inside.iter_mut()) {
            let now = zone.contains(camera_x);
            if now == *inside {
                continue;
            }
            *inside = now;
            if now {
                entered.push(zone.direction);
            } else {
                log::debug!("left zone {:?}", zone);
                rotator.set_direction(0);
            }
        }
        for direction in entered {
            log::debug!("entered zone, rotating {direction}");
            rotator.set_direction(direction);
        }
    }
}
