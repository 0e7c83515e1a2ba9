//! Small per-tick animation helpers: glow pulsing, fading trails and
//! parallax-style X binding.

use glam::Vec3;

use crate::calibration::lerp;
use crate::motion::ping_pong;
use crate::{GLOW_MAX, GLOW_MIN, GLOW_SPEED, TRAIL_LIFETIME_SEC, TRAIL_SPAWN_INTERVAL_SEC};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowPulse {
    pub speed: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for GlowPulse {
    fn default() -> Self {
        Self {
            speed: GLOW_SPEED,
            min: GLOW_MIN,
            max: GLOW_MAX,
        }
    }
}

impl GlowPulse {
    /// Glow intensity at absolute time `time_sec`.
    pub fn intensity(&self, time_sec: f32) -> f32 {
        ping_pong(time_sec * self.speed, self.max - self.min) + self.min
    }
}

/// One spawned trail element fading out over its lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trail {
    pub position: Vec3,
    pub initial_alpha: f32,
    pub lifetime: f32,
    age: f32,
}

impl Trail {
    pub fn new(position: Vec3, initial_alpha: f32, lifetime: f32) -> Self {
        Self {
            position,
            initial_alpha,
            lifetime,
            age: 0.0,
        }
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn alpha(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        lerp(self.initial_alpha, 0.0, self.age / self.lifetime)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Spawns a [`Trail`] behind a moving object at a fixed interval.
#[derive(Clone, Debug)]
pub struct TrailEmitter {
    pub interval: f32,
    pub offset: Vec3,
    pub lifetime: f32,
    pub initial_alpha: f32,
    timer: f32,
    trails: Vec<Trail>,
}

impl Default for TrailEmitter {
    fn default() -> Self {
        Self {
            interval: TRAIL_SPAWN_INTERVAL_SEC,
            offset: Vec3::ZERO,
            lifetime: TRAIL_LIFETIME_SEC,
            initial_alpha: 1.0,
            timer: 0.0,
            trails: Vec::new(),
        }
    }
}

impl TrailEmitter {
    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    /// Age existing trails, drop the expired ones, then spawn at `position`
    /// once the interval has elapsed.
    pub fn tick(&mut self, dt_sec: f32, position: Vec3) {
        for trail in &mut self.trails {
            trail.age += dt_sec;
        }
        self.trails.retain(|t| !t.is_expired());

        self.timer += dt_sec;
        if self.timer >= self.interval {
            self.trails.push(Trail::new(
                position + self.offset,
                self.initial_alpha,
                self.lifetime,
            ));
            self.timer = 0.0;
        }
    }
}

/// Moves an X coordinate by a fraction of a target's X movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeltaXBinding {
    pub factor: f32,
    previous_target_x: f32,
}

impl DeltaXBinding {
    pub fn new(factor: f32, initial_target_x: f32) -> Self {
        Self {
            factor,
            previous_target_x: initial_target_x,
        }
    }

    /// Returns the follower's new X.
    pub fn apply(&mut self, follower_x: f32, target_x: f32) -> f32 {
        let delta = target_x - self.previous_target_x;
        self.previous_target_x = target_x;
        follower_x + delta * self.factor
    }
}
