//! Idle-triggered overlay: fades a target in after a period without
//! interaction and back out as soon as someone touches the installation.

use glam::Vec3;

use crate::calibration::lerp;
use crate::controller::next_preset;
use crate::prefs::PrefsStore;
use crate::{
    FADE_IN_SEC, FADE_OUT_SEC, FADE_PRESETS, IDLE_ALPHA_TOLERANCE, IDLE_MOVEMENT_THRESHOLD,
    IDLE_TARGET_ALPHA, IDLE_TIME_PRESETS, IDLE_TIME_SEC,
};

pub const KEY_IDLE_TIME: &str = "IdleTime";
pub const KEY_FADE_IN: &str = "FadeIn";
pub const KEY_FADE_OUT: &str = "FadeOut";

/// Linear alpha tween over a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeTween {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    elapsed: f32,
}

impl FadeTween {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` and return the current value and whether it finished.
    pub fn step(&mut self, dt_sec: f32) -> (f32, bool) {
        self.elapsed += dt_sec;
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            return (self.to, true);
        }
        (lerp(self.from, self.to, self.elapsed / self.duration), false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdleSettings {
    pub idle_time: f32,
    pub fade_in: f32,
    pub fade_out: f32,
    pub target_alpha: f32,
    pub movement_threshold: f32,
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            idle_time: IDLE_TIME_SEC,
            fade_in: FADE_IN_SEC,
            fade_out: FADE_OUT_SEC,
            target_alpha: IDLE_TARGET_ALPHA,
            movement_threshold: IDLE_MOVEMENT_THRESHOLD,
        }
    }
}

impl IdleSettings {
    pub fn load(&mut self, prefs: &PrefsStore) {
        if let Some(v) = prefs.get_float(KEY_IDLE_TIME) {
            self.idle_time = v;
        }
        if let Some(v) = prefs.get_float(KEY_FADE_IN) {
            self.fade_in = v;
        }
        if let Some(v) = prefs.get_float(KEY_FADE_OUT) {
            self.fade_out = v;
        }
        log::info!("idle settings loaded");
    }

    pub fn save(&self, prefs: &mut PrefsStore) {
        prefs.set_float(KEY_IDLE_TIME, self.idle_time);
        prefs.set_float(KEY_FADE_IN, self.fade_in);
        prefs.set_float(KEY_FADE_OUT, self.fade_out);
    }

    pub fn cycle_idle_time(&mut self) -> f32 {
        self.idle_time = next_preset(self.idle_time, &IDLE_TIME_PRESETS);
        log::info!("idle time: {}s", self.idle_time);
        self.idle_time
    }

    pub fn cycle_fade_in(&mut self) -> f32 {
        self.fade_in = next_preset(self.fade_in, &FADE_PRESETS);
        log::info!("fade in: {}s", self.fade_in);
        self.fade_in
    }

    pub fn cycle_fade_out(&mut self) -> f32 {
        self.fade_out = next_preset(self.fade_out, &FADE_PRESETS);
        log::info!("fade out: {}s", self.fade_out);
        self.fade_out
    }

    pub fn report(&self) {
        log::info!(
            "idle time: {}s, fade in: {}s, fade out: {}s",
            self.idle_time,
            self.fade_in,
            self.fade_out
        );
    }
}

#[derive(Clone, Debug)]
pub struct IdleFade {
    pub settings: IdleSettings,
    timer: f32,
    last_camera: Option<Vec3>,
    active: bool,
    alpha: f32,
    animations_enabled: bool,
    fade: Option<FadeTween>,
    hide_after_fade: bool,
}

impl IdleFade {
    pub fn new(settings: IdleSettings) -> Self {
        Self {
            settings,
            timer: 0.0,
            last_camera: None,
            active: false,
            alpha: 0.0,
            animations_enabled: false,
            fade: None,
            hide_after_fade: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn idle_seconds(&self) -> f32 {
        self.timer
    }

    /// Whether the overlay's own animations should play.
    pub fn animations_enabled(&self) -> bool {
        self.animations_enabled
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn tick(&mut self, dt_sec: f32, pointer_down: bool, camera_position: Vec3) {
        let mut interaction = pointer_down;
        if let Some(last) = self.last_camera {
            if camera_position.distance(last) > self.settings.movement_threshold {
                interaction = true;
            }
        }
        self.last_camera = Some(camera_position);

        if interaction {
            self.timer = 0.0;
            if self.active {
                self.fade_out();
            }
        } else {
            self.timer += dt_sec;
            let short_of_target =
                self.alpha < self.settings.target_alpha - IDLE_ALPHA_TOLERANCE;
            if self.timer >= self.settings.idle_time && (!self.active || short_of_target) {
                self.active = true;
                self.fade_in();
            }
        }

        self.step_fade(dt_sec);
    }

    fn fading(&self, hiding: bool) -> bool {
        self.fade.is_some() && self.hide_after_fade == hiding
    }

    fn fade_in(&mut self) {
        self.animations_enabled = true;
        let target = self.settings.target_alpha;
        if !self.fading(false) {
            log::debug!("idle for {:.1}s, fading in", self.timer);
            self.fade = Some(FadeTween::new(self.alpha, target, self.settings.fade_in));
            self.hide_after_fade = false;
        }
    }

    fn fade_out(&mut self) {
        self.animations_enabled = false;
        if !self.fading(true) {
            log::debug!("interaction detected, fading out");
            self.fade = Some(FadeTween::new(self.alpha, 0.0, self.settings.fade_out));
            self.hide_after_fade = true;
        }
    }

    fn step_fade(&mut self, dt_sec: f32) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        let (alpha, done) = fade.step(dt_sec);
        self.alpha = alpha;
        if done {
            self.fade = None;
            if self.hide_after_fade {
                self.active = false;
            }
        }
    }
}

impl Default for IdleFade {
    fn default() -> Self {
        Self::new(IdleSettings::default())
    }
}
