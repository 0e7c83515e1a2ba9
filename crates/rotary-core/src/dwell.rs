//! Centre-of-view dwell detection and the modal panels it controls.

use glam::Vec3;

use crate::idle::FadeTween;
use crate::state::OrthoCamera;
use crate::{CENTER_REQUIRED_SEC, CENTER_THRESHOLD, MODAL_FADE_SEC};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DwellEvent {
    /// The point has stayed centred for the required time.
    Entered,
    /// The point left the centre after having entered.
    Exited,
}

/// Watches a world point and reports when it has been held in the middle of
/// the camera view long enough, and when it leaves again.
#[derive(Clone, Debug)]
pub struct CenterDwell {
    pub point: Vec3,
    pub threshold: f32,
    pub required_time: f32,
    timer: f32,
    entered: bool,
}

impl CenterDwell {
    pub fn new(point: Vec3) -> Self {
        Self {
            point,
            threshold: CENTER_THRESHOLD,
            required_time: CENTER_REQUIRED_SEC,
            timer: 0.0,
            entered: false,
        }
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn is_centered(&self, camera: &OrthoCamera) -> bool {
        let vp = camera.world_to_viewport(self.point);
        vp.z > 0.0
            && (vp.x - 0.5).abs() < self.threshold
            && (vp.y - 0.5).abs() < self.threshold
    }

    pub fn tick(&mut self, dt_sec: f32, camera: &OrthoCamera) -> Option<DwellEvent> {
        if self.is_centered(camera) {
            self.timer += dt_sec;
            if self.timer >= self.required_time && !self.entered {
                self.entered = true;
                log::info!("point {:?} centred for {}s", self.point, self.required_time);
                return Some(DwellEvent::Entered);
            }
            return None;
        }
        let was_entered = self.entered;
        self.timer = 0.0;
        self.entered = false;
        if was_entered {
            log::info!("point {:?} left the centre of the view", self.point);
            Some(DwellEvent::Exited)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Modal {
    pub active: bool,
    pub alpha: f32,
    fade: Option<FadeTween>,
}

/// Buttons that open modals, and the modals themselves. While any modal is
/// open every button is unclickable.
#[derive(Clone, Debug)]
pub struct ModalGroup {
    pub fade_duration: f32,
    buttons: Vec<bool>,
    modals: Vec<Modal>,
}

impl ModalGroup {
    pub fn new(count: usize) -> Self {
        Self {
            fade_duration: MODAL_FADE_SEC,
            buttons: vec![true; count],
            modals: vec![Modal::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.modals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modals.is_empty()
    }

    pub fn modal(&self, index: usize) -> Option<&Modal> {
        self.modals.get(index)
    }

    pub fn modals(&self) -> &[Modal] {
        &self.modals
    }

    pub fn button_enabled(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Click on button `index`: show its modal with a fade and lock all
    /// buttons. Ignored while the button is disabled.
    pub fn open(&mut self, index: usize) -> bool {
        if !self.button_enabled(index) {
            return false;
        }
        let duration = self.fade_duration;
        let Some(modal) = self.modals.get_mut(index) else {
            return false;
        };
        modal.active = true;
        modal.alpha = 0.0;
        modal.fade = Some(FadeTween::new(0.0, 1.0, duration));
        self.set_buttons(false);
        true
    }

    /// Close button inside modal `index`.
    pub fn close(&mut self, index: usize) {
        self.set_buttons(true);
        match self.modals.get_mut(index) {
            Some(modal) => {
                modal.active = false;
                modal.fade = None;
            }
            None => log::warn!("no modal at index {index}"),
        }
    }

    /// Hide every modal and unlock every button.
    pub fn reset(&mut self) {
        self.set_buttons(true);
        for modal in &mut self.modals {
            modal.active = false;
            modal.fade = None;
        }
    }

    pub fn tick(&mut self, dt_sec: f32) {
        for modal in &mut self.modals {
            if let Some(fade) = modal.fade.as_mut() {
                let (alpha, done) = fade.step(dt_sec);
                modal.alpha = alpha;
                if done {
                    modal.fade = None;
                }
            }
        }
    }

    fn set_buttons(&mut self, enabled: bool) {
        for b in &mut self.buttons {
            *b = enabled;
        }
    }
}
