//! The installation scene and its per-frame scheduler.
//!
//! Every behaviour is a plain struct owned here and ticked in a fixed order
//! by [`Installation::tick`]. Collaborators are passed explicitly (the
//! direction zones receive the rotator they steer, the dwell detectors reset
//! the modal group they belong to).

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::controller::{BatchStats, BoundSide, CameraController};
use crate::dwell::{CenterDwell, DwellEvent, ModalGroup};
use crate::effects::{DeltaXBinding, GlowPulse, TrailEmitter};
use crate::idle::{IdleFade, IdleSettings};
use crate::prefs::PrefsStore;
use crate::rotator::{DirectionZone, DirectionZones, WaypointRotator};
use crate::state::{OrthoCamera, Rect, SpriteInstance};
use crate::{MANUAL_MOVE_SPEED, SMOOTHING_RATE_STEP};

// Scene palette
const BACKDROP_COLOR: [f32; 4] = [0.08, 0.10, 0.18, 1.0];
const ZONE_COLOR: [f32; 4] = [0.20, 0.35, 0.55, 0.25];
const HOTSPOT_COLOR: [f32; 4] = [0.85, 0.75, 0.30, 1.0];
const HOTSPOT_LIT_COLOR: [f32; 4] = [1.0, 0.95, 0.60, 1.0];
const GLOBE_COLOR: [f32; 4] = [0.30, 0.60, 0.95, 1.0];
const COMET_COLOR: [f32; 4] = [0.95, 0.95, 1.0, 1.0];
const MODAL_COLOR: [f32; 3] = [0.92, 0.92, 0.88];
const CLOSE_BADGE_COLOR: [f32; 3] = [0.80, 0.25, 0.25];
const OVERLAY_COLOR: [f32; 3] = [0.02, 0.02, 0.05];

const HOTSPOT_SIZE: f32 = 1.2;
const MODAL_SIZE: [f32; 2] = [6.0, 4.0];
const CLOSE_BADGE_SIZE: f32 = 0.6;
const COMET_SIZE: f32 = 0.4;
const TRAIL_SIZE: f32 = 0.25;

/// User-level commands the frontend maps from keys and clicks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Recalibrate,
    ToggleInvert,
    SmoothingUp,
    SmoothingDown,
    ClearCustomBounds,
    SetCustomBounds { left: f32, right: f32 },
    ToggleCustomBounds,
    AdjustBound { side: BoundSide, raise: bool },
    CycleBoundStep,
    SmoothingPreset(f32),
    CycleIdleTime,
    CycleFadeIn,
    CycleFadeOut,
    /// Log the last encoder value and every tunable setting.
    ReportSettings,
}

/// Everything one frame feeds into the scene.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub dt_sec: f32,
    pub time_sec: f32,
    /// Any pointer button held this frame.
    pub pointer_down: bool,
    /// World position of a click released this frame.
    pub click: Option<Vec2>,
    /// Manual horizontal input in `[-1, 1]`.
    pub move_axis: f32,
    pub actions: Vec<Action>,
}

/// Static placement of the scene's objects.
#[derive(Clone, Debug)]
pub struct SceneLayout {
    pub backdrop: Rect,
    pub globe_position: Vec3,
    pub globe_size: f32,
    pub globe_waypoints: Vec<Quat>,
    pub zones: Vec<DirectionZone>,
    pub hotspots: Vec<Vec3>,
    pub comet_start: Vec3,
    pub comet_parallax: f32,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            backdrop: Rect::from_center_size(Vec2::ZERO, Vec2::new(40.0, 10.0)),
            globe_position: Vec3::new(0.0, -2.5, 0.0),
            globe_size: 2.0,
            globe_waypoints: (0..4)
                .map(|i| Quat::from_rotation_y(i as f32 * std::f32::consts::FRAC_PI_2))
                .collect(),
            zones: vec![
                DirectionZone::new(-20.0, -8.0, -1),
                DirectionZone::new(8.0, 20.0, 1),
            ],
            hotspots: vec![
                Vec3::new(-9.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(9.0, 0.0, 0.0),
            ],
            comet_start: Vec3::new(0.0, 3.5, 0.0),
            comet_parallax: 0.5,
        }
    }
}

pub struct Installation {
    pub camera: OrthoCamera,
    pub controller: CameraController,
    pub idle: IdleFade,
    pub globe: WaypointRotator,
    pub zones: DirectionZones,
    pub glow: GlowPulse,
    pub trails: TrailEmitter,
    pub dwell: Vec<CenterDwell>,
    pub modals: ModalGroup,
    layout: SceneLayout,
    comet: Vec3,
    comet_binding: DeltaXBinding,
    last_batch: BatchStats,
}

impl Installation {
    pub fn new(layout: SceneLayout, camera: OrthoCamera) -> Self {
        let controller = CameraController::new(&camera).with_reference_bounds(layout.backdrop);
        let comet_binding = DeltaXBinding::new(layout.comet_parallax, camera.position.x);
        Self {
            controller,
            idle: IdleFade::new(IdleSettings::default()),
            globe: WaypointRotator::new(layout.globe_waypoints.clone()),
            zones: DirectionZones::new(layout.zones.clone()),
            glow: GlowPulse::default(),
            trails: TrailEmitter::default(),
            dwell: layout.hotspots.iter().map(|p| CenterDwell::new(*p)).collect(),
            modals: ModalGroup::new(layout.hotspots.len()),
            comet: layout.comet_start,
            comet_binding,
            layout,
            camera,
            last_batch: BatchStats::default(),
        }
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn last_batch(&self) -> BatchStats {
        self.last_batch
    }

    pub fn comet_position(&self) -> Vec3 {
        self.comet
    }

    pub fn load(&mut self, prefs: &PrefsStore) {
        self.controller.load(prefs);
        self.idle.settings.load(prefs);
    }

    pub fn save(&self, prefs: &mut PrefsStore) {
        self.controller.save(prefs);
        self.idle.settings.save(prefs);
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Recalibrate => {
                self.controller.recalibrate();
            }
            Action::ToggleInvert => {
                let invert = !self.controller.invert();
                self.controller.set_invert(invert);
                log::info!("invert movement: {invert}");
            }
            Action::SmoothingUp => {
                let rate = self.controller.smoothing_rate + SMOOTHING_RATE_STEP;
                self.controller.set_smoothing_rate(rate);
                log::info!("smoothing speed: {:.2}", self.controller.smoothing_rate);
            }
            Action::SmoothingDown => {
                let rate = self.controller.smoothing_rate - SMOOTHING_RATE_STEP;
                self.controller.set_smoothing_rate(rate);
                log::info!("smoothing speed: {:.2}", self.controller.smoothing_rate);
            }
            Action::ClearCustomBounds => self.controller.clear_custom_boundaries(),
            Action::SetCustomBounds { left, right } => {
                self.controller.set_custom_boundaries(left, right)
            }
            Action::ToggleCustomBounds => {
                self.controller.toggle_custom_boundaries(&self.camera);
            }
            Action::AdjustBound { side, raise } => {
                self.controller.adjust_bound(side, raise);
            }
            Action::CycleBoundStep => {
                self.controller.cycle_bound_step();
            }
            Action::SmoothingPreset(rate) => {
                self.controller.set_smoothing_rate(rate);
                log::info!("smoothing speed: {:.2}", self.controller.smoothing_rate);
            }
            Action::CycleIdleTime => {
                self.idle.settings.cycle_idle_time();
            }
            Action::CycleFadeIn => {
                self.idle.settings.cycle_fade_in();
            }
            Action::CycleFadeOut => {
                self.idle.settings.cycle_fade_out();
            }
            Action::ReportSettings => {
                self.controller.report();
                self.idle.settings.report();
            }
        }
    }

    /// Run one frame. `lines` are the raw samples drained from the reader
    /// since the previous frame.
    pub fn tick<I, S>(&mut self, input: &FrameInput, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dt = input.dt_sec.max(0.0);

        self.last_batch = self.controller.process_lines(lines, &self.camera);
        for action in &input.actions {
            self.apply(*action);
        }
        if input.move_axis != 0.0 {
            self.controller
                .nudge_target(input.move_axis.clamp(-1.0, 1.0) * MANUAL_MOVE_SPEED * dt);
        }
        self.controller.update(&mut self.camera, dt);

        self.zones.update(self.camera.position.x, &mut self.globe);
        self.globe.tick(dt);

        self.comet.x = self.comet_binding.apply(self.comet.x, self.camera.position.x);
        self.trails.tick(dt, self.comet);

        let mut exited = false;
        for dwell in &mut self.dwell {
            if dwell.tick(dt, &self.camera) == Some(DwellEvent::Exited) {
                exited = true;
            }
        }
        if exited {
            self.modals.reset();
        }
        if let Some(click) = input.click {
            self.handle_click(click);
        }
        self.modals.tick(dt);

        self.idle.tick(dt, input.pointer_down, self.camera.position);

        self.controller.late_update(&mut self.camera);
    }

    /// Panel rect of modal `index`, centred under its hotspot at the
    /// camera's height.
    pub fn modal_rect(&self, index: usize) -> Option<Rect> {
        let hotspot = self.layout.hotspots.get(index)?;
        Some(Rect::from_center_size(
            Vec2::new(hotspot.x, self.camera.position.y),
            Vec2::from(MODAL_SIZE),
        ))
    }

    /// Close badge of modal `index`, centred on the panel's top-right corner.
    pub fn modal_close_rect(&self, index: usize) -> Option<Rect> {
        let panel = self.modal_rect(index)?;
        Some(Rect::from_center_size(
            panel.top_right(),
            Vec2::splat(CLOSE_BADGE_SIZE),
        ))
    }

    fn handle_click(&mut self, world: Vec2) {
        // While a modal is open only its close badge reacts.
        if let Some(open) = self.modals.modals().iter().position(|m| m.active) {
            if self.modal_close_rect(open).is_some_and(|r| r.contains(world)) {
                self.modals.close(open);
                log::debug!("closed modal {open}");
            }
            return;
        }
        let hit = self
            .layout
            .hotspots
            .iter()
            .position(|h| hotspot_rect(*h).contains(world));
        if let Some(index) = hit {
            if self.modals.open(index) {
                log::debug!("opened modal {index}");
            }
        }
    }

    /// Build the draw list, back to front.
    pub fn draw_list(&self, time_sec: f32) -> Vec<SpriteInstance> {
        let mut out = Vec::with_capacity(16 + self.trails.trails().len());
        let backdrop = self.layout.backdrop;
        out.push(SpriteInstance::new(
            backdrop.center().extend(-1.0),
            backdrop.size(),
            BACKDROP_COLOR,
        ));
        for zone in self.zones.zones() {
            let center = Vec2::new((zone.min_x + zone.max_x) * 0.5, backdrop.center().y);
            let size = Vec2::new(zone.max_x - zone.min_x, backdrop.size().y);
            out.push(SpriteInstance::new(center.extend(-0.9), size, ZONE_COLOR));
        }
        for (hotspot, dwell) in self.layout.hotspots.iter().zip(&self.dwell) {
            let color = if dwell.is_entered() {
                HOTSPOT_LIT_COLOR
            } else {
                HOTSPOT_COLOR
            };
            out.push(SpriteInstance::new(*hotspot, Vec2::splat(HOTSPOT_SIZE), color));
        }

        let (yaw, _, _) = self.globe.rotation.to_euler(EulerRot::YXZ);
        out.push(
            SpriteInstance::new(
                self.layout.globe_position,
                Vec2::splat(self.layout.globe_size),
                GLOBE_COLOR,
            )
            .with_rotation(yaw)
            .with_glow(self.glow.intensity(time_sec)),
        );

        for trail in self.trails.trails() {
            let mut color = COMET_COLOR;
            color[3] = trail.alpha();
            out.push(SpriteInstance::new(trail.position, Vec2::splat(TRAIL_SIZE), color));
        }
        out.push(SpriteInstance::new(self.comet, Vec2::splat(COMET_SIZE), COMET_COLOR));

        for (index, modal) in self.modals.modals().iter().enumerate() {
            if !modal.active {
                continue;
            }
            let (Some(panel), Some(badge)) = (self.modal_rect(index), self.modal_close_rect(index))
            else {
                continue;
            };
            out.push(SpriteInstance::new(
                panel.center().extend(0.5),
                panel.size(),
                [MODAL_COLOR[0], MODAL_COLOR[1], MODAL_COLOR[2], modal.alpha],
            ));
            out.push(SpriteInstance::new(
                badge.center().extend(0.6),
                badge.size(),
                [
                    CLOSE_BADGE_COLOR[0],
                    CLOSE_BADGE_COLOR[1],
                    CLOSE_BADGE_COLOR[2],
                    modal.alpha,
                ],
            ));
        }

        if self.idle.is_active() {
            let view = Vec2::new(self.camera.half_width(), self.camera.ortho_size) * 2.0;
            let glow = if self.idle.animations_enabled() {
                self.glow.intensity(time_sec) * 0.1
            } else {
                0.0
            };
            out.push(
                SpriteInstance::new(
                    self.camera.position.truncate().extend(1.0),
                    view,
                    [
                        OVERLAY_COLOR[0],
                        OVERLAY_COLOR[1],
                        OVERLAY_COLOR[2],
                        self.idle.alpha(),
                    ],
                )
                .with_glow(glow),
            );
        }
        out
    }
}

fn hotspot_rect(center: Vec3) -> Rect {
    Rect::from_center_size(center.truncate(), Vec2::splat(HOTSPOT_SIZE))
}
