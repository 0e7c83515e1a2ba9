// Scene behaviours: idle fade, waypoint rotation, trails, glow, dwell and
// modals, and the full installation tick.

use glam::{Quat, Vec2, Vec3};
use rotary_core::dwell::{CenterDwell, DwellEvent, ModalGroup};
use rotary_core::effects::{DeltaXBinding, GlowPulse, TrailEmitter};
use rotary_core::idle::{FadeTween, IdleFade, IdleSettings};
use rotary_core::rotator::{DirectionZone, DirectionZones, WaypointRotator};
use rotary_core::{
    next_preset, Action, BoundSide, FrameInput, Installation, OrthoCamera, SceneLayout,
    FADE_PRESETS,
};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() < eps
}

fn frame(dt: f32) -> FrameInput {
    FrameInput {
        dt_sec: dt,
        ..Default::default()
    }
}

const NO_LINES: [&str; 0] = [];

#[test]
fn fade_tween_reaches_target() {
    let mut tween = FadeTween::new(0.0, 1.0, 2.0);
    assert_eq!(tween.step(0.5), (0.25, false));
    assert_eq!(tween.step(1.5), (1.0, true));
    let mut instant = FadeTween::new(1.0, 0.0, 0.0);
    assert_eq!(instant.step(0.0), (0.0, true));
}

#[test]
fn idle_fades_in_then_out_on_interaction() {
    let mut idle = IdleFade::new(IdleSettings::default());
    let cam = Vec3::new(0.0, 0.0, 10.0);
    for _ in 0..4 {
        idle.tick(1.0, false, cam);
    }
    assert!(!idle.is_active());
    assert_eq!(idle.alpha(), 0.0);

    // 5s idle: fade-in starts and, with a 1s fade, completes in the same tick.
    idle.tick(1.0, false, cam);
    assert!(idle.is_active());
    assert!(idle.animations_enabled());
    assert!(approx(idle.alpha(), 1.0, 1e-6));

    idle.tick(0.5, true, cam);
    assert_eq!(idle.idle_seconds(), 0.0);
    assert!(idle.is_active());
    assert!(!idle.animations_enabled());
    assert!(approx(idle.alpha(), 0.5, 1e-6));

    idle.tick(0.5, false, cam);
    assert!(!idle.is_active());
    assert_eq!(idle.alpha(), 0.0);
}

#[test]
fn camera_movement_counts_as_interaction() {
    let mut idle = IdleFade::default();
    idle.tick(3.0, false, Vec3::ZERO);
    idle.tick(1.0, false, Vec3::ZERO);
    assert!(approx(idle.idle_seconds(), 4.0, 1e-6));
    idle.tick(1.0, false, Vec3::new(0.5, 0.0, 0.0));
    assert_eq!(idle.idle_seconds(), 0.0);
    // Sub-threshold drift is ignored.
    idle.tick(1.0, false, Vec3::new(0.505, 0.0, 0.0));
    assert!(approx(idle.idle_seconds(), 1.0, 1e-6));
}

#[test]
fn fade_in_is_not_restarted_every_tick() {
    let settings = IdleSettings {
        idle_time: 1.0,
        fade_in: 4.0,
        ..IdleSettings::default()
    };
    let mut idle = IdleFade::new(settings);
    idle.tick(1.0, false, Vec3::ZERO);
    let a1 = idle.alpha();
    idle.tick(1.0, false, Vec3::ZERO);
    let a2 = idle.alpha();
    assert!(approx(a1, 0.25, 1e-6));
    assert!(approx(a2, 0.5, 1e-6));
    assert!(idle.is_fading());
}

fn quarter_turns() -> Vec<Quat> {
    (0..4)
        .map(|i| Quat::from_rotation_y(i as f32 * std::f32::consts::FRAC_PI_2))
        .collect()
}

#[test]
fn rotator_follows_zone_direction() {
    let mut globe = WaypointRotator::new(quarter_turns());
    let mut zones = DirectionZones::new(vec![
        DirectionZone::new(-20.0, -8.0, -1),
        DirectionZone::new(8.0, 20.0, 1),
    ]);

    zones.update(10.0, &mut globe);
    assert_eq!(globe.direction(), 1);
    for _ in 0..100 {
        globe.tick(0.1);
    }
    assert_eq!(globe.progress(), 1.0);
    assert!(globe.rotation.angle_between(globe.waypoints[3]) < 1e-2);

    zones.update(0.0, &mut globe);
    assert_eq!(globe.direction(), 0);
    globe.tick(0.1);
    assert_eq!(globe.progress(), 1.0);

    zones.update(-10.0, &mut globe);
    assert_eq!(globe.direction(), -1);
    for _ in 0..100 {
        globe.tick(0.1);
    }
    assert_eq!(globe.progress(), 0.0);
    assert!(globe.rotation.angle_between(globe.waypoints[0]) < 1e-2);
}

#[test]
fn zone_hand_off_ends_on_new_direction() {
    let zones = vec![
        DirectionZone::new(0.0, 5.0, -1),
        DirectionZone::new(4.0, 10.0, 1),
    ];
    for order in [zones.clone(), zones.into_iter().rev().collect()] {
        let mut globe = WaypointRotator::new(quarter_turns());
        let mut z = DirectionZones::new(order);
        z.update(2.0, &mut globe);
        assert_eq!(globe.direction(), -1);
        z.update(7.0, &mut globe);
        assert_eq!(globe.direction(), 1);
        z.update(2.0, &mut globe);
        assert_eq!(globe.direction(), -1);
    }
}

#[test]
fn rotator_without_waypoints_keeps_rotation() {
    let mut r = WaypointRotator::new(Vec::new());
    r.set_direction(5);
    assert_eq!(r.direction(), 1);
    r.tick(0.5);
    assert_eq!(r.rotation, Quat::IDENTITY);
}

#[test]
fn trails_spawn_and_expire() {
    let mut emitter = TrailEmitter::default();
    emitter.interval = 0.25;
    emitter.lifetime = 1.0;
    let pos = Vec3::new(1.0, 2.0, 0.0);
    for _ in 0..4 {
        emitter.tick(0.25, pos);
    }
    assert_eq!(emitter.trails().len(), 4);
    let oldest = emitter.trails()[0];
    assert_eq!(oldest.age(), 0.75);
    assert!(approx(oldest.alpha(), 0.25, 1e-6));

    // The oldest hits its lifetime and is replaced by a new one.
    emitter.tick(0.25, pos);
    assert_eq!(emitter.trails().len(), 4);
    assert!(emitter.trails().iter().all(|t| !t.is_expired()));
    assert_eq!(emitter.trails()[0].position, pos);
}

#[test]
fn glow_ping_pongs_between_limits() {
    let glow = GlowPulse::default();
    assert!(approx(glow.intensity(0.0), 0.0, 1e-6));
    assert!(approx(glow.intensity(1.0), 2.0, 1e-6));
    assert!(approx(glow.intensity(3.5), 3.0, 1e-5));
    let shifted = GlowPulse {
        min: 1.0,
        max: 2.0,
        speed: 1.0,
    };
    for i in 0..40 {
        let v = shifted.intensity(i as f32 * 0.37);
        assert!((1.0..=2.0).contains(&v));
    }
}

#[test]
fn delta_x_binding_follows_fraction_of_motion() {
    let mut b = DeltaXBinding::new(0.5, 0.0);
    assert_eq!(b.apply(0.0, 4.0), 2.0);
    assert_eq!(b.apply(2.0, 4.0), 2.0);
    assert_eq!(b.apply(2.0, 2.0), 1.0);
}

#[test]
fn dwell_enters_after_required_time_and_exits_on_leave() {
    let mut cam = OrthoCamera::new(Vec3::new(0.0, 0.0, 10.0), 5.0, 1280, 720);
    let mut dwell = CenterDwell::new(Vec3::ZERO);
    assert_eq!(dwell.tick(0.5, &cam), None);
    assert_eq!(dwell.tick(0.5, &cam), Some(DwellEvent::Entered));
    assert_eq!(dwell.tick(0.5, &cam), None);
    assert!(dwell.is_entered());

    cam.position.x = 3.0;
    assert_eq!(dwell.tick(0.1, &cam), Some(DwellEvent::Exited));
    assert_eq!(dwell.tick(0.1, &cam), None);

    // Behind the camera never counts as centred.
    let behind = CenterDwell::new(Vec3::new(3.0, 0.0, 20.0));
    assert!(!behind.is_centered(&cam));
}

#[test]
fn modal_locks_buttons_until_closed() {
    let mut group = ModalGroup::new(3);
    assert!(group.open(1));
    assert!(!group.button_enabled(0));
    assert!(!group.open(0));
    group.tick(0.5);
    let modal = group.modal(1).unwrap();
    assert!(modal.active);
    assert!(approx(modal.alpha, 0.5, 1e-6));

    group.close(1);
    assert!(group.button_enabled(0));
    assert!(!group.modal(1).unwrap().active);

    assert!(group.open(2));
    group.reset();
    assert!(group.modals().iter().all(|m| !m.active));
    assert!((0..3).all(|i| group.button_enabled(i)));
    assert!(!group.open(7));
}

fn scene() -> Installation {
    Installation::new(SceneLayout::default(), OrthoCamera::default())
}

#[test]
fn serial_lines_drive_camera_into_zone() {
    let mut s = scene();
    s.tick(&frame(0.1), ["100", "200"]);
    assert_eq!(s.last_batch().applied, 2);

    // Backdrop is 40 wide; the camera half width is 5 * 1280 / 720.
    let right = 20.0 - 5.0 * 1280.0 / 720.0;
    assert!(approx(s.controller.target_x(), right, 1e-4));
    for _ in 0..60 {
        s.tick(&frame(0.1), NO_LINES);
    }
    assert!(approx(s.camera.position.x, right, 0.02));
    assert_eq!(s.globe.direction(), 1);
    assert!(s.globe.progress() > 0.0);
    assert!(approx(s.comet_position().x, s.camera.position.x * 0.5, 0.02));
}

#[test]
fn bad_lines_are_counted_and_skipped() {
    let mut s = scene();
    s.tick(&frame(0.1), ["5", "oops", ""]);
    assert_eq!(s.last_batch().applied, 1);
    assert_eq!(s.last_batch().rejected, 2);
    assert_eq!(s.controller.last_sample(), 5.0);
}

#[test]
fn click_on_hotspot_opens_modal_and_badge_click_closes_it() {
    let mut s = scene();
    let mut input = frame(0.1);
    input.click = Some(Vec2::ZERO);
    s.tick(&input, NO_LINES);
    assert!(s.modals.modal(1).unwrap().active);
    assert!(!s.modals.button_enabled(0));

    let panels = s
        .draw_list(0.0)
        .iter()
        .filter(|sprite| sprite.size == [6.0, 4.0])
        .count();
    assert_eq!(panels, 1);

    // Clicks away from the badge are swallowed.
    input.click = Some(Vec2::new(100.0, 100.0));
    s.tick(&input, NO_LINES);
    assert!(s.modals.modal(1).unwrap().active);
    input.click = Some(Vec2::new(-9.0, 0.0));
    s.tick(&input, NO_LINES);
    assert!(s.modals.modal(1).unwrap().active);
    assert!(!s.modals.modal(0).unwrap().active);

    let badge = s.modal_close_rect(1).unwrap();
    assert!(approx(badge.center().x, 3.0, 1e-4));
    assert!(approx(badge.center().y, 2.0, 1e-4));
    input.click = Some(badge.center());
    s.tick(&input, NO_LINES);
    assert!(!s.modals.modal(1).unwrap().active);
    assert!(s.modals.button_enabled(0));
}

#[test]
fn leaving_a_hotspot_resets_modals() {
    let mut s = scene();
    for _ in 0..12 {
        s.tick(&frame(0.1), NO_LINES);
    }
    assert!(s.dwell[1].is_entered());

    let mut input = frame(0.1);
    input.click = Some(Vec2::ZERO);
    s.tick(&input, NO_LINES);
    assert!(s.modals.modal(1).unwrap().active);

    let mut input = frame(0.1);
    input.actions = vec![Action::SetCustomBounds {
        left: -10.0,
        right: 10.0,
    }];
    s.tick(&input, NO_LINES);
    s.tick(&frame(0.1), ["1", "2"]);
    assert!(s.camera.position.x > 1.0);
    assert!(!s.dwell[1].is_entered());
    assert!(s.modals.modals().iter().all(|m| !m.active));
}

#[test]
fn keyboard_actions_adjust_controller() {
    let mut s = scene();
    let mut input = frame(0.0);
    input.actions = vec![Action::SmoothingUp, Action::ToggleInvert];
    s.tick(&input, NO_LINES);
    assert_eq!(s.controller.smoothing_rate, 6.0);
    assert!(s.controller.invert());

    input.actions = vec![Action::SmoothingDown; 10];
    s.tick(&input, NO_LINES);
    assert_eq!(s.controller.smoothing_rate, 0.0);

    input.actions = vec![
        Action::SetCustomBounds {
            left: -3.0,
            right: 3.0,
        },
        Action::ClearCustomBounds,
    ];
    s.tick(&input, NO_LINES);
    assert_eq!(s.controller.custom_bounds(), None);
}

#[test]
fn move_axis_nudges_target() {
    let mut s = scene();
    let mut input = frame(0.5);
    input.move_axis = 1.0;
    s.tick(&input, NO_LINES);
    assert!(approx(s.controller.target_x(), 2.5, 1e-5));
    input.move_axis = -3.0;
    s.tick(&input, NO_LINES);
    assert!(approx(s.controller.target_x(), 0.0, 1e-5));
}

#[test]
fn idle_overlay_appears_and_clears() {
    let mut s = scene();
    for _ in 0..70 {
        s.tick(&frame(0.1), NO_LINES);
    }
    assert!(s.idle.is_active());
    let overlay = *s.draw_list(1.0).last().unwrap();
    assert!(approx(overlay.alpha(), 1.0, 1e-3));
    assert_eq!(overlay.pos[2], 1.0);

    let mut input = frame(0.1);
    input.pointer_down = true;
    s.tick(&input, NO_LINES);
    for _ in 0..15 {
        s.tick(&frame(0.1), NO_LINES);
    }
    assert!(!s.idle.is_active());
    assert!(s.draw_list(1.0).iter().all(|sprite| sprite.pos[2] < 1.0));
}

#[test]
fn toggling_custom_bounds_seeds_from_bounds_in_effect() {
    let mut s = scene();
    let edge = 20.0 - 5.0 * 1280.0 / 720.0;
    let mut input = frame(0.0);
    input.actions = vec![Action::ToggleCustomBounds];
    s.tick(&input, NO_LINES);
    let bounds = s.controller.custom_bounds().unwrap();
    assert!(approx(bounds.left, -edge, 1e-4));
    assert!(approx(bounds.right, edge, 1e-4));

    input.actions = vec![
        Action::AdjustBound {
            side: BoundSide::Left,
            raise: true,
        },
        Action::CycleBoundStep,
        Action::AdjustBound {
            side: BoundSide::Right,
            raise: false,
        },
    ];
    s.tick(&input, NO_LINES);
    let bounds = s.controller.custom_bounds().unwrap();
    assert!(approx(bounds.left, -edge + 1.0, 1e-4));
    assert!(approx(bounds.right, edge - 0.1, 1e-4));
    assert!(approx(s.controller.bound_step(), 0.1, 1e-6));

    input.actions = vec![Action::ToggleCustomBounds];
    s.tick(&input, NO_LINES);
    assert_eq!(s.controller.custom_bounds(), None);
}

#[test]
fn adjusting_a_disabled_bound_does_nothing() {
    let mut s = scene();
    assert_eq!(s.controller.adjust_bound(BoundSide::Left, true), None);
    assert_eq!(s.controller.custom_bounds(), None);
}

#[test]
fn bound_step_cycles_back_to_one() {
    let mut s = scene();
    assert_eq!(s.controller.bound_step(), 1.0);
    s.controller.cycle_bound_step();
    s.controller.cycle_bound_step();
    assert!(approx(s.controller.bound_step(), 0.01, 1e-6));
    assert_eq!(s.controller.cycle_bound_step(), 1.0);
}

#[test]
fn smoothing_and_idle_presets() {
    let mut s = scene();
    let mut input = frame(0.0);
    input.actions = vec![
        Action::SmoothingPreset(20.0),
        Action::CycleIdleTime,
        Action::CycleFadeIn,
    ];
    s.tick(&input, NO_LINES);
    assert_eq!(s.controller.smoothing_rate, 20.0);
    assert_eq!(s.idle.settings.idle_time, 10.0);
    assert_eq!(s.idle.settings.fade_in, 1.5);

    s.idle.settings.fade_out = 0.7;
    input.actions = vec![Action::CycleFadeOut, Action::ReportSettings];
    s.tick(&input, NO_LINES);
    assert_eq!(s.idle.settings.fade_out, 0.3);
}

#[test]
fn presets_wrap_around() {
    assert_eq!(next_preset(2.0, &FADE_PRESETS), 0.3);
    assert_eq!(next_preset(0.5, &FADE_PRESETS), 1.0);
    assert_eq!(next_preset(4.0, &[]), 4.0);
}

#[test]
fn requesting_the_current_port_changes_nothing() {
    let mut s = scene();
    assert_eq!(s.controller.port_name, "COM4");
    assert!(!s.controller.request_port("COM4"));
    assert_eq!(s.controller.port_name, "COM4");
    assert!(s.controller.request_port("COM5"));
    assert_eq!(s.controller.port_name, "COM5");
}
