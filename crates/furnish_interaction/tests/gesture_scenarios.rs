//! End-to-end gesture scenarios over a headless scene

mod common;

use approx::assert_relative_eq;
use common::{floor_at, Harness};
use furnish_interaction::prelude::*;
use furnish_scene::SceneGraph;
use glam::{Vec2, Vec3};

#[test]
fn test_place_select_delete_walkthrough() {
    let mut h = Harness::new();
    assert_eq!(*h.session.gesture_state(), GestureState::Idle);

    // Long press on empty space with nothing selected changes nothing
    let empty = h.empty_space();
    assert!(h.hold(empty, 600).is_empty());
    assert!(h.session.registry().is_empty());

    // Double tap over the surface places model 0, selected
    let actions = h.double_tap(empty);
    let id = match actions.as_slice() {
        [SessionAction::Placed { id, model_index: 0, replaced: None }] => *id,
        other => panic!("expected a placement, got {:?}", other),
    };
    assert_eq!(h.session.registry().len(), 1);
    assert_eq!(h.selected_id(), Some(id));
    assert_eq!(h.session.selected().unwrap().scale, Vec3::splat(0.01));

    // Long press on empty space deselects
    assert_eq!(h.hold(empty, 600), vec![SessionAction::Deselected(id)]);
    assert_eq!(h.selected_id(), None);

    // Long press on the object selects it
    let over = h.screen_of_object(id);
    assert_eq!(
        h.hold(over, 600),
        vec![SessionAction::Selected { id, replaced: None }]
    );

    // Long press again deletes it
    let handle = h.session.registry().get(id).unwrap().handle;
    assert_eq!(h.hold(over, 600), vec![SessionAction::Deleted(id)]);
    assert!(h.session.registry().is_empty());
    assert_eq!(h.selected_id(), None);
    assert!(!h.session.scene().contains(handle));

    // Nothing left to hit
    let ray = h.camera.screen_ray(over);
    assert_eq!(h.session.registry().pick(h.session.scene(), &ray), None);
    assert!(h.hold(over, 600).is_empty());
}

#[test]
fn test_selection_is_exclusive() {
    let mut h = Harness::new();
    let a = h.place_at(floor_at(0.0, -1.5));

    h.session.probe_mut().set_pose(floor_at(0.8, -1.5));
    h.frame();
    let point = h.empty_space();
    let b = match h.double_tap(point).as_slice() {
        [SessionAction::Placed { id, replaced, .. }] => {
            assert_eq!(*replaced, Some(a));
            *id
        }
        other => panic!("expected a placement, got {:?}", other),
    };
    assert_eq!(h.selected_id(), Some(b));

    let over_a = h.screen_of_object(a);
    assert_eq!(
        h.hold(over_a, 600),
        vec![SessionAction::Selected { id: a, replaced: Some(b) }]
    );
    assert_eq!(h.selected_id(), Some(a));
    assert_eq!(h.session.selection().overlay().len(), 3);
}

#[test]
fn test_drag_suppresses_tap_and_long_press() {
    let mut h = Harness::new();
    let start = Vec2::new(540.0, 960.0);

    let (id, _) = h.down(start);
    h.advance(100);
    assert!(h.motion(id, start + Vec2::new(0.0, 25.0)).is_empty());
    assert!(h.advance(700).is_empty());
    assert!(h.up(id).is_empty());

    // The dropped press does not count as the first half of a double tap
    assert!(h.tap(start).is_empty());
    assert!(h.session.registry().is_empty());
}

#[test]
fn test_small_wander_still_long_presses() {
    let mut h = Harness::new();
    let id = h.place_at(floor_at(0.0, -1.5));
    let over = h.screen_of_object(id);
    let empty = h.empty_space();
    h.hold(empty, 600);

    let (touch, _) = h.down(over);
    h.advance(100);
    h.motion(touch, over + Vec2::new(6.0, -7.0));
    let actions = h.advance(500);
    h.up(touch);

    assert_eq!(actions, vec![SessionAction::Selected { id, replaced: None }]);
}

#[test]
fn test_slow_taps_never_place() {
    let mut h = Harness::new();
    let point = h.empty_space();

    assert!(h.tap(point).is_empty());
    h.advance(300);
    assert!(h.tap(point).is_empty());
    h.advance(400);
    assert!(h.tap(point).is_empty());
    assert!(h.session.registry().is_empty());

    // A quick follow-up tap does place
    h.advance(100);
    assert_eq!(h.tap(point).len(), 1);
    assert_eq!(h.session.registry().len(), 1);
}

#[test]
fn test_double_tap_without_surface_declines() {
    let mut h = Harness::new();
    h.session.probe_mut().clear_pose();
    let report = h.frame();
    assert!(!report.reticle_visible);

    let point = h.empty_space();
    assert!(h.double_tap(point).is_empty());
    assert!(h.session.registry().is_empty());
}

#[test]
fn test_two_point_drag_rotates_selection() {
    let mut h = Harness::new();
    let id = h.place_at(floor_at(0.0, -1.5));

    let (first, _) = h.down(Vec2::new(300.0, 1500.0));
    h.advance(20);
    let (second, started) = h.down(Vec2::new(700.0, 1500.0));
    assert!(started.is_empty());
    assert!(matches!(h.session.gesture_state(), GestureState::Rotating(_)));

    // Midpoint x moves by +30 px
    let actions = h.motion(second, Vec2::new(760.0, 1500.0));
    match actions.as_slice() {
        [SessionAction::Rotated { id: rotated, yaw }] => {
            assert_eq!(*rotated, id);
            assert_relative_eq!(*yaw, 0.3, epsilon = 1e-5);
        }
        other => panic!("expected a rotation, got {:?}", other),
    }

    // Long press is suppressed while both points are down
    assert!(h.advance(800).is_empty());

    // Midpoint x ends 30 px left of where it started
    let actions = h.motion(first, Vec2::new(180.0, 1500.0));
    match actions.as_slice() {
        [SessionAction::Rotated { yaw, .. }] => assert_relative_eq!(*yaw, -0.3, epsilon = 1e-5),
        other => panic!("expected a rotation, got {:?}", other),
    }

    h.up(second);
    assert_eq!(*h.session.gesture_state(), GestureState::Idle);
    assert!(h.advance(600).is_empty());
    h.up(first);

    assert_relative_eq!(h.session.selected().unwrap().yaw, -0.3, epsilon = 1e-5);
}

#[test]
fn test_third_finger_ends_rotation() {
    let mut h = Harness::new();
    let id = h.place_at(floor_at(0.0, -1.5));

    h.down_as(50, Vec2::new(400.0, 1500.0));
    h.down_as(51, Vec2::new(600.0, 1500.0));
    assert!(matches!(
        h.session.gesture_state(),
        GestureState::Rotating(session) if session.start_midpoint_x == 500.0
    ));

    // A lower id sorts first, so the midpoint pair would change under it
    assert!(h.down_as(1, Vec2::new(0.0, 1500.0)).is_empty());
    assert_eq!(*h.session.gesture_state(), GestureState::Cancelled);
    assert!(h.motion(51, Vec2::new(601.0, 1500.0)).is_empty());

    // Back to two contacts, the drag stays over
    assert!(h.up(1).is_empty());
    assert_eq!(*h.session.gesture_state(), GestureState::Cancelled);
    assert!(h.motion(51, Vec2::new(700.0, 1500.0)).is_empty());
    assert_relative_eq!(h.session.registry().get(id).unwrap().yaw, 0.0);

    // No long press fires from the leftover contacts
    assert!(h.advance(800).is_empty());
    h.up(51);
    h.up(50);
    assert_eq!(*h.session.gesture_state(), GestureState::Idle);
    assert_eq!(h.selected_id(), Some(id));

    // A fresh two-point drag works again
    h.down_as(60, Vec2::new(400.0, 1500.0));
    h.down_as(61, Vec2::new(600.0, 1500.0));
    match h.motion(61, Vec2::new(640.0, 1500.0)).as_slice() {
        [SessionAction::Rotated { yaw, .. }] => assert_relative_eq!(*yaw, 0.2, epsilon = 1e-5),
        other => panic!("expected a rotation, got {:?}", other),
    }
}

#[test]
fn test_rotation_independent_of_scale() {
    let mut h = Harness::new();
    h.session.choose_model(2);
    let id = h.place_at(floor_at(0.0, -1.5));
    assert_eq!(h.session.registry().get(id).unwrap().scale, Vec3::splat(0.005));

    let (_, _) = h.down(Vec2::new(400.0, 1500.0));
    let (second, _) = h.down(Vec2::new(600.0, 1500.0));
    let actions = h.motion(second, Vec2::new(800.0, 1500.0));

    match actions.as_slice() {
        [SessionAction::Rotated { yaw, .. }] => assert_relative_eq!(*yaw, 1.0, epsilon = 1e-5),
        other => panic!("expected a rotation, got {:?}", other),
    }
}

#[test]
fn test_second_finger_without_selection_does_nothing() {
    let mut h = Harness::new();
    let center = Vec2::new(540.0, 960.0);

    let (first, _) = h.down(center);
    h.advance(100);
    let (second, actions) = h.down(center + Vec2::new(200.0, 0.0));
    assert!(actions.is_empty());
    assert_eq!(*h.session.gesture_state(), GestureState::Cancelled);

    assert!(h.advance(800).is_empty());
    assert!(h.up(second).is_empty());
    assert!(h.up(first).is_empty());
    assert_eq!(*h.session.gesture_state(), GestureState::Idle);
}

#[test]
fn test_indicator_tracks_selection_every_frame() {
    let mut h = Harness::new();
    let id = h.place_at(floor_at(0.0, -1.5));
    let indicator = h.session.selection().indicator();
    assert!(h.session.scene().is_visible(indicator));

    let (first, _) = h.down(Vec2::new(300.0, 1500.0));
    let (second, _) = h.down(Vec2::new(500.0, 1500.0));
    h.motion(second, Vec2::new(700.0, 1500.0));
    h.frame();

    let object = h.session.registry().get(id).unwrap().clone();
    let transform = h.session.scene().transform(indicator).unwrap();
    assert_eq!(transform.position, object.position());
    assert!(transform.rotation.angle_between(object.orientation()) < 1e-4);

    h.up(second);
    h.up(first);
}

#[test]
fn test_near_miss_keeps_selection() {
    let config = Harness::single_model("cube", 0.01);
    let mut h = Harness::with_config(config, Vec3::new(5.0, 5.0, 5.0));
    let id = h.place_at(floor_at(0.0, -1.5));

    let base = h.screen_of(Vec3::new(0.0, 0.0, -1.5));
    assert!(h.hold(base + Vec2::new(45.0, 0.0), 600).is_empty());
    assert_eq!(h.selected_id(), Some(id));

    assert_eq!(
        h.hold(base + Vec2::new(120.0, 0.0), 600),
        vec![SessionAction::Deselected(id)]
    );
}

#[test]
fn test_near_miss_can_be_disabled() {
    let mut config = Harness::single_model("cube", 0.01);
    config.selection.proximity_radius_px = 0.0;
    let mut h = Harness::with_config(config, Vec3::new(5.0, 5.0, 5.0));
    let id = h.place_at(floor_at(0.0, -1.5));

    let base = h.screen_of(Vec3::new(0.0, 0.0, -1.5));
    assert_eq!(
        h.hold(base + Vec2::new(45.0, 0.0), 600),
        vec![SessionAction::Deselected(id)]
    );
}
