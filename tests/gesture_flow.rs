//! Gesture lifecycle against a live scene: begin on an element, update from
//! pointer positions, finish, and persist the result through the scene.

use kurbo::Point;
use scenekey::{
    DragGesture, Element, GestureController, Handle, PlaybackClock, Scene,
};

fn fixture() -> Scene {
    Scene::from_json(include_str!("data/overlay_scene.json")).unwrap()
}

fn find<'a>(scene: &'a Scene, id: &str) -> &'a Element {
    scene.elements.iter().find(|el| el.id == id).unwrap()
}

#[test]
fn finished_drag_persists_to_base_element() {
    let mut scene = fixture();
    let container = scene.container();
    let mut gestures = GestureController::default();

    let started = gestures.begin(DragGesture::begin_resize(
        find(&scene, "backdrop"),
        Handle::Se,
        Point::new(500.0, 500.0),
        1.0,
        container,
    ));
    assert!(started);

    let geometry = gestures.finish(Point::new(540.0, 520.0), false).unwrap();
    assert!(!gestures.is_active());
    scene.apply_geometry("backdrop", geometry, None);

    let backdrop = find(&scene, "backdrop");
    assert_eq!(backdrop.width, 680.0);
    assert_eq!(backdrop.height, 160.0);
    assert_eq!(backdrop.x, 80.0);
    assert_eq!(backdrop.y, 860.0);
}

#[test]
fn drag_with_active_keyframe_edits_snapshot_not_base() {
    let mut scene = fixture();
    let container = scene.container();
    let kf_id = scene.add_keyframe_at(1.0);

    let mut clock = PlaybackClock::new();
    clock.set_active_keyframe(Some(kf_id));

    let mut gestures = GestureController::default();
    gestures.begin(DragGesture::begin_move(
        find(&scene, "backdrop"),
        Point::new(0.0, 0.0),
        1.0,
        container,
    ));
    let geometry = gestures.finish(Point::new(0.0, -100.0), false).unwrap();

    let base_before = find(&scene, "backdrop").clone();
    scene.apply_geometry("backdrop", geometry, clock.active_keyframe());

    // Base untouched; the keyframe now pins the new position at t = 1.
    let backdrop = find(&scene, "backdrop");
    assert_eq!(backdrop.y, base_before.y);
    let at_keyframe = scene.effective_elements(1.0);
    let pinned = at_keyframe.iter().find(|el| el.id == "backdrop").unwrap();
    assert_eq!(pinned.y, geometry.y);
}

#[test]
fn rotated_resize_applies_the_same_local_math() {
    let scene = fixture();
    let container = scene.container();
    let mut base = scene.elements[0].clone();
    base.x = 100.0;
    base.y = 100.0;
    base.width = 60.0;
    base.height = 40.0;
    base.rotation = 0.0;

    // Unrotated: east handle dragged 20px right.
    let flat = DragGesture::begin_resize(&base, Handle::E, Point::ZERO, 1.0, container)
        .unwrap()
        .update(Point::new(20.0, 0.0), false);
    assert_eq!((flat.width, flat.height), (80.0, 40.0));
    assert_eq!(flat.center(), Point::new(140.0, 120.0));

    // Rotated 90 degrees: the local east axis now points down in world
    // space, so the equivalent drag is 20px downward.
    let mut turned = base.clone();
    turned.rotation = 90.0;
    let spun = DragGesture::begin_resize(&turned, Handle::E, Point::ZERO, 1.0, container)
        .unwrap()
        .update(Point::new(0.0, 20.0), false);

    // Same local growth, center offset rotated with the element.
    assert_eq!((spun.width, spun.height), (flat.width, flat.height));
    assert_eq!(spun.center(), Point::new(130.0, 130.0));
    assert_eq!(spun.rotation, 90.0);

    // Dropping the rotation back to zero leaves plain axis-aligned
    // geometry with the same integral footprint.
    let upright = scenekey::Geometry {
        rotation: 0.0,
        ..spun
    };
    assert_eq!(upright.x, 90.0);
    assert_eq!(upright.y, 110.0);
    assert_eq!(upright.x.fract(), 0.0);
    assert_eq!(upright.y.fract(), 0.0);
}

#[test]
fn rotate_gesture_roundtrips_through_scene() {
    let mut scene = fixture();
    let el = find(&scene, "backdrop").clone();
    let pivot = scenekey::Geometry::of(&el).center();

    let gesture = DragGesture::begin_rotate(&el, Point::new(pivot.x, 0.0), pivot).unwrap();
    // Pointer straight right of the pivot: 90 degrees clockwise from up.
    let turned = gesture.update(Point::new(pivot.x + 200.0, pivot.y), false);
    assert_eq!(turned.rotation, 90.0);
    scene.apply_geometry("backdrop", turned, None);
    assert_eq!(find(&scene, "backdrop").rotation, 90.0);

    // Back to the starting direction undoes the rotation.
    let restored = gesture.update(Point::new(pivot.x, 0.0), false);
    assert_eq!(restored.rotation, 0.0);
    scene.apply_geometry("backdrop", restored, None);
    assert_eq!(find(&scene, "backdrop").rotation, 0.0);
}
