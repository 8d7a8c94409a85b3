//! Pointer-drag geometry: move, 8-handle resize, and free rotation.
//!
//! Gestures are modal. A [`DragGesture`] owns the start snapshot (pointer
//! and geometry) so updates are pure functions of the current pointer; the
//! [`GestureController`] holds at most one active gesture and cancels
//! idempotently. Pointer coordinates arrive in screen space; move and resize
//! deltas are divided by the current zoom before touching canvas geometry.

use kurbo::{Point, Vec2};

use crate::element::Element;

/// Width/height floor applied during resize.
pub const MIN_SIZE: f64 = 4.0;
/// Snap increment used when the rotate modifier is held.
pub const ROTATION_SNAP_DEGREES: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl Handle {
    fn north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    fn south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    fn east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    fn west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }
}

/// Fully-specified output geometry to persist back onto an element (or into
/// the active keyframe's snapshot when editing mid-timeline).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, not wrapped into [0, 360).
    pub rotation: f64,
}

impl Geometry {
    pub fn of(el: &Element) -> Self {
        Self {
            x: el.x,
            y: el.y,
            width: el.width,
            height: el.height,
            rotation: el.rotation,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// The container an element's *center* is clamped into. Edges may overhang;
/// the center may not leave `[0, width] × [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

impl Container {
    fn clamp_center(&self, center: Point) -> Point {
        Point::new(
            center.x.clamp(0.0, self.width),
            center.y.clamp(0.0, self.height),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize(Handle),
    Rotate,
}

/// One in-flight drag. Construction fails (returns `None`) on locked
/// elements; locked elements reject all three gestures.
#[derive(Clone, Debug)]
pub struct DragGesture {
    kind: GestureKind,
    start_pointer: Point,
    start: Geometry,
    /// Rotation pivot, in the same space as the pointer.
    pivot: Point,
    zoom: f64,
    container: Container,
}

impl DragGesture {
    pub fn begin_move(
        el: &Element,
        pointer: Point,
        zoom: f64,
        container: Container,
    ) -> Option<Self> {
        Self::begin(GestureKind::Move, el, pointer, zoom, container)
    }

    pub fn begin_resize(
        el: &Element,
        handle: Handle,
        pointer: Point,
        zoom: f64,
        container: Container,
    ) -> Option<Self> {
        Self::begin(GestureKind::Resize(handle), el, pointer, zoom, container)
    }

    /// `center` is the element's world-space center as projected into the
    /// pointer's coordinate space by the interaction surface.
    pub fn begin_rotate(el: &Element, pointer: Point, center: Point) -> Option<Self> {
        if el.locked {
            return None;
        }
        Some(Self {
            kind: GestureKind::Rotate,
            start_pointer: pointer,
            start: Geometry::of(el),
            pivot: center,
            zoom: 1.0,
            container: Container {
                width: f64::INFINITY,
                height: f64::INFINITY,
            },
        })
    }

    fn begin(
        kind: GestureKind,
        el: &Element,
        pointer: Point,
        zoom: f64,
        container: Container,
    ) -> Option<Self> {
        if el.locked {
            return None;
        }
        let start = Geometry::of(el);
        Some(Self {
            kind,
            start_pointer: pointer,
            start,
            pivot: start.center(),
            zoom: if zoom > 0.0 { zoom } else { 1.0 },
            container,
        })
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    /// Computes the geometry for the current pointer position. Pure: the
    /// same pointer always yields the same geometry.
    pub fn update(&self, pointer: Point, snap: bool) -> Geometry {
        match self.kind {
            GestureKind::Move => self.update_move(pointer),
            GestureKind::Resize(handle) => self.update_resize(handle, pointer),
            GestureKind::Rotate => self.update_rotate(pointer, snap),
        }
    }

    fn update_move(&self, pointer: Point) -> Geometry {
        let delta = (pointer - self.start_pointer) / self.zoom;
        let moved = Geometry {
            x: self.start.x + delta.x,
            y: self.start.y + delta.y,
            ..self.start
        };
        let center = self.container.clamp_center(moved.center());
        Geometry {
            x: (center.x - moved.width / 2.0).round(),
            y: (center.y - moved.height / 2.0).round(),
            ..moved
        }
    }

    fn update_resize(&self, handle: Handle, pointer: Point) -> Geometry {
        let world_delta = (pointer - self.start_pointer) / self.zoom;
        let theta = self.start.rotation.to_radians();
        let local = rotate_vec(world_delta, -theta);

        let mut width = self.start.width;
        let mut height = self.start.height;
        if handle.east() {
            width += local.x;
        }
        if handle.west() {
            width -= local.x;
        }
        if handle.south() {
            height += local.y;
        }
        if handle.north() {
            height -= local.y;
        }
        width = width.max(MIN_SIZE);
        height = height.max(MIN_SIZE);

        // The center shifts by half the growth of whichever edges moved, in
        // the element's local frame; rotate that back into world space.
        let dw = width - self.start.width;
        let dh = height - self.start.height;
        let local_center_delta = Vec2::new(
            if handle.east() {
                dw / 2.0
            } else if handle.west() {
                -dw / 2.0
            } else {
                0.0
            },
            if handle.south() {
                dh / 2.0
            } else if handle.north() {
                -dh / 2.0
            } else {
                0.0
            },
        );
        let world_center_delta = rotate_vec(local_center_delta, theta);

        let center = self
            .container
            .clamp_center(self.start.center() + world_center_delta);
        Geometry {
            x: (center.x - width / 2.0).round(),
            y: (center.y - height / 2.0).round(),
            width: width.round(),
            height: height.round(),
            rotation: self.start.rotation,
        }
    }

    fn update_rotate(&self, pointer: Point, snap: bool) -> Geometry {
        let d = pointer - self.pivot;
        // "Up" is 0 degrees, clockwise positive.
        let mut angle = d.x.atan2(-d.y).to_degrees();
        if snap {
            angle = (angle / ROTATION_SNAP_DEGREES).round() * ROTATION_SNAP_DEGREES;
        }
        Geometry {
            rotation: (angle * 10.0).round() / 10.0,
            ..self.start
        }
    }
}

fn rotate_vec(v: Vec2, radians: f64) -> Vec2 {
    let (s, c) = radians.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// Owns the single in-flight gesture for one interaction surface. Drag,
/// resize, and rotate are mutually exclusive: beginning a gesture while one
/// is active is rejected.
#[derive(Debug, Default)]
pub struct GestureController {
    active: Option<DragGesture>,
}

impl GestureController {
    pub fn begin(&mut self, gesture: Option<DragGesture>) -> bool {
        if self.active.is_some() {
            return false;
        }
        match gesture {
            Some(g) => {
                tracing::trace!(kind = ?g.kind(), "gesture started");
                self.active = Some(g);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn update(&self, pointer: Point, snap: bool) -> Option<Geometry> {
        self.active.as_ref().map(|g| g.update(pointer, snap))
    }

    /// Pointer release: produces the final geometry and returns to idle.
    pub fn finish(&mut self, pointer: Point, snap: bool) -> Option<Geometry> {
        let gesture = self.active.take()?;
        Some(gesture.update(pointer, snap))
    }

    /// Idempotent: cancelling with no active gesture is a no-op.
    pub fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, Filters, ShapeVariant};

    fn element(x: f64, y: f64, w: f64, h: f64, rotation: f64) -> Element {
        Element {
            id: "el".to_string(),
            kind: ElementKind::Shape {
                variant: ShapeVariant::Rectangle,
            },
            x,
            y,
            width: w,
            height: h,
            rotation,
            scale_x: 1.0,
            scale_y: 1.0,
            fill: "#ffffff".to_string(),
            stroke: "#000000".to_string(),
            stroke_width: 1.0,
            corner_radius: 0.0,
            opacity: 1.0,
            filters: Filters::default(),
            visible: true,
            locked: false,
            z: 0,
        }
    }

    const CONTAINER: Container = Container {
        width: 1920.0,
        height: 1080.0,
    };

    #[test]
    fn move_applies_zoom_scaled_delta() {
        let el = element(100.0, 100.0, 50.0, 50.0, 0.0);
        let g = DragGesture::begin_move(&el, Point::new(0.0, 0.0), 2.0, CONTAINER).unwrap();
        let out = g.update(Point::new(20.0, 10.0), false);
        assert_eq!(out.x, 110.0);
        assert_eq!(out.y, 105.0);
        assert_eq!(out.width, 50.0);
    }

    #[test]
    fn move_clamps_center_not_edges() {
        let el = element(10.0, 10.0, 100.0, 100.0, 0.0);
        let g = DragGesture::begin_move(&el, Point::new(0.0, 0.0), 1.0, CONTAINER).unwrap();
        let out = g.update(Point::new(-500.0, 0.0), false);
        // Center pinned to x=0; half the element overhangs the container.
        assert_eq!(out.x, -50.0);
        assert_eq!(out.y, 10.0);
    }

    #[test]
    fn locked_elements_reject_all_gestures() {
        let mut el = element(0.0, 0.0, 50.0, 50.0, 0.0);
        el.locked = true;
        let p = Point::new(0.0, 0.0);
        assert!(DragGesture::begin_move(&el, p, 1.0, CONTAINER).is_none());
        assert!(DragGesture::begin_resize(&el, Handle::Se, p, 1.0, CONTAINER).is_none());
        assert!(DragGesture::begin_rotate(&el, p, p).is_none());
    }

    #[test]
    fn se_resize_keeps_north_west_edges_fixed() {
        let el = element(100.0, 100.0, 60.0, 40.0, 0.0);
        let g =
            DragGesture::begin_resize(&el, Handle::Se, Point::new(0.0, 0.0), 1.0, CONTAINER)
                .unwrap();
        let out = g.update(Point::new(20.0, 10.0), false);
        assert_eq!(out.width, 80.0);
        assert_eq!(out.height, 50.0);
        // North/west edges unchanged.
        assert_eq!(out.x, 100.0);
        assert_eq!(out.y, 100.0);
    }

    #[test]
    fn nw_resize_moves_origin_and_keeps_south_east_fixed() {
        let el = element(100.0, 100.0, 60.0, 40.0, 0.0);
        let g =
            DragGesture::begin_resize(&el, Handle::Nw, Point::new(0.0, 0.0), 1.0, CONTAINER)
                .unwrap();
        let out = g.update(Point::new(10.0, 20.0), false);
        assert_eq!(out.width, 50.0);
        assert_eq!(out.height, 20.0);
        assert_eq!(out.x, 110.0);
        assert_eq!(out.y, 120.0);
        // South/east edges unchanged.
        assert_eq!(out.x + out.width, 160.0);
        assert_eq!(out.y + out.height, 140.0);
    }

    #[test]
    fn resize_floors_at_minimum_size() {
        let el = element(100.0, 100.0, 20.0, 20.0, 0.0);
        let g =
            DragGesture::begin_resize(&el, Handle::Se, Point::new(0.0, 0.0), 1.0, CONTAINER)
                .unwrap();
        let out = g.update(Point::new(-500.0, -500.0), false);
        assert_eq!(out.width, MIN_SIZE);
        assert_eq!(out.height, MIN_SIZE);
    }

    #[test]
    fn north_handle_on_rotated_element_moves_world_x() {
        // At 90 degrees the local north edge is a vertical edge in world
        // space: a horizontal drag resizes along world x and leaves the
        // world y extent untouched.
        let el = element(100.0, 100.0, 60.0, 40.0, 90.0);
        let start_center = Geometry::of(&el).center();
        let g = DragGesture::begin_resize(&el, Handle::N, Point::new(0.0, 0.0), 1.0, CONTAINER)
            .unwrap();
        let out = g.update(Point::new(10.0, 0.0), false);

        assert_eq!(out.height, 50.0);
        assert_eq!(out.width, 60.0);
        let center = out.center();
        // One world vertical edge moved by the full delta: center shifts by
        // half along x, not at all along y.
        assert_eq!(center.x, start_center.x + 5.0);
        assert_eq!(center.y, start_center.y);
    }

    #[test]
    fn rotate_measures_clockwise_from_up() {
        let el = element(0.0, 0.0, 100.0, 100.0, 0.0);
        let pivot = Point::new(50.0, 50.0);
        let g = DragGesture::begin_rotate(&el, Point::new(50.0, 0.0), pivot).unwrap();

        assert_eq!(g.update(Point::new(50.0, 0.0), false).rotation, 0.0);
        assert_eq!(g.update(Point::new(100.0, 50.0), false).rotation, 90.0);
        assert_eq!(g.update(Point::new(50.0, 100.0), false).rotation, 180.0);
        assert_eq!(g.update(Point::new(0.0, 50.0), false).rotation, -90.0);
    }

    #[test]
    fn rotate_snaps_to_fifteen_degrees_with_modifier() {
        let el = element(0.0, 0.0, 100.0, 100.0, 0.0);
        let pivot = Point::new(50.0, 50.0);
        let g = DragGesture::begin_rotate(&el, Point::new(50.0, 0.0), pivot).unwrap();
        // ~40.7 degrees unsnapped.
        let free = g.update(Point::new(93.0, 0.0), false).rotation;
        assert!((free - 40.7).abs() < 0.05);
        let snapped = g.update(Point::new(93.0, 0.0), true).rotation;
        assert_eq!(snapped, 45.0);
    }

    #[test]
    fn controller_is_modal_and_cancel_is_idempotent() {
        let el = element(0.0, 0.0, 50.0, 50.0, 0.0);
        let p = Point::new(0.0, 0.0);
        let mut ctl = GestureController::default();

        assert!(ctl.begin(DragGesture::begin_move(&el, p, 1.0, CONTAINER)));
        // A second gesture cannot start while one is active.
        assert!(!ctl.begin(DragGesture::begin_resize(&el, Handle::E, p, 1.0, CONTAINER)));

        assert!(ctl.finish(Point::new(5.0, 5.0), false).is_some());
        assert!(!ctl.is_active());

        ctl.cancel();
        ctl.cancel();
        assert!(ctl.finish(p, false).is_none());
    }
}
