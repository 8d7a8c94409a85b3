//! Core engines for a layered overlay-scene editor: global keyframe
//! interpolation (reconstructing the visual state of an element tree at any
//! point on a timeline) and rotation-aware transform/resize geometry, plus
//! the color, easing, and spline math they depend on.

#![forbid(unsafe_code)]

pub mod clock;
pub mod color;
pub mod ease;
pub mod element;
pub mod error;
pub mod gesture;
pub mod interp;
pub mod scene;
pub mod spline;
pub mod timeline;

pub use clock::{PlaybackClock, PlaybackState};
pub use color::{
    Hsv, ParsedColor, Rgb, build_color, hex_to_rgb, hsv_to_rgb, lerp_color, parse_color,
    rgb_to_hex, rgb_to_hsv,
};
pub use ease::Ease;
pub use element::{Element, ElementKind, Filters, PropKey, PropValue, ShapeVariant, TextAttrs};
pub use error::{SceneKeyError, SceneKeyResult};
pub use gesture::{Container, DragGesture, Geometry, GestureController, GestureKind, Handle};
pub use interp::{apply_overrides, effective_elements, interpolate, snapshot_scene};
pub use scene::{EditorIntent, Scene};
pub use spline::solve_spline;
pub use timeline::{GlobalKeyframe, PropertyMap, Snapshot, Timeline};
