//! One independently-animatable scene: an element tree plus an optional
//! timeline, with the editor-facing operations that tie the interpolation
//! and gesture engines together.

use crate::{
    clock::PlaybackClock,
    element::{self, Element, PropKey, PropValue},
    error::{SceneKeyError, SceneKeyResult},
    gesture::{Container, Geometry, GestureController},
    interp,
    timeline::{GlobalKeyframe, Timeline},
};

/// A scene (widget): the canvas container, its element forest, and the
/// timeline created lazily the first time the scene is animated. The whole
/// struct is a plain serializable document; no runtime handles live here.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
}

/// Already-decoded editing intents from the keyboard shortcut surface. The
/// core never parses raw input events.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "intent", rename_all = "camelCase")]
pub enum EditorIntent {
    AddKeyframe,
    DeleteElement { id: String },
    DuplicateElement { id: String },
    EscapeTool,
}

impl Scene {
    pub fn validate(&self) -> SceneKeyResult<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(SceneKeyError::validation(
                "scene width/height must be > 0",
            ));
        }
        element::validate_unique_ids(&self.elements)?;
        if let Some(tl) = &self.timeline {
            tl.validate()?;
        }
        Ok(())
    }

    /// Decodes and validates a persisted scene document.
    pub fn from_json(json: &str) -> SceneKeyResult<Self> {
        let scene: Self = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_json(&self) -> SceneKeyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn container(&self) -> Container {
        Container {
            width: self.width,
            height: self.height,
        }
    }

    /// The timeline, created with defaults the first time it is needed.
    pub fn ensure_timeline(&mut self) -> &mut Timeline {
        self.timeline.get_or_insert_default()
    }

    fn keyframes(&self) -> &[GlobalKeyframe] {
        self.timeline.as_ref().map_or(&[], |tl| &tl.keyframes)
    }

    /// Captures the effective scene state at `time` into a new keyframe and
    /// inserts it (replacing any keyframe occupying that time). Because the
    /// snapshot is taken from the already-interpolated state, inserting
    /// mid-interpolation never visually jumps the scene.
    pub fn add_keyframe_at(&mut self, time: f64) -> String {
        let snapshot = interp::snapshot_scene(&self.elements, self.keyframes(), time);
        let timeline = self.ensure_timeline();
        let id = fresh_keyframe_id(timeline);
        timeline.upsert_keyframe(GlobalKeyframe {
            id: id.clone(),
            time,
            easing: Default::default(),
            snapshot,
        });
        id
    }

    /// The render input: elements with interpolated overrides applied at
    /// `time`, siblings in z order.
    pub fn effective_elements(&self, time: f64) -> Vec<Element> {
        interp::effective_elements(&self.elements, self.keyframes(), time)
    }

    /// The ghost preview: the scene state at the last keyframe at or before
    /// `time`, for rendering at reduced opacity alongside the live state.
    pub fn ghost_preview(&self, time: f64) -> Option<(f64, Vec<Element>)> {
        let keyframes = self.keyframes();
        let at = keyframes
            .iter()
            .filter(|kf| kf.time <= time)
            .map(|kf| kf.time)
            .max_by(f64::total_cmp)?;
        Some((at, self.effective_elements(at)))
    }

    /// Persists a finished gesture. Geometry goes onto the base element
    /// unless a keyframe is selected for editing, in which case it goes
    /// into that keyframe's snapshot instead.
    pub fn apply_geometry(
        &mut self,
        element_id: &str,
        geometry: Geometry,
        active_keyframe: Option<&str>,
    ) {
        if let Some(kf_id) = active_keyframe
            && let Some(tl) = self.timeline.as_mut()
            && let Some(kf) = tl.keyframe_mut(kf_id)
        {
            let props = kf.snapshot.entry(element_id.to_string()).or_default();
            props.insert(PropKey::X, PropValue::Number(geometry.x));
            props.insert(PropKey::Y, PropValue::Number(geometry.y));
            props.insert(PropKey::Width, PropValue::Number(geometry.width));
            props.insert(PropKey::Height, PropValue::Number(geometry.height));
            props.insert(PropKey::Rotation, PropValue::Number(geometry.rotation));
            return;
        }

        if let Some(el) = element::find_element_mut(&mut self.elements, element_id) {
            el.x = geometry.x;
            el.y = geometry.y;
            el.width = geometry.width;
            el.height = geometry.height;
            el.rotation = geometry.rotation;
        }
    }

    /// Dispatches a decoded editing intent. Returns the id created by
    /// keyframe/duplicate intents, if any.
    #[tracing::instrument(skip(self, clock, gestures))]
    pub fn apply_intent(
        &mut self,
        intent: EditorIntent,
        clock: &mut PlaybackClock,
        gestures: &mut GestureController,
    ) -> Option<String> {
        match intent {
            EditorIntent::AddKeyframe => {
                let time = clock.time(self.ensure_timeline());
                Some(self.add_keyframe_at(time))
            }
            EditorIntent::DeleteElement { id } => {
                element::remove_element(&mut self.elements, &id);
                if let Some(tl) = self.timeline.as_mut() {
                    tl.purge_element(&id);
                }
                None
            }
            EditorIntent::DuplicateElement { id } => {
                element::duplicate_element(&mut self.elements, &id)
            }
            EditorIntent::EscapeTool => {
                gestures.cancel();
                None
            }
        }
    }
}

fn fresh_keyframe_id(timeline: &Timeline) -> String {
    let mut n = timeline.keyframes.len();
    loop {
        let candidate = format!("kf-{n}");
        if timeline.keyframe(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}
