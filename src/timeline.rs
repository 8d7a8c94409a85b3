use std::collections::BTreeMap;

use crate::{
    ease::Ease,
    element::{PropKey, PropValue},
    error::{SceneKeyError, SceneKeyResult},
};

/// Two keyframes closer than this are considered to occupy the same time.
pub const KEYFRAME_EPSILON: f64 = 0.01;

/// Animatable property values captured for one element.
pub type PropertyMap = BTreeMap<PropKey, PropValue>;

/// One full-scene capture: element id to captured property values.
pub type Snapshot = BTreeMap<String, PropertyMap>;

/// Playback settings and global keyframes for one animated scene.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Total duration in seconds, > 0.
    pub duration: f64,
    #[serde(default)]
    pub looping: bool,
    #[serde(default)]
    pub autoplay: bool,
    /// Playback speed multiplier, > 0.
    pub speed: f64,
    /// Unordered; read through [`Timeline::sorted`].
    pub keyframes: Vec<GlobalKeyframe>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            duration: 5.0,
            looping: false,
            autoplay: false,
            speed: 1.0,
            keyframes: Vec::new(),
        }
    }
}

/// A snapshot of the whole scene at one instant, plus the easing used when
/// leaving it toward the next keyframe in time order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalKeyframe {
    pub id: String,
    pub time: f64,
    #[serde(default)]
    pub easing: Ease,
    pub snapshot: Snapshot,
}

impl Timeline {
    pub fn validate(&self) -> SceneKeyResult<()> {
        if !(self.duration > 0.0) {
            return Err(SceneKeyError::validation("timeline duration must be > 0"));
        }
        if !(self.speed > 0.0) {
            return Err(SceneKeyError::validation("timeline speed must be > 0"));
        }
        for kf in &self.keyframes {
            if !(0.0..=self.duration).contains(&kf.time) {
                return Err(SceneKeyError::validation(format!(
                    "keyframe '{}' time {} outside [0, {}]",
                    kf.id, kf.time, self.duration
                )));
            }
        }
        Ok(())
    }

    /// Keyframes in ascending time order. Order is always derived here at
    /// read time; no explicit sequence field exists.
    pub fn sorted(&self) -> Vec<&GlobalKeyframe> {
        let mut kfs: Vec<&GlobalKeyframe> = self.keyframes.iter().collect();
        kfs.sort_by(|a, b| a.time.total_cmp(&b.time));
        kfs
    }

    pub fn keyframe(&self, id: &str) -> Option<&GlobalKeyframe> {
        self.keyframes.iter().find(|kf| kf.id == id)
    }

    pub fn keyframe_mut(&mut self, id: &str) -> Option<&mut GlobalKeyframe> {
        self.keyframes.iter_mut().find(|kf| kf.id == id)
    }

    /// Inserts a keyframe, clamping its time into `[0, duration]`.
    ///
    /// At most one keyframe may exist per time: any existing keyframe within
    /// [`KEYFRAME_EPSILON`] of the (clamped) time is replaced.
    pub fn upsert_keyframe(&mut self, mut kf: GlobalKeyframe) {
        kf.time = kf.time.clamp(0.0, self.duration);
        let replaced = self.remove_near(kf.time, &kf.id);
        if replaced {
            tracing::debug!(time = kf.time, id = %kf.id, "keyframe replaced at occupied time");
        }
        self.keyframes.push(kf);
    }

    pub fn remove_keyframe(&mut self, id: &str) -> Option<GlobalKeyframe> {
        let pos = self.keyframes.iter().position(|kf| kf.id == id)?;
        Some(self.keyframes.remove(pos))
    }

    /// Moves a keyframe to a new (clamped) time. Landing within epsilon of
    /// another keyframe replaces that keyframe, keeping the one-per-time
    /// invariant under every mutation path.
    pub fn move_keyframe(&mut self, id: &str, new_time: f64) {
        if self.keyframe(id).is_none() {
            return;
        }
        let clamped = new_time.clamp(0.0, self.duration);
        self.remove_near(clamped, id);
        if let Some(kf) = self.keyframe_mut(id) {
            kf.time = clamped;
        }
    }

    pub fn set_easing(&mut self, id: &str, easing: Ease) {
        if let Some(kf) = self.keyframe_mut(id) {
            kf.easing = easing;
        }
    }

    /// Drops every snapshot entry for `element_id` across all keyframes, so
    /// deleted elements leave no orphan data behind.
    pub fn purge_element(&mut self, element_id: &str) {
        for kf in &mut self.keyframes {
            kf.snapshot.remove(element_id);
        }
    }

    fn remove_near(&mut self, time: f64, except_id: &str) -> bool {
        let before = self.keyframes.len();
        self.keyframes
            .retain(|kf| kf.id == except_id || (kf.time - time).abs() >= KEYFRAME_EPSILON);
        self.keyframes.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(id: &str, time: f64) -> GlobalKeyframe {
        GlobalKeyframe {
            id: id.to_string(),
            time,
            easing: Ease::Linear,
            snapshot: Snapshot::new(),
        }
    }

    #[test]
    fn sorted_derives_order_at_read_time() {
        let mut tl = Timeline::default();
        tl.upsert_keyframe(kf("b", 3.0));
        tl.upsert_keyframe(kf("a", 1.0));
        let order: Vec<&str> = tl.sorted().iter().map(|k| k.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn upsert_replaces_within_epsilon() {
        let mut tl = Timeline::default();
        tl.upsert_keyframe(kf("a", 1.0));
        tl.upsert_keyframe(kf("b", 1.005));
        assert_eq!(tl.keyframes.len(), 1);
        assert_eq!(tl.keyframes[0].id, "b");
    }

    #[test]
    fn upsert_clamps_time_into_duration() {
        let mut tl = Timeline::default();
        tl.upsert_keyframe(kf("a", 99.0));
        assert_eq!(tl.keyframes[0].time, 5.0);
        tl.upsert_keyframe(kf("b", -1.0));
        assert_eq!(tl.keyframe("b").unwrap().time, 0.0);
    }

    #[test]
    fn move_keyframe_collides_and_replaces() {
        let mut tl = Timeline::default();
        tl.upsert_keyframe(kf("a", 1.0));
        tl.upsert_keyframe(kf("b", 3.0));
        tl.move_keyframe("b", 1.002);
        assert_eq!(tl.keyframes.len(), 1);
        assert_eq!(tl.keyframes[0].id, "b");
        assert_eq!(tl.keyframes[0].time, 1.002);
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let tl = Timeline {
            duration: 0.0,
            ..Timeline::default()
        };
        assert!(tl.validate().is_err());

        let tl = Timeline {
            speed: 0.0,
            ..Timeline::default()
        };
        assert!(tl.validate().is_err());
    }

    #[test]
    fn purge_removes_element_entries() {
        let mut tl = Timeline::default();
        let mut k = kf("a", 1.0);
        k.snapshot
            .insert("el".to_string(), PropertyMap::from([(PropKey::X, PropValue::Number(1.0))]));
        tl.upsert_keyframe(k);
        tl.purge_element("el");
        assert!(tl.keyframes[0].snapshot.is_empty());
    }
}
