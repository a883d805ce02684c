//! Scene boundaries and the outcome of scene segmentation.

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sentinel::NO_SCENE_CHANGES;
use crate::timestamp::format_timecode;

/// A detected scene as a pair of `HH:MM:SS.mmm` timecodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub start: String,
    pub end: String,
}

impl Scene {
    /// Create a scene from timecode strings.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Create a scene from frame positions at the given frame rate.
    pub fn from_frames(start_frame: u64, end_frame: u64, fps: u32) -> Self {
        Self {
            start: format_timecode(start_frame, fps),
            end: format_timecode(end_frame, fps),
        }
    }
}

/// Outcome of scene segmentation.
///
/// Serialized as an array of `[start, end]` pairs, the string
/// `"No scene changes detected"`, or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SceneChangesRepr", into = "SceneChangesRepr")]
pub enum SceneChanges {
    /// Boundaries found, ordered by start time
    Detected(Vec<Scene>),
    /// Detector ran and found no boundaries
    NoneDetected,
    /// Detector failed
    Failed(String),
}

impl SceneChanges {
    /// Wrap a detector result, mapping an empty list to `NoneDetected`.
    pub fn from_scenes(scenes: Vec<Scene>) -> Self {
        if scenes.is_empty() {
            Self::NoneDetected
        } else {
            Self::Detected(scenes)
        }
    }

    /// Detected scenes, empty for the sentinel outcomes.
    pub fn scenes(&self) -> &[Scene] {
        match self {
            Self::Detected(scenes) => scenes,
            Self::NoneDetected | Self::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
enum SceneChangesRepr {
    Detected(Vec<(String, String)>),
    Failed { error: String },
    Sentinel(String),
}

impl From<SceneChanges> for SceneChangesRepr {
    fn from(changes: SceneChanges) -> Self {
        match changes {
            SceneChanges::Detected(scenes) => Self::Detected(
                scenes
                    .into_iter()
                    .map(|scene| (scene.start, scene.end))
                    .collect(),
            ),
            SceneChanges::NoneDetected => Self::Sentinel(NO_SCENE_CHANGES.to_string()),
            SceneChanges::Failed(error) => Self::Failed { error },
        }
    }
}

impl From<SceneChangesRepr> for SceneChanges {
    fn from(repr: SceneChangesRepr) -> Self {
        match repr {
            SceneChangesRepr::Detected(pairs) => Self::from_scenes(
                pairs
                    .into_iter()
                    .map(|(start, end)| Scene { start, end })
                    .collect(),
            ),
            SceneChangesRepr::Failed { error } => Self::Failed(error),
            SceneChangesRepr::Sentinel(_) => Self::NoneDetected,
        }
    }
}

impl JsonSchema for SceneChanges {
    fn schema_name() -> String {
        "SceneChanges".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        SceneChangesRepr::json_schema(gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scene_from_frames() {
        let scene = Scene::from_frames(0, 75, 25);
        assert_eq!(scene.start, "00:00:00.000");
        assert_eq!(scene.end, "00:00:03.000");
    }

    #[test]
    fn test_empty_maps_to_sentinel() {
        assert_eq!(SceneChanges::from_scenes(Vec::new()), SceneChanges::NoneDetected);
    }

    #[test]
    fn test_serialize_detected() {
        let changes = SceneChanges::from_scenes(vec![
            Scene::new("00:00:00.000", "00:00:04.000"),
            Scene::new("00:00:04.000", "00:00:09.500"),
        ]);
        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!([["00:00:00.000", "00:00:04.000"], ["00:00:04.000", "00:00:09.500"]])
        );
    }

    #[test]
    fn test_serialize_sentinels() {
        assert_eq!(
            serde_json::to_value(SceneChanges::NoneDetected).unwrap(),
            json!("No scene changes detected")
        );
        assert_eq!(
            serde_json::to_value(SceneChanges::Failed("Scene detection failed".into())).unwrap(),
            json!({"error": "Scene detection failed"})
        );
    }

    #[test]
    fn test_deserialize_shapes() {
        let failed: SceneChanges = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert!(failed.is_failed());

        let none: SceneChanges = serde_json::from_value(json!("No scene changes detected")).unwrap();
        assert_eq!(none, SceneChanges::NoneDetected);

        let detected: SceneChanges =
            serde_json::from_value(json!([["00:00:00.000", "00:00:01.000"]])).unwrap();
        assert_eq!(detected.scenes().len(), 1);
    }
}
