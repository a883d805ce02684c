//! Scene segmentation stage.

use std::path::Path;

use tracing::{info, warn};
use vlens_media::SceneDetector;
use vlens_models::SceneChanges;

/// Reported when the detector fails; the cause is only logged.
pub const SCENE_DETECTION_FAILED: &str = "Scene detection failed due to an error.";

/// Run the boundary detector and classify its outcome.
pub async fn segment(detector: &dyn SceneDetector, video: &Path) -> SceneChanges {
    match detector.detect_scenes(video).await {
        Ok(scenes) => {
            info!(detector = detector.name(), scenes = scenes.len(), "Scene segmentation complete");
            SceneChanges::from_scenes(scenes)
        }
        Err(e) => {
            warn!(detector = detector.name(), error = %e, "Error in scene detection");
            SceneChanges::Failed(SCENE_DETECTION_FAILED.to_string())
        }
    }
}
