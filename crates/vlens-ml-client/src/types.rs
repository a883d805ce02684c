//! Sidecar request/response types.

use serde::{Deserialize, Serialize};
use vlens_media::RecognizedSegment;
use vlens_models::{LabelTree, TranscriptFragment};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
    #[serde(default)]
    pub models: Option<ModelStatus>,
}

/// Which models the sidecar has loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStatus {
    pub speech: Option<bool>,
    pub objects: Option<bool>,
    pub emotions: Option<bool>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" || self.status == "ok"
    }

    /// Healthy and not reporting the speech model as missing.
    pub fn speech_ready(&self) -> bool {
        self.is_healthy()
            && self
                .models
                .as_ref()
                .and_then(|m| m.speech)
                .unwrap_or(true)
    }
}

/// Start a recognition session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
}

/// One chunk of little-endian i16 PCM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRequest {
    pub pcm_base64: String,
}

/// Recognizer output for a chunk or a flush.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionResponse {
    /// Whether an utterance was finalized
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub result: Vec<TranscriptFragment>,
}

impl RecognitionResponse {
    /// The finalized segment, if the response carries one.
    pub fn into_segment(self) -> Option<RecognizedSegment> {
        let segment = RecognizedSegment {
            text: self.text.unwrap_or_default(),
            words: self.result,
        };
        (!segment.is_empty()).then_some(segment)
    }
}

/// A JPEG frame for detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub image_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectsResponse {
    #[serde(default = "LabelTree::empty")]
    pub labels: LabelTree,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmotionsResponse {
    #[serde(default)]
    pub faces: Vec<FaceEmotion>,
}

/// Per-face classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceEmotion {
    pub dominant_emotion: Option<String>,
}

impl EmotionsResponse {
    /// Dominant labels of faces that have one, in detection order.
    pub fn dominant_labels(self) -> Vec<String> {
        self.faces
            .into_iter()
            .filter_map(|f| f.dominant_emotion)
            .collect()
    }
}
