//! Client for the inference sidecar.
//!
//! The sidecar hosts the trained models the pipeline treats as opaque
//! capability providers: streaming speech recognition, object detection and
//! facial emotion classification. `MlClient` speaks its JSON/HTTP protocol
//! and implements the matching `vlens-media` provider traits.

pub mod client;
pub mod error;
pub mod types;

pub use client::{MlClient, MlClientConfig, MlRecognitionSession};
pub use error::{MlError, MlResult};
pub use types::{HealthResponse, ModelStatus};
