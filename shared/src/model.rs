use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display};
use uuid::Uuid;

use crate::error::Failure;

/// A user-selected image. `S` carries the bytes and whatever local preview
/// resource the platform created for them; dropping the last handle releases it.
#[derive(Debug)]
pub struct UploadedFile<S> {
    id: Uuid,
    name: String,
    media_type: String,
    source: S,
}

impl<S> UploadedFile<S> {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, source: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            media_type: media_type.into(),
            source,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

/// One object as reported by the inference service. Only `confidence` is
/// required; a `label` or `box` of an unexpected shape reads as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        default,
        rename = "box",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub bbox: Option<[f64; 4]>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Annotated image ready for an `<img src>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedImage {
    media_type: String,
    payload: String,
}

impl AnnotatedImage {
    pub(crate) fn new(media_type: &str, payload: &str) -> Self {
        Self {
            media_type: media_type.to_string(),
            payload: payload.to_string(),
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.payload)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.payload)
    }
}

/// The view model the results page renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    ripeness: String,
    count: usize,
    confidence: f64,
    annotated_image: AnnotatedImage,
}

impl DetectionResult {
    pub(crate) fn new(
        ripeness: String,
        count: usize,
        confidence: f64,
        annotated_image: AnnotatedImage,
    ) -> Self {
        Self {
            ripeness,
            count,
            confidence,
            annotated_image,
        }
    }

    pub fn ripeness(&self) -> &str {
        &self.ripeness
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }

    pub fn annotated_image(&self) -> &AnnotatedImage {
        &self.annotated_image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum StateTag {
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

#[derive(Debug)]
pub enum WorkflowState<S> {
    Idle,
    Uploading(Rc<UploadedFile<S>>),
    Succeeded(DetectionResult),
    Failed(Failure),
}

impl<S> WorkflowState<S> {
    pub fn tag(&self) -> StateTag {
        match self {
            WorkflowState::Idle => StateTag::Idle,
            WorkflowState::Uploading(_) => StateTag::Uploading,
            WorkflowState::Succeeded(_) => StateTag::Succeeded,
            WorkflowState::Failed(_) => StateTag::Failed,
        }
    }

    pub fn uploading(&self) -> Option<&UploadedFile<S>> {
        match self {
            WorkflowState::Uploading(file) => Some(file.as_ref()),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        match self {
            WorkflowState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            WorkflowState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
