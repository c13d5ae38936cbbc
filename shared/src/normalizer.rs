use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::config::DEFAULT_FALLBACK_RIPENESS;
use crate::error::DetectionError;
use crate::model::{AnnotatedImage, DetectionResult, RawDetection};

const DETECTIONS_FIELD: &str = "detections";
const IMAGE_FIELDS: [&str; 2] = ["annotated_image", "image"];
const LABEL_FIELDS: [&str; 2] = ["ripeness", "label"];

/// Maps a raw inference response onto a [`DetectionResult`].
///
/// The decision label comes from, in order: a top-level `ripeness`/`label`
/// string, the most frequent detection label, then `fallback_ripeness`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseNormalizer {
    fallback_ripeness: String,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_RIPENESS)
    }
}

impl ResponseNormalizer {
    pub fn new(fallback_ripeness: impl Into<String>) -> Self {
        Self {
            fallback_ripeness: fallback_ripeness.into(),
        }
    }

    pub fn fallback_ripeness(&self) -> &str {
        &self.fallback_ripeness
    }

    pub fn normalize(&self, raw: &Value) -> Result<DetectionResult, DetectionError> {
        let body = raw
            .as_object()
            .ok_or_else(|| DetectionError::malformed("response is not a JSON object"))?;

        let entries = body
            .get(DETECTIONS_FIELD)
            .ok_or_else(|| DetectionError::malformed("missing `detections`"))?
            .as_array()
            .ok_or_else(|| DetectionError::malformed("`detections` is not a list"))?;

        let detections = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_detection(i, entry))
            .collect::<Result<Vec<_>, _>>()?;

        let annotated_image = parse_image(body)?;
        let ripeness = self.derive_ripeness(body, &detections);

        Ok(DetectionResult::new(
            ripeness,
            detections.len(),
            mean_confidence(&detections),
            annotated_image,
        ))
    }

    fn derive_ripeness(&self, body: &serde_json::Map<String, Value>, detections: &[RawDetection]) -> String {
        let explicit = LABEL_FIELDS
            .iter()
            .filter_map(|field| body.get(*field).and_then(Value::as_str))
            .map(str::trim)
            .find(|label| !label.is_empty());

        explicit
            .map(str::to_string)
            .or_else(|| majority_label(detections))
            .unwrap_or_else(|| self.fallback_ripeness.clone())
    }
}

fn parse_detection(index: usize, entry: &Value) -> Result<RawDetection, DetectionError> {
    if !entry.is_object() {
        return Err(DetectionError::malformed(format!(
            "detection {index} is not an object"
        )));
    }
    let detection: RawDetection = serde_json::from_value(entry.clone())
        .map_err(|e| DetectionError::malformed(format!("detection {index}: {e}")))?;

    if !detection.confidence.is_finite() || !(0.0..=1.0).contains(&detection.confidence) {
        return Err(DetectionError::malformed(format!(
            "detection {index} has confidence {} outside [0, 1]",
            detection.confidence
        )));
    }
    Ok(detection)
}

fn parse_image(body: &serde_json::Map<String, Value>) -> Result<AnnotatedImage, DetectionError> {
    let value = IMAGE_FIELDS
        .iter()
        .find_map(|field| body.get(*field).filter(|v| !v.is_null()))
        .ok_or_else(|| DetectionError::malformed("missing `annotated_image`"))?;

    let encoded = value
        .as_str()
        .ok_or_else(|| DetectionError::malformed("`annotated_image` is not a string"))?;
    // Tolerate services that already send a data URI.
    let payload = encoded
        .split_once(";base64,")
        .filter(|(prefix, _)| prefix.starts_with("data:"))
        .map_or(encoded, |(_, rest)| rest)
        .trim();

    if payload.is_empty() {
        return Err(DetectionError::malformed("`annotated_image` is empty"));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| DetectionError::malformed(format!("`annotated_image` is not base64: {e}")))?;

    Ok(AnnotatedImage::new(sniff_media_type(&bytes), payload))
}

/// Arithmetic mean of the confidences; zero detections yield `0.0`.
pub fn mean_confidence(detections: &[RawDetection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    let total: f64 = detections.iter().map(|d| d.confidence).sum();
    total / detections.len() as f64
}

fn majority_label(detections: &[RawDetection]) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (order, label) in detections
        .iter()
        .filter_map(|d| d.label.as_deref())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
    {
        counts.entry(label).or_insert((0, order)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(label, _)| label.to_string())
}

fn sniff_media_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}
