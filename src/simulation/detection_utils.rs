use crate::annotations::detection::Detection;

/// Keeps the detections whose confidence is at least `threshold`, in their original order.
pub fn filter_by_confidence(detections: Vec<Detection>, threshold: f64) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|det| det.confidence() >= threshold)
        .collect()
}
