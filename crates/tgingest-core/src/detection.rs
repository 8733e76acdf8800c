use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One object found by an external detector in one image.
///
/// Bounding box coordinates are in pixels of the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub image_name: String,
    pub class_name: String,
    pub confidence: f64,
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub detection_time: NaiveDateTime,
}
