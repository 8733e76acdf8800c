//! Detector backed by an external program.
//!
//! The program is invoked once per image with the image path as its last
//! argument and must print a JSON array of detections on stdout:
//!
//! ```json
//! [{"class_name": "bottle", "confidence": 0.91,
//!   "x_min": 10.0, "y_min": 20.0, "x_max": 110.5, "y_max": 220.25}]
//! ```
//!
//! `image_name` and `detection_time` may be omitted; they default to the image
//! file name and the current UTC time.

use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use tgingest_core::DetectionRecord;

use crate::error::DetectError;
use crate::Detector;

#[derive(Debug, Deserialize)]
struct CommandDetection {
    image_name: Option<String>,
    class_name: String,
    confidence: f64,
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
    detection_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: String,
    args: Vec<String>,
}

impl CommandDetector {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a whitespace-separated command line into program and arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::EmptyCommand`] for a blank command line.
    pub fn from_command_line(command: &str) -> Result<Self, DetectError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(DetectError::EmptyCommand)?;
        Ok(Self::new(program, parts.collect()))
    }
}

#[async_trait::async_trait]
impl Detector for CommandDetector {
    fn name(&self) -> &str {
        &self.program
    }

    async fn detect_image(&self, path: &Path) -> Result<Vec<DetectionRecord>, DetectError> {
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .await
            .map_err(|source| DetectError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DetectError::Failed {
                image: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let parsed: Vec<CommandDetection> =
            serde_json::from_slice(&output.stdout).map_err(|source| DetectError::Decode {
                image: path.to_path_buf(),
                source,
            })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let now = Utc::now().naive_utc();

        Ok(parsed
            .into_iter()
            .map(|d| DetectionRecord {
                image_name: d.image_name.unwrap_or_else(|| file_name.clone()),
                class_name: d.class_name,
                confidence: d.confidence,
                x_min: d.x_min,
                y_min: d.y_min,
                x_max: d.x_max,
                y_max: d.y_max,
                detection_time: d.detection_time.unwrap_or(now),
            })
            .collect())
    }
}
