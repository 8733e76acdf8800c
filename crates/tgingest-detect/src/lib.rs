//! Object detection over downloaded post images.
//!
//! Inference itself is delegated to a [`Detector`] backend; this crate only
//! drives it over a folder and shapes its output into [`DetectionRecord`]s.

pub mod command;
pub mod error;
pub mod folder;

use std::path::Path;

use tgingest_core::DetectionRecord;

pub use command::CommandDetector;
pub use error::DetectError;
pub use folder::{detect_folder, image_files};

/// A detection backend.
#[async_trait::async_trait]
pub trait Detector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Runs detection on one image.
    async fn detect_image(&self, path: &Path) -> Result<Vec<DetectionRecord>, DetectError>;
}
