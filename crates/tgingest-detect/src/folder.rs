//! Detection over every image in a folder.

use std::path::{Path, PathBuf};

use tgingest_core::DetectionRecord;

use crate::error::DetectError;
use crate::Detector;

const IMAGE_SUFFIXES: [&str; 2] = [".jpg", ".png"];

/// Image files directly inside `folder`, sorted by path.
///
/// # Errors
///
/// Returns [`DetectError::Io`] if the folder cannot be listed.
pub fn image_files(folder: &Path) -> Result<Vec<PathBuf>, DetectError> {
    let io_err = |source| DetectError::Io {
        path: folder.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_image = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| IMAGE_SUFFIXES.iter().any(|s| n.ends_with(s)));
        if is_image {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Runs `detector` on every image in `folder` and collects the detections.
///
/// An image the detector fails on is logged and skipped.
///
/// # Errors
///
/// Returns [`DetectError::Io`] if the folder cannot be listed.
pub async fn detect_folder(
    detector: &dyn Detector,
    folder: &Path,
) -> Result<Vec<DetectionRecord>, DetectError> {
    let images = image_files(folder)?;
    tracing::info!(
        detector = detector.name(),
        folder = %folder.display(),
        images = images.len(),
        "starting object detection"
    );

    let mut detections = Vec::new();
    let mut failed = 0usize;
    for image in &images {
        match detector.detect_image(image).await {
            Ok(found) => {
                for d in &found {
                    tracing::info!(
                        image = %d.image_name,
                        class = %d.class_name,
                        confidence = d.confidence,
                        "detected object"
                    );
                }
                detections.extend(found);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(image = %image.display(), error = %e, "detection failed, skipping image");
            }
        }
    }

    tracing::info!(
        images = images.len(),
        failed,
        detections = detections.len(),
        "object detection complete"
    );
    Ok(detections)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use super::*;

    /// Returns one detection per image and fails on names containing "broken".
    struct FakeDetector {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Detector for FakeDetector {
        fn name(&self) -> &str {
            "fake"
        }

        async fn detect_image(&self, path: &Path) -> Result<Vec<DetectionRecord>, DetectError> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.seen.lock().unwrap().push(name.clone());
            if name.contains("broken") {
                return Err(DetectError::Failed {
                    image: path.to_path_buf(),
                    status: "exit status: 1".to_string(),
                    stderr: String::new(),
                });
            }
            Ok(vec![DetectionRecord {
                image_name: name,
                class_name: "bottle".to_string(),
                confidence: 0.8,
                x_min: 0.0,
                y_min: 0.0,
                x_max: 1.0,
                y_max: 1.0,
                detection_time: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap(),
            }])
        }
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"img").unwrap();
    }

    #[test]
    fn only_jpg_and_png_files_are_listed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b_1_0.png");
        touch(dir.path(), "a_1_0.jpg");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "c_1_0.JPG");
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let names: Vec<_> = image_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_1_0.jpg", "b_1_0.png"]);
    }

    #[test]
    fn missing_folder_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = image_files(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, DetectError::Io { .. }));
    }

    #[tokio::test]
    async fn failing_images_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "EAHCI_1_0.jpg");
        touch(dir.path(), "EAHCI_2_0_broken.jpg");
        touch(dir.path(), "EAHCI_3_0.jpg");

        let detector = FakeDetector {
            seen: Mutex::new(Vec::new()),
        };
        let records = detect_folder(&detector, dir.path()).await.unwrap();

        let names: Vec<_> = records.iter().map(|r| r.image_name.as_str()).collect();
        assert_eq!(names, vec!["EAHCI_1_0.jpg", "EAHCI_3_0.jpg"]);
        assert_eq!(detector.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_folder_yields_no_detections() {
        let dir = tempfile::tempdir().unwrap();
        let detector = FakeDetector {
            seen: Mutex::new(Vec::new()),
        };
        assert!(detect_folder(&detector, dir.path()).await.unwrap().is_empty());
    }
}
