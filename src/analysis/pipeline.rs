//! Runs one field of view through detection, filtering, evaluation and rendering.

use crate::analysis::evaluator::FlagEvaluator;
use crate::analysis::report::AnalysisReport;
use crate::config::AnalysisConfig;
use crate::image_utils::cropping::{WbcCrop, crop_wbcs};
use crate::image_utils::drawing::draw_detections;
use crate::image_utils::image_io::read_image_as_rgb8;
use crate::simulation::detection_model::{CellDetector, DetectionError};
use crate::simulation::detection_utils::filter_by_confidence;
use crate::simulation::simulated_detector::SimulatedDetector;
use image::{ImageError, RgbImage};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to read or write image: {0}")]
    Image(#[from] ImageError),
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// The rendered results of one image.
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    pub annotated: RgbImage,
    pub crops: Vec<WbcCrop>,
}

pub struct Analyzer<D: CellDetector> {
    detector: D,
    evaluator: FlagEvaluator,
    confidence_threshold: f64,
}

impl Analyzer<SimulatedDetector> {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Analyzer::new(
            SimulatedDetector::new(config.degenerate_policy),
            FlagEvaluator::new(config.flag_rules),
            config.confidence_threshold,
        )
    }
}

impl<D: CellDetector> Analyzer<D> {
    pub fn new(detector: D, evaluator: FlagEvaluator, confidence_threshold: f64) -> Self {
        Analyzer { detector, evaluator, confidence_threshold }
    }

    /// Detects, filters and evaluates an image of the given size without touching pixels.
    ///
    /// `rng` only feeds the evaluator; detection is seeded from the image size.
    pub fn simulate<R: Rng>(
        &self,
        width: u32,
        height: u32,
        source: Option<String>,
        rng: &mut R,
    ) -> Result<AnalysisReport, DetectionError> {
        let detections = self.detector.detect(width, height)?;
        let generated = detections.len();
        let detections = filter_by_confidence(detections, self.confidence_threshold);
        debug!(
            generated,
            kept = detections.len(),
            threshold = self.confidence_threshold,
            "filtered detections"
        );
        let evaluation = self.evaluator.evaluate(&detections, rng);
        Ok(AnalysisReport::new(
            source,
            (width, height),
            self.confidence_threshold,
            evaluation,
            detections,
        ))
    }

    pub fn analyze_image<R: Rng>(
        &self,
        image: &RgbImage,
        source: Option<String>,
        rng: &mut R,
    ) -> Result<AnalysisOutcome, DetectionError> {
        let mut report = self.simulate(image.width(), image.height(), source, rng)?;
        let annotated = draw_detections(image.clone(), &report.detections);
        let crops = crop_wbcs(image, &report.detections);
        report.gallery_size = crops.len();
        Ok(AnalysisOutcome { report, annotated, crops })
    }

    pub fn analyze_file<R: Rng>(
        &self,
        filepath: &Path,
        rng: &mut R,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let image = read_image_as_rgb8(filepath)?;
        info!(
            path = %filepath.display(),
            width = image.width(),
            height = image.height(),
            "analyzing image"
        );
        Ok(self.analyze_image(&image, Some(filepath.display().to_string()), rng)?)
    }
}

/// Writes `<stem>_annotated.png`, `<stem>_report.json` and, when asked, the white cell crops
/// into `<stem>_wbc/`. Returns the written paths.
pub fn write_outcome(
    outcome: &AnalysisOutcome,
    stem: &str,
    output_dir: &Path,
    save_crops: bool,
) -> Result<Vec<PathBuf>, AnalysisError> {
    fs::create_dir_all(output_dir)?;
    let mut written: Vec<PathBuf> = Vec::new();

    let annotated_path = output_dir.join(format!("{}_annotated.png", stem));
    outcome.annotated.save(&annotated_path)?;
    written.push(annotated_path);

    let report_path = output_dir.join(format!("{}_report.json", stem));
    fs::write(&report_path, outcome.report.to_json()?)?;
    written.push(report_path);

    if save_crops && !outcome.crops.is_empty() {
        let crop_dir = output_dir.join(format!("{}_wbc", stem));
        fs::create_dir_all(&crop_dir)?;
        for (index, crop) in outcome.crops.iter().enumerate() {
            let crop_path = crop_dir.join(format!("{:02}_{}.png", index, crop.subtype.slug()));
            crop.image.save(&crop_path)?;
            debug!(subtype = %crop.subtype, bbox = ?crop.bbox.as_xyxy(), "saved crop");
            written.push(crop_path);
        }
    }
    debug!(files = written.len(), dir = %output_dir.display(), "wrote outputs");
    Ok(written)
}
