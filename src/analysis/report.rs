use crate::analysis::evaluator::{CellCounts, Evaluation, SubtypeHistogram};
use crate::analysis::flags::Flag;
use crate::annotations::detection::Detection;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

pub const DISCLAIMER: &str = "Disclaimer: this is a DEMO using simulated data. It is NOT a \
                              medical device and should not be used for diagnosis.";

/// Everything shown for one analyzed field of view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Where the image came from, if it came from a file.
    pub source: Option<String>,
    pub width: u32,
    pub height: u32,
    pub confidence_threshold: f64,
    pub counts: CellCounts,
    pub wbc_differential: SubtypeHistogram,
    pub flags: Vec<Flag>,
    /// Number of crops in the white cell gallery. Until an image is cropped this is the WBC count.
    pub gallery_size: usize,
    pub detections: Vec<Detection>,
}

impl AnalysisReport {
    pub fn new(
        source: Option<String>,
        (width, height): (u32, u32),
        confidence_threshold: f64,
        evaluation: Evaluation,
        detections: Vec<Detection>,
    ) -> Self {
        let gallery_size = evaluation.counts.wbc as usize;
        AnalysisReport {
            source,
            width,
            height,
            confidence_threshold,
            counts: evaluation.counts,
            wbc_differential: evaluation.subtype_histogram,
            flags: evaluation.flags,
            gallery_size,
            detections,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.source.as_deref().unwrap_or("simulated field");
        writeln!(f, "Peripheral Blood Smear Analysis: {} ({}x{})", title, self.width, self.height)?;
        writeln!(f, "Confidence threshold: {:.2}", self.confidence_threshold)?;
        writeln!(
            f,
            "RBC Count: {} | WBC Count: {} | Platelet Count: {}",
            self.counts.rbc, self.counts.wbc, self.counts.platelets
        )?;

        writeln!(f, "\nClinical Flags (PROTOTYPE)")?;
        if self.flags.is_empty() {
            writeln!(
                f,
                "  No significant morphological anomalies detected in this field of view."
            )?;
        }
        for flag in self.flags.iter() {
            writeln!(f, "  [{}] {}: {}", flag.severity, flag.title, flag.description)?;
        }

        writeln!(f, "\nWBC Differential")?;
        if self.wbc_differential.is_empty() {
            writeln!(f, "  No WBCs detected.")?;
        } else {
            let rows = self
                .wbc_differential
                .iter()
                .map(|(subtype, count)| format!("  {}: {}", subtype, count))
                .join("\n");
            writeln!(f, "{}", rows)?;
        }

        writeln!(f, "\nWBC Morphology Gallery")?;
        if self.gallery_size == 0 {
            writeln!(f, "  No WBCs found to crop.")?;
        } else {
            writeln!(f, "  {} crop(s)", self.gallery_size)?;
        }

        write!(f, "\n{}", DISCLAIMER)
    }
}
