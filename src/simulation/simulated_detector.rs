//! A stand-in for a trained blood smear detector.
//!
//! The detector fabricates boxes from a pseudo-random stream seeded with the pixel area of the
//! image. Two images with the same dimensions get the same detections, whatever they show.

use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::cell_class::{CellClass, CellLabel, WbcSubtype};
use crate::annotations::detection::Detection;
use crate::simulation::class_profile::ClassProfile;
use crate::simulation::detection_model::{CellDetector, DetectionError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// What to do with a sampled box that does not fit inside the image.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DegenerateSamplePolicy {
    /// Shrink the box to the image extent on the offending axis.
    #[default]
    Clamp,
    /// Drop the instance.
    Skip,
}

/// A sampled box larger than the image on at least one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DegenerateSample {
    pub class: CellClass,
    pub box_width: u32,
    pub box_height: u32,
    pub image_width: u32,
    pub image_height: u32,
}

impl fmt::Display for DegenerateSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} box of {}x{} does not fit a {}x{} image",
            self.class, self.box_width, self.box_height, self.image_width, self.image_height
        )
    }
}

pub struct SimulatedDetector {
    profiles: [ClassProfile; 3],
    degenerate_policy: DegenerateSamplePolicy,
}

impl Default for SimulatedDetector {
    fn default() -> Self {
        SimulatedDetector::new(DegenerateSamplePolicy::default())
    }
}

impl SimulatedDetector {
    pub fn new(degenerate_policy: DegenerateSamplePolicy) -> Self {
        SimulatedDetector {
            profiles: CellClass::ALL.map(ClassProfile::for_class),
            degenerate_policy,
        }
    }

    /// The seed used for an image of the given size: its pixel area.
    pub fn seed_for(width: u32, height: u32) -> u64 {
        width as u64 * height as u64
    }

    /// Generates detections from a caller supplied random stream.
    ///
    /// Batches are drawn in the order RBC, WBC, Platelets. Within a batch the count is drawn
    /// first, then for every instance: width, height jitter, x, y, confidence and, for white
    /// cells only, the subtype. Every draw happens even when the instance is later skipped, so
    /// the stream position never depends on the degenerate sample policy.
    pub fn generate<R: Rng>(
        &self,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Result<Vec<Detection>, DetectionError> {
        if width == 0 || height == 0 {
            return Err(DetectionError::InvalidDimensions { width, height });
        }
        let mut detections: Vec<Detection> = Vec::new();
        for profile in self.profiles.iter() {
            self.generate_batch(profile, width, height, rng, &mut detections);
        }
        Ok(detections)
    }

    fn generate_batch<R: Rng>(
        &self,
        profile: &ClassProfile,
        width: u32,
        height: u32,
        rng: &mut R,
        detections: &mut Vec<Detection>,
    ) {
        if width < *profile.width.end() || height < profile.max_height() {
            debug!(
                class = %profile.class,
                width,
                height,
                "image is smaller than the largest {} box",
                profile.class
            );
        }
        let count = rng.random_range(profile.count.clone());
        let mut skipped = 0_u32;
        for _ in 0..count {
            let box_width = rng.random_range(profile.width.clone());
            let jitter = rng.random_range(profile.height_jitter.clone());
            let box_height = box_width.saturating_add_signed(jitter).max(1);
            let degenerate = (box_width > width || box_height > height).then_some(
                DegenerateSample {
                    class: profile.class,
                    box_width,
                    box_height,
                    image_width: width,
                    image_height: height,
                },
            );
            let box_width = box_width.min(width);
            let box_height = box_height.min(height);
            let x = rng.random_range(0..=width - box_width);
            let y = rng.random_range(0..=height - box_height);
            let confidence = rng.random_range(profile.confidence.clone());
            let label = match profile.class {
                CellClass::Rbc => CellLabel::Rbc,
                CellClass::Wbc => CellLabel::Wbc(
                    WbcSubtype::ALL[rng.random_range(0..WbcSubtype::ALL.len())],
                ),
                CellClass::Platelets => CellLabel::Platelets,
            };
            if let Some(sample) = degenerate {
                if self.degenerate_policy == DegenerateSamplePolicy::Skip {
                    debug!(%sample, "skipping degenerate sample");
                    skipped += 1;
                    continue;
                }
                debug!(%sample, "clamping degenerate sample");
            }
            // Sizes are at least 1 and clamped to the image, so the box is always valid.
            if let Ok(bbox) = BoundingBox::from_origin_and_size(x, y, box_width, box_height) {
                debug_assert!(bbox.fits_within(width, height));
                detections.push(Detection::new(bbox, label, confidence));
            }
        }
        debug!(class = %profile.class, drawn = count, skipped, "generated batch");
    }
}

impl CellDetector for SimulatedDetector {
    /// Seeds a fresh [`ChaCha8Rng`] from the image area and generates from it.
    fn detect(&self, width: u32, height: u32) -> Result<Vec<Detection>, DetectionError> {
        let mut rng = ChaCha8Rng::seed_from_u64(SimulatedDetector::seed_for(width, height));
        self.generate(width, height, &mut rng)
    }
}
