use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::cell_class::{CellClass, CellLabel, WbcSubtype};
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

/// A detection is what the detector produces for a single cell.
///
/// A detection is a bounding box combined with a label and a confidence score: the simulated
/// belief that the detection is true. Detections are never edited after they are produced.
/// Callers narrow a set of detections by filtering, see
/// [`filter_by_confidence`](crate::simulation::detection_utils::filter_by_confidence).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    annotation: BoundingBox,
    label: CellLabel,
    confidence: f64,
}

impl Detection {
    pub fn new(annotation: BoundingBox, label: CellLabel, confidence: f64) -> Self {
        Detection { annotation, label, confidence }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.annotation
    }

    pub fn label(&self) -> CellLabel {
        self.label
    }

    pub fn class(&self) -> CellClass {
        self.label.class()
    }

    pub fn subtype(&self) -> Option<WbcSubtype> {
        self.label.subtype()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Serialize for Detection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let field_count = if self.subtype().is_some() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("Detection", field_count)?;
        state.serialize_field("bbox", &self.annotation)?;
        state.serialize_field("class", &self.class())?;
        if let Some(subtype) = self.subtype() {
            state.serialize_field("subtype", &subtype)?;
        } else {
            state.skip_field("subtype")?;
        }
        state.serialize_field("confidence", &self.confidence)?;
        state.end()
    }
}
