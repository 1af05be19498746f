use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of cell the detector reports.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum CellClass {
    #[serde(rename = "RBC")]
    Rbc,
    #[serde(rename = "WBC")]
    Wbc,
    #[serde(rename = "Platelets")]
    Platelets,
}

impl CellClass {
    /// Generation order of the batches.
    pub const ALL: [CellClass; 3] = [CellClass::Rbc, CellClass::Wbc, CellClass::Platelets];

    pub fn name(&self) -> &'static str {
        match self {
            CellClass::Rbc => "RBC",
            CellClass::Wbc => "WBC",
            CellClass::Platelets => "Platelets",
        }
    }
}

impl fmt::Display for CellClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Morphological subtype of a white blood cell.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum WbcSubtype {
    Neutrophil,
    Lymphocyte,
    Monocyte,
    Eosinophil,
    Basophil,
    Blast,
    Promyelocyte,
    Myelocyte,
    Metamyelocyte,
    #[serde(rename = "Band Neutrophil")]
    BandNeutrophil,
    #[serde(rename = "Reactive Lymphocyte")]
    ReactiveLymphocyte,
}

impl WbcSubtype {
    /// Every subtype, in the order the detector draws from.
    pub const ALL: [WbcSubtype; 11] = [
        WbcSubtype::Neutrophil,
        WbcSubtype::Lymphocyte,
        WbcSubtype::Monocyte,
        WbcSubtype::Eosinophil,
        WbcSubtype::Basophil,
        WbcSubtype::Blast,
        WbcSubtype::Promyelocyte,
        WbcSubtype::Myelocyte,
        WbcSubtype::Metamyelocyte,
        WbcSubtype::BandNeutrophil,
        WbcSubtype::ReactiveLymphocyte,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WbcSubtype::Neutrophil => "Neutrophil",
            WbcSubtype::Lymphocyte => "Lymphocyte",
            WbcSubtype::Monocyte => "Monocyte",
            WbcSubtype::Eosinophil => "Eosinophil",
            WbcSubtype::Basophil => "Basophil",
            WbcSubtype::Blast => "Blast",
            WbcSubtype::Promyelocyte => "Promyelocyte",
            WbcSubtype::Myelocyte => "Myelocyte",
            WbcSubtype::Metamyelocyte => "Metamyelocyte",
            WbcSubtype::BandNeutrophil => "Band Neutrophil",
            WbcSubtype::ReactiveLymphocyte => "Reactive Lymphocyte",
        }
    }

    /// A filesystem friendly form of the name, e.g. `band_neutrophil`.
    pub fn slug(&self) -> String {
        self.name().to_lowercase().replace(' ', "_")
    }
}

impl fmt::Display for WbcSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The label attached to a detection.
///
/// Only white blood cells carry a subtype, so the subtype lives inside the `Wbc` variant rather
/// than next to the class. A red cell with a subtype cannot be built.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CellLabel {
    Rbc,
    Wbc(WbcSubtype),
    Platelets,
}

impl CellLabel {
    pub fn class(&self) -> CellClass {
        match self {
            CellLabel::Rbc => CellClass::Rbc,
            CellLabel::Wbc(_) => CellClass::Wbc,
            CellLabel::Platelets => CellClass::Platelets,
        }
    }

    pub fn subtype(&self) -> Option<WbcSubtype> {
        match self {
            CellLabel::Wbc(subtype) => Some(*subtype),
            _ => None,
        }
    }
}

impl fmt::Display for CellLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellLabel::Wbc(subtype) => write!(f, "{} ({})", CellClass::Wbc, subtype),
            other => write!(f, "{}", other.class()),
        }
    }
}
