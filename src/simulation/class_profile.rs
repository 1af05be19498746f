use crate::annotations::cell_class::CellClass;
use std::ops::RangeInclusive;

/// The sampling ranges used to fabricate one class of cell.
///
/// Box height is the sampled width plus a jitter, so cells come out roughly round.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassProfile {
    pub class: CellClass,
    pub count: RangeInclusive<u32>,
    pub width: RangeInclusive<u32>,
    pub height_jitter: RangeInclusive<i32>,
    pub confidence: RangeInclusive<f64>,
}

impl ClassProfile {
    pub fn for_class(class: CellClass) -> Self {
        match class {
            // Many, medium sized.
            CellClass::Rbc => ClassProfile {
                class,
                count: 50..=150,
                width: 30..=60,
                height_jitter: -5..=5,
                confidence: 0.70..=0.99,
            },
            // Few, large.
            CellClass::Wbc => ClassProfile {
                class,
                count: 2..=8,
                width: 80..=150,
                height_jitter: -10..=10,
                confidence: 0.85..=0.99,
            },
            CellClass::Platelets => ClassProfile {
                class,
                count: 10..=30,
                width: 15..=25,
                height_jitter: -3..=3,
                confidence: 0.60..=0.95,
            },
        }
    }

    /// Largest height a box of this class can be drawn with.
    pub fn max_height(&self) -> u32 {
        self.width.end().saturating_add_signed(*self.height_jitter.end())
    }
}
