use crate::analysis::flags::{Flag, FlagKind, FlagRules};
use crate::annotations::cell_class::{CellClass, WbcSubtype};
use crate::annotations::detection::Detection;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Number of detections per class. Every class is present, even at zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CellCounts {
    #[serde(rename = "RBC")]
    pub rbc: u32,
    #[serde(rename = "WBC")]
    pub wbc: u32,
    #[serde(rename = "Platelets")]
    pub platelets: u32,
}

impl CellCounts {
    fn increment(&mut self, class: CellClass) {
        match class {
            CellClass::Rbc => self.rbc += 1,
            CellClass::Wbc => self.wbc += 1,
            CellClass::Platelets => self.platelets += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.rbc + self.wbc + self.platelets
    }
}

/// WBC subtype histogram (the differential). Only observed subtypes appear.
pub type SubtypeHistogram = BTreeMap<WbcSubtype, u32>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub flags: Vec<Flag>,
    pub counts: CellCounts,
    pub subtype_histogram: SubtypeHistogram,
}

/// Turns a (filtered) set of detections into counts, a differential and flags.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlagEvaluator {
    rules: FlagRules,
}

impl FlagEvaluator {
    pub fn new(rules: FlagRules) -> Self {
        FlagEvaluator { rules }
    }

    /// Counts and histogram depend only on `detections`, as do every rule but the malaria one.
    /// The malaria rule draws from `rng`, which callers seed independently of the image, so its
    /// outcome changes from run to run.
    pub fn evaluate<R: Rng>(&self, detections: &[Detection], rng: &mut R) -> Evaluation {
        let mut counts = CellCounts::default();
        let mut subtype_histogram = SubtypeHistogram::new();
        for det in detections {
            counts.increment(det.class());
            if let Some(subtype) = det.subtype() {
                *subtype_histogram.entry(subtype).or_insert(0) += 1;
            }
        }

        let mut flags: Vec<Flag> = Vec::new();
        if counts.wbc > self.rules.leukocytosis_above {
            flags.push(FlagKind::Leukocytosis.into());
        }
        if counts.platelets < self.rules.thrombocytopenia_below {
            flags.push(FlagKind::Thrombocytopenia.into());
        }
        if rng.random_bool(self.rules.malaria_chance()) {
            flags.push(FlagKind::MalariaParasite.into());
        }
        if subtype_histogram.contains_key(&WbcSubtype::Blast) {
            flags.push(FlagKind::BlastCells.into());
        }
        debug!(
            rbc = counts.rbc,
            wbc = counts.wbc,
            platelets = counts.platelets,
            flags = flags.len(),
            "evaluated detections"
        );

        Evaluation { flags, counts, subtype_histogram }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;
    use crate::annotations::cell_class::CellLabel;
    use crate::simulation::detection_model::CellDetector;
    use crate::simulation::detection_utils::filter_by_confidence;
    use crate::simulation::simulated_detector::SimulatedDetector;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cells(label: CellLabel, n: usize) -> Vec<Detection> {
        (0..n)
            .map(|_| Detection::new(BoundingBox::new(0, 0, 10, 10).unwrap(), label, 0.9))
            .collect()
    }

    fn smear(rbc: usize, wbc: &[(WbcSubtype, usize)], platelets: usize) -> Vec<Detection> {
        let mut detections = cells(CellLabel::Rbc, rbc);
        for (subtype, n) in wbc {
            detections.extend(cells(CellLabel::Wbc(*subtype), *n));
        }
        detections.extend(cells(CellLabel::Platelets, platelets));
        detections
    }

    fn deterministic() -> FlagEvaluator {
        FlagEvaluator::new(FlagRules { malaria_probability: 0.0, ..FlagRules::default() })
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    trait HasFlag {
        fn has_flag(&self, kind: FlagKind) -> bool;
    }

    impl HasFlag for Evaluation {
        fn has_flag(&self, kind: FlagKind) -> bool {
            self.flags.iter().any(|flag| flag.kind == kind)
        }
    }

    #[test]
    fn counts_and_histogram_are_consistent() {
        let detections = SimulatedDetector::default().detect(800, 600).unwrap();
        let evaluation = FlagEvaluator::default().evaluate(&detections, &mut rng());
        assert_eq!(evaluation.counts.total() as usize, detections.len());
        assert_eq!(
            evaluation.subtype_histogram.values().sum::<u32>(),
            evaluation.counts.wbc
        );
        assert!(evaluation.subtype_histogram.values().all(|&n| n > 0));
    }

    #[test]
    fn leukocytosis_fires_above_six_white_cells() {
        let evaluator = deterministic();
        let six = smear(60, &[(WbcSubtype::Neutrophil, 6)], 20);
        let seven = smear(60, &[(WbcSubtype::Neutrophil, 7)], 20);
        assert!(!evaluator.evaluate(&six, &mut rng()).has_flag(FlagKind::Leukocytosis));
        assert!(evaluator.evaluate(&seven, &mut rng()).has_flag(FlagKind::Leukocytosis));
    }

    #[test]
    fn thrombocytopenia_fires_below_fifteen_platelets() {
        let evaluator = deterministic();
        let fourteen = smear(60, &[(WbcSubtype::Monocyte, 3)], 14);
        let fifteen = smear(60, &[(WbcSubtype::Monocyte, 3)], 15);
        assert!(evaluator.evaluate(&fourteen, &mut rng()).has_flag(FlagKind::Thrombocytopenia));
        assert!(!evaluator.evaluate(&fifteen, &mut rng()).has_flag(FlagKind::Thrombocytopenia));
    }

    #[test]
    fn blast_in_differential_raises_danger_flag() {
        let detections = smear(60, &[(WbcSubtype::Blast, 1), (WbcSubtype::Lymphocyte, 2)], 20);
        let evaluation = deterministic().evaluate(&detections, &mut rng());
        assert_eq!(evaluation.flags, vec![Flag::from(FlagKind::BlastCells)]);
        assert_eq!(evaluation.subtype_histogram.get(&WbcSubtype::Blast), Some(&1));
        assert_eq!(evaluation.subtype_histogram.get(&WbcSubtype::Lymphocyte), Some(&2));
        assert_eq!(evaluation.subtype_histogram.len(), 2);
    }

    #[test]
    fn flags_are_raised_in_rule_order() {
        let detections = smear(10, &[(WbcSubtype::Blast, 8)], 3);
        let evaluator = FlagEvaluator::new(FlagRules {
            malaria_probability: 1.0,
            ..FlagRules::default()
        });
        let kinds: Vec<FlagKind> = evaluator
            .evaluate(&detections, &mut rng())
            .flags
            .iter()
            .map(|flag| flag.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                FlagKind::Leukocytosis,
                FlagKind::Thrombocytopenia,
                FlagKind::MalariaParasite,
                FlagKind::BlastCells,
            ]
        );
    }

    #[test]
    fn malaria_probability_bounds_are_respected() {
        let detections = smear(60, &[(WbcSubtype::Neutrophil, 3)], 20);
        let always = FlagEvaluator::new(FlagRules { malaria_probability: 1.0, ..FlagRules::default() });
        let never = deterministic();
        let mut rng = rng();
        for _ in 0..50 {
            assert!(always.evaluate(&detections, &mut rng).has_flag(FlagKind::MalariaParasite));
            assert!(!never.evaluate(&detections, &mut rng).has_flag(FlagKind::MalariaParasite));
        }
    }

    #[test]
    fn nan_malaria_probability_never_flags() {
        let detections = smear(60, &[(WbcSubtype::Neutrophil, 3)], 20);
        let evaluator =
            FlagEvaluator::new(FlagRules { malaria_probability: f64::NAN, ..FlagRules::default() });
        let mut rng = rng();
        for _ in 0..20 {
            assert!(!evaluator.evaluate(&detections, &mut rng).has_flag(FlagKind::MalariaParasite));
        }
    }

    #[test]
    fn malaria_flag_is_not_reproducible_by_design() {
        // Same detections every time; only the evaluator's own stream moves.
        let detections = SimulatedDetector::default().detect(800, 600).unwrap();
        let evaluator = FlagEvaluator::default();
        let mut rng = rng();
        let outcomes: Vec<bool> = (0..200)
            .map(|_| evaluator.evaluate(&detections, &mut rng).has_flag(FlagKind::MalariaParasite))
            .collect();
        assert!(outcomes.contains(&true));
        assert!(outcomes.contains(&false));

        let first = evaluator.evaluate(&detections, &mut rng);
        let second = evaluator.evaluate(&detections, &mut rng);
        assert_eq!(first.counts, second.counts);
        assert_eq!(first.subtype_histogram, second.subtype_histogram);
    }

    #[test]
    fn everything_filtered_out() {
        let detections = SimulatedDetector::default().detect(800, 600).unwrap();
        let filtered = filter_by_confidence(detections, 1.01);
        assert!(filtered.is_empty());
        let evaluation = deterministic().evaluate(&filtered, &mut rng());
        assert_eq!(evaluation.counts, CellCounts { rbc: 0, wbc: 0, platelets: 0 });
        assert!(evaluation.subtype_histogram.is_empty());
        // 0 < 15, so the platelet rule still fires.
        assert!(evaluation.has_flag(FlagKind::Thrombocytopenia));
        assert!(!evaluation.has_flag(FlagKind::Leukocytosis));
        assert!(!evaluation.has_flag(FlagKind::BlastCells));
    }

    #[test]
    fn counts_serialize_with_fixed_keys() {
        let value = serde_json::to_value(CellCounts::default()).unwrap();
        assert_eq!(value, serde_json::json!({"RBC": 0, "WBC": 0, "Platelets": 0}));
    }
}
