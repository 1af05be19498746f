use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Danger => f.write_str("danger"),
        }
    }
}

/// The findings the evaluator knows how to raise.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlagKind {
    Leukocytosis,
    Thrombocytopenia,
    MalariaParasite,
    BlastCells,
}

impl FlagKind {
    pub fn title(&self) -> &'static str {
        match self {
            FlagKind::Leukocytosis => "Leukocytosis Pattern",
            FlagKind::Thrombocytopenia => "Thrombocytopenia Pattern",
            FlagKind::MalariaParasite => "Malaria Parasite Pattern",
            FlagKind::BlastCells => "Blast Cells Detected",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FlagKind::Leukocytosis => {
                "Elevated WBC count detected. In clinical settings, this may indicate infection \
                 or inflammation."
            }
            FlagKind::Thrombocytopenia => {
                "Low platelet count detected. This simulation suggests further review for \
                 clotting issues."
            }
            FlagKind::MalariaParasite => {
                "Visual anomaly resembling Plasmodium species detected inside RBCs. \
                 (PROTOTYPE ONLY)"
            }
            FlagKind::BlastCells => {
                "Presence of immature WBCs (Blasts). This is a critical finding often \
                 associated with Leukemia."
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FlagKind::Leukocytosis | FlagKind::Thrombocytopenia => Severity::Warning,
            FlagKind::MalariaParasite | FlagKind::BlastCells => Severity::Danger,
        }
    }
}

/// A qualitative finding shown to the user. Not a diagnosis.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Flag {
    #[serde(skip)]
    pub kind: FlagKind,
    pub title: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

impl From<FlagKind> for Flag {
    fn from(kind: FlagKind) -> Self {
        Flag {
            kind,
            title: kind.title(),
            description: kind.description(),
            severity: kind.severity(),
        }
    }
}

/// Thresholds for the count based rules and the odds of the random one.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct FlagRules {
    /// Leukocytosis fires when the WBC count is strictly above this.
    pub leukocytosis_above: u32,
    /// Thrombocytopenia fires when the platelet count is strictly below this.
    pub thrombocytopenia_below: u32,
    /// Chance of the malaria flag on any evaluation.
    pub malaria_probability: f64,
}

impl Default for FlagRules {
    fn default() -> Self {
        FlagRules {
            leukocytosis_above: 6,
            thrombocytopenia_below: 15,
            malaria_probability: 0.2,
        }
    }
}

impl FlagRules {
    /// `malaria_probability` as a usable Bernoulli parameter: clamped to `[0, 1]`, and 0 when NaN.
    pub fn malaria_chance(&self) -> f64 {
        if self.malaria_probability.is_nan() {
            0.0
        } else {
            self.malaria_probability.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flag_serializes_without_kind() {
        let flag = Flag::from(FlagKind::BlastCells);
        let value = serde_json::to_value(flag).unwrap();
        assert_eq!(value["title"], json!("Blast Cells Detected"));
        assert_eq!(value["severity"], json!("danger"));
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn partial_rules_fall_back_to_defaults() {
        let rules: FlagRules = serde_json::from_value(json!({"malaria_probability": 0.0})).unwrap();
        assert_eq!(rules.leukocytosis_above, 6);
        assert_eq!(rules.thrombocytopenia_below, 15);
        assert_eq!(rules.malaria_probability, 0.0);
    }

    #[test]
    fn malaria_chance_is_always_a_probability() {
        let chance = |p: f64| {
            FlagRules { malaria_probability: p, ..FlagRules::default() }.malaria_chance()
        };
        assert_eq!(chance(0.2), 0.2);
        assert_eq!(chance(-1.0), 0.0);
        assert_eq!(chance(f64::INFINITY), 1.0);
        assert_eq!(chance(f64::NAN), 0.0);
    }
}
