//! Turns the classifier's per-class probabilities into a triage verdict.
//!
//! Pure: no I/O apart from logging of the raw scores.

use log::{debug, info};

use crate::models::{
    class_label, is_high_priority, scale_percent, ProbabilityVector, RiskEntry, Severity,
    Verdict, MOLE_CONFIDENCE_CEILING, MOLE_INDEX, RISK_CHECKS, RUNNER_UP_FLOOR,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primary {
    pub index: usize,
    pub confidence: f64,
}

pub fn evaluate(probs: &ProbabilityVector) -> Verdict {
    for index in 0..probs.as_array().len() {
        info!("class {}: {:.2}%", index, probs.percent(index));
    }

    let primary = select_primary(probs);
    let top_class_name = class_label(primary.index);

    let (diagnosis, severity) = if is_high_priority(primary.index) {
        (top_class_name.to_string(), Severity::High)
    } else {
        match collect_risks(probs).first() {
            Some(top_risk) => (
                format!("{} (Risk: {})", base_name(top_class_name), top_risk.name),
                Severity::Medium,
            ),
            None => (top_class_name.to_string(), Severity::Low),
        }
    };

    debug!(
        "verdict: class={} confidence={:.2} severity={:?}",
        primary.index, primary.confidence, severity
    );

    Verdict {
        diagnosis,
        confidence: round2(primary.confidence),
        severity,
    }
}

/// Step A: argmax, with a low-confidence "Common Mole" call handing over to
/// a plausible runner-up.
pub fn select_primary(probs: &ProbabilityVector) -> Primary {
    let mut working = *probs.as_array();
    let index = argmax(&working);
    let primary = Primary {
        index,
        confidence: probs.percent(index),
    };

    if primary.index != MOLE_INDEX || primary.confidence >= MOLE_CONFIDENCE_CEILING {
        return primary;
    }

    working[MOLE_INDEX] = -1.0;
    let runner_up = argmax(&working);
    let runner_up_confidence = scale_percent(working[runner_up]);
    if runner_up_confidence > RUNNER_UP_FLOOR {
        debug!(
            "suppressing mole call at {:.2}% in favour of class {} at {:.2}%",
            primary.confidence, runner_up, runner_up_confidence
        );
        Primary {
            index: runner_up,
            confidence: runner_up_confidence,
        }
    } else {
        primary
    }
}

/// Cancer-class signals over their thresholds, loudest first. Equal scores
/// keep check order.
pub fn collect_risks(probs: &ProbabilityVector) -> Vec<RiskEntry> {
    let mut risks: Vec<RiskEntry> = RISK_CHECKS
        .iter()
        .filter_map(|check| {
            let score = probs.percent(check.index);
            (score > check.threshold).then_some(RiskEntry {
                name: check.name,
                score,
            })
        })
        .collect();
    risks.sort_by(|a, b| b.score.total_cmp(&a.score));
    risks
}

/// "Dermatofibroma (Benign)" -> "Dermatofibroma"
pub fn base_name(label: &str) -> &str {
    label.split('(').next().unwrap_or(label).trim()
}

// First index wins on ties.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn probs(values: [f32; 7]) -> ProbabilityVector {
        ProbabilityVector::from_slice(&values).expect("seven values")
    }

    fn verdict(diagnosis: &str, confidence: f64, severity: Severity) -> Verdict {
        Verdict {
            diagnosis: diagnosis.to_string(),
            confidence,
            severity,
        }
    }

    #[test]
    fn cancer_primary_is_always_high() {
        let cases = [
            (
                [0.40, 0.10, 0.10, 0.10, 0.10, 0.10, 0.10],
                "Actinic Keratoses (Pre-Cancerous)",
                40.0,
            ),
            (
                [0.05, 0.80, 0.05, 0.02, 0.04, 0.02, 0.02],
                "Basal Cell Carcinoma (Cancer)",
                80.0,
            ),
            (
                [0.10, 0.10, 0.05, 0.05, 0.35, 0.30, 0.05],
                "Melanoma (High Risk Cancer)",
                35.0,
            ),
        ];
        for (values, label, confidence) in cases {
            assert_eq!(
                evaluate(&probs(values)),
                verdict(label, confidence, Severity::High)
            );
        }
    }

    #[test]
    fn weak_mole_call_hands_over_to_runner_up() {
        let input = probs([0.05, 0.20, 0.05, 0.05, 0.05, 0.55, 0.05]);
        assert_eq!(
            select_primary(&input),
            Primary {
                index: 1,
                confidence: 20.0,
            }
        );
        assert_eq!(
            evaluate(&input),
            verdict("Basal Cell Carcinoma (Cancer)", 20.0, Severity::High)
        );
    }

    #[test]
    fn weak_mole_call_kept_when_runner_up_is_implausible() {
        let input = probs([0.01, 0.01, 0.14, 0.14, 0.01, 0.55, 0.14]);
        assert_eq!(select_primary(&input).index, MOLE_INDEX);
    }

    #[test]
    fn runner_up_below_floor_does_not_replace_mole() {
        let input = probs([0.0, 0.0, 0.1499, 0.0, 0.0, 0.50, 0.0]);
        assert_eq!(select_primary(&input).index, MOLE_INDEX);
    }

    #[test]
    fn confident_mole_call_is_not_suppressed() {
        let input = probs([0.01, 0.01, 0.25, 0.01, 0.01, 0.70, 0.01]);
        assert_eq!(
            evaluate(&input),
            verdict("Common Mole (Benign)", 70.0, Severity::Low)
        );
    }

    #[test]
    fn hidden_melanoma_escalates_benign_call() {
        let input = probs([0.01, 0.02, 0.20, 0.50, 0.03, 0.14, 0.10]);
        let risks = collect_risks(&input);
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].name, "Melanoma");
        assert_eq!(
            evaluate(&input),
            verdict("Dermatofibroma (Risk: Melanoma)", 50.0, Severity::Medium)
        );
    }

    #[test]
    fn benign_call_without_risk_is_low() {
        let input = probs([0.01, 0.02, 0.03, 0.02, 0.01, 0.01, 0.90]);
        assert!(collect_risks(&input).is_empty());
        assert_eq!(
            evaluate(&input),
            verdict("Vascular Lesion (Benign)", 90.0, Severity::Low)
        );
    }

    #[test]
    fn loudest_risk_wins() {
        let input = probs([0.12, 0.08, 0.60, 0.05, 0.03, 0.06, 0.06]);
        let names: Vec<_> = collect_risks(&input).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Actinic Keratosis", "Basal Cell", "Melanoma"]);
        assert_eq!(
            evaluate(&input).diagnosis,
            "Benign Keratosis (Risk: Actinic Keratosis)"
        );
    }

    #[test]
    fn equal_risks_keep_check_order() {
        let input = probs([0.0, 0.06, 0.0, 0.0, 0.06, 0.0, 0.88]);
        let names: Vec<_> = collect_risks(&input).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Melanoma", "Basal Cell"]);
        assert_eq!(
            evaluate(&input).diagnosis,
            "Vascular Lesion (Risk: Melanoma)"
        );
    }

    #[test]
    fn suppressed_primary_still_escalates() {
        // Mole at 45% yields to Benign Keratosis; melanoma signal still counts.
        let input = probs([0.01, 0.01, 0.40, 0.05, 0.04, 0.45, 0.04]);
        assert_eq!(select_primary(&input).index, 2);
        assert_eq!(
            evaluate(&input),
            verdict(
                "Benign Keratosis (Risk: Melanoma)",
                40.0,
                Severity::Medium
            )
        );
    }

    #[test]
    fn risk_exactly_at_threshold_is_not_flagged() {
        let input = probs([0.05, 0.05, 0.0, 0.0, 0.02, 0.0, 0.88]);
        assert!(collect_risks(&input).is_empty());
        assert_eq!(
            evaluate(&input),
            verdict("Vascular Lesion (Benign)", 88.0, Severity::Low)
        );

        let input = probs([0.0, 0.05, 0.0, 0.0, 0.0, 0.0, 0.95]);
        assert_eq!(evaluate(&input).severity, Severity::Low);
    }

    #[test]
    fn mole_at_ceiling_is_not_suppressed() {
        let input = probs([0.0, 0.0, 0.40, 0.0, 0.0, 0.60, 0.0]);
        assert_eq!(select_primary(&input).index, MOLE_INDEX);
        assert_eq!(
            evaluate(&input),
            verdict("Common Mole (Benign)", 60.0, Severity::Low)
        );
    }

    #[test]
    fn runner_up_at_floor_follows_single_precision() {
        // 0.15 * 100 rounds up to 15.000001 in f32.
        let input = probs([0.0, 0.0, 0.15, 0.0, 0.0, 0.50, 0.0]);
        assert_eq!(select_primary(&input).index, 2);
        assert_eq!(evaluate(&input).confidence, 15.0);
    }

    #[test]
    fn thresholds_are_strict() {
        let below = probs([0.049, 0.049, 0.0, 0.0, 0.019, 0.0, 0.883]);
        assert!(collect_risks(&below).is_empty());
        let above = probs([0.051, 0.0, 0.0, 0.0, 0.0, 0.0, 0.949]);
        assert_eq!(collect_risks(&above)[0].name, "Actinic Keratosis");
    }

    #[test]
    fn confidence_is_primary_not_risk_score() {
        let input = probs([0.30, 0.0, 0.0, 0.0, 0.0, 0.0, 0.70]);
        let result = evaluate(&input);
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.confidence, 70.0);
    }

    #[test]
    fn confidence_is_rounded_to_two_decimals() {
        let input = probs([0.0, 0.0, 0.0, 0.0, 0.0, 0.123456, 0.876544]);
        assert_eq!(evaluate(&input).confidence, 87.65);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let input = probs([0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 0.0]);
        assert_eq!(select_primary(&input).index, 2);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let input = probs([0.03, 0.04, 0.30, 0.20, 0.025, 0.375, 0.03]);
        assert_eq!(evaluate(&input), evaluate(&input));
    }

    #[test]
    fn base_name_strips_parenthetical() {
        assert_eq!(base_name("Common Mole (Benign)"), "Common Mole");
        assert_eq!(base_name("Benign Keratosis (Sun Spot)"), "Benign Keratosis");
        assert_eq!(base_name("Unknown"), "Unknown");
    }

    #[test]
    fn high_priority_argmax_ignores_everything_else() {
        // Sweep the remaining mass across other classes; severity stays high.
        for index in [0, 1, 4] {
            for spill in 0..7 {
                if spill == index {
                    continue;
                }
                let mut values = [0.0f32; 7];
                values[index] = 0.61;
                values[spill] = 0.39;
                let result = evaluate(&probs(values));
                assert_eq!(result.severity, Severity::High);
                assert_eq!(result.diagnosis, class_label(index));
            }
        }
    }
}
