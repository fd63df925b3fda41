//! Priority `score_config` document — spec.md §6. `steps` is a list of
//! `[threshold, score]` pairs; "custom" never executes user code at
//! runtime, it dispatches to the process-registered hook in
//! [`crate::context::CoreContext::custom_score_fn`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    Linear,
    Exponential,
    Logarithmic,
    Step,
    Custom,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreConfig {
    #[serde(rename = "type")]
    pub curve: Option<CurveType>,
    #[serde(default)]
    pub base_score: Option<f64>,
    #[serde(default)]
    pub multiplier: Option<f64>,
    #[serde(default)]
    pub exponent: Option<f64>,
    #[serde(default)]
    pub steps: Option<Vec<(f64, f64)>>,
    #[serde(default)]
    pub default_score: Option<f64>,
    /// Case-insensitive keywords counted against `special_instructions`
    /// for the `special_needs` score type.
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

/// Case-insensitive count of `keywords` occurring in `text`, one hit per
/// keyword match per occurrence (spec.md §4.3 `special_needs`).
pub fn count_keyword_hits(text: Option<&str>, keywords: &[String]) -> f64 {
    let Some(text) = text else {
        return 0.0;
    };
    let text = text.to_lowercase();
    keywords
        .iter()
        .map(|kw| {
            let kw = kw.to_lowercase();
            if kw.is_empty() {
                0
            } else {
                text.matches(&kw).count()
            }
        })
        .sum::<usize>() as f64
}

/// Applies the configured scoring function to a raw base value
/// (spec.md §4.3 "Scoring functions").
pub fn apply_curve(base_value: f64, config: &ScoreConfig) -> f64 {
    let base = config.base_score.unwrap_or(0.0);
    let mult = config.multiplier.unwrap_or(1.0);

    match config.curve.unwrap_or(CurveType::Linear) {
        CurveType::Linear => base + base_value * mult,
        CurveType::Exponential => {
            let exp = config.exponent.unwrap_or(1.0);
            base + mult * base_value.powf(exp)
        }
        CurveType::Logarithmic => {
            if base_value <= 0.0 {
                base
            } else {
                base + mult * (base_value + 1.0).ln()
            }
        }
        CurveType::Step => {
            let steps = config.steps.as_deref().unwrap_or(&[]);
            steps
                .iter()
                .find(|(threshold, _)| *threshold >= base_value)
                .map(|(_, score)| *score)
                .unwrap_or_else(|| config.default_score.unwrap_or(base))
        }
        CurveType::Custom => config.default_score.unwrap_or(base),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponent {
    pub rule_name: String,
    pub base_value: f64,
    pub raw_score: f64,
    pub weighted_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_curve_applies_base_and_multiplier() {
        let config = ScoreConfig {
            curve: Some(CurveType::Linear),
            base_score: Some(1.0),
            multiplier: Some(2.0),
            ..Default::default()
        };
        assert_eq!(apply_curve(5.0, &config), 11.0);
    }

    #[test]
    fn exponential_curve_raises_to_configured_power() {
        let config = ScoreConfig {
            curve: Some(CurveType::Exponential),
            multiplier: Some(1.0),
            exponent: Some(2.0),
            ..Default::default()
        };
        assert_eq!(apply_curve(3.0, &config), 9.0);
    }

    #[test]
    fn logarithmic_curve_falls_back_to_base_at_or_below_zero() {
        let config = ScoreConfig {
            curve: Some(CurveType::Logarithmic),
            base_score: Some(5.0),
            ..Default::default()
        };
        assert_eq!(apply_curve(0.0, &config), 5.0);
        assert_eq!(apply_curve(-1.0, &config), 5.0);
        assert!(apply_curve(10.0, &config) > 5.0);
    }

    #[test]
    fn step_curve_picks_first_threshold_at_or_above_value() {
        let config = ScoreConfig {
            curve: Some(CurveType::Step),
            steps: Some(vec![(10.0, 1.0), (20.0, 2.0), (30.0, 3.0)]),
            default_score: Some(0.0),
            ..Default::default()
        };
        assert_eq!(apply_curve(5.0, &config), 1.0);
        assert_eq!(apply_curve(15.0, &config), 2.0);
        assert_eq!(apply_curve(100.0, &config), 0.0);
    }

    #[test]
    fn custom_curve_returns_default_score() {
        let config = ScoreConfig {
            curve: Some(CurveType::Custom),
            default_score: Some(7.5),
            ..Default::default()
        };
        assert_eq!(apply_curve(42.0, &config), 7.5);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityScoreView {
    pub queue_item_id: i64,
    pub total: f64,
    pub base: f64,
    pub boost: f64,
    pub tier: &'static str,
    pub components: Vec<ScoreComponent>,
    pub is_boosted: bool,
    pub suggested_sequence: Option<i32>,
}
