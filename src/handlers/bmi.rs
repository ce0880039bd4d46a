use serde::Serialize;

use crate::errors::BridgeResult;
use crate::models::{BmiAdvice, BmiCategory, Recommendations};

/// weight (kg) / height (m)^2
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// What the BMI calculator shows, personalized or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmiReport {
    pub bmi: f64,
    pub category: String,
    pub recommendations: Recommendations,
    pub personalized: bool,
}

impl BmiReport {
    /// Any model failure falls back to the threshold table with no recommendations.
    pub fn resolve(bmi: f64, outcome: BridgeResult<BmiAdvice>) -> Self {
        match outcome {
            Ok(advice) => Self {
                bmi,
                category: advice.category,
                recommendations: advice.recommendations,
                personalized: true,
            },
            Err(e) => {
                log::warn!("⚠️ BMI recommendations unavailable, using threshold table: {}", e);
                Self {
                    bmi,
                    category: BmiCategory::from_bmi(bmi).label().to_string(),
                    recommendations: Recommendations::default(),
                    personalized: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BridgeError;
    use crate::handlers::wellness::tests::ScriptedGenerator;
    use crate::handlers::WellnessAdvisor;

    #[test]
    fn test_compute_bmi() {
        let bmi = compute_bmi(175.0, 70.0);
        assert!((bmi - 22.857).abs() < 0.001);
    }

    #[test]
    fn test_fallback_uses_threshold_table() {
        let cases = [
            (17.0, "Underweight"),
            (22.0, "Normal weight"),
            (27.5, "Overweight"),
            (32.0, "Obesity Class I"),
            (37.0, "Obesity Class II"),
            (45.0, "Obesity Class III"),
        ];

        for (bmi, label) in cases {
            let report = BmiReport::resolve(bmi, Err(BridgeError::Extraction));
            assert_eq!(report.category, label);
            assert!(!report.personalized);
            assert_eq!(report.recommendations, Recommendations::default());
        }
    }

    #[tokio::test]
    async fn test_report_from_unparseable_reply() {
        let generator = ScriptedGenerator::replying("You're doing great, keep it up!");
        let advisor = WellnessAdvisor::new(generator.clone());
        let bmi = compute_bmi(160.0, 85.0);

        let report = BmiReport::resolve(bmi, advisor.bmi_advice(bmi, 160.0, 85.0).await);

        assert_eq!(report.category, "Obesity Class I");
        assert!(!report.personalized);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_report_personalized() {
        let reply = r#"{"bmiCategory": "Normal weight", "recommendations": {"diet": ["More veggies"], "exercise": [], "general": ["Sleep 8h"]}}"#;
        let generator = ScriptedGenerator::replying(reply);
        let advisor = WellnessAdvisor::new(generator);
        let bmi = compute_bmi(180.0, 72.0);

        let report = BmiReport::resolve(bmi, advisor.bmi_advice(bmi, 180.0, 72.0).await);

        assert!(report.personalized);
        assert_eq!(report.category, "Normal weight");
        assert_eq!(report.recommendations.general, vec!["Sleep 8h".to_string()]);
    }
}
