//! Recovers structured records from free-form model output.
//!
//! The model is asked for a JSON object but usually wraps it in prose or a
//! markdown fence. Extraction takes everything from the first `{` to the last
//! `}`; the result is parsed into a partial record (every field optional) and
//! then checked field by field, so a reply that drifts from the requested
//! schema only fails when something the caller needs is absent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::{BridgeError, BridgeResult};
use crate::models::{
    BmiAdvice, BodyType, BodyTypeAdvice, Carbs, FoodComparison, FoodNutrition, MealAnalysis,
    NutritionalEstimate, Recommendations,
};

/// Greedy `{ ... }` span: first opening brace to last closing brace.
pub fn extract_json_object(text: &str) -> BridgeResult<&str> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&text[start..=end]),
        _ => {
            log::warn!("⚠️ No JSON object found in model response ({} chars)", text.len());
            Err(BridgeError::Extraction)
        }
    }
}

/// Extract and deserialize the embedded object without further validation.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> BridgeResult<T> {
    let json = extract_json_object(text)?;
    serde_json::from_str(json).map_err(|e| {
        log::warn!("⚠️ Embedded JSON could not be parsed: {}", e);
        BridgeError::Parse(e.to_string())
    })
}

fn required<T>(value: Option<T>, path: &str) -> BridgeResult<T> {
    value.ok_or_else(|| BridgeError::Parse(format!("missing field {}", path)))
}

/// Numbers may arrive as JSON numbers or as strings like "165" or "12.5g".
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            // Commas are digit-group separators ("1,200 kcal").
            let cleaned: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
                .filter(|c| *c != ',')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// A lone string is accepted where a list of strings was requested.
fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(vec![s]),
        _ => None,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialFood {
    #[serde(deserialize_with = "lenient_number")]
    calories: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    protein: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    fats: Option<f64>,
    carbs: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialFoodComparison {
    food1: Option<PartialFood>,
    food2: Option<PartialFood>,
}

impl PartialFood {
    fn into_nutrition(self, name: &str, path: &str) -> BridgeResult<FoodNutrition> {
        let carbs = match self.carbs {
            Some(Value::Object(fields)) => Carbs {
                total: required(
                    fields.get("total").and_then(number_from_value),
                    &format!("{}.carbs.total", path),
                )?,
                fiber: fields.get("fiber").and_then(number_from_value).unwrap_or(0.0),
            },
            Some(ref value) => Carbs {
                total: required(number_from_value(value), &format!("{}.carbs", path))?,
                fiber: 0.0,
            },
            None => return Err(BridgeError::Parse(format!("missing field {}.carbs", path))),
        };

        Ok(FoodNutrition {
            name: name.to_string(),
            calories: required(self.calories, &format!("{}.calories", path))?,
            protein: required(self.protein, &format!("{}.protein", path))?,
            fats: required(self.fats, &format!("{}.fats", path))?,
            carbs,
        })
    }
}

/// Names are pinned to the requested foods rather than the model's spelling.
pub fn food_comparison(text: &str, food1: &str, food2: &str) -> BridgeResult<FoodComparison> {
    let partial: PartialFoodComparison = parse_structured(text)?;

    Ok(FoodComparison {
        food1: required(partial.food1, "food1")?.into_nutrition(food1, "food1")?,
        food2: required(partial.food2, "food2")?.into_nutrition(food2, "food2")?,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialRecommendations {
    #[serde(deserialize_with = "lenient_list")]
    diet: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    exercise: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    general: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PartialBmiAdvice {
    bmi_category: Option<String>,
    category: Option<String>,
    recommendations: Option<PartialRecommendations>,
}

pub fn bmi_advice(text: &str) -> BridgeResult<BmiAdvice> {
    let partial: PartialBmiAdvice = parse_structured(text)?;

    let category = partial
        .bmi_category
        .or(partial.category)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let recommendations = partial.recommendations.unwrap_or_default();

    Ok(BmiAdvice {
        category: required(category, "bmiCategory")?,
        recommendations: Recommendations {
            diet: recommendations.diet.unwrap_or_default(),
            exercise: recommendations.exercise.unwrap_or_default(),
            general: recommendations.general.unwrap_or_default(),
        },
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialEstimate {
    #[serde(deserialize_with = "lenient_number")]
    calories: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    protein: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    carbs: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    fat: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PartialMealAnalysis {
    #[serde(deserialize_with = "lenient_list")]
    identified_foods: Option<Vec<String>>,
    nutritional_estimate: Option<PartialEstimate>,
    health_assessment: Option<String>,
}

pub fn meal_analysis(text: &str) -> BridgeResult<MealAnalysis> {
    let partial: PartialMealAnalysis = parse_structured(text)?;

    let identified_foods = partial.identified_foods.filter(|foods| !foods.is_empty());
    let estimate = required(partial.nutritional_estimate, "nutritionalEstimate")?;

    Ok(MealAnalysis {
        identified_foods: required(identified_foods, "identifiedFoods")?,
        nutritional_estimate: NutritionalEstimate {
            calories: required(estimate.calories, "nutritionalEstimate.calories")?,
            protein: required(estimate.protein, "nutritionalEstimate.protein")?,
            carbs: required(estimate.carbs, "nutritionalEstimate.carbs")?,
            fat: required(estimate.fat, "nutritionalEstimate.fat")?,
        },
        health_assessment: partial.health_assessment.unwrap_or_default(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PartialBodyTypeAdvice {
    #[serde(deserialize_with = "lenient_list")]
    characteristics: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    nutrition_tips: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    exercise_recommendations: Option<Vec<String>>,
    challenges_and_solutions: Option<Value>,
}

/// Accepts `{"challenge": "solution"}` or `[{"challenge": .., "solution": ..}]`.
fn challenges_from_value(value: Option<Value>) -> BTreeMap<String, String> {
    let as_text = |value: &Value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    match value {
        Some(Value::Object(fields)) => fields
            .iter()
            .map(|(challenge, solution)| (challenge.clone(), as_text(solution)))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let challenge = item.get("challenge")?;
                let solution = item.get("solution")?;
                Some((as_text(challenge), as_text(solution)))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// `bodyType` is pinned to the requested type.
pub fn body_type_advice(text: &str, body_type: BodyType) -> BridgeResult<BodyTypeAdvice> {
    let partial: PartialBodyTypeAdvice = parse_structured(text)?;

    let nutrition_tips = partial.nutrition_tips.unwrap_or_default();
    let exercise_recommendations = partial.exercise_recommendations.unwrap_or_default();
    if nutrition_tips.is_empty() && exercise_recommendations.is_empty() {
        return Err(BridgeError::Parse(
            "missing field nutritionTips or exerciseRecommendations".to_string(),
        ));
    }

    Ok(BodyTypeAdvice {
        body_type,
        characteristics: partial.characteristics.unwrap_or_default(),
        nutrition_tips,
        exercise_recommendations,
        challenges_and_solutions: challenges_from_value(partial.challenges_and_solutions),
    })
}
