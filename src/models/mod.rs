use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Temperature used when a request does not carry its own.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Image bytes forwarded to the model alongside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// One call to the generative text endpoint. Built per call, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
    pub image: Option<InlineImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            image: None,
        }
    }

    /// Temperature is clamped into [0, 1].
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 1.0));
        self
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn effective_temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carbs {
    pub total: f64,
    pub fiber: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodNutrition {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fats: f64,
    pub carbs: Carbs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodComparison {
    pub food1: FoodNutrition,
    pub food2: FoodNutrition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub diet: Vec<String>,
    pub exercise: Vec<String>,
    pub general: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiAdvice {
    pub category: String,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionalEstimate {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysis {
    pub identified_foods: Vec<String>,
    pub nutritional_estimate: NutritionalEstimate,
    pub health_assessment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyTypeAdvice {
    pub body_type: BodyType,
    pub characteristics: Vec<String>,
    pub nutrition_tips: Vec<String>,
    pub exercise_recommendations: Vec<String>,
    pub challenges_and_solutions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Ectomorph,
    Mesomorph,
    Endomorph,
}

impl std::fmt::Display for BodyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Ectomorph => "ectomorph",
            BodyType::Mesomorph => "mesomorph",
            BodyType::Endomorph => "endomorph",
        }
    }

    /// Indefinite article for use in prose ("an ectomorph", "a mesomorph").
    pub fn article(&self) -> &'static str {
        match self {
            BodyType::Mesomorph => "a",
            BodyType::Ectomorph | BodyType::Endomorph => "an",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ectomorph" => Some(BodyType::Ectomorph),
            "mesomorph" => Some(BodyType::Mesomorph),
            "endomorph" => Some(BodyType::Endomorph),
            _ => None,
        }
    }
}

/// Weight class derived from a BMI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    ObesityI,
    ObesityII,
    ObesityIII,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else if bmi < 35.0 {
            BmiCategory::ObesityI
        } else if bmi < 40.0 {
            BmiCategory::ObesityII
        } else {
            BmiCategory::ObesityIII
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObesityI => "Obesity Class I",
            BmiCategory::ObesityII => "Obesity Class II",
            BmiCategory::ObesityIII => "Obesity Class III",
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
