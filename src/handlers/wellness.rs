use std::sync::Arc;

use crate::errors::BridgeResult;
use crate::models::{BmiAdvice, BodyType, BodyTypeAdvice, FoodComparison, InlineImage, MealAnalysis};
use crate::services::{extractor, prompts, TextGenerator};

/// The five wellness features, each one prompt → one call → one parse.
///
/// Input range checks are the caller's job; nothing here retries or caches.
pub struct WellnessAdvisor {
    generator: Arc<dyn TextGenerator>,
}

impl WellnessAdvisor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn compare_foods(
        &self,
        food1: &str,
        food2: &str,
        grams1: f64,
        grams2: f64,
    ) -> BridgeResult<FoodComparison> {
        log::info!("🥗 Comparing {}g {} vs {}g {}", grams1, food1, grams2, food2);

        let request = prompts::food_comparison(food1, food2, grams1, grams2);
        let response = self.generator.generate(&request).await?;
        extractor::food_comparison(&response, food1, food2)
    }

    pub async fn bmi_advice(&self, bmi: f64, height_cm: f64, weight_kg: f64) -> BridgeResult<BmiAdvice> {
        log::info!("⚖️ Requesting BMI advice for BMI {:.1}", bmi);

        let request = prompts::bmi_advice(bmi, height_cm, weight_kg);
        let response = self.generator.generate(&request).await?;
        extractor::bmi_advice(&response)
    }

    /// Returned verbatim, no extraction.
    pub async fn chat(&self, question: &str) -> BridgeResult<String> {
        log::info!("💬 Chat question ({} chars)", question.len());

        let request = prompts::chat(question);
        self.generator.generate(&request).await
    }

    pub async fn analyze_meal(
        &self,
        image: InlineImage,
        weight_grams: Option<f64>,
    ) -> BridgeResult<MealAnalysis> {
        log::info!(
            "📸 Analyzing meal image ({} bytes, {}, weight: {:?})",
            image.data.len(),
            image.mime_type,
            weight_grams
        );

        let request = prompts::meal_analysis(image, weight_grams);
        let response = self.generator.generate(&request).await?;
        extractor::meal_analysis(&response)
    }

    pub async fn body_type_advice(&self, body_type: BodyType) -> BridgeResult<BodyTypeAdvice> {
        log::info!("🏋️ Requesting advice for body type {}", body_type);

        let request = prompts::body_type_advice(body_type);
        let response = self.generator.generate(&request).await?;
        extractor::body_type_advice(&response, body_type)
    }
}
