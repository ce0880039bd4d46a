//! Prompt templates for each wellness feature.
//!
//! Builders are pure: identical inputs always yield an identical request.

use crate::models::{BodyType, GenerationRequest, InlineImage};

/// Fact-seeking tasks run cold, coaching and conversation run warm.
pub const FOOD_COMPARISON_TEMPERATURE: f32 = 0.1;
pub const BMI_ADVICE_TEMPERATURE: f32 = 0.7;
pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const MEAL_ANALYSIS_TEMPERATURE: f32 = 0.3;
pub const BODY_TYPE_TEMPERATURE: f32 = 0.3;

/// "100" rather than "100.0" for whole amounts.
fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

fn food_schema(name: &str) -> String {
    format!(
        r#"{{
      "name": "{}",
      "calories": number,
      "protein": number,
      "fats": number,
      "carbs": {{
        "total": number,
        "fiber": number
      }}
    }}"#,
        name
    )
}

pub fn food_comparison(food1: &str, food2: &str, grams1: f64, grams2: f64) -> GenerationRequest {
    let prompt = format!(
        "Compare the nutritional values of {}g {} vs {}g {} in terms of calories, protein, fats, \
         and carbohydrates (total & fiber).\n\
         Please format your response as a JSON object with the following structure:\n\
         {{\n  \"food1\": {},\n  \"food2\": {}\n}}\n\
         All numbers are for the stated amounts, without units.",
        format_amount(grams1),
        food1,
        format_amount(grams2),
        food2,
        food_schema(food1),
        food_schema(food2),
    );

    GenerationRequest::new(prompt).with_temperature(FOOD_COMPARISON_TEMPERATURE)
}

pub fn bmi_advice(bmi: f64, height_cm: f64, weight_kg: f64) -> GenerationRequest {
    let prompt = format!(
        "I have calculated my BMI as {:.1} based on a height of {} cm and weight of {} kg.\n\
         Please provide personalized recommendations for my health based on this BMI value.\n\
         Consider diet, exercise, and general wellness in your response.\n\
         Format your response as a JSON object with the following structure:\n\
         {{\n\
         \x20 \"bmiCategory\": \"string\",\n\
         \x20 \"recommendations\": {{\n\
         \x20   \"diet\": [\"string\", \"string\"],\n\
         \x20   \"exercise\": [\"string\", \"string\"],\n\
         \x20   \"general\": [\"string\", \"string\"]\n\
         \x20 }}\n\
         }}\n\
         Keep your tone friendly and informal like a nutrition doctor. Use simple language and \
         organize your recommendations in an easy-to-understand way.",
        bmi,
        format_amount(height_cm),
        format_amount(weight_kg),
    );

    GenerationRequest::new(prompt).with_temperature(BMI_ADVICE_TEMPERATURE)
}

pub fn chat(question: &str) -> GenerationRequest {
    let prompt = format!(
        "As a friendly nutrition doctor, please provide a helpful response to this question: \"{}\"\n\
         Keep your response concise, informative, and evidence-based.\n\
         Use bullet points to organize your answer.\n\
         Add emojis in your response to make it friendly and engaging.\n\
         Maintain a warm, conversational tone like you're talking to a patient.\n\
         End with a follow-up question to encourage continued conversation.",
        question.trim()
    );

    GenerationRequest::new(prompt).with_temperature(CHAT_TEMPERATURE)
}

pub fn meal_analysis(image: InlineImage, weight_grams: Option<f64>) -> GenerationRequest {
    let portion = match weight_grams {
        Some(grams) => format!(
            "The whole plate weighs about {}g; scale your estimate to that portion.\n",
            format_amount(grams)
        ),
        None => "Estimate the portion size from the image.\n".to_string(),
    };

    let prompt = format!(
        "Analyze this meal image and estimate its nutritional content.\n\
         Identify the foods visible, and provide an estimate of calories, protein, carbs, and fat.\n\
         {}\
         Format your response as a JSON object with the following structure:\n\
         {{\n\
         \x20 \"identifiedFoods\": [\"string\", \"string\"],\n\
         \x20 \"nutritionalEstimate\": {{\n\
         \x20   \"calories\": number,\n\
         \x20   \"protein\": number,\n\
         \x20   \"carbs\": number,\n\
         \x20   \"fat\": number\n\
         \x20 }},\n\
         \x20 \"healthAssessment\": \"string\"\n\
         }}",
        portion
    );

    GenerationRequest::new(prompt)
        .with_temperature(MEAL_ANALYSIS_TEMPERATURE)
        .with_image(image)
}

pub fn body_type_advice(body_type: BodyType) -> GenerationRequest {
    let prompt = format!(
        "Provide nutrition and exercise recommendations for someone with {} {} body type.\n\
         Format your response as a JSON object with the following structure:\n\
         {{\n\
         \x20 \"bodyType\": \"{}\",\n\
         \x20 \"characteristics\": [\"string\", \"string\"],\n\
         \x20 \"nutritionTips\": [\"string\", \"string\"],\n\
         \x20 \"exerciseRecommendations\": [\"string\", \"string\"],\n\
         \x20 \"challengesAndSolutions\": {{\n\
         \x20   \"challenge1\": \"solution1\",\n\
         \x20   \"challenge2\": \"solution2\"\n\
         \x20 }}\n\
         }}\n\
         Use friendly, informal language and make the recommendations easy to understand.",
        body_type.article(),
        body_type,
        body_type,
    );

    GenerationRequest::new(prompt).with_temperature(BODY_TYPE_TEMPERATURE)
}
