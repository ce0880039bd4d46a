use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::BridgeError;
use crate::handlers::{compute_bmi, BmiReport, WellnessAdvisor};
use crate::models::{BodyType, BodyTypeAdvice, FoodComparison, InlineImage, MealAnalysis};

pub const MIN_HEIGHT_CM: f64 = 50.0;
pub const MAX_HEIGHT_CM: f64 = 300.0;
pub const MIN_WEIGHT_KG: f64 = 20.0;
pub const MAX_WEIGHT_KG: f64 = 500.0;
/// Meal photos travel base64-encoded inside the JSON body.
pub const MAX_MEAL_BODY_BYTES: usize = 15 * 1024 * 1024;

fn default_grams() -> f64 {
    100.0
}

/// Front-end request payloads
#[derive(Debug, Deserialize, Serialize)]
pub struct CompareRequest {
    pub food1: String,
    pub food2: String,
    #[serde(default = "default_grams")]
    pub grams1: f64,
    #[serde(default = "default_grams")]
    pub grams2: f64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiRequest {
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRequest {
    /// Data URL (`data:image/png;base64,...`) or bare base64.
    pub image: String,
    #[serde(default)]
    pub weight_grams: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyTypeRequest {
    pub body_type: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct BmiResponse {
    #[serde(flatten)]
    pub report: BmiReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please select both foods to compare")]
    MissingFoods,
    #[error("Amounts must be greater than 0 grams")]
    InvalidAmount,
    #[error("Please enter both height and weight")]
    MissingMeasurements,
    #[error("Height should be between 50 and 300 cm")]
    InvalidHeight,
    #[error("Weight should be between 20 and 500 kg")]
    InvalidWeight,
    #[error("Please enter a question")]
    EmptyQuestion,
    #[error("Please upload an image file (JPEG, PNG)")]
    InvalidImageType,
    #[error("Image data could not be decoded")]
    InvalidImageData,
    #[error("Unknown body type: {0}")]
    UnknownBodyType(String),
    #[error("Invalid request: {0}")]
    MalformedRequest(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Model(#[from] BridgeError),
}

impl ApiError {
    /// Text shown to the user in the error notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::Model(BridgeError::Transport(message)) => message.clone(),
            ApiError::Model(_) => {
                "Our nutrition assistant is having trouble right now. Please try again later."
                    .to_string()
            }
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Accepts a data URL or bare base64, standard or URL-safe alphabet, with or
/// without line breaks. Bare payloads are assumed to be JPEG.
pub fn decode_image(payload: &str) -> Result<InlineImage, ValidationError> {
    let payload = payload.trim();

    let (mime_type, encoded) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',').ok_or(ValidationError::InvalidImageData)?;
            let mime_type = header.split(';').next().unwrap_or_default();
            (mime_type.to_string(), data)
        }
        None => ("image/jpeg".to_string(), payload),
    };

    if !mime_type.starts_with("image/") {
        return Err(ValidationError::InvalidImageType);
    }

    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let data = general_purpose::STANDARD
        .decode(&compact)
        .or_else(|_| general_purpose::URL_SAFE.decode(&compact))
        .map_err(|_| ValidationError::InvalidImageData)?;
    if data.is_empty() {
        return Err(ValidationError::InvalidImageData);
    }

    Ok(InlineImage::new(mime_type, data))
}

pub async fn handle_compare(
    advisor: &WellnessAdvisor,
    request: CompareRequest,
) -> Result<FoodComparison, ApiError> {
    let food1 = request.food1.trim();
    let food2 = request.food2.trim();
    if food1.is_empty() || food2.is_empty() {
        return Err(ValidationError::MissingFoods.into());
    }
    if !is_positive(request.grams1) || !is_positive(request.grams2) {
        return Err(ValidationError::InvalidAmount.into());
    }

    Ok(advisor
        .compare_foods(food1, food2, request.grams1, request.grams2)
        .await?)
}

/// Never fails on model errors: the threshold category is shown instead.
pub async fn handle_bmi(advisor: &WellnessAdvisor, request: BmiRequest) -> Result<BmiResponse, ApiError> {
    let (height, weight) = match (request.height_cm, request.weight_kg) {
        (Some(height), Some(weight)) if is_positive(height) && is_positive(weight) => (height, weight),
        _ => return Err(ValidationError::MissingMeasurements.into()),
    };
    if !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&height) {
        return Err(ValidationError::InvalidHeight.into());
    }
    if !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight) {
        return Err(ValidationError::InvalidWeight.into());
    }

    let bmi = compute_bmi(height, weight);
    let report = BmiReport::resolve(bmi, advisor.bmi_advice(bmi, height, weight).await);
    let notice = (!report.personalized).then(|| {
        "We've calculated your BMI, but couldn't get personalized recommendations. Please try again later."
            .to_string()
    });

    Ok(BmiResponse { report, notice })
}

pub async fn handle_chat(advisor: &WellnessAdvisor, request: ChatRequest) -> Result<ChatResponse, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ValidationError::EmptyQuestion.into());
    }

    let answer = advisor.chat(question).await?;
    Ok(ChatResponse { answer })
}

pub async fn handle_meal(advisor: &WellnessAdvisor, request: MealRequest) -> Result<MealAnalysis, ApiError> {
    if let Some(weight) = request.weight_grams {
        if !is_positive(weight) {
            return Err(ValidationError::InvalidAmount.into());
        }
    }
    let image = decode_image(&request.image)?;

    Ok(advisor.analyze_meal(image, request.weight_grams).await?)
}

pub async fn handle_body_type(
    advisor: &WellnessAdvisor,
    request: BodyTypeRequest,
) -> Result<BodyTypeAdvice, ApiError> {
    let body_type = BodyType::from_string(&request.body_type)
        .ok_or_else(|| ValidationError::UnknownBodyType(request.body_type.clone()))?;

    Ok(advisor.body_type_advice(body_type).await?)
}

// Axum integration (optional - requires axum dependency)
#[cfg(feature = "http-server")]
pub mod server {
    use super::*;
    use axum::{
        extract::{rejection::JsonRejection, DefaultBodyLimit, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::Arc;
    use tower_http::services::ServeDir;

    pub struct AppState {
        pub advisor: Arc<WellnessAdvisor>,
    }

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            let status = match &self {
                ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                ApiError::Model(_) => StatusCode::BAD_GATEWAY,
            };
            if status == StatusCode::BAD_GATEWAY {
                log::error!("❌ Model request failed: {}", self);
            }

            let body = serde_json::json!({ "error": self.user_message() });
            (status, Json(body)).into_response()
        }
    }

    /// Routes for the front end; `static_dir` serves the built UI as fallback.
    pub fn create_api_router(advisor: Arc<WellnessAdvisor>, static_dir: Option<&str>) -> Router {
        let state = Arc::new(AppState { advisor });

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/api/compare", post(compare_handler))
            .route("/api/bmi", post(bmi_handler))
            .route("/api/chat", post(chat_handler))
            .route(
                "/api/meal",
                post(meal_handler).layer(DefaultBodyLimit::max(MAX_MEAL_BODY_BYTES)),
            )
            .route("/api/body-type", post(body_type_handler))
            .with_state(state);

        match static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router,
        }
    }

    /// Unreadable bodies get the same `{error}` shape as other validation failures.
    fn rejected(rejection: JsonRejection) -> ApiError {
        log::warn!("⚠️ Rejected request body: {}", rejection.body_text());
        ValidationError::MalformedRequest(rejection.body_text()).into()
    }

    async fn compare_handler(
        State(state): State<Arc<AppState>>,
        payload: Result<Json<CompareRequest>, JsonRejection>,
    ) -> Result<Json<FoodComparison>, ApiError> {
        let Json(request) = payload.map_err(rejected)?;
        handle_compare(&state.advisor, request).await.map(Json)
    }

    async fn bmi_handler(
        State(state): State<Arc<AppState>>,
        payload: Result<Json<BmiRequest>, JsonRejection>,
    ) -> Result<Json<BmiResponse>, ApiError> {
        let Json(request) = payload.map_err(rejected)?;
        handle_bmi(&state.advisor, request).await.map(Json)
    }

    async fn chat_handler(
        State(state): State<Arc<AppState>>,
        payload: Result<Json<ChatRequest>, JsonRejection>,
    ) -> Result<Json<ChatResponse>, ApiError> {
        let Json(request) = payload.map_err(rejected)?;
        handle_chat(&state.advisor, request).await.map(Json)
    }

    async fn meal_handler(
        State(state): State<Arc<AppState>>,
        payload: Result<Json<MealRequest>, JsonRejection>,
    ) -> Result<Json<MealAnalysis>, ApiError> {
        let Json(request) = payload.map_err(rejected)?;
        handle_meal(&state.advisor, request).await.map(Json)
    }

    async fn body_type_handler(
        State(state): State<Arc<AppState>>,
        payload: Result<Json<BodyTypeRequest>, JsonRejection>,
    ) -> Result<Json<BodyTypeAdvice>, ApiError> {
        let Json(request) = payload.map_err(rejected)?;
        handle_body_type(&state.advisor, request).await.map(Json)
    }

    async fn health_check() -> &'static str {
        "OK"
    }

}
