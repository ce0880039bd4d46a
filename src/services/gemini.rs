use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use super::TextGenerator;
use crate::errors::{BridgeError, BridgeResult};
use crate::models::GenerationRequest;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// `endpoint` is the full `.../models/<model>:generateContent` URL.
    pub fn new(api_key: String, endpoint: String) -> Self {
        Self {
            api_key,
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = vec![RequestPart::Text {
            text: request.prompt.clone(),
        }];

        if let Some(image) = &request.image {
            parts.push(RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: general_purpose::STANDARD.encode(&image.data),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![RequestContent { parts }],
            generation_config: GenerationConfig {
                temperature: request.effective_temperature(),
            },
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> BridgeResult<String> {
        let body = Self::build_body(request);

        log::info!(
            "🤖 Sending request to Gemini (temperature {}, image: {})",
            request.effective_temperature(),
            request.image.is_some()
        );
        log::debug!("📤 Prompt size: {} chars", request.prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        let response_text = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &response_text);
            log::error!("❌ Gemini API error ({}): {}", status, message);
            return Err(BridgeError::Transport(message));
        }

        log::debug!("📄 Raw Gemini response size: {} bytes", response_text.len());
        first_candidate_text(&response_text)
    }
}

/// Message reported by the endpoint in `{error:{message}}`, or a generic one.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("Failed to communicate with Gemini API ({})", status))
}

/// First text part of the first candidate.
fn first_candidate_text(body: &str) -> BridgeResult<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| BridgeError::Transport(format!("malformed Gemini response: {}", e)))?;

    let candidate = parsed.candidates.into_iter().next().ok_or_else(|| {
        log::warn!("⚠️ Gemini returned no candidates");
        BridgeError::EmptyResponse
    })?;

    candidate
        .content
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(BridgeError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InlineImage;

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest::new("Compare apples").with_temperature(0.1);
        let body = serde_json::to_value(GeminiClient::build_body(&request)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "Compare apples" }] }],
                "generationConfig": { "temperature": 0.1f32 }
            })
        );
    }

    #[test]
    fn test_request_body_default_temperature_and_image() {
        let request = GenerationRequest::new("Analyze")
            .with_image(InlineImage::new("image/png", vec![1, 2, 3]));
        let body = serde_json::to_value(GeminiClient::build_body(&request)).unwrap();

        assert_eq!(body["generationConfig"]["temperature"], serde_json::json!(0.7f32));
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "AQID");
    }

    #[test]
    fn test_first_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"first"},{"text":"second"}]}},{"content":{"parts":[{"text":"other"}]}}]}"#;
        assert_eq!(first_candidate_text(body).unwrap(), "first");
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        assert_eq!(first_candidate_text(r#"{"candidates":[]}"#), Err(BridgeError::EmptyResponse));
        assert_eq!(first_candidate_text(r#"{}"#), Err(BridgeError::EmptyResponse));
        assert_eq!(
            first_candidate_text(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#),
            Err(BridgeError::EmptyResponse)
        );
    }

    #[test]
    fn test_malformed_success_body_is_transport_error() {
        assert!(matches!(first_candidate_text("<html>"), Err(BridgeError::Transport(_))));
    }

    #[test]
    fn test_error_message() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(status, r#"{"error":{"code":400,"message":"API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(
            error_message(status, "not json"),
            "Failed to communicate with Gemini API (400 Bad Request)"
        );
        assert_eq!(
            error_message(status, r#"{"error":{}}"#),
            "Failed to communicate with Gemini API (400 Bad Request)"
        );
    }

    #[cfg(feature = "http-server")]
    mod fake_endpoint {
        use super::*;
        use axum::{
            extract::{Query, State},
            http::StatusCode,
            routing::post,
            Json, Router,
        };
        use std::collections::HashMap;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct FakeState {
            calls: Arc<AtomicUsize>,
            last_key: Arc<Mutex<Option<String>>>,
            last_body: Arc<Mutex<Option<serde_json::Value>>>,
            status: StatusCode,
            reply: serde_json::Value,
        }

        async fn generate(
            State(state): State<FakeState>,
            Query(query): Query<HashMap<String, String>>,
            Json(body): Json<serde_json::Value>,
        ) -> (StatusCode, Json<serde_json::Value>) {
            state.calls.fetch_add(1, Ordering::SeqCst);
            *state.last_key.lock().unwrap() = query.get("key").cloned();
            *state.last_body.lock().unwrap() = Some(body);
            (state.status, Json(state.reply.clone()))
        }

        async fn spawn_fake(status: StatusCode, reply: serde_json::Value) -> (String, FakeState) {
            let state = FakeState {
                calls: Arc::new(AtomicUsize::new(0)),
                last_key: Arc::new(Mutex::new(None)),
                last_body: Arc::new(Mutex::new(None)),
                status,
                reply,
            };
            let app = Router::new()
                .route("/generate", post(generate))
                .with_state(state.clone());

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            (format!("http://{}/generate", addr), state)
        }

        #[tokio::test]
        async fn test_generate_success() {
            let reply = serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "Eat oats 🥣" }] } }]
            });
            let (endpoint, state) = spawn_fake(StatusCode::OK, reply).await;
            let client = GeminiClient::new("secret".to_string(), endpoint);

            let request = GenerationRequest::new("breakfast?").with_temperature(0.3);
            let text = client.generate(&request).await.unwrap();

            assert_eq!(text, "Eat oats 🥣");
            assert_eq!(state.calls.load(Ordering::SeqCst), 1);
            assert_eq!(state.last_key.lock().unwrap().as_deref(), Some("secret"));
            let body = state.last_body.lock().unwrap().clone().unwrap();
            assert_eq!(body["contents"][0]["parts"][0]["text"], "breakfast?");
        }

        #[tokio::test]
        async fn test_generate_error_status_single_call() {
            let reply = serde_json::json!({ "error": { "message": "Quota exceeded" } });
            let (endpoint, state) = spawn_fake(StatusCode::TOO_MANY_REQUESTS, reply).await;
            let client = GeminiClient::new("secret".to_string(), endpoint);

            let err = client.generate(&GenerationRequest::new("hi")).await.unwrap_err();

            assert_eq!(err, BridgeError::Transport("Quota exceeded".to_string()));
            assert_eq!(state.calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_generate_without_candidates() {
            let (endpoint, _state) = spawn_fake(StatusCode::OK, serde_json::json!({})).await;
            let client = GeminiClient::new("secret".to_string(), endpoint);

            let err = client.generate(&GenerationRequest::new("hi")).await.unwrap_err();
            assert_eq!(err, BridgeError::EmptyResponse);
        }
    }
}
