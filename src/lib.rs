//! Prompt/response bridge between the wellness front end and a hosted
//! text-generation model.
//!
//! Each feature builds a prompt ([`services::prompts`]), makes exactly one
//! call through a [`services::TextGenerator`], and pulls a typed record out
//! of the model's free-form reply ([`services::extractor`]).
//! [`handlers::WellnessAdvisor`] exposes the five features; [`api`] adds
//! caller-side validation and the HTTP routes.

pub mod api;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

pub use errors::{BridgeError, BridgeResult};
pub use handlers::WellnessAdvisor;
