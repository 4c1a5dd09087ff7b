pub mod client;
pub mod models;

pub use client::{ApiClient, ApiError, ChatHistory, Health, HealthMonitor};
