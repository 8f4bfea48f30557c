//! HTTP client module
//!
//! Provides the page fetcher: one GET per call, routed through the retry
//! policy, with failures classified as network, status or payload errors.
//!
//! # Features
//!
//! - **Session ownership**: each `ApiClient` owns exactly one session
//! - **Automatic Retries**: bounded attempts with exponential backoff
//! - **Authentication**: static headers plus bearer token

mod client;

pub use client::{ApiClient, PageFetcher};
