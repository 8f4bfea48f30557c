// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::unused_async)]

//! # pagewise
//!
//! Building blocks for paginated, retrying HTTP API clients.
//!
//! A client is assembled from capability roles rather than a base type:
//! it owns a session, wraps every page request in a bounded retry policy,
//! and exposes a lazy record stream driven by a pluggable continuation
//! strategy.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use pagewise::config::ApiSettings;
//! use pagewise::http::ApiClient;
//! use pagewise::pagination::PageNumberStrategy;
//! use pagewise::roles::Internal;
//!
//! #[tokio::main]
//! async fn main() -> pagewise::Result<()> {
//!     let settings = ApiSettings::builder()
//!         .base_url("https://api.worldbank.org/v2")
//!         .endpoint("indicator/SP.POP.TOTL")
//!         .build();
//!     let mut client = ApiClient::new(settings)?;
//!     let client = client.scoped()?;
//!
//!     let strategy = PageNumberStrategy::new();
//!     let records: Vec<_> = client.fetch(&strategy, None, None).try_collect().await?;
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Roles                                  │
//! │  Source → records()   Sink → write()   Internal → connect()     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Session  │   Retry   │  PageFetcher  │ Paginate  │   Sinks     │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Headers  │ Backoff   │ GET + JSON    │ Lazy      │ JSON lines  │
//! │ Bearer   │ Transient │ Defaults      │ Strategy  │ DuckDB      │
//! │ Timeout  │ Give up   │ Status check  │ Page loop │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client and API settings
pub mod config;

/// HTTP session lifecycle
pub mod session;

/// Retry with exponential backoff
pub mod retry;

/// Capability roles and the pipeline runner
pub mod roles;

/// Page fetching over HTTP
pub mod http;

/// Continuation strategies and the streaming page loop
pub mod pagination;

/// World Bank indicators adapter
pub mod worldbank;

/// DuckDB storage sink
pub mod storage;

/// JSON lines output sink
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{ApiSettings, ClientSettings};
pub use http::{ApiClient, PageFetcher};
pub use pagination::{paginate, ContinuationStrategy, PageNumberStrategy};
pub use retry::RetryPolicy;
pub use roles::{connected, Connected, Intermediate, Internal, Sink, SinkOutcome, Source};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
