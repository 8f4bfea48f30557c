//! Pagination module
//!
//! A streaming page loop driven by a pluggable continuation strategy.
//!
//! # Overview
//!
//! The engine ([`paginate`]) asks a [`PageFetcher`](crate::http::PageFetcher)
//! for one page at a time and hands each payload to a
//! [`ContinuationStrategy`], which reads the records and metadata out of it
//! and decides whether and how to request the next page. Records are yielded
//! as soon as their page arrives; the next page is only requested once the
//! consumer has pulled every record of the current one.

mod engine;
mod strategy;

pub use engine::paginate;
pub use strategy::{ContinuationStrategy, PageNumberStrategy};
