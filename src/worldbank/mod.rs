//! World Bank indicators adapter
//!
//! A concrete client built from the generic pieces: `[metadata, records]`
//! page-numbered pagination, one endpoint per indicator, and a `fetch_all`
//! that concatenates the per-endpoint streams.
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use pagewise::roles::Internal;
//! use pagewise::worldbank::{WorldBankClient, WorldBankSettings};
//!
//! let settings = WorldBankSettings::new(["USA", "CAN"], ["SP.POP.TOTL"], ["2010:2020"]);
//! let mut client = WorldBankClient::new(settings)?;
//! let client = client.scoped()?;
//! let mut records = client.fetch_all();
//! while let Some(record) = records.next().await {
//!     println!("{}", record?);
//! }
//! ```

mod client;
mod types;

pub use client::{WorldBankClient, WorldBankSettings, WORLD_BANK_BASE_URL};
pub use types::Observation;
