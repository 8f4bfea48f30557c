//! World Bank client

use crate::config::ApiSettings;
use crate::error::Result;
use crate::http::ApiClient;
use crate::pagination::PageNumberStrategy;
use crate::roles::{Internal, Source};
use crate::types::{RecordStream, RequestParams};
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Public endpoint of the World Bank indicators API
pub const WORLD_BANK_BASE_URL: &str = "https://api.worldbank.org/v2";

fn default_api() -> ApiSettings {
    ApiSettings::builder()
        .base_url(WORLD_BANK_BASE_URL)
        .batch_size(1000)
        .name("worldbank")
        .build()
}

/// What to download from the World Bank API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldBankSettings {
    /// Country codes (ISO3 or ISO2); empty means every country
    #[serde(default)]
    pub countries: Vec<String>,

    /// Indicator identifiers, e.g. `SP.POP.TOTL`
    #[serde(default)]
    pub indicators: Vec<String>,

    /// Date filters, e.g. `2010:2020`
    #[serde(default)]
    pub date_intervals: Vec<String>,

    /// Target API settings
    #[serde(default = "default_api")]
    pub api: ApiSettings,
}

impl WorldBankSettings {
    /// Settings against the public API
    pub fn new<C, I, D>(countries: C, indicators: I, date_intervals: D) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            countries: countries.into_iter().map(Into::into).collect(),
            indicators: indicators.into_iter().map(Into::into).collect(),
            date_intervals: date_intervals.into_iter().map(Into::into).collect(),
            api: default_api(),
        }
    }

    /// Replace the API settings
    #[must_use]
    pub fn with_api(mut self, api: ApiSettings) -> Self {
        self.api = api;
        self
    }
}

/// Client for the World Bank indicators API
#[derive(Debug)]
pub struct WorldBankClient {
    client: ApiClient,
    strategy: PageNumberStrategy,
    indicators: Vec<String>,
    merged_countries: String,
}

impl WorldBankClient {
    /// Create a client. The session starts closed.
    ///
    /// An empty base URL, as left by an `api` block that names only some
    /// fields, falls back to the public endpoint.
    pub fn new(mut settings: WorldBankSettings) -> Result<Self> {
        if settings.api.base_url.is_empty() {
            settings.api.base_url = WORLD_BANK_BASE_URL.to_string();
        }
        let params = default_params(&settings);
        let client = ApiClient::new(settings.api)?.with_default_params(params);

        Ok(Self {
            client,
            strategy: PageNumberStrategy::new(),
            indicators: settings.indicators,
            merged_countries: settings.countries.join(";"),
        })
    }

    /// Wrap an already configured API client
    pub fn with_client(client: ApiClient, settings: &WorldBankSettings) -> Self {
        let client = client.with_default_params(default_params(settings));
        Self {
            client,
            strategy: PageNumberStrategy::new(),
            indicators: settings.indicators.clone(),
            merged_countries: settings.countries.join(";"),
        }
    }

    /// The underlying API client
    pub fn api_client(&self) -> &ApiClient {
        &self.client
    }

    /// Requested indicators
    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    /// Parameters of the first page of every endpoint
    pub fn params(&self) -> RequestParams {
        crate::http::PageFetcher::default_params(&self.client)
    }

    /// One endpoint per indicator, scoped to the configured countries
    pub fn endpoints(&self) -> Vec<String> {
        self.indicators
            .iter()
            .map(|indicator| {
                if self.merged_countries.is_empty() {
                    format!("indicator/{indicator}")
                } else {
                    format!("country/{}/indicator/{indicator}", self.merged_countries)
                }
            })
            .collect()
    }

    /// Stream the records of one endpoint
    pub fn fetch(&self, endpoint: Option<&str>, params: Option<RequestParams>) -> RecordStream<'_> {
        self.client.fetch(&self.strategy, endpoint, params)
    }

    /// Stream the records of every endpoint, one endpoint after another.
    ///
    /// The first error ends the whole stream; later endpoints are not requested.
    pub fn fetch_all(&self) -> RecordStream<'_> {
        let endpoints: VecDeque<String> = self.endpoints().into();
        debug!(endpoints = endpoints.len(), "Fetching all indicators");

        let state: (VecDeque<String>, Option<RecordStream<'_>>) = (endpoints, None);
        Box::pin(stream::try_unfold(
            state,
            move |(mut endpoints, mut current)| async move {
                loop {
                    if let Some(records) = current.as_mut() {
                        match records.next().await {
                            Some(record) => return record.map(|r| Some((r, (endpoints, current)))),
                            None => current = None,
                        }
                    }
                    let Some(endpoint) = endpoints.pop_front() else {
                        return Ok(None);
                    };
                    current = Some(self.fetch(Some(&endpoint), None));
                }
            },
        ))
    }
}

fn default_params(settings: &WorldBankSettings) -> RequestParams {
    let mut params = RequestParams::new()
        .with("format", "json")
        .with("per_page", settings.api.batch_size)
        .with("page", 1);
    if !settings.date_intervals.is_empty() {
        params.insert("date", settings.date_intervals.join(";"));
    }
    params
}

impl Source for WorldBankClient {
    fn records(&self) -> RecordStream<'_> {
        self.fetch_all()
    }
}

impl Internal for WorldBankClient {
    fn connect(&mut self) -> Result<()> {
        self.client.connect()
    }

    fn disconnect(&mut self) {
        self.client.disconnect();
    }

    fn is_connected(&self) -> bool {
        self.client.is_connected()
    }
}
