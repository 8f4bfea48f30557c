//! Page fetcher
//!
//! `ApiClient` issues one GET per `get` call against
//! `{base_url}/{endpoint}` and returns the decoded JSON payload. Failures
//! are classified so the retry policy can decide what to retry:
//! - transport failure → `Error::Network`
//! - non-2xx status → `Error::HttpStatus`
//! - body that is not JSON → `Error::InvalidResponsePayload`

use crate::config::ApiSettings;
use crate::error::{Error, Result};
use crate::pagination::{paginate, ContinuationStrategy};
use crate::retry::RetryPolicy;
use crate::roles::Internal;
use crate::session::Session;
use crate::types::{Payload, RecordStream, RequestParams};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

/// Something that can fetch one page of an API
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Endpoint used when a request names none
    fn default_endpoint(&self) -> &str;

    /// Parameters used when a request passes none
    fn default_params(&self) -> RequestParams;

    /// Fetch and decode one page
    async fn get(&self, endpoint: Option<&str>, params: Option<&RequestParams>) -> Result<Payload>;
}

/// Paginating, retrying API client
pub struct ApiClient {
    settings: ApiSettings,
    session: Session,
    retry: RetryPolicy,
    default_params: RequestParams,
}

impl ApiClient {
    /// Create a client for the given API target. The session starts closed.
    pub fn new(settings: ApiSettings) -> Result<Self> {
        settings.validate()?;
        let retry = RetryPolicy::from_settings(&settings.client);
        Ok(Self {
            settings,
            session: Session::new(),
            retry,
            default_params: RequestParams::new(),
        })
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the parameters used when a request passes none
    #[must_use]
    pub fn with_default_params(mut self, params: RequestParams) -> Self {
        self.default_params = params;
        self
    }

    /// API settings of this client
    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Retry policy of this client
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// The client's session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Stream every record reachable from one endpoint.
    ///
    /// Pages are requested lazily, one at a time, as the stream is polled.
    pub fn fetch<'a, S>(
        &'a self,
        strategy: &'a S,
        endpoint: Option<&str>,
        params: Option<RequestParams>,
    ) -> RecordStream<'a>
    where
        S: ContinuationStrategy + ?Sized,
    {
        paginate(self, strategy, endpoint, params)
    }

    async fn send_once(
        &self,
        client: &Client,
        url: &str,
        query: &[(String, String)],
    ) -> Result<Payload> {
        debug!(client = %self.settings.client.name, %url, ?query, "GET");

        let response = client
            .get(url)
            .query(query)
            .timeout(self.settings.client.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| Error::invalid_payload(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for ApiClient {
    fn default_endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    fn default_params(&self) -> RequestParams {
        self.default_params.clone()
    }

    async fn get(&self, endpoint: Option<&str>, params: Option<&RequestParams>) -> Result<Payload> {
        let endpoint = endpoint.unwrap_or(&self.settings.endpoint);
        let query = match params {
            Some(params) => params.to_query_pairs(),
            None => self.default_params.to_query_pairs(),
        };

        let client = self.session.client()?;
        let url = self.settings.url_for(endpoint);

        self.retry
            .run(|| self.send_once(client, &url, &query))
            .await
    }
}

impl Internal for ApiClient {
    fn connect(&mut self) -> Result<()> {
        if self.session.is_connected() {
            return Ok(());
        }
        self.session.connect(&self.settings)?;
        info!(client = %self.settings.client.name, base_url = %self.settings.base_url, "Connected");
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.session.is_connected() {
            info!(client = %self.settings.client.name, "Disconnected");
        }
        self.session.disconnect();
    }

    fn is_connected(&self) -> bool {
        self.session.is_connected()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("name", &self.settings.client.name)
            .field("base_url", &self.settings.base_url)
            .field("session", &self.session)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
