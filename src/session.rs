//! Session lifecycle
//!
//! Owns the underlying `reqwest::Client` for one API client instance.
//! Static headers are applied first, then the bearer token, so a configured
//! token always wins over a static `Authorization` header.

use crate::config::ApiSettings;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tracing::debug;

/// An exclusively owned HTTP session
#[derive(Default)]
pub struct Session {
    client: Option<Client>,
    headers: HeaderMap,
    connected: bool,
}

impl Session {
    /// Create a closed session
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the session if it is not already open
    pub fn connect(&mut self, settings: &ApiSettings) -> Result<()> {
        if self.client.is_some() {
            return Ok(());
        }

        let headers = build_headers(settings)?;
        let client = Client::builder()
            .timeout(settings.client.timeout)
            .user_agent(format!("pagewise/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        debug!(client = %settings.client.name, headers = headers.len(), "Session opened");
        self.client = Some(client);
        self.headers = headers;
        self.connected = true;
        Ok(())
    }

    /// Release the session. Safe to call when already closed.
    pub fn disconnect(&mut self) {
        if self.client.take().is_some() {
            debug!("Session closed");
        }
        self.headers.clear();
        self.connected = false;
    }

    /// Whether the session is open
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The open HTTP client, or `NotConnected`
    pub fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(Error::NotConnected)
    }

    /// Headers applied to every request of this session
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("connected", &self.connected)
            .field("header_count", &self.headers.len())
            .finish_non_exhaustive()
    }
}

fn build_headers(settings: &ApiSettings) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(static_headers) = &settings.headers {
        for (key, value) in static_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::config(format!("Invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("Invalid value for header '{key}': {e}")))?;
            headers.insert(name, value);
        }
    }

    if let Some(token) = &settings.auth_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::config(format!("Invalid auth token: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}
