//! Remote book lookup
//!
//! [`BookLookup`] is the seam between the executor and the network. The
//! executor only ever sees this trait; [`HttpBookLookup`] is the production
//! implementation talking to the storefront's autocomplete endpoint.

use crate::config::ShelfConfig;
use crate::error::LookupError;
use crate::types::{Book, SearchType};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Asynchronous text search against a book catalogue
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookLookup: Send + Sync {
    /// Look up books matching `keyword`
    ///
    /// Results are returned in the endpoint's rank order.
    ///
    /// # Errors
    /// Any transport, status, or decode failure.
    async fn lookup(&self, keyword: &str, search_type: SearchType)
        -> Result<Vec<Book>, LookupError>;
}

#[async_trait]
impl<L: BookLookup + ?Sized> BookLookup for Arc<L> {
    async fn lookup(
        &self,
        keyword: &str,
        search_type: SearchType,
    ) -> Result<Vec<Book>, LookupError> {
        (**self).lookup(keyword, search_type).await
    }
}

/// Wire format of the autocomplete endpoint
#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    /// Absent or null means no matches
    #[serde(default)]
    books: Option<Vec<Book>>,
}

/// HTTP implementation of [`BookLookup`]
#[derive(Debug, Clone)]
pub struct HttpBookLookup {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpBookLookup {
    /// Create lookup from configuration
    ///
    /// # Errors
    /// - `LookupError::InvalidConfig` for a bad base URL or token
    /// - `LookupError::Transport` if the HTTP client cannot be built
    pub fn new(config: &ShelfConfig) -> Result<Self, LookupError> {
        let endpoint = config
            .endpoint_url()
            .map_err(|e| LookupError::InvalidConfig(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| LookupError::InvalidConfig("api token is not a valid header".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let timeout = config.request_timeout();
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Resolved endpoint URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            LookupError::from(err)
        }
    }
}

#[async_trait]
impl BookLookup for HttpBookLookup {
    async fn lookup(
        &self,
        keyword: &str,
        search_type: SearchType,
    ) -> Result<Vec<Book>, LookupError> {
        tracing::debug!(keyword, %search_type, "autocomplete request");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("keyword", keyword), ("type", search_type.as_str())])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let payload: AutocompleteResponse = serde_json::from_slice(&body)?;
        Ok(payload.books.unwrap_or_default())
    }
}
