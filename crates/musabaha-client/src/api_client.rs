//! HTTP client for communicating with the Musabaha backend

use crate::error::{ClientError, ClientResult};
use crate::resource::{HttpVerb, TransitionRequest};
use musabaha_core::Credentials;
use musabaha_core::types::{ListEnvelope, MutationEnvelope};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const BODY_EXCERPT_LEN: usize = 200;

/// API client for the payment and subscription endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl ApiClient {
    /// Create a new API client with default HTTP settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base(base_url.into()),
            credentials: None,
        }
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &musabaha_core::Config) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.api.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: normalize_base(config.base_url().to_string()),
            credentials: config.credentials().cloned(),
        })
    }

    /// Set the bearer token for authenticated endpoints
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer token is configured
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(
        &self,
        request: RequestBuilder,
        requires_auth: bool,
        resource: &'static str,
    ) -> ClientResult<RequestBuilder> {
        if !requires_auth {
            return Ok(request);
        }
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ClientError::MissingCredentials { resource })?;
        Ok(request.bearer_auth(credentials.token()))
    }

    /// Fetch a record list from an envelope endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are required but missing, the request
    /// fails, the status is not 2xx, the body is not a valid envelope, or the
    /// envelope reports `success: false`.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        requires_auth: bool,
        resource: &'static str,
    ) -> ClientResult<Vec<T>> {
        let request = self.authorize(self.client.get(self.url(path)), requires_auth, resource)?;

        debug!(resource, path, "Fetching list");
        let body = read_success_body(request.send().await?).await?;

        let envelope: ListEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| ClientError::decode(format!("{resource} list"), e))?;

        if !envelope.success {
            return Err(ClientError::Rejected {
                message: envelope
                    .failure_message()
                    .unwrap_or_else(|| format!("Failed to fetch {resource} list")),
            });
        }

        Ok(envelope.data.unwrap_or_default())
    }

    /// Send a status-change request
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are required but missing, the request
    /// fails, the status is not 2xx, the body is not valid JSON, or the
    /// backend reports `success: false`.
    pub async fn send_transition(
        &self,
        transition: &TransitionRequest,
        requires_auth: bool,
        resource: &'static str,
    ) -> ClientResult<()> {
        let url = self.url(&transition.path);
        let mut request = match transition.verb {
            HttpVerb::Patch => self.client.patch(url),
            HttpVerb::Put => self.client.put(url),
        };
        if let Some(body) = &transition.body {
            request = request.json(body);
        }
        let request = self.authorize(request, requires_auth, resource)?;

        debug!(resource, path = %transition.path, verb = ?transition.verb, "Sending status change");
        let body = read_success_body(request.send().await?).await?;

        let envelope: MutationEnvelope = serde_json::from_str(&body)
            .map_err(|e| ClientError::decode(format!("{resource} status response"), e))?;

        if !envelope.success {
            return Err(ClientError::Rejected {
                message: envelope
                    .failure_message()
                    .unwrap_or_else(|| format!("The {resource} was not updated")),
            });
        }

        Ok(())
    }

    /// Check whether an asset URL answers a `HEAD` request with 2xx
    ///
    /// Failures of any kind count as unreachable.
    pub async fn asset_exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let reachable = response.status().is_success();
                debug!(url, status = response.status().as_u16(), reachable, "Asset check");
                reachable
            }
            Err(e) => {
                warn!(url, error = %e, "Asset check failed");
                false
            }
        }
    }
}

fn normalize_base(base_url: String) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

async fn read_success_body(response: Response) -> ClientResult<String> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let message = serde_json::from_str::<MutationEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.failure_message())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(BODY_EXCERPT_LEN).collect())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        });

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new(" http://localhost:5000/ ");

        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/x"), "http://localhost:5000/api/x");
        assert!(!client.has_credentials());
    }

    #[test]
    fn test_from_config_carries_credentials() {
        let mut config = musabaha_core::Config::default();
        config.api.base_url = "http://127.0.0.1:1/".to_string();
        config.api.request_timeout_seconds = Some(3);
        config.auth.token = Credentials::bearer("abc");

        let client = ApiClient::from_config(&config).unwrap();

        assert_eq!(client.base_url(), "http://127.0.0.1:1");
        assert!(client.has_credentials());
    }

    #[test]
    fn test_missing_credentials_are_refused_locally() {
        let client = ApiClient::new("http://localhost");
        let request = client.client.get(client.url("/api/subscriptions/all"));

        let result = client.authorize(request, true, "registration");

        assert!(matches!(
            result,
            Err(ClientError::MissingCredentials { resource: "registration" })
        ));
    }
}
