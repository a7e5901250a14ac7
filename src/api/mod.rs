//! FortiFlex v2 REST client.
//!
//! [`FlexClient`] carries the base URL and bearer token for one run. The
//! endpoint wrappers live in submodules as `impl FlexClient` blocks:
//!
//! - [`auth`] - OAuth password grant (separate [`auth::AuthClient`], no bearer yet)
//! - [`query`] - `programs/list`, `configs/list`, `entitlements/list`
//! - [`lifecycle`] - `entitlements/reactivate`, `entitlements/vm/token`,
//!   `entitlements/vm/create`
//!
//! Every call is a single JSON POST. Nothing is retried or paginated.

pub mod auth;
pub mod lifecycle;
pub mod query;
pub mod types;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ApiConfig;
use crate::errors::{ProvisionError, ProvisionResult};
use types::Envelope;

/// Build the HTTP client shared by the auth and API calls of one run.
pub fn http_client(api: &ApiConfig) -> ProvisionResult<Client> {
    Client::builder()
        .user_agent(user_agent())
        .timeout(api.timeout())
        .build()
        .map_err(ProvisionError::Http)
}

pub fn user_agent() -> &'static str {
    concat!("flex-provisioner/", env!("CARGO_PKG_VERSION"))
}

/// Authenticated FortiFlex client.
#[derive(Clone)]
pub struct FlexClient {
    http: Client,
    base: Url,
    access_token: String,
}

impl std::fmt::Debug for FlexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlexClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl FlexClient {
    pub fn new(api: &ApiConfig, access_token: impl Into<String>) -> ProvisionResult<Self> {
        Ok(Self::with_http(http_client(api)?, api.base_url()?, access_token))
    }

    /// Reuse an existing HTTP client. `base` must end with `/`.
    pub fn with_http(http: Client, base: Url, access_token: impl Into<String>) -> Self {
        Self {
            http,
            base,
            access_token: access_token.into(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> ProvisionResult<Url> {
        self.base.join(path).map_err(|e| {
            ProvisionError::InvalidInput(format!("cannot join '{path}' onto {}: {e}", self.base))
        })
    }

    /// POST a JSON body and decode a FortiFlex envelope.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> ProvisionResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Envelope,
    {
        let req = self.request(path)?.json(body);
        self.send(path, req).await
    }

    /// POST without a body and decode a FortiFlex envelope.
    pub(crate) async fn post_empty<T>(&self, path: &str) -> ProvisionResult<T>
    where
        T: DeserializeOwned + Envelope,
    {
        let req = self.request(path)?;
        self.send(path, req).await
    }

    fn request(&self, path: &str) -> ProvisionResult<RequestBuilder> {
        Ok(self
            .http
            .post(self.url(path)?)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token)))
    }

    async fn send<T>(&self, path: &str, req: RequestBuilder) -> ProvisionResult<T>
    where
        T: DeserializeOwned + Envelope,
    {
        debug!(path = %path, "POST");
        let resp = req.send().await?;
        let envelope: T = decode(resp).await?;
        check_envelope(envelope)
    }
}

/// Fail on non-2xx, then decode the body as JSON.
pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ProvisionResult<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        return Err(ProvisionError::Server {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    serde_json::from_slice(&bytes).map_err(|e| ProvisionError::Decode(e.to_string()))
}

/// Map a non-zero envelope status to `ProvisionError::Api`.
pub(crate) fn check_envelope<T: Envelope>(envelope: T) -> ProvisionResult<T> {
    if envelope.status() != 0 {
        return Err(ProvisionError::Api {
            status: envelope.status(),
            message: envelope
                .message()
                .unwrap_or("no message from server")
                .to_string(),
        });
    }
    Ok(envelope)
}
