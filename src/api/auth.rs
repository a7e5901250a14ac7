//! OAuth password grant against the Fortinet customer auth endpoint.

use reqwest::{Client, Url};
use tracing::{debug, info};

use super::types::{OAuthToken, PasswordGrantRequest};
use crate::config::ApiConfig;
use crate::credentials::Credentials;
use crate::errors::{ProvisionError, ProvisionResult};

/// Exchanges operator credentials for a bearer token.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    auth_url: Url,
    client_id: String,
}

impl AuthClient {
    pub fn new(http: Client, api: &ApiConfig) -> ProvisionResult<Self> {
        Ok(Self {
            http,
            auth_url: api.auth_url()?,
            client_id: api.client_id.clone(),
        })
    }

    /// Request a token. One POST, no retry and no refresh.
    pub async fn get_oauth_token(&self, credentials: &Credentials) -> ProvisionResult<OAuthToken> {
        let body = PasswordGrantRequest {
            username: &credentials.api_username,
            password: &credentials.api_password,
            client_id: &self.client_id,
            grant_type: "password",
        };

        debug!(url = %self.auth_url, client_id = %self.client_id, "Requesting OAuth token");
        let resp = self
            .http
            .post(self.auth_url.clone())
            .json(&body)
            .send()
            .await?;

        let token: OAuthToken = super::decode(resp).await?;
        if token.access_token.is_empty() {
            return Err(ProvisionError::Decode(
                "token endpoint returned an empty access_token".to_string(),
            ));
        }

        info!(
            username = %credentials.api_username,
            expires_in = ?token.expires_in,
            "Authenticated"
        );
        Ok(token)
    }
}
