//! REST client for an Identity Toolkit-style provider. All operations are
//! POSTs to `accounts:<op>` under the configured base URL, authenticated by
//! an API key query parameter. Error bodies are JSON with the reason under
//! `error.message`.

use crate::errors::AuthError;
use crate::provider::{IdentityProvider, IdentityUser};
use crate::APP_USER_AGENT;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, instrument};
use ulid::Ulid;
use url::Url;

#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

impl IdentityClient {
    /// Build a client against the provider base URL.
    ///
    /// The timeout applies per request; a hanging provider call fails with a
    /// transport error instead of pinning the flow.
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Provider(format!("error creating client: {e}")))?;

        let base_url =
            Url::parse(base_url).map_err(|e| AuthError::Provider(format!("invalid URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint_url(&self, operation: &str) -> Result<Url, AuthError> {
        let mut url = self
            .base_url
            .join(&format!("v1/accounts:{operation}"))
            .map_err(|e| AuthError::Provider(format!("invalid URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        Ok(url)
    }

    async fn post(&self, operation: &str, payload: Value) -> Result<Value, AuthError> {
        let url = self.endpoint_url(operation)?;

        debug!("provider call: accounts:{}", operation);

        let response = self
            .client
            .post(url)
            .header("x-request-id", Ulid::new().to_string())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let json_response: Value = response.json().await.unwrap_or_default();
            let message = provider_error_message(&json_response);

            error!("accounts:{} failed: {} - {}", operation, status, message);

            return Err(AuthError::Provider(message));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("error parsing response: {e}")))
    }

    async fn lookup_email_verified(&self, id_token: &SecretString) -> Result<bool, AuthError> {
        let response = self
            .post("lookup", json!({ "idToken": id_token.expose_secret() }))
            .await?;

        Ok(response["users"][0]["emailVerified"]
            .as_bool()
            .unwrap_or(false))
    }
}

/// Extract the human-readable reason from a provider error body.
fn provider_error_message(body: &Value) -> String {
    body["error"]["message"]
        .as_str()
        .unwrap_or("provider request failed")
        .to_string()
}

fn user_from_response(response: &Value, email_verified: bool) -> Result<IdentityUser, AuthError> {
    let uid = response["localId"]
        .as_str()
        .ok_or_else(|| AuthError::Provider("no localId in response".to_string()))?
        .to_string();

    let email = response["email"].as_str().unwrap_or_default().to_string();

    let id_token = response["idToken"].as_str().unwrap_or_default().to_string();

    Ok(IdentityUser::new(
        uid,
        email,
        email_verified,
        SecretString::from(id_token),
    ))
}

impl IdentityProvider for IdentityClient {
    #[instrument(skip(self, password))]
    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityUser, AuthError> {
        let response = self
            .post(
                "signUp",
                json!({
                    "email": email,
                    "password": password.expose_secret(),
                    "returnSecureToken": true,
                }),
            )
            .await?;

        // A freshly created account is never verified.
        user_from_response(&response, false)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityUser, AuthError> {
        let response = self
            .post(
                "signInWithPassword",
                json!({
                    "email": email,
                    "password": password.expose_secret(),
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let mut user = user_from_response(&response, false)?;

        // signInWithPassword does not carry the verification flag; one
        // lookup populates it.
        user.email_verified = self.lookup_email_verified(&user.id_token()?).await?;

        Ok(user)
    }

    #[instrument(skip_all, fields(uid = %user.uid))]
    async fn send_verification_email(&self, user: &IdentityUser) -> Result<(), AuthError> {
        let token = user.id_token()?;

        self.post(
            "sendOobCode",
            json!({
                "requestType": "VERIFY_EMAIL",
                "idToken": token.expose_secret(),
            }),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip_all, fields(uid = %user.uid))]
    async fn reload(&self, user: &mut IdentityUser) -> Result<(), AuthError> {
        user.email_verified = self.lookup_email_verified(&user.id_token()?).await?;

        Ok(())
    }
}
