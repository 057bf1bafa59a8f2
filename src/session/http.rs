//! REST client for the session service. Sign-up and sign-in are JSON POSTs;
//! the session query sends the artifact as a bearer token and treats
//! `204 No Content` as "no active session".

use crate::errors::AuthError;
use crate::session::{
    Profile, ProfileRegistration, RegistrationOutcome, SessionArtifact, SessionService,
};
use crate::APP_USER_AGENT;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};
use ulid::Ulid;
use url::Url;

#[derive(Clone, Debug, Serialize)]
struct SignUpRequest<'a> {
    uid: &'a str,
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Clone, Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    id_token: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
struct SignInResponse {
    token: String,
}

#[derive(Debug, Clone)]
pub struct SessionClient {
    client: Client,
    base_url: Url,
}

impl SessionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Session(format!("error creating client: {e}")))?;

        let base_url =
            Url::parse(base_url).map_err(|e| AuthError::Session(format!("invalid URL: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(endpoint)
            .map_err(|e| AuthError::Session(format!("invalid URL: {e}")))
    }
}

/// Extract the failure reason from a session-service error body.
fn session_error_message(body: &serde_json::Value) -> String {
    body["message"]
        .as_str()
        .unwrap_or("session service request failed")
        .to_string()
}

impl SessionService for SessionClient {
    #[instrument(skip_all, fields(uid = %registration.uid))]
    async fn sign_up(
        &self,
        registration: &ProfileRegistration,
    ) -> Result<RegistrationOutcome, AuthError> {
        let url = self.endpoint_url("api/auth/sign-up")?;

        debug!("registering profile");

        let payload = SignUpRequest {
            uid: &registration.uid,
            name: &registration.name,
            email: &registration.email,
            // Plaintext per the upstream contract; see DESIGN.md.
            password: registration.password.expose_secret(),
        };

        let response = self
            .client
            .post(url)
            .header("x-request-id", Ulid::new().to_string())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Session(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = session_error_message(&body);

            error!("sign-up failed: {} - {}", status, message);

            return Err(AuthError::Session(message));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Session(format!("error parsing response: {e}")))
    }

    #[instrument(skip_all)]
    async fn sign_in(
        &self,
        email: &str,
        id_token: &SecretString,
    ) -> Result<SessionArtifact, AuthError> {
        let url = self.endpoint_url("api/auth/sign-in")?;

        let payload = SignInRequest {
            email,
            id_token: id_token.expose_secret(),
        };

        let response = self
            .client
            .post(url)
            .header("x-request-id", Ulid::new().to_string())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Session(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = session_error_message(&body);

            error!("sign-in failed: {} - {}", status, message);

            return Err(AuthError::Session(message));
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Session(format!("error parsing response: {e}")))?;

        Ok(SessionArtifact::new(SecretString::from(body.token)))
    }

    #[instrument(skip_all)]
    async fn is_authenticated(&self, artifact: &SessionArtifact) -> Result<bool, AuthError> {
        Ok(self.current_user(artifact).await?.is_some())
    }

    #[instrument(skip_all)]
    async fn current_user(&self, artifact: &SessionArtifact) -> Result<Option<Profile>, AuthError> {
        let url = self.endpoint_url("api/auth/session")?;

        let response = self
            .client
            .get(url)
            .bearer_auth(artifact.token().expose_secret())
            .send()
            .await
            .map_err(|e| AuthError::Session(e.to_string()))?;

        // No content means no session, not an error.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            error!("session lookup failed: {}", status);

            return Err(AuthError::Session(format!("session lookup failed: {status}")));
        }

        let profile: Profile = response
            .json()
            .await
            .map_err(|e| AuthError::Session(format!("error parsing response: {e}")))?;

        Ok(Some(profile))
    }
}
