//! Session service surface: profile registration at sign-up, exchange of a
//! provider identity token for a server-held session artifact, and the two
//! read-only session queries. Artifact creation goes exclusively through
//! [`SessionService::sign_in`].

pub mod bridge;
pub mod http;

pub use self::bridge::SessionBridge;
pub use self::http::SessionClient;

use crate::errors::AuthError;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Profile payload registered with the session service at sign-up.
///
/// Carries the plaintext password because the upstream contract does; see
/// DESIGN.md. It is exposed only while serializing the request.
#[derive(Debug, Clone)]
pub struct ProfileRegistration {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

/// Session-service verdict on a profile registration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub success: bool,
    pub message: Option<String>,
}

/// Profile associated with an active session. Contains no secrets.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub uid: String,
    pub name: String,
    pub email: String,
}

/// Opaque server-issued proof of an authenticated session.
///
/// Created only by a verified sign-in; queries take it explicitly so session
/// state is never ambient.
#[derive(Debug, Clone)]
pub struct SessionArtifact {
    token: SecretString,
}

impl SessionArtifact {
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }
}

/// Operations the flow needs from the session service.
#[allow(async_fn_in_trait)]
pub trait SessionService {
    /// Register the profile for a freshly created identity account.
    ///
    /// A rejection here leaves the identity account in place with no
    /// session-side profile; the outcome message is surfaced verbatim.
    async fn sign_up(
        &self,
        registration: &ProfileRegistration,
    ) -> Result<RegistrationOutcome, AuthError>;

    /// Exchange a verified user's identity token for a session artifact.
    async fn sign_in(
        &self,
        email: &str,
        id_token: &SecretString,
    ) -> Result<SessionArtifact, AuthError>;

    /// True iff the artifact maps to a live, non-expired session.
    async fn is_authenticated(&self, artifact: &SessionArtifact) -> Result<bool, AuthError>;

    /// Profile for the artifact's session, or `None` when the session is
    /// missing or expired. Callers treat `None` as unauthenticated.
    async fn current_user(&self, artifact: &SessionArtifact) -> Result<Option<Profile>, AuthError>;
}
