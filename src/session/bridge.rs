//! Session bridge: the only holder of the session artifact. It turns a
//! verified identity token into a server session and answers the two
//! queries the rest of the application needs ("am I logged in" and "who is
//! logged in") without a network call when no artifact is held.

use crate::errors::AuthError;
use crate::session::{Profile, SessionArtifact, SessionService};
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct SessionBridge<S> {
    service: S,
    artifact: Option<SessionArtifact>,
}

impl<S: SessionService> SessionBridge<S> {
    #[must_use]
    pub fn new(service: S) -> Self {
        Self {
            service,
            artifact: None,
        }
    }

    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Exchange an identity token for a session artifact and hold it.
    ///
    /// The caller guarantees the token belongs to a verified user; this is
    /// the only path that creates an artifact.
    pub async fn establish(
        &mut self,
        email: &str,
        id_token: &SecretString,
    ) -> Result<(), AuthError> {
        let artifact = self.service.sign_in(email, id_token).await?;

        debug!("session established");

        self.artifact = Some(artifact);

        Ok(())
    }

    /// Drop the held artifact, e.g. when navigating back to sign-in.
    pub fn reset(&mut self) {
        self.artifact = None;
    }

    /// True iff a held artifact maps to a live session.
    pub async fn is_authenticated(&self) -> Result<bool, AuthError> {
        match &self.artifact {
            Some(artifact) => self.service.is_authenticated(artifact).await,
            None => Ok(false),
        }
    }

    /// Profile for the current session, absent when there is none. An
    /// absent profile must be treated as unauthenticated even if
    /// `is_authenticated` was not separately checked.
    pub async fn current_user(&self) -> Result<Option<Profile>, AuthError> {
        match &self.artifact {
            Some(artifact) => self.service.current_user(artifact).await,
            None => Ok(None),
        }
    }
}
