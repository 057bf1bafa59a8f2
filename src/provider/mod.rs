//! Identity provider surface consumed by the verification gate: account
//! creation, password sign-in, verification email dispatch, and user-record
//! reload. The provider is authoritative for `email_verified`.

pub mod http;

pub use self::http::IdentityClient;

use crate::errors::AuthError;
use secrecy::{ExposeSecret, SecretString};

/// Provider-issued user handle.
///
/// `email_verified` reflects the provider-side record at the time it was
/// fetched and may be stale until [`IdentityProvider::reload`] refreshes it.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    id_token: SecretString,
}

impl IdentityUser {
    #[must_use]
    pub fn new(uid: String, email: String, email_verified: bool, id_token: SecretString) -> Self {
        Self {
            uid,
            email,
            email_verified,
            id_token,
        }
    }

    /// Short-lived identity token issued at authentication.
    ///
    /// An empty token is reported as [`AuthError::Token`]; callers never see
    /// a blank credential.
    pub fn id_token(&self) -> Result<SecretString, AuthError> {
        if self.id_token.expose_secret().is_empty() {
            return Err(AuthError::Token("no identity token issued".to_string()));
        }

        Ok(self.id_token.clone())
    }
}

/// Operations the gate needs from the identity provider.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityUser, AuthError>;

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityUser, AuthError>;

    async fn send_verification_email(&self, user: &IdentityUser) -> Result<(), AuthError>;

    /// Refresh the provider-side record, in particular `email_verified`.
    /// Without this, a verification performed out-of-band is invisible.
    async fn reload(&self, user: &mut IdentityUser) -> Result<(), AuthError>;
}
