//! Mock identity provider and session service for gate tests. Call counts
//! are atomic so tests can assert exactly how many network operations an
//! action performed.

use crate::errors::AuthError;
use crate::form::Credentials;
use crate::provider::{IdentityProvider, IdentityUser};
use crate::session::{
    Profile, ProfileRegistration, RegistrationOutcome, SessionArtifact, SessionService,
};
use secrecy::SecretString;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn creds(name: &str, email: &str, password: &str) -> Credentials {
    Credentials {
        name: if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        },
        email: email.to_string(),
        password: SecretString::from(password),
    }
}

pub struct MockProvider {
    /// Provider-side truth, read by `reload`.
    verified: AtomicBool,
    /// Possibly stale view returned by `sign_in` before a reload.
    sign_in_reports_verified: AtomicBool,
    create_error: Option<String>,
    sign_in_error: Option<String>,
    send_error: Option<String>,
    empty_token: bool,
    hang: bool,
    pub create_calls: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub reload_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            verified: AtomicBool::new(false),
            sign_in_reports_verified: AtomicBool::new(false),
            create_error: None,
            sign_in_error: None,
            send_error: None,
            empty_token: false,
            hang: false,
            create_calls: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            reload_calls: AtomicUsize::new(0),
        }
    }

    /// Verified from the start, including the `sign_in` view.
    pub fn verified(self) -> Self {
        self.verified.store(true, Ordering::SeqCst);
        self.sign_in_reports_verified.store(true, Ordering::SeqCst);
        self
    }

    /// Simulate the user clicking the verification link out-of-band: the
    /// provider record flips, but `sign_in` keeps reporting the stale value
    /// until `reload`.
    pub fn flip_verified(&self) {
        self.verified.store(true, Ordering::SeqCst);
    }

    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub fn failing_sign_in(mut self, message: &str) -> Self {
        self.sign_in_error = Some(message.to_string());
        self
    }

    pub fn failing_send(mut self, message: &str) -> Self {
        self.send_error = Some(message.to_string());
        self
    }

    pub fn with_empty_token(mut self) -> Self {
        self.empty_token = true;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    fn user(&self, email: &str, email_verified: bool) -> IdentityUser {
        let token = if self.empty_token { "" } else { "id-token-1" };
        IdentityUser::new(
            "uid-1".to_string(),
            email.to_string(),
            email_verified,
            SecretString::from(token),
        )
    }
}

impl IdentityProvider for MockProvider {
    async fn create_account(
        &self,
        email: &str,
        _password: &SecretString,
    ) -> Result<IdentityUser, AuthError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.create_error {
            return Err(AuthError::Provider(message.clone()));
        }

        Ok(self.user(email, false))
    }

    async fn sign_in(
        &self,
        email: &str,
        _password: &SecretString,
    ) -> Result<IdentityUser, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);

        if self.hang {
            return std::future::pending().await;
        }

        if let Some(message) = &self.sign_in_error {
            return Err(AuthError::Provider(message.clone()));
        }

        Ok(self.user(email, self.sign_in_reports_verified.load(Ordering::SeqCst)))
    }

    async fn send_verification_email(&self, _user: &IdentityUser) -> Result<(), AuthError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.send_error {
            return Err(AuthError::Provider(message.clone()));
        }

        Ok(())
    }

    async fn reload(&self, user: &mut IdentityUser) -> Result<(), AuthError> {
        self.reload_calls.fetch_add(1, Ordering::SeqCst);
        user.email_verified = self.verified.load(Ordering::SeqCst);

        Ok(())
    }
}

pub struct MockSession {
    rejection: Option<String>,
    sign_up_error: Option<String>,
    sign_in_error: Option<String>,
    registered: Mutex<Option<ProfileRegistration>>,
    pub sign_up_calls: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            rejection: None,
            sign_up_error: None,
            sign_in_error: None,
            registered: Mutex::new(None),
            sign_up_calls: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
        }
    }

    /// Registration is answered with `success: false` and this message.
    pub fn with_rejection(mut self, message: &str) -> Self {
        self.rejection = Some(message.to_string());
        self
    }

    pub fn failing_sign_in(mut self) -> Self {
        self.sign_in_error = Some("session unavailable".to_string());
        self
    }

    pub fn registered(&self) -> Option<ProfileRegistration> {
        self.registered.lock().unwrap().clone()
    }
}

impl SessionService for MockSession {
    async fn sign_up(
        &self,
        registration: &ProfileRegistration,
    ) -> Result<RegistrationOutcome, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.sign_up_error {
            return Err(AuthError::Session(message.clone()));
        }

        if let Some(message) = &self.rejection {
            return Ok(RegistrationOutcome {
                success: false,
                message: Some(message.clone()),
            });
        }

        *self.registered.lock().unwrap() = Some(registration.clone());

        Ok(RegistrationOutcome {
            success: true,
            message: None,
        })
    }

    async fn sign_in(
        &self,
        _email: &str,
        _id_token: &SecretString,
    ) -> Result<SessionArtifact, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.sign_in_error {
            return Err(AuthError::Session(message.clone()));
        }

        Ok(SessionArtifact::new(SecretString::from("session-1")))
    }

    async fn is_authenticated(&self, _artifact: &SessionArtifact) -> Result<bool, AuthError> {
        Ok(true)
    }

    async fn current_user(
        &self,
        _artifact: &SessionArtifact,
    ) -> Result<Option<Profile>, AuthError> {
        Ok(self.registered().map(|registration| Profile {
            uid: registration.uid,
            name: registration.name,
            email: registration.email,
        }))
    }
}
