//! Verification gate: the state machine between credential submission and
//! session establishment.
//!
//! Each user action (`submit`, `resend`, `check_status`, `back`) runs to
//! completion before the next is accepted. Failures are caught, converted
//! to a user-visible [`Notice`], and the machine settles at the nearest
//! stable state (`Idle` or `AwaitingVerification`); it is never left in an
//! in-flight state. A session is only ever established for a user whose
//! email the provider reports as verified.

pub mod controller;
#[cfg(test)]
pub(crate) mod test_support;

use crate::errors::AuthError;
use crate::form::{AuthMode, Credentials};
use crate::provider::IdentityProvider;
use crate::session::{ProfileRegistration, SessionBridge, SessionService};
use secrecy::SecretString;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on any single provider or session call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-observable states of the verification flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Submitting,
    AwaitingVerification,
    CheckingVerification,
    Resending,
    /// Pass-through on a caught error; the machine settles at `Idle` or
    /// `AwaitingVerification` before the operation returns.
    Failed(String),
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    /// Normal negative result, e.g. "not verified yet".
    Info,
}

/// Transient toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn info(message: &str) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    ApplicationRoot,
    SignIn,
}

/// Result of one gate action: notices to surface and an optional redirect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    pub notices: Vec<Notice>,
    pub redirect: Option<Redirect>,
}

impl Outcome {
    #[must_use]
    pub fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            redirect: None,
        }
    }

    /// Empty outcome for an action that was not accepted (wrong state or
    /// duplicate invocation while busy).
    #[must_use]
    pub fn ignored() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.notices.is_empty() && self.redirect.is_none()
    }
}

/// Screen state while verification is pending. Owned by the gate, mutated
/// only by its transition methods, discarded on `back` and on session
/// establishment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationUiState {
    pub active: bool,
    pub email: String,
    pub resending: bool,
    pub checking: bool,
}

impl VerificationUiState {
    fn pending(email: String) -> Self {
        Self {
            active: true,
            email,
            resending: false,
            checking: false,
        }
    }
}

pub struct VerificationGate<P, S> {
    provider: P,
    bridge: SessionBridge<S>,
    state: GateState,
    ui: Option<VerificationUiState>,
    /// Password retained across the pending screen; resend and check
    /// re-authenticate with it. See DESIGN.md.
    pending_password: Option<SecretString>,
    call_timeout: Duration,
}

/// Bound a provider/session call so a hanging call cannot pin the machine
/// in an in-flight state.
async fn bounded<F, T>(limit: Duration, call: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AuthError::Timeout(limit))?
}

impl<P, S> VerificationGate<P, S>
where
    P: IdentityProvider,
    S: SessionService,
{
    #[must_use]
    pub fn new(provider: P, sessions: S) -> Self {
        Self {
            provider,
            bridge: SessionBridge::new(sessions),
            state: GateState::Idle,
            ui: None,
            pending_password: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &GateState {
        &self.state
    }

    #[must_use]
    pub const fn ui(&self) -> Option<&VerificationUiState> {
        self.ui.as_ref()
    }

    #[must_use]
    pub const fn bridge(&self) -> &SessionBridge<S> {
        &self.bridge
    }

    /// Hand the established session to the application shell.
    #[must_use]
    pub fn into_bridge(self) -> SessionBridge<S> {
        self.bridge
    }

    fn transition(&mut self, next: GateState) {
        debug!("gate: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Caught failure: pass through `Failed`, settle at `stable`, surface
    /// `message`.
    fn fail(&mut self, stable: GateState, err: &AuthError, message: &str) -> Outcome {
        warn!("{err}");
        self.transition(GateState::Failed(err.to_string()));
        self.transition(stable);
        Outcome::notice(Notice::error(message))
    }

    fn enter_pending(&mut self, email: String, password: SecretString) {
        self.ui = Some(VerificationUiState::pending(email));
        self.pending_password = Some(password);
        self.transition(GateState::AwaitingVerification);
    }

    fn clear_pending(&mut self) {
        self.ui = None;
        self.pending_password = None;
    }

    /// Submit validated credentials. Accepted only from `Idle`.
    pub async fn submit(&mut self, mode: AuthMode, credentials: Credentials) -> Outcome {
        if self.state != GateState::Idle {
            debug!("submit ignored in state {:?}", self.state);
            return Outcome::ignored();
        }

        match mode {
            AuthMode::SignUp => self.submit_sign_up(credentials).await,
            AuthMode::SignIn => self.submit_sign_in(credentials).await,
        }
    }

    async fn submit_sign_up(&mut self, credentials: Credentials) -> Outcome {
        let limit = self.call_timeout;

        self.transition(GateState::Submitting);

        let user = match bounded(
            limit,
            self.provider
                .create_account(&credentials.email, &credentials.password),
        )
        .await
        {
            Ok(user) => user,
            Err(err) => {
                let message = format!("There was an error: {err}");
                return self.fail(GateState::Idle, &err, &message);
            }
        };

        if let Err(err) = bounded(limit, self.provider.send_verification_email(&user)).await {
            let message = format!("There was an error: {err}");
            return self.fail(GateState::Idle, &err, &message);
        }

        let registration = ProfileRegistration {
            uid: user.uid.clone(),
            name: credentials.name.clone().unwrap_or_default(),
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        };

        match bounded(limit, self.bridge.service().sign_up(&registration)).await {
            Ok(outcome) if !outcome.success => {
                // The identity account already exists; the inconsistency is
                // surfaced and left for manual resolution, not rolled back.
                let reason = outcome
                    .message
                    .unwrap_or_else(|| "profile registration failed".to_string());
                let err = AuthError::ProfileRegistration(reason.clone());
                return self.fail(GateState::Idle, &err, &reason);
            }
            Ok(_) => {}
            Err(err) => {
                let message = format!("There was an error: {err}");
                return self.fail(GateState::Idle, &err, &message);
            }
        }

        self.enter_pending(credentials.email.clone(), credentials.password);

        Outcome::notice(Notice::success("Account created. Please verify your email."))
    }

    async fn submit_sign_in(&mut self, credentials: Credentials) -> Outcome {
        let limit = self.call_timeout;

        self.transition(GateState::Submitting);

        let user = match bounded(
            limit,
            self.provider
                .sign_in(&credentials.email, &credentials.password),
        )
        .await
        {
            Ok(user) => user,
            Err(err) => {
                let message = format!("There was an error: {err}");
                return self.fail(GateState::Idle, &err, &message);
            }
        };

        if !user.email_verified {
            // No session for an unverified user; park on the pending screen.
            self.enter_pending(credentials.email.clone(), credentials.password);
            return Outcome::notice(Notice::error(
                "Please verify your email before signing in.",
            ));
        }

        let token = match user.id_token() {
            Ok(token) => token,
            Err(err) => return self.fail(GateState::Idle, &err, "Sign in failed"),
        };

        if let Err(err) = bounded(limit, self.bridge.establish(&credentials.email, &token)).await {
            let message = format!("There was an error: {err}");
            return self.fail(GateState::Idle, &err, &message);
        }

        self.clear_pending();
        self.transition(GateState::Authenticated);

        Outcome {
            notices: vec![Notice::success("Signed in successfully.")],
            redirect: Some(Redirect::ApplicationRoot),
        }
    }

    /// Leave the pending screen: discard verification state, back to the
    /// sign-in form.
    pub fn back(&mut self) -> Outcome {
        if self.state != GateState::AwaitingVerification {
            debug!("back ignored in state {:?}", self.state);
            return Outcome::ignored();
        }

        self.clear_pending();
        self.transition(GateState::Idle);

        Outcome {
            notices: Vec::new(),
            redirect: Some(Redirect::SignIn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{creds, MockProvider, MockSession};
    use super::*;
    use std::sync::atomic::Ordering;

    fn gate(
        provider: MockProvider,
        sessions: MockSession,
    ) -> VerificationGate<MockProvider, MockSession> {
        VerificationGate::new(provider, sessions)
    }

    #[tokio::test]
    async fn test_sign_up_reaches_awaiting_verification() {
        // Scenario A: account created, verification mail sent, machine
        // parks on the pending screen with the submitted email.
        let mut gate = gate(MockProvider::new(), MockSession::new());

        let outcome = gate
            .submit(AuthMode::SignUp, creds("Ada", "a@x.com", "abc"))
            .await;

        assert_eq!(*gate.state(), GateState::AwaitingVerification);
        let ui = gate.ui().unwrap();
        assert!(ui.active);
        assert_eq!(ui.email, "a@x.com");
        assert!(!ui.resending);
        assert!(!ui.checking);
        assert_eq!(outcome.notices[0].kind, NoticeKind::Success);

        let provider = &gate.provider;
        assert_eq!(provider.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.send_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_up_registers_profile_with_password() {
        let mut gate = gate(MockProvider::new(), MockSession::new());

        gate.submit(AuthMode::SignUp, creds("Ada", "a@x.com", "abc"))
            .await;

        let registered = gate.bridge().service().registered();
        let registration = registered.expect("profile not registered");
        assert_eq!(registration.name, "Ada");
        assert_eq!(registration.email, "a@x.com");
        assert_eq!(registration.uid, "uid-1");
    }

    #[tokio::test]
    async fn test_rejected_registration_settles_at_idle() {
        // Successful identity creation + failed profile registration must
        // end at Idle with the service message, never AwaitingVerification.
        let sessions = MockSession::new().with_rejection("email already registered");
        let mut gate = gate(MockProvider::new(), sessions);

        let outcome = gate
            .submit(AuthMode::SignUp, creds("Ada", "a@x.com", "abc"))
            .await;

        assert_eq!(*gate.state(), GateState::Idle);
        assert!(gate.ui().is_none());
        assert_eq!(outcome.notices[0].kind, NoticeKind::Error);
        assert_eq!(outcome.notices[0].message, "email already registered");
    }

    #[tokio::test]
    async fn test_create_account_failure_settles_at_idle() {
        let provider = MockProvider::new().failing_create("EMAIL_EXISTS");
        let mut gate = gate(provider, MockSession::new());

        let outcome = gate
            .submit(AuthMode::SignUp, creds("Ada", "a@x.com", "abc"))
            .await;

        assert_eq!(*gate.state(), GateState::Idle);
        assert_eq!(outcome.notices[0].kind, NoticeKind::Error);
        assert!(outcome.notices[0].message.contains("EMAIL_EXISTS"));
        assert_eq!(
            gate.bridge().service().sign_up_calls.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_unverified_sign_in_never_creates_session() {
        // Scenario B: unverified sign-in parks on the pending screen; the
        // session service sees zero sign-in calls.
        let mut gate = gate(MockProvider::new(), MockSession::new());

        let outcome = gate
            .submit(AuthMode::SignIn, creds("", "a@x.com", "abc"))
            .await;

        assert_eq!(*gate.state(), GateState::AwaitingVerification);
        assert_eq!(gate.ui().unwrap().email, "a@x.com");
        assert_eq!(outcome.notices[0].kind, NoticeKind::Error);
        assert_eq!(
            outcome.notices[0].message,
            "Please verify your email before signing in."
        );
        assert_eq!(
            gate.bridge().service().sign_in_calls.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_verified_sign_in_authenticates_and_redirects() {
        let provider = MockProvider::new().verified();
        let mut gate = gate(provider, MockSession::new());

        let outcome = gate
            .submit(AuthMode::SignIn, creds("", "a@x.com", "abc"))
            .await;

        assert_eq!(*gate.state(), GateState::Authenticated);
        assert_eq!(outcome.redirect, Some(Redirect::ApplicationRoot));
        assert_eq!(
            gate.bridge().service().sign_in_calls.load(Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_token_failure_settles_at_idle() {
        let provider = MockProvider::new().verified().with_empty_token();
        let mut gate = gate(provider, MockSession::new());

        let outcome = gate
            .submit(AuthMode::SignIn, creds("", "a@x.com", "abc"))
            .await;

        assert_eq!(*gate.state(), GateState::Idle);
        assert_eq!(outcome.notices[0].message, "Sign in failed");
        assert_eq!(
            gate.bridge().service().sign_in_calls.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_session_sign_in_failure_settles_at_idle() {
        let provider = MockProvider::new().verified();
        let sessions = MockSession::new().failing_sign_in();
        let mut gate = gate(provider, sessions);

        let outcome = gate
            .submit(AuthMode::SignIn, creds("", "a@x.com", "abc"))
            .await;

        assert_eq!(*gate.state(), GateState::Idle);
        assert_eq!(outcome.notices[0].kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_submit_ignored_while_pending() {
        let mut gate = gate(MockProvider::new(), MockSession::new());

        gate.submit(AuthMode::SignUp, creds("Ada", "a@x.com", "abc"))
            .await;
        let outcome = gate
            .submit(AuthMode::SignUp, creds("Ada", "a@x.com", "abc"))
            .await;

        assert!(outcome.is_ignored());
        assert_eq!(gate.provider.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_back_discards_pending_state() {
        let mut gate = gate(MockProvider::new(), MockSession::new());

        gate.submit(AuthMode::SignUp, creds("Ada", "a@x.com", "abc"))
            .await;
        let outcome = gate.back();

        assert_eq!(*gate.state(), GateState::Idle);
        assert!(gate.ui().is_none());
        assert_eq!(outcome.redirect, Some(Redirect::SignIn));
    }

    #[tokio::test]
    async fn test_back_ignored_from_idle() {
        let mut gate = gate(MockProvider::new(), MockSession::new());
        assert!(gate.back().is_ignored());
    }

    #[tokio::test]
    async fn test_hanging_provider_call_times_out() {
        let provider = MockProvider::new().hanging();
        let mut gate = gate(provider, MockSession::new())
            .with_call_timeout(Duration::from_millis(10));

        let outcome = gate
            .submit(AuthMode::SignIn, creds("", "a@x.com", "abc"))
            .await;

        assert_eq!(*gate.state(), GateState::Idle);
        assert_eq!(outcome.notices[0].kind, NoticeKind::Error);
        assert!(outcome.notices[0].message.contains("timed out"));
    }
}
