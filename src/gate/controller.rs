//! Resend/poll actions on the pending-verification screen. Each action is
//! guarded by its own busy flag so repeated clicks are idempotent: a
//! duplicate invocation while the flag is set performs zero provider calls.
//! The flags are per action-kind; resend and check do not block each other.

use super::{bounded, GateState, Notice, Outcome, Redirect, VerificationGate};
use crate::errors::AuthError;
use crate::provider::IdentityProvider;
use crate::session::SessionService;
use secrecy::SecretString;
use tracing::debug;

impl<P, S> VerificationGate<P, S>
where
    P: IdentityProvider,
    S: SessionService,
{
    /// Email and retained password for the pending screen, or `None` when
    /// no verification is pending.
    fn pending_credentials(&self) -> Option<(String, SecretString)> {
        let ui = self.ui.as_ref()?;
        let password = self.pending_password.clone()?;

        Some((ui.email.clone(), password))
    }

    /// Re-trigger the verification email.
    ///
    /// Re-authenticates with the stored email and retained password, then
    /// requests another email. Always settles back at
    /// `AwaitingVerification`, surfacing the result as a notice.
    pub async fn resend(&mut self) -> Outcome {
        if self.state != GateState::AwaitingVerification {
            debug!("resend ignored in state {:?}", self.state);
            return Outcome::ignored();
        }

        match self.ui.as_mut() {
            Some(ui) if ui.resending => {
                debug!("resend already in flight, ignoring");
                return Outcome::ignored();
            }
            Some(ui) => ui.resending = true,
            None => return Outcome::ignored(),
        }

        let Some((email, password)) = self.pending_credentials() else {
            if let Some(ui) = self.ui.as_mut() {
                ui.resending = false;
            }
            return Outcome::ignored();
        };

        let limit = self.call_timeout;

        self.transition(GateState::Resending);

        let result = match bounded(limit, self.provider.sign_in(&email, &password)).await {
            Ok(user) => bounded(limit, self.provider.send_verification_email(&user)).await,
            Err(err) => Err(err),
        };

        let outcome = match result {
            Ok(()) => {
                self.transition(GateState::AwaitingVerification);
                Outcome::notice(Notice::success(
                    "Verification email resent. Please check your inbox.",
                ))
            }
            Err(err) => self.fail(
                GateState::AwaitingVerification,
                &err,
                "Failed to resend verification email. Please try again.",
            ),
        };

        if let Some(ui) = self.ui.as_mut() {
            ui.resending = false;
        }

        outcome
    }

    /// Re-check the provider-side verification status.
    ///
    /// Re-authenticates and force-reloads the user record; the provider's
    /// cached `email_verified` is stale until reloaded. Verified: fresh
    /// token, session sign-in, `Authenticated`, redirect. Still unverified:
    /// informational notice, back to `AwaitingVerification`.
    pub async fn check_status(&mut self) -> Outcome {
        if self.state != GateState::AwaitingVerification {
            debug!("check ignored in state {:?}", self.state);
            return Outcome::ignored();
        }

        match self.ui.as_mut() {
            Some(ui) if ui.checking => {
                debug!("check already in flight, ignoring");
                return Outcome::ignored();
            }
            Some(ui) => ui.checking = true,
            None => return Outcome::ignored(),
        }

        let Some((email, password)) = self.pending_credentials() else {
            if let Some(ui) = self.ui.as_mut() {
                ui.checking = false;
            }
            return Outcome::ignored();
        };

        let limit = self.call_timeout;

        self.transition(GateState::CheckingVerification);

        let mut user = match bounded(limit, self.provider.sign_in(&email, &password)).await {
            Ok(user) => user,
            Err(err) => return self.finish_check_failed(&err),
        };

        if let Err(err) = bounded(limit, self.provider.reload(&mut user)).await {
            return self.finish_check_failed(&err);
        }

        if !user.email_verified {
            // Normal negative result, not an error.
            self.transition(GateState::AwaitingVerification);
            if let Some(ui) = self.ui.as_mut() {
                ui.checking = false;
            }
            return Outcome::notice(Notice::info(
                "Your email is not verified yet. Please check your inbox.",
            ));
        }

        let token = match user.id_token() {
            Ok(token) => token,
            Err(err) => return self.finish_check_failed(&err),
        };

        if let Err(err) = bounded(limit, self.bridge.establish(&email, &token)).await {
            return self.finish_check_failed(&err);
        }

        self.clear_pending();
        self.transition(GateState::Authenticated);

        Outcome {
            notices: vec![Notice::success("Email verified successfully. Signing in...")],
            redirect: Some(Redirect::ApplicationRoot),
        }
    }

    fn finish_check_failed(&mut self, err: &AuthError) -> Outcome {
        let outcome = self.fail(
            GateState::AwaitingVerification,
            err,
            "Failed to check verification status. Please try again.",
        );

        if let Some(ui) = self.ui.as_mut() {
            ui.checking = false;
        }

        outcome
    }
}
