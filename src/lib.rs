//! # PrepWise Auth
//!
//! Client-side authentication and email-verification flow for the PrepWise
//! interview platform. The crate drives the account lifecycle between two
//! external collaborators:
//!
//! - an **Identity Provider** that owns credentials and the
//!   `email_verified` flag on the user record;
//! - a **Session Service** that turns a provider-issued identity token into
//!   a server-held session artifact.
//!
//! The core is the [`gate::VerificationGate`] state machine:
//!
//! ```text
//! Idle -> Submitting -> AwaitingVerification -> CheckingVerification
//!                                            -> Authenticated
//! ```
//!
//! A session artifact is only ever created for a user whose email the
//! provider reports as verified. Everything else (credential validation,
//! HTTP clients, the session bridge, the resend/check controller) exists to
//! feed or consume that machine.

pub mod cli;
pub mod errors;
pub mod form;
pub mod gate;
pub mod provider;
pub mod session;

/// User-Agent sent on every outbound request.
pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
