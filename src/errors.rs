use std::time::Duration;
use thiserror::Error;

/// Failures observable while driving the verification flow.
///
/// Each variant maps to one recovery path in the gate: the in-flight
/// operation is abandoned, the reason becomes a user-visible notice, and the
/// machine settles at the nearest stable state. Nothing here is fatal to the
/// process.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity provider error: {0}")]
    Provider(String),
    #[error("profile registration rejected: {0}")]
    ProfileRegistration(String),
    #[error("token retrieval failed: {0}")]
    Token(String),
    #[error("session service error: {0}")]
    Session(String),
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}
