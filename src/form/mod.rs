//! Credential form: collects raw name/email/password and validates shape
//! before anything touches the network. Validation failures stay local and
//! field-scoped; only a successful [`CredentialForm::validate`] produces
//! [`Credentials`] for the verification gate.

use regex::Regex;
use secrecy::SecretString;

/// Minimum length for the display name at registration.
const MIN_NAME_LEN: usize = 3;

/// Minimum password length accepted by the form.
///
/// Deliberately weak: this mirrors the provider-side policy and is tracked
/// as an open question rather than tightened here.
const MIN_PASSWORD_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// Validated credential set handed to the gate. Ephemeral: lives only for
/// the duration of one submit.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Present only for registration.
    pub name: Option<String>,
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Raw form state for one rendering of the sign-in/sign-up card.
#[derive(Debug, Clone)]
pub struct CredentialForm {
    mode: AuthMode,
    name: String,
    email: String,
    password: String,
}

impl CredentialForm {
    #[must_use]
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            name: String::new(),
            email: String::new(),
            password: String::new(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = email.trim().to_string();
    }

    pub fn set_password(&mut self, password: &str) {
        self.password = password.to_string();
    }

    /// Password last entered in the form.
    ///
    /// The pending-verification screen re-authenticates with this value for
    /// resend/check, so the form must outlive submission while verification
    /// is pending.
    #[must_use]
    pub fn password_value(&self) -> SecretString {
        SecretString::from(self.password.clone())
    }

    /// Validate the current input against the mode's schema.
    ///
    /// Returns every failing field at once so the UI can render all errors
    /// in one pass. On failure no credentials leave the form.
    pub fn validate(&self) -> Result<Credentials, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.mode == AuthMode::SignUp && self.name.chars().count() < MIN_NAME_LEN {
            errors.push(FieldError::new(
                Field::Name,
                "Name must be at least 3 characters",
            ));
        }

        if !valid_email(&self.email) {
            errors.push(FieldError::new(Field::Email, "Invalid email address"));
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                Field::Password,
                "Password must be at least 3 characters",
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Credentials {
            name: match self.mode {
                AuthMode::SignUp => Some(self.name.clone()),
                AuthMode::SignIn => None,
            },
            email: self.email.clone(),
            password: SecretString::from(self.password.clone()),
        })
    }
}
