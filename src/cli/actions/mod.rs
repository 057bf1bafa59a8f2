pub mod auth;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    SignUp {
        name: String,
        email: String,
        password: SecretString,
    },
    SignIn {
        email: String,
        password: SecretString,
    },
}
