use crate::gate::DEFAULT_CALL_TIMEOUT;
use secrecy::SecretString;
use std::time::Duration;

/// Settings shared by every action: where the two services live, the
/// provider API key, and the per-call timeout.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub provider_url: String,
    pub session_url: String,
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(provider_url: String, session_url: String) -> Self {
        Self {
            provider_url,
            session_url,
            api_key: SecretString::default(),
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn set_api_key(&mut self, api_key: SecretString) {
        self.api_key = api_key;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}
