use crate::{AuthError, Result as AuthErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;
use gsm_config::AuthConfig;
use log::warn;

/// Shared-secret check for mutating operations.
///
/// With no key configured every request is let through.
#[derive(Clone)]
pub struct ApiKeyGuard {
    expected: Option<String>,
}

impl ApiKeyGuard {
    pub fn new(expected: Option<String>) -> Self {
        Self { expected }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let guard = Self::new(config.api_key.clone());
        if !guard.is_enabled() {
            warn!("No API key configured: restart and update are open to anyone who can reach the API");
        }
        guard
    }

    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    #[track_caller]
    pub fn verify(&self, presented: Option<&str>) -> AuthErrorResult<()> {
        let Some(ref expected) = self.expected else {
            return Ok(());
        };

        let location = ErrorLocation::from(Location::caller());
        match presented {
            None | Some("") => Err(AuthError::MissingApiKey { location }),
            Some(key) if constant_time_eq(key.as_bytes(), expected.as_bytes()) => Ok(()),
            Some(_) => Err(AuthError::InvalidApiKey { location }),
        }
    }
}

impl std::fmt::Debug for ApiKeyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyGuard")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Comparison time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
