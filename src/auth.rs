use std::fmt;
use thiserror::Error;

/// Header carrying the operator credential on moderation calls.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("operator key rejected")]
pub struct AccessDenied;

/// Credential attached to every moderation call once an operator is signed in.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(<redacted>)")
    }
}

/// Verifies operator identity before moderation actions are exposed.
pub trait OperatorVerifier: Send + Sync {
    fn verify(&self, presented: &str) -> Result<SessionCredential, AccessDenied>;
}

/// Accepts a single configured shared key.
///
/// No rotation, lockout or rate limiting. Swap in a real credential issuer
/// behind [`OperatorVerifier`] for anything beyond a trusted network.
pub struct StaticKeyVerifier {
    key: String,
}

impl StaticKeyVerifier {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl OperatorVerifier for StaticKeyVerifier {
    fn verify(&self, presented: &str) -> Result<SessionCredential, AccessDenied> {
        if self.key.is_empty() || !constant_time_eq(self.key.as_bytes(), presented.as_bytes()) {
            return Err(AccessDenied);
        }
        Ok(SessionCredential::new(presented))
    }
}

/// Accepts any non-empty key and leaves the real check to the processing
/// service, which validates the header on every call.
pub struct DeferredVerifier;

impl OperatorVerifier for DeferredVerifier {
    fn verify(&self, presented: &str) -> Result<SessionCredential, AccessDenied> {
        if presented.trim().is_empty() {
            return Err(AccessDenied);
        }
        Ok(SessionCredential::new(presented))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
