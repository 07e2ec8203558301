//! Credential evaluation seam.
//!
//! The real user store lives outside this service; the handlers only need
//! something they can hand a username/password pair to once the Turnstile
//! challenge has passed.

/// A matched user as reported by the checker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub token: String,
    pub username: String,
    pub role: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterDecision {
    Accepted,
    Rejected,
}

pub trait CredentialChecker: Send + Sync {
    /// Returns the authenticated user on a match, `None` on a mismatch.
    fn check(&self, username: &str, password: &str) -> Option<AuthenticatedUser>;

    /// Hook for future user stores; the in-memory checker always accepts.
    fn register(&self, username: &str, password: &str) -> RegisterDecision;
}

/// In-memory checker holding a single fixed credential pair.
#[derive(Clone, Debug)]
pub struct StaticCredentialChecker {
    username: String,
    password: String,
    token: String,
    role: String,
}

impl StaticCredentialChecker {
    #[must_use]
    pub fn new(username: &str, password: &str, token: &str, role: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            token: token.to_string(),
            role: role.to_string(),
        }
    }
}

impl Default for StaticCredentialChecker {
    fn default() -> Self {
        Self::new("test", "password", "sample-token-123", "user")
    }
}

impl CredentialChecker for StaticCredentialChecker {
    fn check(&self, username: &str, password: &str) -> Option<AuthenticatedUser> {
        if username == self.username && password == self.password {
            Some(AuthenticatedUser {
                token: self.token.clone(),
                username: username.to_string(),
                role: self.role.clone(),
            })
        } else {
            None
        }
    }

    fn register(&self, _username: &str, _password: &str) -> RegisterDecision {
        RegisterDecision::Accepted
    }
}
