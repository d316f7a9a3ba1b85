use thiserror::Error;

/// Failure reported by an authentication gateway for a single login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("Network error. Please try again.")]
    Network,
}

impl AuthError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
