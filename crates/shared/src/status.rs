use std::fmt;

use crate::error::AuthError;

/// Every status line the login screen can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    EnterCredentials,
    UsernameTooShort,
    PasswordTooShort,
    ReadyToLogin,
    LoggingIn,
    Welcome(String),
    Failed(AuthError),
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnterCredentials => f.write_str("Enter credentials"),
            Self::UsernameTooShort => f.write_str("Username too short"),
            Self::PasswordTooShort => f.write_str("Password too short"),
            Self::ReadyToLogin => f.write_str("Ready to login"),
            Self::LoggingIn => f.write_str("Logging in…"),
            Self::Welcome(name) => write!(f, "Welcome, {name} ✅"),
            Self::Failed(err) => write!(f, "{err}"),
        }
    }
}
