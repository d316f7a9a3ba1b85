use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::status::StatusMessage;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub token: String,
}

/// Username/password pair after whitespace normalization.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn normalized(raw_username: &str, raw_password: &str) -> Self {
        Self {
            username: raw_username.trim().to_string(),
            password: raw_password.trim().to_string(),
        }
    }

    /// Length in user-perceived characters (extended grapheme clusters).
    pub fn username_len(&self) -> usize {
        self.username.graphemes(true).count()
    }

    pub fn password_len(&self) -> usize {
        self.password.graphemes(true).count()
    }

    pub fn is_valid(&self) -> bool {
        self.username_len() >= MIN_USERNAME_LEN && self.password_len() >= MIN_PASSWORD_LEN
    }

    /// Status shown while no login attempt is running.
    pub fn idle_status(&self) -> StatusMessage {
        if self.username.is_empty() || self.password.is_empty() {
            StatusMessage::EnterCredentials
        } else if self.username_len() < MIN_USERNAME_LEN {
            StatusMessage::UsernameTooShort
        } else if self.password_len() < MIN_PASSWORD_LEN {
            StatusMessage::PasswordTooShort
        } else {
            StatusMessage::ReadyToLogin
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password_len", &self.password_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_spaces_tabs_and_newlines() {
        let creds = Credentials::normalized("  dayal\t", "\n1234  ");
        assert_eq!(creds.username, "dayal");
        assert_eq!(creds.password, "1234");
    }

    #[test]
    fn distinct_raw_inputs_collapse_to_equal_pairs() {
        assert_eq!(
            Credentials::normalized("bob", "secret"),
            Credentials::normalized(" bob ", "secret\n")
        );
    }

    #[test]
    fn validity_uses_trimmed_lengths() {
        assert!(Credentials::normalized("bob", "abcd").is_valid());
        assert!(!Credentials::normalized(" bo ", "abcd").is_valid());
        assert!(!Credentials::normalized("bob", " abc ").is_valid());
        assert!(!Credentials::default().is_valid());
    }

    #[test]
    fn lengths_count_graphemes_not_bytes() {
        let creds = Credentials::normalized("ñañ", "日本語字");
        assert_eq!(creds.username_len(), 3);
        assert_eq!(creds.password_len(), 4);
        assert!(creds.is_valid());
    }

    #[test]
    fn combining_marks_count_as_one_character() {
        // "éé" spelled with combining acute accents: four scalars, two graphemes.
        let creds = Credentials::normalized("e\u{301}e\u{301}", "1234");
        assert_eq!(creds.username_len(), 2);
        assert!(!creds.is_valid());
        assert_eq!(creds.idle_status(), StatusMessage::UsernameTooShort);

        let creds = Credentials::normalized("bob", "a\u{301}b\u{301}c\u{301}");
        assert_eq!(creds.password_len(), 3);
        assert_eq!(creds.idle_status(), StatusMessage::PasswordTooShort);
    }

    #[test]
    fn idle_status_follows_priority_order() {
        assert_eq!(
            Credentials::normalized("", "").idle_status(),
            StatusMessage::EnterCredentials
        );
        // An empty field wins over a short one.
        assert_eq!(
            Credentials::normalized("ab", "  ").idle_status(),
            StatusMessage::EnterCredentials
        );
        assert_eq!(
            Credentials::normalized("ab", "xx").idle_status(),
            StatusMessage::UsernameTooShort
        );
        assert_eq!(
            Credentials::normalized("bob", "xx").idle_status(),
            StatusMessage::PasswordTooShort
        );
        assert_eq!(
            Credentials::normalized("bob", "xxxx").idle_status(),
            StatusMessage::ReadyToLogin
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", Credentials::normalized("dayal", "1234"));
        assert!(rendered.contains("dayal"));
        assert!(!rendered.contains("1234"));
    }

    #[test]
    fn user_round_trips_through_json() {
        let user = User {
            id: UserId::new(),
            name: "Dayal".into(),
            token: "token_abc_123".into(),
        };
        let encoded = serde_json::to_string(&user).expect("encode");
        let decoded: User = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, user);
    }
}
