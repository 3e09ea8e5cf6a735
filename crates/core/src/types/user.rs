//! Logged-in user profile.

use serde::{Deserialize, Serialize};

use super::Email;

/// The profile the backend returns with a login token.
///
/// Persisted next to the token so a restart keeps the user signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: Email,
}

impl UserProfile {
    /// First word of the display name, used in the navigation greeting.
    ///
    /// Falls back to the email's local part when the name is blank.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_else(|| {
            self.email
                .as_str()
                .split_once('@')
                .map_or(self.email.as_str(), |(local, _)| local)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        let user = UserProfile {
            name: "Ana Maria Rojas".to_string(),
            email: Email::parse("a@x.cl").unwrap(),
        };
        assert_eq!(user.first_name(), "Ana");
    }

    #[test]
    fn test_first_name_falls_back_to_email() {
        let user = UserProfile {
            name: "  ".to_string(),
            email: Email::parse("ana@x.cl").unwrap(),
        };
        assert_eq!(user.first_name(), "ana");
    }

    #[test]
    fn test_profile_json_shape() {
        let user: UserProfile = serde_json::from_str(r#"{"name":"Ana","email":"a@x.cl"}"#).unwrap();
        assert_eq!(user.email.as_str(), "a@x.cl");
    }
}
