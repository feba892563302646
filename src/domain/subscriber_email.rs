use std::fmt::Display;

use validator::validate_email;

/// An email address that passed the same checks as a required
/// `<input type="email">` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(s: String) -> Result<Self, String> {
        let s = s.trim().to_string();
        if s.is_empty() {
            Err("Please enter an email address.".to_string())
        } else if validate_email(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{s} is not a valid email address."))
        }
    }
}

impl Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
