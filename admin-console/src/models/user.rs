use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Account as reported by the auth server's `me` endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Admin flag gating the `/admin` routes.
    pub is_superuser: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.is_superuser
    }
}

/// Access/refresh token pair issued by the auth server.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(Serialize, Validate, Clone)]
pub struct LoginCredentials {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize, Validate, Clone)]
pub struct RegisterData {
    #[validate(
        length(min = 3, max = 20, message = "Username must be 3 to 20 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
}

impl RegisterData {
    /// Credentials used for the automatic login after registration.
    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for RegisterData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterData")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
    if username.chars().all(allowed) {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_charset");
        err.message = Some("Username may only contain letters, digits, '_' and '-'".into());
        Err(err)
    }
}

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_lower && has_upper && has_digit {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message =
            Some("Password must contain an uppercase letter, a lowercase letter and a digit".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterData {
        RegisterData {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(register("alice", "alice@example.com", "Secret123").validate().is_ok());
    }

    #[test]
    fn test_registration_rejects_bad_fields() {
        let errors = register("a!", "not-an-email", "weak")
            .validate()
            .unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_password_needs_mixed_case_and_digit() {
        let errors = register("alice", "alice@example.com", "alllowercase1")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_empty_login_is_rejected() {
        let creds = LoginCredentials {
            username: String::new(),
            password: String::new(),
        };
        let errors = creds.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let pair = TokenPair::new("access", "refresh");
        let rendered = format!("{:?}", pair);
        assert!(!rendered.contains("\"access\""));
        assert!(rendered.contains("[REDACTED]"));

        let creds = register("alice", "alice@example.com", "Secret123").credentials();
        assert!(!format!("{:?}", creds).contains("Secret123"));
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(pair.token_type, "bearer");
    }
}
