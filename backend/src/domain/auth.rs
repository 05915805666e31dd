//! Account request values handed from inbound adapters to the account port.
//!
//! Passwords are held in [`Zeroizing`] buffers so plaintext is wiped when the
//! request is dropped. Every accessor returns the trimmed value; the raw
//! caller input is never consulted after construction.

use zeroize::Zeroizing;

/// Registration input.
///
/// # Examples
/// ```
/// use accounts::domain::RegisterRequest;
///
/// let request = RegisterRequest::new(" ada ", "ada@example.com", " secret-pass ");
/// assert_eq!(request.username(), "ada");
/// assert_eq!(request.password(), "secret-pass");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: Zeroizing<String>,
}

impl RegisterRequest {
    /// Build a request from raw inputs.
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_owned(),
            email: email.trim().to_owned(),
            password: Zeroizing::new(password.trim().to_owned()),
        }
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Trimmed email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Trimmed password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Login input: a username or email plus a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    username_or_email: String,
    password: Zeroizing<String>,
}

impl LoginRequest {
    /// Build a request from raw inputs.
    pub fn new(username_or_email: &str, password: &str) -> Self {
        Self {
            username_or_email: username_or_email.trim().to_owned(),
            password: Zeroizing::new(password.trim().to_owned()),
        }
    }

    /// Trimmed credential.
    pub fn username_or_email(&self) -> &str {
        self.username_or_email.as_str()
    }

    /// Trimmed password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Forgotten-password input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgotPasswordRequest {
    email: String,
}

impl ForgotPasswordRequest {
    /// Build a request from the raw email.
    pub fn new(email: &str) -> Self {
        Self {
            email: email.trim().to_owned(),
        }
    }

    /// Trimmed email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}

/// Password reset input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPasswordRequest {
    new_password: Zeroizing<String>,
    new_password_confirm: Zeroizing<String>,
    token: String,
}

impl ResetPasswordRequest {
    /// Build a request from raw inputs.
    pub fn new(new_password: &str, new_password_confirm: &str, token: &str) -> Self {
        Self {
            new_password: Zeroizing::new(new_password.trim().to_owned()),
            new_password_confirm: Zeroizing::new(new_password_confirm.trim().to_owned()),
            token: token.trim().to_owned(),
        }
    }

    /// Trimmed new password.
    pub fn new_password(&self) -> &str {
        self.new_password.as_str()
    }

    /// Trimmed confirmation.
    pub fn new_password_confirm(&self) -> &str {
        self.new_password_confirm.as_str()
    }

    /// Trimmed reset token.
    pub fn token(&self) -> &str {
        self.token.as_str()
    }
}
