//! Credential value types and password digest helpers.
//!
//! Credential *verification* sits behind the [`crate::domain::ports::LoginService`]
//! port; this module only defines the shapes and the digest scheme shared by
//! the registration service and the persistence-backed login adapter.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::user::{Email, UserValidationError};

/// Validation errors for login credential shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    InvalidEmail,
    EmptyPassword,
    PasswordTooShort { min: usize },
}

impl std::fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Minimum accepted password length at registration time.
pub const PASSWORD_MIN: usize = 8;

/// Validated login credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: String,
}

impl LoginCredentials {
    /// Validate and construct credentials from raw request input.
    ///
    /// Login only requires a non-empty password; the length floor applies
    /// at registration so existing accounts never get locked out by a
    /// policy change.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(|_: UserValidationError| {
            CredentialsValidationError::InvalidEmail
        })?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: password.to_owned(),
        })
    }

    /// Login email address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Raw password as submitted.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Salted password digest stored beside the user record.
///
/// Hex-encoded SHA-256 over `salt || password` with a random 16-byte salt.
/// Swapping in a memory-hard KDF is a deployment decision that only touches
/// this module and the login adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt_hex: String,
    digest_hex: String,
}

impl PasswordDigest {
    /// Digest a new password with a freshly generated salt.
    pub fn create(password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest_hex = digest_hex(&salt, password);
        Self {
            salt_hex: hex::encode(salt),
            digest_hex,
        }
    }

    /// Rebuild from persisted hex fields.
    pub fn from_stored(salt_hex: impl Into<String>, digest_hex: impl Into<String>) -> Self {
        Self {
            salt_hex: salt_hex.into(),
            digest_hex: digest_hex.into(),
        }
    }

    /// Constant-time-ish verification of a submitted password.
    ///
    /// Digest comparison is over fixed-length hex strings, so the byte-wise
    /// fold does not leak length information.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(salt) = hex::decode(&self.salt_hex) else {
            return false;
        };
        let candidate = digest_hex(&salt, password);
        if candidate.len() != self.digest_hex.len() {
            return false;
        }
        candidate
            .bytes()
            .zip(self.digest_hex.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Persisted salt as hex.
    pub fn salt_hex(&self) -> &str {
        self.salt_hex.as_str()
    }

    /// Persisted digest as hex.
    pub fn digest_hex(&self) -> &str {
        self.digest_hex.as_str()
    }
}

fn digest_hex(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
