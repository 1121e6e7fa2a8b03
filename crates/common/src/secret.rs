//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports [`secrecy`] so every service wraps passwords, refresh tokens and
//! private key PEMs the same way. `SecretString` implements `Debug` with
//! redaction, so a struct deriving `Debug` that holds one is safe to hand to
//! `tracing`. Values are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     email: String,
//!     password: SecretString,
//! }
//!
//! let req = LoginRequest {
//!     email: "alice@example.com".to_string(),
//!     password: SecretString::from("hunter22"),
//! };
//!
//! // Debug output redacts the password
//! assert!(!format!("{req:?}").contains("hunter22"));
//!
//! // Reading the value is always explicit
//! let password: &str = req.password.expose_secret();
//! assert_eq!(password, "hunter22");
//! ```
//!
//! # What to wrap
//!
//! - User passwords (request bodies)
//! - Opaque refresh tokens (request bodies and issuance results)
//! - RSA private key PEM text loaded at startup

pub use secrecy::{ExposeSecret, SecretString};
