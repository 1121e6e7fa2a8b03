//! # Auth Test Utilities
//!
//! Shared test utilities for the auth service and its verifiers.
//!
//! This crate provides:
//! - Fixed RSA/EC key fixtures (PEM files under `fixtures/jwt`)
//! - Token builders for valid and hostile access tokens
//! - Server test harness (`TestAuthServer` over in-memory stores)
//! - Fixed test identities
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestAuthServer::spawn().await?;
//!     let tokens = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
//!
//!     tokens
//!         .access_token
//!         .assert_valid_jwt()
//!         .assert_has_role("user");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
