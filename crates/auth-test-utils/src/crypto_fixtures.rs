//! Fixed key fixtures for testing
//!
//! Every key is read from `fixtures/jwt` at compile time so tests across
//! crates sign and verify with identical material.

/// RSA 2048 private key (PKCS#8) that the test services trust.
pub const PRIMARY_PRIVATE_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/jwt/primary_private.pem"
));

/// Same key as [`PRIMARY_PRIVATE_KEY_PEM`] in PKCS#1 encoding.
pub const PRIMARY_PRIVATE_KEY_PKCS1_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/jwt/primary_private_pkcs1.pem"
));

/// PKIX public half of the primary key.
pub const PRIMARY_PUBLIC_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/jwt/primary_public.pem"
));

/// An unrelated RSA key. Tokens signed with it must be rejected.
pub const ROGUE_PRIVATE_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/jwt/rogue_private.pem"
));

pub const ROGUE_PUBLIC_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/jwt/rogue_public.pem"
));

/// P-256 key pair for algorithm substitution tests.
pub const EC_PRIVATE_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/jwt/ec_private.pem"
));

pub const EC_PUBLIC_KEY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../fixtures/jwt/ec_public.pem"
));
