//! Common utilities and types shared across the platform's services.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for access token verification (claims, verifier, bearer extraction)
pub mod jwt;
