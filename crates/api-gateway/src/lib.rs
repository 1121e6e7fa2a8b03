//! API gateway library
//!
//! Reference resource server: verifies bearer access tokens with the issuer's
//! public key only and never talks to the auth service.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
