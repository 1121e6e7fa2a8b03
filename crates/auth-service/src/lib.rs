//! Auth service library
//!
//! Issues RS256 access tokens, rotates opaque refresh tokens and verifies
//! bearer credentials.
//!
//! # Modules
//!
//! - `config` - Environment configuration
//! - `crypto` - Key material, signing, refresh token and password hashing
//! - `errors` - Error type and HTTP mapping
//! - `handlers` - HTTP request handlers
//! - `models` - Records and wire types
//! - `repositories` - Store traits with Postgres and in-memory backends
//! - `services` - Issuance, refresh rotation, roles and user accounts
//! - `tasks` - Background store health polling

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod tasks;
