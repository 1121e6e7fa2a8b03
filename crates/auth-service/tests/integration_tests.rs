//! Integration tests for the auth service
//!
//! This is the top-level integration test harness that Cargo discovers.
//! Test modules are organized in the integration/ subdirectory. Every test
//! drives the real router through `TestAuthServer` over in-memory stores.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

#[path = "integration/health_tests.rs"]
mod health_tests;

#[path = "integration/user_auth_tests.rs"]
mod user_auth_tests;

#[path = "integration/refresh_tests.rs"]
mod refresh_tests;

#[path = "integration/logout_tests.rs"]
mod logout_tests;

#[path = "integration/me_tests.rs"]
mod me_tests;
