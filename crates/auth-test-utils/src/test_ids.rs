//! Fixed test identities for deterministic tests

// Token parameters the test services are configured with
pub const TEST_ISSUER: &str = "fintech-auth";
pub const TEST_AUDIENCE: &str = "fintech-platform";

// Principals for direct issuance
pub const TEST_PRINCIPAL_1: &str = "u1";
pub const TEST_PRINCIPAL_2: &str = "u2";

// Accounts for HTTP flows
pub const TEST_EMAIL_ALICE: &str = "alice@example.com";
pub const TEST_EMAIL_BOB: &str = "bob@example.com";
pub const TEST_EMAIL_CAROL: &str = "carol@example.com";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

// Roles
pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";
