#![no_main]

use common::jwt::TokenVerifier;
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

const PUBLIC_KEY_PEM: &str = include_str!("../../../../fixtures/jwt/primary_public.pem");

fn verifier() -> &'static TokenVerifier {
    static VERIFIER: OnceLock<TokenVerifier> = OnceLock::new();
    VERIFIER.get_or_init(|| {
        TokenVerifier::from_public_key_pem(PUBLIC_KEY_PEM, "fintech-auth", "fintech-platform")
            .expect("fixture key should parse")
    })
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must be rejected without panicking; nothing here can
    // carry a valid RS256 signature from the fixture key.
    if let Ok(token) = std::str::from_utf8(data) {
        assert!(verifier().verify(token).is_err());
        assert!(verifier().verify_at(token, 0).is_err());
    }
});
