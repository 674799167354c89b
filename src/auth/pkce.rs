use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

/// Verifies a PKCE `code_verifier` against the `code_challenge` stored at
/// authorization time. Only the `S256` method is supported; `plain` is
/// rejected outright since OAuth 2.1 drops it.
pub fn verify(code_verifier: &str, code_challenge: &str, method: &str) -> bool {
    if method != "S256" {
        return false;
    }
    let digest = Sha256::digest(code_verifier.as_bytes());
    let computed = URL_SAFE_NO_PAD.encode(digest);
    computed == code_challenge
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_verifier_and_challenge_pass() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(digest);
        assert!(verify(verifier, &challenge, "S256"));
    }

    #[test]
    fn mismatched_verifier_fails() {
        let verifier = "correct-verifier";
        let digest = Sha256::digest(b"different-verifier");
        let challenge = URL_SAFE_NO_PAD.encode(digest);
        assert!(!verify(verifier, &challenge, "S256"));
    }

    #[test]
    fn plain_method_is_always_rejected() {
        assert!(!verify("anything", "anything", "plain"));
    }
}
