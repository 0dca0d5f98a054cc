//! Login digest of a PBX connecting to the app service
//!
//! The PBX proves knowledge of the shared app password by sending
//! `hex(sha256(app:domain:sip:guid:dn:info:challenge:password))`, where
//! `challenge` is the value this service handed out on the same connection.

use sha2::{Digest, Sha256};

/// Fields of an `AppLogin` that enter the digest
#[derive(Debug, Clone, Copy)]
pub struct LoginParams<'a> {
    pub app: &'a str,
    pub domain: &'a str,
    pub sip: &'a str,
    pub guid: &'a str,
    pub dn: &'a str,
    pub info: &'a str,
    pub challenge: &'a str,
}

/// Generate a fresh login challenge
pub fn generate_challenge() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Compute the expected digest for a login
pub fn compute_login_digest(params: &LoginParams<'_>, password: &str) -> String {
    let input = [
        params.app,
        params.domain,
        params.sip,
        params.guid,
        params.dn,
        params.info,
        params.challenge,
        password,
    ]
    .join(":");

    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Verify a digest sent by the PBX
///
/// Comparison is case-insensitive on the hex digits and does not short-circuit.
pub fn verify_login_digest(params: &LoginParams<'_>, password: &str, digest: &str) -> bool {
    let expected = compute_login_digest(params, password);
    let received = digest.to_ascii_lowercase();

    if expected.len() != received.len() {
        return false;
    }

    expected
        .bytes()
        .zip(received.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
