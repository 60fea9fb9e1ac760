//! Test-case parameter encoding for the error-injection test identity
//! provider.
//!
//! The cooperating test provider accepts a `tParams` query parameter on the
//! authorization request: a base64url token wrapping a textual descriptor of
//! the failure it should simulate (invalid nonce, invalid signature, JWE
//! tampering, ...). The descriptor texts are fixed and the provider matches
//! them literally, so they are preserved here byte for byte.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

/// Query parameter name the test provider looks for on the authorization
/// request.
pub const TPARAMS_QUERY_KEY: &str = "tParams";

/// Runtime test cases selectable via `GET /{id}`.
const TEST_CASES: [(&str, &str); 8] = [
    ("1", "{ 'id_token_invalid_nonce': true }"),
    ("2", "{ 'id_token_invalid_signature': true }"),
    ("3", "{ 'auth_response_invalid_state': true }"),
    ("4", "{ 'auth_response_access_denied': true }"),
    ("5", "{ 'token_response_missing_access_token': true }"),
    ("6", "{ 'token_response_expired_access_token': true }"),
    ("7", "{ 'JWE_alg': 'RSA1_5', 'JWE_alg_key_kid': 'rsa_key', 'JWE_enc': 'A128CBC-HS256', 'id_token_JWE_invalid_authTag': true }"),
    ("8", "{ 'JWE_alg': 'RSA1_5', 'JWE_alg_key_kid': 'rsa_key', 'JWE_enc': 'A128CBC-HS256' }"),
];

/// The full scenario catalogue used by the offline `generate-tparams` tool,
/// keyed by the short name the test harness configuration uses.
pub const NAMED_SCENARIOS: [(&str, &str); 28] = [
    ("alg", "id_token_alg_none"),
    ("iss1", "id_token_missing_iss"),
    ("iss2", "id_token_invalid_iss"),
    ("aud1", "id_token_missing_aud"),
    ("aud2", "id_token_invalid_aud"),
    ("exp1", "id_token_missing_exp"),
    ("exp2", "id_token_expired"),
    ("iat", "id_token_missing_iat"),
    ("nonce1", "id_token_missing_nonce"),
    ("nonce2", "id_token_invalid_nonce"),
    ("azp1", "id_token_multiple_aud_no_azp"),
    ("azp2", "id_token_multiple_aud_invalid_azp"),
    ("nbf", "id_token_future_nbf"),
    ("sig1", "id_token_missing_signature"),
    ("sig2", "id_token_invalid_signature"),
    ("at_hash1", "id_token_missing_at_hash"),
    ("at_hash2", "id_token_invalid_at_hash"),
    ("c_hash1", "id_token_missing_c_hash"),
    ("c_hash2", "id_token_invalid_c_hash"),
    ("state1", "auth_response_missing_state"),
    ("state2", "auth_response_invalid_state"),
    ("code1", "auth_response_missing_code"),
    ("code2", "auth_response_invalid_code"),
    ("id_token_authResp", "auth_response_missing_id_token"),
    ("access_token_authResp", "auth_response_missing_access_token"),
    ("denied", "auth_response_access_denied"),
    ("id_token_tokenResp", "token_response_missing_id_token"),
    ("access_token_tokenResp", "token_response_missing_access_token"),
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown test case `{0}`")]
pub struct UnknownTestCase(pub String);

/// Resolve a test-case identifier to its descriptor text. The match is on the
/// exact string key, so non-canonical spellings like `007` don't resolve.
pub fn payload(id: &str) -> Option<&'static str> {
    TEST_CASES
        .iter()
        .find(|(case, _)| *case == id)
        .map(|(_, payload)| *payload)
}

/// Encode the descriptor for `id` as a transport-safe token.
///
/// Identifiers outside the fixed table are rejected instead of being encoded
/// as an absent value.
pub fn encode(id: &str) -> Result<String, UnknownTestCase> {
    payload(id)
        .map(encode_payload)
        .ok_or_else(|| UnknownTestCase(id.to_string()))
}

fn encode_payload(payload: &str) -> String {
    URL_SAFE_NO_PAD.encode(payload)
}

/// Tokens for the full scenario catalogue, for manual test-harness
/// configuration. The descriptor shape here is `{<scenario>: true}`.
pub fn named_scenario_tokens() -> Vec<(&'static str, String)> {
    NAMED_SCENARIOS
        .iter()
        .map(|(key, scenario)| (*key, encode_payload(&format!("{{{scenario}: true}}"))))
        .collect()
}
