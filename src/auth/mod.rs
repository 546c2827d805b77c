//! Credential check shared by every guarded route.

use axum::{
    extract::Query,
    http::{HeaderMap, Uri, header::COOKIE},
};

/// Name of both the query parameter and the cookie carrying the credential.
pub const API_KEY: &str = "api_key";

/// Result of checking a request's credential.
///
/// `credential` is the candidate taken from the request whether or not it
/// matched, so the caller can echo it back as a cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub valid: bool,
    pub credential: String,
}

/// Compares the request's candidate credential against `expected`.
///
/// A missing candidate is reported as an empty credential and never matches,
/// since configuration validation rejects an empty key.
pub fn validate_authentication(uri: &Uri, headers: &HeaderMap, expected: &str) -> AuthOutcome {
    let credential = extract_credential(uri, headers).unwrap_or_default();
    let valid = !credential.is_empty() && credential == expected;

    AuthOutcome { valid, credential }
}

/// Query parameter first, cookie as fallback.
pub fn extract_credential(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    from_query(uri).or_else(|| from_cookies(headers))
}

/// First occurrence wins when the parameter is repeated.
fn from_query(uri: &Uri) -> Option<String> {
    let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    params
        .into_iter()
        .find(|(name, _)| name == API_KEY)
        .map(|(_, value)| value)
}

fn from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == API_KEY)
        .map(|(_, value)| value.trim_matches('"').to_string())
}
