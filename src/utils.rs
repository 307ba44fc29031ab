use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};

/// Random string of `length` characters from `[A-Za-z0-9]`, drawn from the
/// thread-local CSPRNG.
pub fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// `Authorization` header value for confidential-client authentication at
/// the token endpoint.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {credentials}")
}

pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

pub fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
