//! Security utilities for input validation and log hygiene.
//!
//! This module provides validation functions for untrusted input:
//! - Wallet address grammar validation and free-form text scanning
//! - RPC URL validation with HTTPS enforcement
//! - Input sanitization for logging

use anyhow::{anyhow, Result};
use url::Url;

const ADDRESS_MIN_LEN: usize = 32;
const ADDRESS_MAX_LEN: usize = 44;

/// Check whether a token matches the wallet address grammar: base-58
/// alphabet (digits 1-9, uppercase letters excluding I/O, lowercase letters
/// excluding l), length 32-44 inclusive.
///
/// This is a grammar check, not key validation: a string in the alphabet and
/// length range is accepted even if it does not decode to a 32-byte key.
pub fn is_valid_wallet_address(token: &str) -> bool {
    let len = token.len();
    if !(ADDRESS_MIN_LEN..=ADDRESS_MAX_LEN).contains(&len) {
        return false;
    }
    token.chars().all(is_base58_char)
}

fn is_base58_char(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

/// Scan free-form text token-by-token and return the first token that
/// matches the wallet address grammar.
pub fn extract_wallet_address(text: &str) -> Option<&str> {
    text.split_whitespace().find(|t| is_valid_wallet_address(t))
}

/// Validate an RPC URL.
///
/// Requires HTTPS except for localhost/loopback endpoints used in testing.
pub fn validate_rpc_url(url_str: &str) -> Result<String> {
    let url = Url::parse(url_str).map_err(|e| anyhow!("Invalid URL format: {}", e))?;

    if url.scheme() != "https"
        && !url.host_str().unwrap_or("").contains("localhost")
        && !url.host_str().unwrap_or("").starts_with("127.0.0.1")
    {
        return Err(anyhow!("RPC URL must use HTTPS for security"));
    }

    Ok(url.to_string())
}

/// Sanitize log output to prevent sensitive data leakage.
///
/// Redacts patterns that look like private keys, bearer credentials, or API
/// keys before the string reaches the log stream.
pub fn sanitize_for_logging(input: &str) -> String {
    let patterns = [
        (r"[a-zA-Z0-9]{64,}", "[REDACTED-KEY]"),
        (r"Bearer [a-zA-Z0-9\-._~+/]+=*", "Bearer [REDACTED]"),
        (r"token[=:]\s*[a-zA-Z0-9\-._~+/]+=*", "token=[REDACTED]"),
        (r"key[=:]\s*[a-zA-Z0-9\-._~+/]+=*", "key=[REDACTED]"),
    ];

    let mut output = input.to_string();
    for (pattern, replacement) in patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            output = re.replace_all(&output, replacement).to_string();
        }
    }
    output
}
