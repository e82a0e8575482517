//! Token authentication for the HTTP API.
//!
//! Clients send `Authorization: Token <key>`. Keys are provisioned through the
//! configuration file and map to a username.

use std::collections::HashMap;

use thiserror::Error;

pub const TOKEN_SCHEME: &str = "Token";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication credentials were not provided")]
    MissingCredentials,

    #[error("invalid token")]
    InvalidToken,
}

#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, String>,
}

impl TokenRegistry {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn username(&self, key: &str) -> Option<&str> {
        self.tokens.get(key).map(String::as_str)
    }

    /// Resolve the raw `Authorization` header value to a username.
    ///
    /// The `Token ` prefix is optional.
    pub fn authenticate(&self, header: Option<&str>) -> Result<&str, AuthError> {
        let raw = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let key = raw
            .strip_prefix(TOKEN_SCHEME)
            .map(str::trim_start)
            .unwrap_or(raw);

        self.username(key).ok_or(AuthError::InvalidToken)
    }
}

/// Header value for `key`.
pub fn authorization_header(key: &str) -> String {
    format!("{TOKEN_SCHEME} {key}")
}
