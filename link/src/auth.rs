//! Authentication provider for the statement gateway.
//!
//! Handles API key pairs and bearer tokens, attaching the matching
//! `Authorization` header to outgoing HTTP requests.

use base64::{engine::general_purpose, Engine as _};

/// Credentials for the statement gateway.
///
/// # Examples
///
/// ```rust
/// use streamsql_link::AuthProvider;
///
/// // API key + secret, sent as HTTP Basic auth
/// let auth = AuthProvider::api_key("KEY".to_string(), "SECRET".to_string());
///
/// // Bearer token (e.g. from an SSO login)
/// let auth = AuthProvider::bearer_token("eyJhbGc...".to_string());
///
/// // No authentication (local gateway)
/// let auth = AuthProvider::none();
/// ```
#[derive(Clone)]
pub enum AuthProvider {
    /// API key and secret
    ApiKey(String, String),

    /// Bearer token authentication
    BearerToken(String),

    /// No authentication
    None,
}

impl AuthProvider {
    /// Create API key authentication
    ///
    /// Encodes key:secret as base64 for the `Authorization: Basic` header
    /// following RFC 7617.
    pub fn api_key(key: String, secret: String) -> Self {
        Self::ApiKey(key, secret)
    }

    /// Create bearer token authentication
    pub fn bearer_token(token: String) -> Self {
        Self::BearerToken(token)
    }

    /// No authentication
    pub fn none() -> Self {
        Self::None
    }

    /// Attach authentication headers to an HTTP request builder
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::ApiKey(key, secret) => {
                let credentials = format!("{}:{}", key, secret);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                request.header("Authorization", format!("Basic {}", encoded))
            },
            Self::BearerToken(token) => request.bearer_auth(token),
            Self::None => request,
        }
    }

    /// Check if authentication is configured
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

// Secrets never reach logs through `{:?}`.
impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(key, _) => write!(f, "AuthProvider::ApiKey({}, ****)", key),
            Self::BearerToken(_) => write!(f, "AuthProvider::BearerToken(****)"),
            Self::None => write!(f, "AuthProvider::None"),
        }
    }
}
