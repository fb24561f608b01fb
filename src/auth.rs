// Credentials for the authenticated probe phase
// Supports bearer tokens and raw cookies

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredential {
    Bearer(String),
    Cookie(String),
}

impl AuthCredential {
    /// Pick the credential from the CLI flags. A token wins over a cookie;
    /// empty strings count as absent.
    pub fn from_flags(token: Option<&str>, cookie: Option<&str>) -> Option<Self> {
        match (token.filter(|t| !t.is_empty()), cookie.filter(|c| !c.is_empty())) {
            (Some(token), _) => Some(AuthCredential::Bearer(token.to_string())),
            (None, Some(cookie)) => Some(AuthCredential::Cookie(cookie.to_string())),
            (None, None) => None,
        }
    }

    /// The single header this credential contributes to a request
    pub fn header(&self) -> (&'static str, String) {
        match self {
            AuthCredential::Bearer(token) => ("Authorization", format!("Bearer {}", token)),
            AuthCredential::Cookie(cookie) => ("Cookie", cookie.clone()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuthCredential::Bearer(_) => "JWT-based",
            AuthCredential::Cookie(_) => "Cookie-based",
        }
    }

    /// Subject of a bearer JWT, if the token decodes as one. Nothing is verified.
    pub fn subject(&self) -> Option<String> {
        match self {
            AuthCredential::Bearer(token) => jwt_subject(token),
            AuthCredential::Cookie(_) => None,
        }
    }
}

/// Extract the user ID claim from a JWT payload (header.payload.signature)
fn jwt_subject(token: &str) -> Option<String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    // base64url without padding
    let decoded = general_purpose::URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let json: Value = serde_json::from_slice(&decoded).ok()?;

    ["sub", "user_id", "userId", "id"]
        .iter()
        .filter_map(|claim| json.get(*claim))
        .find_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
