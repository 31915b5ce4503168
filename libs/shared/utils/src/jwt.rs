use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::debug;

use shared_models::auth::{JwtClaims, User};

/// Reads the claims of a backend-issued token.
///
/// The signature is not checked: the client never holds the signing secret
/// and the backend re-validates every request. The claims are only used to
/// label the session and to decide when a refresh is due.
pub fn decode_claims(token: &str) -> Result<JwtClaims, String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(e) => {
            debug!("Failed to decode claims: {}", e);
            return Err("Invalid claims encoding".to_string());
        }
    };

    serde_json::from_str(&claims_json).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        "Invalid claims format".to_string()
    })
}

pub fn user_from_claims(claims: &JwtClaims) -> User {
    User {
        id: claims.sub.clone(),
        email: claims.email.clone(),
        role: claims.role.clone(),
        name: claims.name.clone(),
    }
}

pub fn expires_at(claims: &JwtClaims) -> Option<DateTime<Utc>> {
    claims.exp
        .and_then(|exp| Utc.timestamp_opt(exp as i64, 0).single())
}

/// True when the token is past (or within `leeway` of) its `exp` claim.
/// Tokens without `exp` never expire client-side.
pub fn is_expired(claims: &JwtClaims, now: DateTime<Utc>, leeway: Duration) -> bool {
    match expires_at(claims) {
        Some(exp) => exp <= now + leeway,
        None => false,
    }
}
