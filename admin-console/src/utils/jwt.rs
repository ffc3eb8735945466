use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Decode JWT claims without verifying the signature.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(anyhow::anyhow!("Invalid JWT format"));
    }

    // Some issuers pad the payload; strip it so the no-pad engine accepts both.
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

    let claims: JwtClaims = serde_json::from_slice(&payload)
        .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

    Ok(claims)
}

/// True when the token cannot be decoded, has no `exp`, or `exp` is not in
/// the future relative to `now`.
pub fn is_token_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_jwt_claims(token) {
        Ok(JwtClaims { exp: Some(exp), .. }) => now.timestamp() >= exp,
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Treating undecodable access token as expired");
            true
        }
    }
}

pub fn is_token_expired(token: &str) -> bool {
    is_token_expired_at(token, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token_with(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{}.signature",
            general_purpose::URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_decode_jwt_claims() {
        let token = token_with(r#"{"sub":"alice","exp":9999999999,"iat":1736500000}"#);

        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert_eq!(claims.exp, Some(9999999999));
    }

    #[test]
    fn test_expiry_boundary() {
        let token = token_with(r#"{"exp":1700000000}"#);
        let before = Utc.timestamp_opt(1699999999, 0).unwrap();
        let at = Utc.timestamp_opt(1700000000, 0).unwrap();

        assert!(!is_token_expired_at(&token, before));
        assert!(is_token_expired_at(&token, at));
    }

    #[test]
    fn test_missing_exp_counts_as_expired() {
        assert!(is_token_expired(&token_with(r#"{"sub":"alice"}"#)));
    }

    #[test]
    fn test_garbage_counts_as_expired() {
        assert!(is_token_expired("not-a-jwt"));
        assert!(is_token_expired("a.%%%.c"));
    }
}
