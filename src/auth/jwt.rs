use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated caller.
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

pub fn generate_token(username: &str, secret: &str, ttl: usize) -> Result<String, Error> {
    let issued_at = now();
    let claims = Claims {
        sub: username.to_string(),
        exp: issued_at + ttl,
        iat: issued_at,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Signature and expiry are both checked; any failure is opaque to the
/// caller beyond "invalid".
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips() {
        let token = generate_token("alice.nguyen", SECRET, 1800).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "alice.nguyen");
        assert_eq!(claims.exp, claims.iat + 1800);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token("alice.nguyen", SECRET, 1800).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = generate_token("alice.nguyen", SECRET, 0).unwrap();
        let mut validation = Validation::default();
        validation.leeway = 0;
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        );
        assert!(result.is_err());
    }

    #[test]
    fn each_token_gets_a_fresh_jti() {
        let a = verify_token(&generate_token("u", SECRET, 60).unwrap(), SECRET).unwrap();
        let b = verify_token(&generate_token("u", SECRET, 60).unwrap(), SECRET).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
