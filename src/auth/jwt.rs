use std::time::Duration;

use anyhow::Context;
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::config::JwtConfig;

/// Why a presented token was refused. Never shown to clients; the
/// authorization layer collapses all of these into "not authenticated".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Signing material and policy, built once at startup and shared read-only.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> anyhow::Result<Self> {
        let algorithm = cfg.algorithm()?;

        // Expiry is checked by hand after the signature so the clock can be
        // injected and no leeway applies.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        validation.set_audience(std::slice::from_ref(&cfg.audience));

        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm,
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: cfg.ttl()?,
        })
    }

    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user_id: Uuid, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = TimeDuration::try_from(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate_at(token, OffsetDateTime::now_utc())
    }

    /// Structure, then signature, then time window. Each step short-circuits.
    pub fn validate_at(&self, token: &str, now: OffsetDateTime) -> Result<Uuid, AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(AuthError::Malformed);
        }
        let header = decode_header(token).map_err(|_| AuthError::Malformed)?;
        if header.alg != self.algorithm {
            return Err(AuthError::Malformed);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                _ => AuthError::Malformed,
            }
        })?;

        let now = now.unix_timestamp();
        if now >= data.claims.exp || data.claims.iat > now {
            return Err(AuthError::Expired);
        }

        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64ct::{Base64UrlUnpadded, Encoding};

    pub(crate) fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            algorithm: "HS256".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        })
        .expect("keys")
    }

    fn flip_signature_bit(token: &str, byte: usize, bit: u8) -> String {
        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut raw = Base64UrlUnpadded::decode_vec(sig).unwrap();
        raw[byte] ^= 1 << bit;
        format!("{head}.{}", Base64UrlUnpadded::encode_string(&raw))
    }

    #[test]
    fn issue_then_validate_returns_subject() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).expect("issue");
        assert_eq!(keys.validate(&token), Ok(user_id));
    }

    #[test]
    fn claims_carry_expiry_after_issuance() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc();
        let token = keys.issue_at(Uuid::new_v4(), now).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["test-aud"]);
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"dev-secret"),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, 300);
        assert_eq!(data.claims.iss, "test-issuer");
    }

    #[test]
    fn oversized_ttl_is_refused_at_startup() {
        let res = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            algorithm: "HS256".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 1_000_000_000_000,
        });
        assert!(res.is_err());
    }

    #[test]
    fn expiry_past_the_calendar_is_an_error_not_a_panic() {
        let keys = make_keys("dev-secret");
        let end_of_time = time::macros::datetime!(9999-12-31 23:59 UTC);
        assert!(keys.issue_at(Uuid::new_v4(), end_of_time).is_err());
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let token = keys.issue_at(Uuid::new_v4(), issued).unwrap();
        assert_eq!(keys.validate(&token), Err(AuthError::Expired));
    }

    #[test]
    fn window_end_is_exclusive() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc();
        let token = keys.issue_at(Uuid::new_v4(), issued).unwrap();
        let at_expiry = issued + TimeDuration::minutes(5);
        assert_eq!(keys.validate_at(&token, at_expiry), Err(AuthError::Expired));
        let just_before = at_expiry - TimeDuration::seconds(1);
        assert!(keys.validate_at(&token, just_before).is_ok());
    }

    #[test]
    fn token_from_the_future_is_outside_window() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc() + TimeDuration::minutes(1);
        let token = keys.issue_at(Uuid::new_v4(), issued).unwrap();
        assert_eq!(keys.validate(&token), Err(AuthError::Expired));
    }

    #[test]
    fn flipped_signature_bits_are_bad_signatures() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(Uuid::new_v4()).unwrap();
        for byte in [0usize, 7, 16, 31] {
            for bit in [0u8, 3, 7] {
                let forged = flip_signature_bit(&token, byte, bit);
                assert_eq!(keys.validate(&forged), Err(AuthError::BadSignature));
            }
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_bad_signature() {
        let ours = make_keys("server-secret");
        let theirs = make_keys("attacker-secret");
        let token = theirs.issue(Uuid::new_v4()).unwrap();
        assert_eq!(ours.validate(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn expired_forgery_reports_signature_first() {
        let ours = make_keys("server-secret");
        let theirs = make_keys("attacker-secret");
        let issued = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let token = theirs.issue_at(Uuid::new_v4(), issued).unwrap();
        assert_eq!(ours.validate(&token), Err(AuthError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let keys = make_keys("dev-secret");
        for token in ["", "abc", "a.b", "a..c", "a.b.c.d", "!!!.###.$$$"] {
            assert_eq!(keys.validate(token), Err(AuthError::Malformed), "{token:?}");
        }
    }

    #[test]
    fn unexpected_algorithm_is_malformed() {
        let keys = make_keys("dev-secret");
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: OffsetDateTime::now_utc().unix_timestamp(),
            exp: OffsetDateTime::now_utc().unix_timestamp() + 60,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert_eq!(keys.validate(&token), Err(AuthError::Malformed));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let keys = make_keys("dev-secret");
        let mut other = make_keys("dev-secret");
        other.audience = "someone-else".into();
        let token = other.issue(Uuid::new_v4()).unwrap();
        assert_eq!(keys.validate(&token), Err(AuthError::Malformed));
    }
}
