use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::state::AppState;

/// Token type used to distinguish access tokens from gate QR tokens.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Qr,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub kind: TokenKind,
    pub iat: usize,
    pub exp: usize,
}

/// HMAC signing and verification keys plus the configured TTLs.
#[derive(Clone)]
pub struct TokenKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub access_ttl: Duration,
    pub qr_ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl TokenKeys {
    pub fn from_config(jwt: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            access_ttl: Duration::from_secs((jwt.access_ttl_minutes as u64) * 60),
            qr_ttl: Duration::from_secs(jwt.qr_ttl_seconds as u64),
        }
    }

    fn sign_with_kind(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Qr => self.qr_ttl,
        };
        let exp = now + time::Duration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            kind,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Access)
    }

    pub fn sign_qr(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Qr)
    }

    /// Verify signature and expiry, then require the expected kind. A kind
    /// mismatch is the same failure as a bad signature.
    pub fn verify(&self, token: &str, expected: TokenKind) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.kind != expected {
            anyhow::bail!("invalid token");
        }
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn make_keys() -> TokenKeys {
        TokenKeys::from_config(&JwtConfig {
            secret: "test-secret".into(),
            access_ttl_minutes: 5,
            qr_ttl_seconds: 60,
        })
    }

    #[test]
    fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");
        let claims = keys.verify(&token, TokenKind::Access).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn sign_and_verify_qr_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_qr(user_id).expect("sign qr");
        let claims = keys.verify(&token, TokenKind::Qr).expect("verify qr");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Qr);
    }

    #[test]
    fn verify_rejects_kind_mismatch() {
        let keys = make_keys();
        let token = keys.sign_qr(Uuid::new_v4()).expect("sign qr");
        assert!(keys.verify(&token, TokenKind::Access).is_err());

        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");
        assert!(keys.verify(&token, TokenKind::Qr).is_err());
    }

    #[test]
    fn verify_rejects_garbled_token() {
        let keys = make_keys();
        assert!(keys.verify("not-a-jwt", TokenKind::Qr).is_err());
        assert!(keys.verify("", TokenKind::Access).is_err());
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys();
        let other = TokenKeys::from_config(&JwtConfig {
            secret: "other-secret".into(),
            access_ttl_minutes: 5,
            qr_ttl_seconds: 60,
        });
        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");
        assert!(other.verify(&token, TokenKind::Access).is_err());
    }
}
