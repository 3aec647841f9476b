//! Signed bearer tokens.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Role;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to sign token: {0}")]
	Sign(#[source] jsonwebtoken::errors::Error),
	#[error("invalid token: {0}")]
	Invalid(#[source] jsonwebtoken::errors::Error),
}

/// The claims carried by a bearer token.
///
/// The role is captured at issuance and is not re-checked until a new
/// token is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	pub sub: Uuid,
	pub role: Role,
	pub iat: i64,
	pub exp: i64,
}

struct Keys {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
	ttl_secs: i64,
}

/// Signing and verification keys for HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenKeys(Arc<Keys>);

impl TokenKeys {
	pub fn new(secret: &[u8], ttl: Duration) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.set_required_spec_claims(&["exp", "sub"]);
		validation.leeway = 0;

		Self(Arc::new(Keys {
			encoding: EncodingKey::from_secret(secret),
			decoding: DecodingKey::from_secret(secret),
			validation,
			ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
		}))
	}

	pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, Error> {
		self.issue_at(user_id, role, Utc::now())
	}

	pub fn issue_at(&self, user_id: Uuid, role: Role, now: DateTime<Utc>) -> Result<String, Error> {
		let claims = Claims {
			sub: user_id,
			role,
			iat: now.timestamp(),
			exp: now.timestamp().saturating_add(self.0.ttl_secs),
		};

		jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.0.encoding)
			.map_err(Error::Sign)
	}

	pub fn verify(&self, token: &str) -> Result<Claims, Error> {
		jsonwebtoken::decode::<Claims>(token, &self.0.decoding, &self.0.validation)
			.map(|data| data.claims)
			.map_err(Error::Invalid)
	}
}

impl std::fmt::Debug for TokenKeys {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TokenKeys").field("ttl_secs", &self.0.ttl_secs).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn keys() -> TokenKeys {
		TokenKeys::new(b"test-secret", Duration::from_secs(60 * 60))
	}

	#[test]
	fn test_issue_and_verify() {
		let keys = keys();
		let user_id = Uuid::new_v4();

		let token = keys.issue(user_id, Role::Admin).unwrap();
		let claims = keys.verify(&token).unwrap();

		assert_eq!(claims.sub, user_id);
		assert_eq!(claims.role, Role::Admin);
		assert_eq!(claims.exp - claims.iat, 60 * 60);
	}

	#[test]
	fn test_expired_token_is_rejected() {
		let keys = keys();
		let issued = Utc::now() - chrono::Duration::hours(2);

		let token = keys.issue_at(Uuid::new_v4(), Role::Ordinary, issued).unwrap();

		assert!(keys.verify(&token).is_err());
	}

	#[test]
	fn test_foreign_secret_is_rejected() {
		let other = TokenKeys::new(b"other-secret", Duration::from_secs(60));
		let token = other.issue(Uuid::new_v4(), Role::Ordinary).unwrap();

		assert!(keys().verify(&token).is_err());
	}

	#[test]
	fn test_garbage_is_rejected() {
		assert!(keys().verify("not.a.token").is_err());
	}
}
