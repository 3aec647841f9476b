//! Password hashing and single-use opaque tokens.

use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use chrono::{DateTime, Utc};
use rand::RngCore;

/// Number of random bytes in an opaque token, before hex encoding.
pub const OPAQUE_TOKEN_BYTES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("password hashing failed: {0}")]
	Hash(argon2::password_hash::Error),
}

/// Hashes a password with a fresh random salt, returning a PHC string.
pub fn hash_password(hasher: &Argon2, password: &str) -> Result<String, Error> {
	let salt = SaltString::generate(&mut OsRng);

	hasher
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(Error::Hash)
}

/// Checks a password against a stored PHC string in constant time.
///
/// A stored value that is not a valid PHC string never matches.
pub fn verify_password(hasher: &Argon2, password: &str, stored: &str) -> Result<bool, Error> {
	let Ok(hash) = PasswordHash::new(stored) else {
		tracing::warn!("stored password is not a PHC string");
		return Ok(false);
	};

	match hasher.verify_password(password.as_bytes(), &hash) {
		Ok(()) => Ok(true),
		Err(argon2::password_hash::Error::Password) => Ok(false),
		Err(error) => Err(Error::Hash(error)),
	}
}

/// Generates a random hex token used for email verification and password resets.
pub fn opaque_token() -> String {
	let mut bytes = [0; OPAQUE_TOKEN_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);

	hex::encode(bytes)
}

/// A reset token is honoured strictly before its expiry instant.
pub fn is_unexpired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
	expires_at.is_some_and(|expires_at| now < expires_at)
}
