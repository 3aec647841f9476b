use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request, StatusCode},
};
use uuid::Uuid;

use crate::{
	error::{ErrorShape, RouteError},
	model::Role,
	openapi::SECURITY_SCHEME_BEARER,
	token::TokenKeys,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("missing bearer token")]
	MissingToken,
	#[error("invalid bearer token")]
	InvalidToken,
	#[error("Access denied. This route is only accessible by admin users.")]
	Forbidden,
}

impl ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
			Self::Forbidden => StatusCode::FORBIDDEN,
		}
	}
}

/// The caller, as encoded in their bearer token.
///
/// The token is the only source of truth: the user is not looked up, so a
/// deleted or demoted user keeps their identity until the token expires.
///
/// ```rust
/// async fn route(identity: Identity) {
///   println!("{}", identity.user_id);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
	pub user_id: Uuid,
	pub role: Role,
}

impl Identity {
	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin
	}

	/// Whether the caller may act on resources belonging to `user_id`.
	pub fn can_access(&self, user_id: Uuid) -> bool {
		self.user_id == user_id || self.is_admin()
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
	TokenKeys: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let header = parts
			.headers
			.get(header::AUTHORIZATION)
			.ok_or(Error::MissingToken)?;

		let token = header
			.to_str()
			.ok()
			.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
			.map(str::trim)
			.filter(|token| !token.is_empty())
			.ok_or(Error::InvalidToken)?;

		let claims = TokenKeys::from_ref(state).verify(token).map_err(|error| {
			tracing::debug!(%error, "rejected bearer token");
			Error::InvalidToken
		})?;

		Ok(Self {
			user_id: claims.sub,
			role: claims.role,
		})
	}
}

/// An [`Identity`] whose role is [`Role::Admin`].
#[derive(Debug, Clone, Copy)]
pub struct Admin(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Admin
where
	TokenKeys: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let identity = Identity::from_request_parts(parts, state).await?;

		if !identity.is_admin() {
			return Err(Error::Forbidden.into());
		}

		Ok(Self(identity))
	}
}

fn add_bearer_requirement(operation: &mut aide::openapi::Operation) {
	operation.security.extend([[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
		.into_iter()
		.collect()]);
}

impl OperationInput for Identity {
	/// Adds a bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		add_bearer_requirement(operation);
	}
}

impl OperationInput for Admin {
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		add_bearer_requirement(operation);
	}
}
