use aide::{
	gen::GenContext,
	openapi::{Operation, Response},
	OperationOutput,
};
use axum::{http::header, response::IntoResponse};
use schemars::JsonSchema;
use serde::Serialize;

use crate::extract::Json;

/// Name of the cookie some clients keep their bearer token in.
pub const TOKEN_COOKIE_NAME: &str = "jwtToken";

/// Creates an empty token cookie used to invalidate a previous one.
pub fn clear_token_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(TOKEN_COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

/// A JSON body sent together with a cleared token cookie.
///
/// Clearing the cookie does not revoke the token itself.
pub struct ClearToken<T>(pub T);

impl<T: Serialize> IntoResponse for ClearToken<T> {
	fn into_response(self) -> axum::response::Response {
		(
			[(header::SET_COOKIE, clear_token_cookie().to_string())],
			axum::Json(self.0),
		)
			.into_response()
	}
}

impl<T: JsonSchema> OperationOutput for ClearToken<T> {
	type Inner = T;

	fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<Response> {
		Json::<T>::operation_response(ctx, operation)
	}

	fn inferred_responses(ctx: &mut GenContext, operation: &mut Operation) -> Vec<(Option<u16>, Response)> {
		Json::<T>::inferred_responses(ctx, operation)
	}
}
