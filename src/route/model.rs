use std::borrow::Cow;

use aide::{
	gen::GenContext,
	openapi::{Operation, Response},
	OperationOutput,
};
use axum::{http::StatusCode, response::IntoResponse};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::Json;

/// A confirmation message.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Notice {
	pub message: Cow<'static, str>,
}

impl Notice {
	pub fn json(message: &'static str) -> Json<Self> {
		Json(Self {
			message: Cow::Borrowed(message),
		})
	}
}

/// Targets a user by email, as used by the moderation routes.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct EmailInput {
	#[validate(email)]
	pub email: String,
}

/// A JSON body sent with `201 Created`.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
	fn into_response(self) -> axum::response::Response {
		(StatusCode::CREATED, axum::Json(self.0)).into_response()
	}
}

impl<T: JsonSchema> OperationOutput for Created<T> {
	type Inner = T;

	fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<Response> {
		Json::<T>::operation_response(ctx, operation)
	}

	fn inferred_responses(ctx: &mut GenContext, operation: &mut Operation) -> Vec<(Option<u16>, Response)> {
		Self::operation_response(ctx, operation)
			.map(|res| vec![(Some(StatusCode::CREATED.as_u16()), res)])
			.unwrap_or_default()
	}
}
