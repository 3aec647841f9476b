use std::{borrow::Cow, convert::Infallible};

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

use crate::{credential, notify, token, upload};

/// Shown to clients for every failure that is not their fault.
pub const INTERNAL_MESSAGE: &str = "An error occurred";

/// A single client-facing error message, optionally tied to an input field.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Message<'a> {
	pub content: Cow<'a, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
		}
	}
}

/// The JSON body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody<'a> {
	/// The primary error message.
	pub error: Cow<'a, str>,
	/// Per-field details, present for validation errors.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub errors: Vec<Message<'a>>,
}

/// Implemented by the domain error of each route group.
///
/// Messages are presented to the client, so they should not contain
/// sensitive information.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message<'_>> {
		vec![Message::new(self.to_string())]
	}
}

impl ErrorShape for Infallible {
	fn status(&self) -> StatusCode {
		match *self {}
	}
}

/// Error type returned by route handlers and extractors.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<E = Infallible> {
	#[error(transparent)]
	Route(E),
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("upload error: {0}")]
	Upload(#[from] upload::Error),
	#[error("credential error: {0}")]
	Credential(#[from] credential::Error),
	#[error("token error: {0}")]
	Token(#[from] token::Error),
	#[error("mail error: {0}")]
	Mail(#[from] notify::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("rate limited")]
	RateLimit(GovernorError),
}

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self::Route(error)
	}
}

impl<E> From<GovernorError> for RouteError<E> {
	fn from(error: GovernorError) -> Self {
		Self::RateLimit(error)
	}
}

impl<E: ErrorShape> RouteError<E> {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Route(error) => error.status(),
			Self::Validation(..) | Self::Json(..) | Self::Query(..) | Self::Path(..) => {
				StatusCode::BAD_REQUEST
			}
			Self::Upload(error) if error.is_client_error() => StatusCode::BAD_REQUEST,
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => StatusCode::TOO_MANY_REQUESTS,
			Self::RateLimit(GovernorError::Other { code, .. }) => *code,
			Self::Upload(..)
			| Self::Credential(..)
			| Self::Token(..)
			| Self::Mail(..)
			| Self::Database(..)
			| Self::RateLimit(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn body(&self) -> ErrorBody<'_> {
		let (error, errors) = match self {
			Self::Route(error) => {
				let errors = error.errors();
				let error = errors
					.first()
					.map_or(Cow::Borrowed(INTERNAL_MESSAGE), |message| message.content.clone());

				(error, errors)
			}
			Self::Validation(errors) => (Cow::Borrowed("invalid input"), validation_messages(errors)),
			Self::Json(rejection) => (Cow::Owned(rejection.body_text()), Vec::new()),
			Self::Query(rejection) => (Cow::Owned(rejection.body_text()), Vec::new()),
			Self::Path(rejection) => (Cow::Owned(rejection.body_text()), Vec::new()),
			Self::Upload(error) if error.is_client_error() => {
				(Cow::Owned(error.to_string()), Vec::new())
			}
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => {
				(Cow::Borrowed("too many requests"), Vec::new())
			}
			_ => (Cow::Borrowed(INTERNAL_MESSAGE), Vec::new()),
		};

		ErrorBody { error, errors }
	}
}

/// Flattens validator output into one message per failed rule, ordered by field.
fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'_>> {
	let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
	fields.sort_by_key(|(field, _)| *field);

	fields
		.into_iter()
		.flat_map(|(field, errors)| {
			errors.iter().map(move |error| Message {
				content: error.message.clone().unwrap_or_else(|| error.code.clone()),
				field: Some(Cow::Borrowed(field)),
			})
		})
		.collect()
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		}

		(status, axum::Json(self.body())).into_response()
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = Self;
}

#[cfg(test)]
mod test {
	use super::*;

	#[derive(Debug, thiserror::Error)]
	enum Sample {
		#[error("sample not found")]
		Missing,
	}

	impl ErrorShape for Sample {
		fn status(&self) -> StatusCode {
			StatusCode::NOT_FOUND
		}
	}

	#[test]
	fn test_route_error_uses_domain_status_and_message() {
		let error = RouteError::from(Sample::Missing);

		assert_eq!(error.status(), StatusCode::NOT_FOUND);
		assert_eq!(error.body().error, "sample not found");
	}

	#[test]
	fn test_database_error_is_generic() {
		let error = RouteError::<Sample>::from(sqlx::Error::RowNotFound);
		let body = error.body();

		assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(body.error, INTERNAL_MESSAGE);
		assert!(body.errors.is_empty());
	}

	#[test]
	fn test_validation_errors_are_listed_per_field() {
		use validator::Validate;

		#[derive(Validate)]
		struct Input {
			#[validate(email)]
			email: String,
			#[validate(length(min = 3))]
			name: String,
		}

		let errors = Input {
			email: "nope".into(),
			name: "a".into(),
		}
		.validate()
		.unwrap_err();

		let error = RouteError::<Sample>::from(errors);
		let body = error.body();

		assert_eq!(error.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body.errors.len(), 2);
		assert_eq!(body.errors[0].field.as_deref(), Some("email"));
		assert_eq!(body.errors[1].field.as_deref(), Some("name"));
	}
}
