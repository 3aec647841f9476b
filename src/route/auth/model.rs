use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::CreateCv;

/// Text fields of the registration form. The photo is an optional file field.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
	#[validate(length(min = 1, max = 128))]
	pub name: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
	pub motivation_letter: Option<String>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TokenResponse {
	/// A bearer token carrying the user's id and role.
	pub token: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ResetPasswordInput {
	#[serde(rename = "newPassword", alias = "new_password")]
	#[validate(length(min = 1, max = 128))]
	pub new_password: String,
}

/// Text fields of the profile form: the motivation letter plus every CV field.
///
/// CV fields are only applied when the user already has a CV.
#[derive(Debug, Deserialize)]
pub struct ProfileInput {
	pub motivation_letter: Option<String>,
	#[serde(flatten)]
	pub cv: CreateCv,
}
