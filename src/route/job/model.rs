use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::{Comment, FavoriteEntry, JobListing};

/// A job posting whose company is looked up, or created, by name.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct AddJobInput {
	#[validate(length(min = 1, max = 256))]
	pub company_name: String,
	#[serde(flatten)]
	#[validate(nested)]
	pub job: JobInput,
}

/// A job posting for a company that already exists.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CreateJobInput {
	pub company_id: Uuid,
	#[serde(flatten)]
	#[validate(nested)]
	pub job: JobInput,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct JobInput {
	/// Address the applications are sent to.
	#[validate(email)]
	pub mail: String,
	pub num: Option<String>,
	pub speciality: Option<String>,
	pub description: Option<String>,
	pub titles: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct JobCreated {
	pub job_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct JobIdInput {
	pub job_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CommentIdInput {
	pub comment_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct MessageIdInput {
	pub message_id: Uuid,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct Favorites {
	pub favorites: Vec<JobListing>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AllFavorites {
	#[serde(rename = "allFavorites")]
	pub all_favorites: Vec<FavoriteEntry>,
}

/// Text fields of the application form. The CV is an optional `cvFile` file field.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMailInput {
	#[validate(length(min = 1))]
	pub description: String,
	/// The recruiter receiving the application.
	#[validate(email)]
	pub mail: String,
	/// The applicant, shown in the mail body.
	#[validate(email)]
	pub email: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentAdded {
	pub message: &'static str,
	pub comment: Comment,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MessageSaved {
	pub message: &'static str,
	#[serde(rename = "messageId")]
	pub message_id: Uuid,
}

#[cfg(test)]
mod test {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_add_job_input_flattens_job_fields() {
		let input: AddJobInput = serde_json::from_value(json!({
			"company_name": "Acme",
			"mail": "jobs@acme.com",
			"titles": "Welder",
		}))
		.unwrap();

		assert_eq!(input.company_name, "Acme");
		assert_eq!(input.job.titles.as_deref(), Some("Welder"));
		assert!(input.validate().is_ok());
	}

	#[test]
	fn test_job_input_requires_valid_mail() {
		let input: CreateJobInput = serde_json::from_value(json!({
			"company_id": Uuid::nil(),
			"mail": "nope",
		}))
		.unwrap();

		assert!(input.validate().is_err());
	}

	#[test]
	fn test_message_saved_uses_camel_case_id() {
		let value = serde_json::to_value(MessageSaved {
			message: "ok",
			message_id: Uuid::nil(),
		})
		.unwrap();

		assert_eq!(value["messageId"], json!(Uuid::nil()));
	}
}
