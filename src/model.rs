//! Database models, shared by the repositories and the route groups.

use chrono::{DateTime, Utc};
use macros::model;
use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, thiserror::Error)]
#[error("unknown role {0}")]
pub struct UnknownRole(i16);

/// The role of a user, stored and serialized as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize)]
#[repr(i16)]
#[serde(into = "i16", try_from = "i16")]
pub enum Role {
	#[default]
	Ordinary = 0,
	Admin = 1,
}

impl From<Role> for i16 {
	fn from(role: Role) -> Self {
		role as i16
	}
}

impl TryFrom<i16> for Role {
	type Error = UnknownRole;

	fn try_from(value: i16) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::Ordinary),
			1 => Ok(Self::Admin),
			other => Err(UnknownRole(other)),
		}
	}
}

impl JsonSchema for Role {
	fn schema_name() -> String {
		"Role".into()
	}

	fn json_schema(gen: &mut SchemaGenerator) -> Schema {
		i16::json_schema(gen)
	}
}

/// A single user.
///
/// Credentials are never serialized. One-time tokens are only matched in
/// queries, so they are not loaded at all.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, JsonSchema)]
pub struct User {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	/// Argon2 PHC string.
	#[serde(skip)]
	pub password: String,
	pub motivation_letter: Option<String>,
	pub role: Role,
	pub active: bool,
	pub verified_email: bool,
	#[serde(skip)]
	pub reset_token_expires_at: Option<DateTime<Utc>>,
	/// Storage name of the profile photo, served under `/uploads`.
	pub photo: Option<String>,
	pub created_at: DateTime<Utc>,
}

/// A user with the public parts of their CV, as listed by the user search.
#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
pub struct UserSummary {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub user: User,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub profession: Option<String>,
	pub facebook: Option<String>,
	pub instagram: Option<String>,
	pub twitter: Option<String>,
	pub linkedin: Option<String>,
}

/// A user together with their CV, if they have one.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Profile {
	#[serde(flatten)]
	pub user: User,
	pub cv: Option<Cv>,
}

/// The résumé of a user. Each user has at most one.
#[model(create)]
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize, JsonSchema, Validate)]
pub struct Cv {
	#[serde(skip_deserializing)]
	pub id: Uuid,
	#[serde(skip_deserializing)]
	pub user_id: Uuid,
	#[validate(length(max = 128))]
	pub last_name: Option<String>,
	#[validate(length(max = 128))]
	pub first_name: Option<String>,
	pub location: Option<String>,
	pub country: Option<String>,
	pub profession: Option<String>,
	pub work_experience: Option<String>,
	pub work_experience_duration: Option<String>,
	pub education: Option<String>,
	pub education_duration: Option<String>,
	pub skills: Option<String>,
	pub languages: Option<String>,
	pub certifications_and_licenses: Option<String>,
	pub links: Option<String>,
	pub facebook: Option<String>,
	pub instagram: Option<String>,
	pub twitter: Option<String>,
	pub linkedin: Option<String>,
}

/// A job posting.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, JsonSchema)]
pub struct Job {
	pub id: Uuid,
	pub company_id: Uuid,
	/// The user that posted the job. Cleared when that user is deleted.
	pub user_id: Option<Uuid>,
	/// Contact address of the recruiter.
	pub mail: String,
	/// Contact phone number of the recruiter.
	pub num: Option<String>,
	pub speciality: Option<String>,
	pub description: Option<String>,
	pub titles: Option<String>,
	pub created_at: DateTime<Utc>,
}

/// A job posting with the name of its company.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, JsonSchema)]
pub struct JobListing {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub job: Job,
	pub company_name: String,
}

/// A user that bookmarked a job.
#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
pub struct JobFavorite {
	pub user_id: Uuid,
	pub user_name: String,
}

/// A bookmark across all users, as seen by an admin.
#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
pub struct FavoriteEntry {
	pub user_id: Uuid,
	pub job_id: Uuid,
	pub created_at: DateTime<Utc>,
	pub titles: Option<String>,
}

/// An application of a user to a job. Repeated applications increment the counter.
#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
pub struct Application {
	pub id: Uuid,
	pub job_id: Uuid,
	pub user_id: Uuid,
	pub apply_count: i32,
	pub applied_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
pub struct ApplicationView {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub application: Application,
	pub user_name: String,
	pub job_title: Option<String>,
}

/// A comment left by a user under a job posting.
#[model(create)]
#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, JsonSchema, Validate)]
pub struct Comment {
	#[serde(skip_deserializing)]
	pub id: Uuid,
	#[serde(skip_deserializing)]
	pub job_id: Uuid,
	#[serde(skip_deserializing)]
	pub user_id: Uuid,
	#[validate(length(min = 1, max = 2000))]
	pub comment_text: String,
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

/// A comment with the author's photo and names taken from their CV.
#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
pub struct CommentView {
	pub id: Uuid,
	pub job_id: Uuid,
	pub user_id: Uuid,
	pub comment_text: String,
	pub created_at: DateTime<Utc>,
	pub photo: Option<String>,
	pub user_first_name: Option<String>,
	pub user_last_name: Option<String>,
}

/// A contact-form submission.
#[model(create)]
#[derive(Debug, sqlx::FromRow, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ContactMessage {
	#[serde(skip_deserializing)]
	pub id: Uuid,
	#[validate(length(min = 1, max = 256))]
	pub names: String,
	#[validate(email)]
	pub email: String,
	pub phone_number: Option<String>,
	pub subject: Option<String>,
	#[validate(length(min = 1))]
	pub message_text: String,
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

/// A moderation action taken by an admin.
#[derive(Debug, sqlx::FromRow, Serialize, JsonSchema)]
pub struct AuditEntry {
	pub id: Uuid,
	pub actor_id: Option<Uuid>,
	pub action: String,
	pub target: String,
	pub created_at: DateTime<Utc>,
}
