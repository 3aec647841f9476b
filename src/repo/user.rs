use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::model::{Role, User, UserSummary};

pub const EMAIL_KEY: &str = "user_email_key";

pub struct NewUser<'a> {
	pub name: &'a str,
	pub email: &'a str,
	pub password_hash: &'a str,
	pub motivation_letter: Option<&'a str>,
	pub photo: Option<&'a str>,
	pub verification_token: &'a str,
}

/// Inserts an unverified, active, ordinary user.
///
/// Fails with a violation of [`EMAIL_KEY`] when the email is taken.
pub async fn insert<'e>(executor: impl PgExecutor<'e>, user: NewUser<'_>) -> Result<Uuid, sqlx::Error> {
	sqlx::query_scalar(
		r#"
			INSERT INTO "user" (name, email, password, motivation_letter, photo, verification_token)
			VALUES ($1, $2, $3, $4, $5, $6)
			RETURNING id
		"#,
	)
	.bind(user.name)
	.bind(user.email)
	.bind(user.password_hash)
	.bind(user.motivation_letter)
	.bind(user.photo)
	.bind(user.verification_token)
	.fetch_one(executor)
	.await
}

pub async fn find_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<User>, sqlx::Error> {
	sqlx::query_as(r#"SELECT * FROM "user" WHERE id = $1"#)
		.bind(id)
		.fetch_optional(executor)
		.await
}

pub async fn find_by_email<'e>(
	executor: impl PgExecutor<'e>,
	email: &str,
) -> Result<Option<User>, sqlx::Error> {
	sqlx::query_as(r#"SELECT * FROM "user" WHERE email = $1"#)
		.bind(email)
		.fetch_optional(executor)
		.await
}

/// Marks the matching user as verified and consumes the token.
pub async fn verify_email<'e>(
	executor: impl PgExecutor<'e>,
	token: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
	sqlx::query_scalar(
		r#"
			UPDATE "user"
			SET verified_email = TRUE, verification_token = NULL
			WHERE verification_token = $1
			RETURNING id
		"#,
	)
	.bind(token)
	.fetch_optional(executor)
	.await
}

pub async fn set_reset_token<'e>(
	executor: impl PgExecutor<'e>,
	id: Uuid,
	token: &str,
	expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
	sqlx::query(r#"UPDATE "user" SET reset_token = $1, reset_token_expires_at = $2 WHERE id = $3"#)
		.bind(token)
		.bind(expires_at)
		.bind(id)
		.execute(executor)
		.await?;

	Ok(())
}

/// Finds the holder of a reset token and locks their row until the transaction ends.
pub async fn find_by_reset_token_for_update<'e>(
	executor: impl PgExecutor<'e>,
	token: &str,
) -> Result<Option<User>, sqlx::Error> {
	sqlx::query_as(r#"SELECT * FROM "user" WHERE reset_token = $1 FOR UPDATE"#)
		.bind(token)
		.fetch_optional(executor)
		.await
}

/// Replaces the password hash and clears any pending reset token.
pub async fn set_password<'e>(
	executor: impl PgExecutor<'e>,
	id: Uuid,
	password_hash: &str,
) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
			UPDATE "user"
			SET password = $1, reset_token = NULL, reset_token_expires_at = NULL
			WHERE id = $2
		"#,
	)
	.bind(password_hash)
	.bind(id)
	.execute(executor)
	.await?;

	Ok(())
}

/// Keeps the current photo when `photo` is `None`. The motivation letter is always overwritten.
pub async fn update_profile<'e>(
	executor: impl PgExecutor<'e>,
	id: Uuid,
	photo: Option<&str>,
	motivation_letter: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
	sqlx::query_as(
		r#"
			UPDATE "user"
			SET photo = COALESCE($1, photo), motivation_letter = $2
			WHERE id = $3
			RETURNING *
		"#,
	)
	.bind(photo)
	.bind(motivation_letter)
	.bind(id)
	.fetch_optional(executor)
	.await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
		.bind(id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn delete_by_email<'e>(
	executor: impl PgExecutor<'e>,
	email: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
	sqlx::query_scalar(r#"DELETE FROM "user" WHERE email = $1 RETURNING id"#)
		.bind(email)
		.fetch_optional(executor)
		.await
}

/// Lists every user with the public parts of their CV, oldest account first.
pub async fn list_with_cv<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<UserSummary>, sqlx::Error> {
	sqlx::query_as(
		r#"
			SELECT
				u.*,
				cv.first_name,
				cv.last_name,
				cv.profession,
				cv.facebook,
				cv.instagram,
				cv.twitter,
				cv.linkedin
			FROM "user" u
			LEFT JOIN cv ON cv.user_id = u.id
			ORDER BY u.created_at
		"#,
	)
	.fetch_all(executor)
	.await
}

/// Returns the new role, or `None` when no user has this email.
pub async fn set_role<'e>(
	executor: impl PgExecutor<'e>,
	email: &str,
	role: Role,
) -> Result<Option<Role>, sqlx::Error> {
	sqlx::query_scalar(r#"UPDATE "user" SET role = $1 WHERE email = $2 RETURNING role"#)
		.bind(role)
		.bind(email)
		.fetch_optional(executor)
		.await
}

/// Flips between ordinary and admin in a single statement.
pub async fn toggle_role<'e>(
	executor: impl PgExecutor<'e>,
	email: &str,
) -> Result<Option<Role>, sqlx::Error> {
	sqlx::query_scalar(r#"UPDATE "user" SET role = 1 - role WHERE email = $1 RETURNING role"#)
		.bind(email)
		.fetch_optional(executor)
		.await
}

pub async fn set_active<'e>(
	executor: impl PgExecutor<'e>,
	email: &str,
	active: bool,
) -> Result<Option<Uuid>, sqlx::Error> {
	sqlx::query_scalar(r#"UPDATE "user" SET active = $1 WHERE email = $2 RETURNING id"#)
		.bind(active)
		.bind(email)
		.fetch_optional(executor)
		.await
}
