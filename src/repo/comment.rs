use sqlx::PgExecutor;
use uuid::Uuid;

use crate::model::{Comment, CommentView};

pub const JOB_FKEY: &str = "comment_job_id_fkey";
pub const USER_FKEY: &str = "comment_user_id_fkey";

pub async fn insert<'e>(
	executor: impl PgExecutor<'e>,
	job_id: Uuid,
	user_id: Uuid,
	text: &str,
) -> Result<Comment, sqlx::Error> {
	sqlx::query_as(
		r#"
			INSERT INTO comment (job_id, user_id, comment_text) VALUES ($1, $2, $3)
			RETURNING *
		"#,
	)
	.bind(job_id)
	.bind(user_id)
	.bind(text)
	.fetch_one(executor)
	.await
}

/// Comments under a job, newest first. Authors without a CV are listed without names.
pub async fn for_job<'e>(executor: impl PgExecutor<'e>, job_id: Uuid) -> Result<Vec<CommentView>, sqlx::Error> {
	sqlx::query_as(
		r#"
			SELECT
				c.id, c.job_id, c.user_id, c.comment_text, c.created_at,
				u.photo,
				cv.first_name AS user_first_name,
				cv.last_name AS user_last_name
			FROM comment c
			INNER JOIN "user" u ON u.id = c.user_id
			LEFT JOIN cv ON cv.user_id = c.user_id
			WHERE c.job_id = $1
			ORDER BY c.created_at DESC
		"#,
	)
	.bind(job_id)
	.fetch_all(executor)
	.await
}

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<CommentView>, sqlx::Error> {
	sqlx::query_as(
		r#"
			SELECT
				c.id, c.job_id, c.user_id, c.comment_text, c.created_at,
				u.photo,
				cv.first_name AS user_first_name,
				cv.last_name AS user_last_name
			FROM comment c
			INNER JOIN "user" u ON u.id = c.user_id
			LEFT JOIN cv ON cv.user_id = c.user_id
			ORDER BY c.created_at DESC
		"#,
	)
	.fetch_all(executor)
	.await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query("DELETE FROM comment WHERE id = $1")
		.bind(id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}
