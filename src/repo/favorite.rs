use sqlx::PgExecutor;
use uuid::Uuid;

use crate::model::{FavoriteEntry, JobFavorite, JobListing};

pub const JOB_FKEY: &str = "favorite_job_id_fkey";
pub const USER_FKEY: &str = "favorite_user_id_fkey";

/// Bookmarks a job. Returns `false` when it was already bookmarked.
pub async fn add<'e>(executor: impl PgExecutor<'e>, user_id: Uuid, job_id: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query(
		r#"
			INSERT INTO favorite (user_id, job_id) VALUES ($1, $2)
			ON CONFLICT (user_id, job_id) DO NOTHING
		"#,
	)
	.bind(user_id)
	.bind(job_id)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() > 0)
}

/// The jobs bookmarked by a user, most recent bookmark first.
pub async fn for_user<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> Result<Vec<JobListing>, sqlx::Error> {
	sqlx::query_as(
		r#"
			SELECT job.*, company.name AS company_name
			FROM favorite
			INNER JOIN job ON job.id = favorite.job_id
			INNER JOIN company ON company.id = job.company_id
			WHERE favorite.user_id = $1
			ORDER BY favorite.created_at DESC
		"#,
	)
	.bind(user_id)
	.fetch_all(executor)
	.await
}

pub async fn for_job<'e>(executor: impl PgExecutor<'e>, job_id: Uuid) -> Result<Vec<JobFavorite>, sqlx::Error> {
	sqlx::query_as(
		r#"
			SELECT favorite.user_id, u.name AS user_name
			FROM favorite
			INNER JOIN "user" u ON u.id = favorite.user_id
			WHERE favorite.job_id = $1
			ORDER BY favorite.created_at
		"#,
	)
	.bind(job_id)
	.fetch_all(executor)
	.await
}

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<FavoriteEntry>, sqlx::Error> {
	sqlx::query_as(
		r#"
			SELECT favorite.user_id, favorite.job_id, favorite.created_at, job.titles
			FROM favorite
			INNER JOIN job ON job.id = favorite.job_id
			ORDER BY favorite.created_at DESC
		"#,
	)
	.fetch_all(executor)
	.await
}
