use sqlx::PgExecutor;
use uuid::Uuid;

use crate::model::{Job, JobListing};

pub const COMPANY_FKEY: &str = "job_company_id_fkey";
pub const USER_FKEY: &str = "job_user_id_fkey";

pub struct NewJob<'a> {
	pub company_id: Uuid,
	pub user_id: Uuid,
	pub mail: &'a str,
	pub num: Option<&'a str>,
	pub speciality: Option<&'a str>,
	pub description: Option<&'a str>,
	pub titles: Option<&'a str>,
}

/// Returns the id of the company with this name, creating it if needed.
pub async fn upsert_company<'e>(executor: impl PgExecutor<'e>, name: &str) -> Result<Uuid, sqlx::Error> {
	sqlx::query_scalar(
		r#"
			INSERT INTO company (name) VALUES ($1)
			ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
			RETURNING id
		"#,
	)
	.bind(name)
	.fetch_one(executor)
	.await
}

/// Fails with a violation of [`COMPANY_FKEY`] when the company does not exist.
pub async fn insert<'e>(executor: impl PgExecutor<'e>, job: NewJob<'_>) -> Result<Job, sqlx::Error> {
	sqlx::query_as(
		r#"
			INSERT INTO job (company_id, user_id, mail, num, speciality, description, titles)
			VALUES ($1, $2, $3, $4, $5, $6, $7)
			RETURNING *
		"#,
	)
	.bind(job.company_id)
	.bind(job.user_id)
	.bind(job.mail)
	.bind(job.num)
	.bind(job.speciality)
	.bind(job.description)
	.bind(job.titles)
	.fetch_one(executor)
	.await
}

/// All postings, newest first.
pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<JobListing>, sqlx::Error> {
	sqlx::query_as(
		r#"
			SELECT job.*, company.name AS company_name
			FROM job
			INNER JOIN company ON company.id = job.company_id
			ORDER BY job.created_at DESC
		"#,
	)
	.fetch_all(executor)
	.await
}

pub async fn find<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<JobListing>, sqlx::Error> {
	sqlx::query_as(
		r#"
			SELECT job.*, company.name AS company_name
			FROM job
			INNER JOIN company ON company.id = job.company_id
			WHERE job.id = $1
		"#,
	)
	.bind(id)
	.fetch_optional(executor)
	.await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query("DELETE FROM job WHERE id = $1")
		.bind(id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}
