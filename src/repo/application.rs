use sqlx::PgExecutor;
use uuid::Uuid;

use crate::model::{Application, ApplicationView};

pub const JOB_FKEY: &str = "application_job_id_fkey";
pub const USER_FKEY: &str = "application_user_id_fkey";

/// Records an application, or bumps the counter and timestamp of an existing one.
pub async fn apply<'e>(executor: impl PgExecutor<'e>, job_id: Uuid, user_id: Uuid) -> Result<Application, sqlx::Error> {
	sqlx::query_as(
		r#"
			INSERT INTO application (job_id, user_id) VALUES ($1, $2)
			ON CONFLICT (job_id, user_id) DO UPDATE SET
				apply_count = application.apply_count + 1,
				applied_at = NOW()
			RETURNING *
		"#,
	)
	.bind(job_id)
	.bind(user_id)
	.fetch_one(executor)
	.await
}

// Every listing shares the same projection, only the filter differs.
const SELECT_VIEW: &str = r#"
	SELECT application.*, u.name AS user_name, job.titles AS job_title
	FROM application
	INNER JOIN "user" u ON u.id = application.user_id
	INNER JOIN job ON job.id = application.job_id
"#;

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<ApplicationView>, sqlx::Error> {
	let sql = format!("{SELECT_VIEW} ORDER BY application.applied_at DESC");

	sqlx::query_as(&sql).fetch_all(executor).await
}

pub async fn for_user<'e>(
	executor: impl PgExecutor<'e>,
	user_id: Uuid,
) -> Result<Vec<ApplicationView>, sqlx::Error> {
	let sql = format!("{SELECT_VIEW} WHERE application.user_id = $1 ORDER BY application.applied_at DESC");

	sqlx::query_as(&sql).bind(user_id).fetch_all(executor).await
}

pub async fn for_job<'e>(executor: impl PgExecutor<'e>, job_id: Uuid) -> Result<Vec<ApplicationView>, sqlx::Error> {
	let sql = format!("{SELECT_VIEW} WHERE application.job_id = $1 ORDER BY application.applied_at DESC");

	sqlx::query_as(&sql).bind(job_id).fetch_all(executor).await
}
