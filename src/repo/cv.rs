use sqlx::{postgres::PgArguments, query::QueryAs, PgExecutor, Postgres};
use uuid::Uuid;

use crate::model::{CreateCv, Cv};

pub const USER_FKEY: &str = "cv_user_id_fkey";

type CvQuery<'q> = QueryAs<'q, Postgres, Cv, PgArguments>;

/// Binds the editable fields in column order, starting after the parameters already bound.
fn bind_fields<'q>(query: CvQuery<'q>, cv: &'q CreateCv) -> CvQuery<'q> {
	query
		.bind(&cv.last_name)
		.bind(&cv.first_name)
		.bind(&cv.location)
		.bind(&cv.country)
		.bind(&cv.profession)
		.bind(&cv.work_experience)
		.bind(&cv.work_experience_duration)
		.bind(&cv.education)
		.bind(&cv.education_duration)
		.bind(&cv.skills)
		.bind(&cv.languages)
		.bind(&cv.certifications_and_licenses)
		.bind(&cv.links)
		.bind(&cv.facebook)
		.bind(&cv.instagram)
		.bind(&cv.twitter)
		.bind(&cv.linkedin)
}

/// Creates the user's CV, or overwrites it when one already exists.
pub async fn upsert<'e>(executor: impl PgExecutor<'e>, user_id: Uuid, cv: &CreateCv) -> Result<Cv, sqlx::Error> {
	let query = sqlx::query_as(
		r#"
			INSERT INTO cv (
				user_id, last_name, first_name, location, country, profession,
				work_experience, work_experience_duration, education, education_duration,
				skills, languages, certifications_and_licenses, links,
				facebook, instagram, twitter, linkedin
			)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
			ON CONFLICT (user_id) DO UPDATE SET
				last_name = EXCLUDED.last_name,
				first_name = EXCLUDED.first_name,
				location = EXCLUDED.location,
				country = EXCLUDED.country,
				profession = EXCLUDED.profession,
				work_experience = EXCLUDED.work_experience,
				work_experience_duration = EXCLUDED.work_experience_duration,
				education = EXCLUDED.education,
				education_duration = EXCLUDED.education_duration,
				skills = EXCLUDED.skills,
				languages = EXCLUDED.languages,
				certifications_and_licenses = EXCLUDED.certifications_and_licenses,
				links = EXCLUDED.links,
				facebook = EXCLUDED.facebook,
				instagram = EXCLUDED.instagram,
				twitter = EXCLUDED.twitter,
				linkedin = EXCLUDED.linkedin
			RETURNING *
		"#,
	)
	.bind(user_id);

	bind_fields(query, cv).fetch_one(executor).await
}

const UPDATE_FIELDS: &str = r#"
	last_name = $2,
	first_name = $3,
	location = $4,
	country = $5,
	profession = $6,
	work_experience = $7,
	work_experience_duration = $8,
	education = $9,
	education_duration = $10,
	skills = $11,
	languages = $12,
	certifications_and_licenses = $13,
	links = $14,
	facebook = $15,
	instagram = $16,
	twitter = $17,
	linkedin = $18
"#;

/// Overwrites a CV owned by `user_id`. Returns `None` when the user owns no CV with this id.
pub async fn update<'e>(
	executor: impl PgExecutor<'e>,
	user_id: Uuid,
	cv_id: Uuid,
	cv: &CreateCv,
) -> Result<Option<Cv>, sqlx::Error> {
	let sql = format!("UPDATE cv SET {UPDATE_FIELDS} WHERE user_id = $1 AND id = $19 RETURNING *");
	let query = sqlx::query_as(&sql).bind(user_id);

	bind_fields(query, cv).bind(cv_id).fetch_optional(executor).await
}

/// Overwrites the user's CV, if they have one.
pub async fn update_for_user<'e>(
	executor: impl PgExecutor<'e>,
	user_id: Uuid,
	cv: &CreateCv,
) -> Result<Option<Cv>, sqlx::Error> {
	let sql = format!("UPDATE cv SET {UPDATE_FIELDS} WHERE user_id = $1 RETURNING *");
	let query = sqlx::query_as(&sql).bind(user_id);

	bind_fields(query, cv).fetch_optional(executor).await
}

pub async fn find<'e>(
	executor: impl PgExecutor<'e>,
	user_id: Uuid,
	cv_id: Uuid,
) -> Result<Option<Cv>, sqlx::Error> {
	sqlx::query_as("SELECT * FROM cv WHERE user_id = $1 AND id = $2")
		.bind(user_id)
		.bind(cv_id)
		.fetch_optional(executor)
		.await
}

pub async fn find_by_user<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> Result<Option<Cv>, sqlx::Error> {
	sqlx::query_as("SELECT * FROM cv WHERE user_id = $1")
		.bind(user_id)
		.fetch_optional(executor)
		.await
}

pub async fn exists_for_user<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> Result<bool, sqlx::Error> {
	sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM cv WHERE user_id = $1)")
		.bind(user_id)
		.fetch_one(executor)
		.await
}

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Cv>, sqlx::Error> {
	sqlx::query_as("SELECT * FROM cv ORDER BY last_name, first_name")
		.fetch_all(executor)
		.await
}

pub async fn delete_for_user<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query("DELETE FROM cv WHERE user_id = $1")
		.bind(user_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}
