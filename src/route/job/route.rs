use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Admin, Identity, Json, Path},
	model::{AuditEntry, JobListing},
	openapi::tag,
	repo::{self, audit::Action},
	route::{Created, Notice},
	Database,
};

use super::{model, Error, RouteError};

fn new_job<'a>(company_id: Uuid, user_id: Uuid, input: &'a model::JobInput) -> repo::job::NewJob<'a> {
	repo::job::NewJob {
		company_id,
		user_id,
		mail: &input.mail,
		num: input.num.as_deref(),
		speciality: input.speciality.as_deref(),
		description: input.description.as_deref(),
		titles: input.titles.as_deref(),
	}
}

fn job_insert_error(error: sqlx::Error) -> RouteError {
	if repo::violates(&error, repo::job::COMPANY_FKEY) {
		Error::UnknownCompany.into()
	} else if repo::violates(&error, repo::job::USER_FKEY) {
		Error::UnknownAccount.into()
	} else {
		error.into()
	}
}

/// Post job
/// Posts a job, creating its company when no company has this name yet.
#[route(tag = tag::JOB, secure)]
pub async fn add_job(
	State(database): State<Database>,
	identity: Identity,
	Json(input): Json<model::AddJobInput>,
) -> Result<Created<model::JobCreated>, RouteError> {
	let mut tx = database.begin().await?;

	let company_id = repo::job::upsert_company(&mut *tx, &input.company_name).await?;
	let job = repo::job::insert(&mut *tx, new_job(company_id, identity.user_id, &input.job))
		.await
		.map_err(job_insert_error)?;

	tx.commit().await?;

	tracing::info!(job = %job.id, company = %company_id, monotonic_counter.jobs_posted = 1, "job posted");

	Ok(Created(model::JobCreated { job_id: job.id }))
}

/// Post job for a company
/// Posts a job for an existing company.
#[route(tag = tag::JOB, secure, response(status = 404, description = "The company does not exist."))]
pub async fn create_job(
	State(database): State<Database>,
	identity: Identity,
	Json(input): Json<model::CreateJobInput>,
) -> Result<Created<model::JobCreated>, RouteError> {
	let job = repo::job::insert(&database, new_job(input.company_id, identity.user_id, &input.job))
		.await
		.map_err(job_insert_error)?;

	tracing::info!(job = %job.id, monotonic_counter.jobs_posted = 1, "job posted");

	Ok(Created(model::JobCreated { job_id: job.id }))
}

/// List jobs
/// Returns every job with its company name, newest first.
#[route(tag = tag::JOB)]
pub async fn get_jobs(State(database): State<Database>) -> Result<Json<Vec<JobListing>>, RouteError> {
	Ok(Json(repo::job::list(&database).await?))
}

/// Get job
#[route(tag = tag::JOB, response(status = 404))]
pub async fn get_job(
	State(database): State<Database>,
	Path(job_id): Path<Uuid>,
) -> Result<Json<JobListing>, RouteError> {
	let job = repo::job::find(&database, job_id).await?.ok_or(Error::UnknownJob)?;

	Ok(Json(job))
}

/// Delete job
/// Deletes a job with its favorites, applications and comments.
#[route(tag = tag::JOB, secure, response(status = 403), response(status = 404))]
pub async fn delete_job(
	State(database): State<Database>,
	Admin(admin): Admin,
	Json(input): Json<model::JobIdInput>,
) -> Result<Json<Notice>, RouteError> {
	let mut tx = database.begin().await?;

	if !repo::job::delete(&mut *tx, input.job_id).await? {
		return Err(Error::UnknownJob.into());
	}

	repo::audit::record(&mut *tx, admin.user_id, Action::DeleteJob, &input.job_id.to_string()).await?;

	tx.commit().await?;

	Ok(Notice::json("Job deleted successfully"))
}

/// Get moderation logs
/// Returns every moderation action, newest first.
#[route(tag = tag::JOB, secure, response(status = 403))]
pub async fn get_logs(State(database): State<Database>, _: Admin) -> Result<Json<Vec<AuditEntry>>, RouteError> {
	Ok(Json(repo::audit::list(&database).await?))
}
