use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Admin, Identity, Json, Multipart, Path},
	model::ApplicationView,
	notify::Notification,
	openapi::tag,
	repo,
	route::{Created, Notice},
	upload, AppState, Database,
};

use super::{missing_reference, model, Error, RouteError};

/// Apply to job
/// Records an application of the caller. Applying again bumps its counter.
#[route(tag = tag::JOB, secure, response(status = 404))]
pub async fn apply_to_job(
	State(database): State<Database>,
	identity: Identity,
	Json(input): Json<model::JobIdInput>,
) -> Result<Json<Notice>, RouteError> {
	let application = repo::application::apply(&database, input.job_id, identity.user_id)
		.await
		.map_err(|e| missing_reference(e, repo::application::JOB_FKEY, repo::application::USER_FKEY))?;

	tracing::info!(
		job = %input.job_id,
		count = application.apply_count,
		monotonic_counter.applications = 1,
		"applied to job"
	);

	Ok(Notice::json("Applied to job successfully"))
}

/// List all applications
#[route(tag = tag::JOB, secure, response(status = 403))]
pub async fn get_applications(
	State(database): State<Database>,
	_: Admin,
) -> Result<Json<Vec<ApplicationView>>, RouteError> {
	Ok(Json(repo::application::list(&database).await?))
}

/// Get applications of a user
/// Only the user themself or an admin may see them.
#[route(tag = tag::JOB, secure, response(status = 403))]
pub async fn get_user_applications(
	State(database): State<Database>,
	identity: Identity,
	Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationView>>, RouteError> {
	if !identity.can_access(user_id) {
		return Err(Error::Forbidden.into());
	}

	Ok(Json(repo::application::for_user(&database, user_id).await?))
}

/// Get applications to a job
#[route(tag = tag::JOB)]
pub async fn get_job_applications(
	State(database): State<Database>,
	Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationView>>, RouteError> {
	Ok(Json(repo::application::for_job(&database, job_id).await?))
}

/// Send application
/// Forwards an application to a recruiter from a multipart form
/// (`description`, `mail`, `email` and an optional `cvFile` file). The file is
/// stored and linked from the mail.
pub async fn send_mail(
	State(state): State<AppState>,
	Multipart(multipart): Multipart,
) -> Result<Created<Notice>, RouteError> {
	let mut form = upload::read_form(multipart, "cvFile").await?;
	let input = form.deserialize::<model::SendMailInput>()?;
	validator::Validate::validate(&input)?;

	let cv_file = match form.take_file() {
		Some(file) => Some(state.uploads.store(&file).await?),
		None => None,
	};

	let result = state
		.notifier
		.send(
			&input.mail,
			Notification::JobApplication {
				applicant_email: &input.email,
				description: &input.description,
				cv_file: cv_file.as_deref(),
			},
		)
		.await;

	state.uploads.discard_on_error(cv_file.as_deref(), result).await?;

	Ok(Created(Notice {
		message: "Mail sent successfully".into(),
	}))
}
