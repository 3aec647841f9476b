use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Admin, Identity, Json, Path},
	model::JobFavorite,
	openapi::tag,
	repo,
	route::Notice,
	Database,
};

use super::{missing_reference, model, Error, RouteError};

/// Add favorite
/// Bookmarks a job for the caller. Bookmarking a job twice has no effect.
#[route(tag = tag::JOB, secure, response(status = 404))]
pub async fn add_to_favorites(
	State(database): State<Database>,
	identity: Identity,
	Json(input): Json<model::JobIdInput>,
) -> Result<Json<Notice>, RouteError> {
	let added = repo::favorite::add(&database, identity.user_id, input.job_id)
		.await
		.map_err(|e| missing_reference(e, repo::favorite::JOB_FKEY, repo::favorite::USER_FKEY))?;

	if added {
		tracing::info!(job = %input.job_id, monotonic_counter.favorites_added = 1, "job bookmarked");
	}

	Ok(Notice::json("Job added to favorites successfully"))
}

/// Get own favorites
#[route(tag = tag::JOB, secure)]
pub async fn get_favorites(
	State(database): State<Database>,
	identity: Identity,
) -> Result<Json<model::Favorites>, RouteError> {
	let favorites = repo::favorite::for_user(&database, identity.user_id).await?;

	Ok(Json(model::Favorites { favorites }))
}

/// Get favorites of a user
/// Only the user themself or an admin may see them.
#[route(tag = tag::JOB, secure, response(status = 403))]
pub async fn get_user_favorites(
	State(database): State<Database>,
	identity: Identity,
	Path(user_id): Path<Uuid>,
) -> Result<Json<model::Favorites>, RouteError> {
	if !identity.can_access(user_id) {
		return Err(Error::Forbidden.into());
	}

	let favorites = repo::favorite::for_user(&database, user_id).await?;

	Ok(Json(model::Favorites { favorites }))
}

/// Get users that bookmarked a job
#[route(tag = tag::JOB)]
pub async fn get_job_favorites(
	State(database): State<Database>,
	Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<JobFavorite>>, RouteError> {
	Ok(Json(repo::favorite::for_job(&database, job_id).await?))
}

/// List all favorites
#[route(tag = tag::JOB, secure, response(status = 403))]
pub async fn get_all_favorites(
	State(database): State<Database>,
	_: Admin,
) -> Result<Json<model::AllFavorites>, RouteError> {
	let all_favorites = repo::favorite::list(&database).await?;

	Ok(Json(model::AllFavorites { all_favorites }))
}
