use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Admin, Identity, Json, Path},
	model::{CreateCv, Cv},
	openapi::tag,
	repo,
	route::{Created, Notice},
	Database,
};

use super::{model, Error, RouteError};

/// Save CV
/// Creates the caller's CV, or overwrites every field of the existing one.
#[route(tag = tag::CV, secure)]
pub async fn create_cv(
	State(database): State<Database>,
	identity: Identity,
	Json(input): Json<CreateCv>,
) -> Result<Created<model::CvCreated>, RouteError> {
	let cv = repo::cv::upsert(&database, identity.user_id, &input)
		.await
		.map_err(|e| {
			if repo::violates(&e, repo::cv::USER_FKEY) {
				Error::UnknownAccount.into()
			} else {
				RouteError::from(e)
			}
		})?;

	Ok(Created(model::CvCreated { cv_id: cv.id }))
}

/// Update CV
/// Overwrites every field of one of the caller's CVs. Omitted fields are cleared.
#[route(tag = tag::CV, secure, response(status = 404, description = "The caller owns no CV with this id."))]
pub async fn update_cv(
	State(database): State<Database>,
	identity: Identity,
	Path(cv_id): Path<Uuid>,
	Json(input): Json<CreateCv>,
) -> Result<Json<Cv>, RouteError> {
	let cv = repo::cv::update(&database, identity.user_id, cv_id, &input)
		.await?
		.ok_or(Error::UnknownCv)?;

	Ok(Json(cv))
}

/// Check CV
/// Tells whether the caller has a CV.
#[route(tag = tag::CV, secure)]
pub async fn check_cv(
	State(database): State<Database>,
	identity: Identity,
) -> Result<Json<model::CvStatus>, RouteError> {
	let has_cv = repo::cv::exists_for_user(&database, identity.user_id).await?;

	Ok(Json(model::CvStatus { has_cv }))
}

/// Get CV
#[route(tag = tag::CV, secure, response(status = 404, description = "The caller owns no CV with this id."))]
pub async fn get_cv(
	State(database): State<Database>,
	identity: Identity,
	Path(cv_id): Path<Uuid>,
) -> Result<Json<Cv>, RouteError> {
	let cv = repo::cv::find(&database, identity.user_id, cv_id)
		.await?
		.ok_or(Error::UnknownCv)?;

	Ok(Json(cv))
}

/// List CVs
#[route(tag = tag::CV, secure, response(status = 403))]
pub async fn get_all_cvs(State(database): State<Database>, _: Admin) -> Result<Json<Vec<Cv>>, RouteError> {
	Ok(Json(repo::cv::list(&database).await?))
}

/// Delete CV
#[route(tag = tag::CV, secure, response(status = 404, description = "The caller has no CV."))]
pub async fn delete_cv(
	State(database): State<Database>,
	identity: Identity,
) -> Result<Json<Notice>, RouteError> {
	if !repo::cv::delete_for_user(&database, identity.user_id).await? {
		return Err(Error::UnknownCv.into());
	}

	Ok(Notice::json("CV deleted successfully"))
}
