use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Admin, Identity, Json, Path},
	model::{CommentView, CreateComment},
	openapi::tag,
	repo::{self, audit::Action},
	route::{Created, Notice},
	Database,
};

use super::{missing_reference, model, Error, RouteError};

/// Get comments of a job
/// Newest first, with the author's photo and names from their CV.
#[route(tag = tag::JOB)]
pub async fn get_comments(
	State(database): State<Database>,
	Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<CommentView>>, RouteError> {
	Ok(Json(repo::comment::for_job(&database, job_id).await?))
}

/// Add comment
#[route(tag = tag::JOB, secure, response(status = 404))]
pub async fn add_comment(
	State(database): State<Database>,
	identity: Identity,
	Path(job_id): Path<Uuid>,
	Json(input): Json<CreateComment>,
) -> Result<Created<model::CommentAdded>, RouteError> {
	let comment = repo::comment::insert(&database, job_id, identity.user_id, &input.comment_text)
		.await
		.map_err(|e| missing_reference(e, repo::comment::JOB_FKEY, repo::comment::USER_FKEY))?;

	Ok(Created(model::CommentAdded {
		message: "Comment added successfully",
		comment,
	}))
}

/// Delete comment
#[route(tag = tag::JOB, secure, response(status = 403), response(status = 404))]
pub async fn delete_comment(
	State(database): State<Database>,
	Admin(admin): Admin,
	Json(input): Json<model::CommentIdInput>,
) -> Result<Json<Notice>, RouteError> {
	let mut tx = database.begin().await?;

	if !repo::comment::delete(&mut *tx, input.comment_id).await? {
		return Err(Error::UnknownComment.into());
	}

	repo::audit::record(
		&mut *tx,
		admin.user_id,
		Action::DeleteComment,
		&input.comment_id.to_string(),
	)
	.await?;

	tx.commit().await?;

	Ok(Notice::json("Comment deleted successfully"))
}

/// List all comments
#[route(tag = tag::JOB, secure, response(status = 403))]
pub async fn all_comments(State(database): State<Database>, _: Admin) -> Result<Json<Vec<CommentView>>, RouteError> {
	Ok(Json(repo::comment::list(&database).await?))
}
