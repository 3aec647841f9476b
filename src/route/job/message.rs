//! The public contact form and its admin inbox.

use axum::extract::State;
use macros::route;

use crate::{
	extract::{Admin, Json},
	model::{ContactMessage, CreateContactMessage},
	openapi::tag,
	repo::{self, audit::Action},
	route::{Created, Notice},
	Database,
};

use super::{model, Error, RouteError};

/// Send contact message
#[route(tag = tag::JOB)]
pub async fn save_message(
	State(database): State<Database>,
	Json(input): Json<CreateContactMessage>,
) -> Result<Created<model::MessageSaved>, RouteError> {
	let message = repo::message::insert(&database, &input).await?;

	tracing::info!(id = %message.id, monotonic_counter.contact_messages = 1, "contact message saved");

	Ok(Created(model::MessageSaved {
		message: "Message saved successfully",
		message_id: message.id,
	}))
}

/// List contact messages
#[route(tag = tag::JOB, secure, response(status = 403))]
pub async fn get_messages(
	State(database): State<Database>,
	_: Admin,
) -> Result<Json<Vec<ContactMessage>>, RouteError> {
	Ok(Json(repo::message::list(&database).await?))
}

/// Delete contact message
#[route(tag = tag::JOB, secure, response(status = 403), response(status = 404))]
pub async fn delete_message(
	State(database): State<Database>,
	Admin(admin): Admin,
	Json(input): Json<model::MessageIdInput>,
) -> Result<Json<Notice>, RouteError> {
	let mut tx = database.begin().await?;

	if !repo::message::delete(&mut *tx, input.message_id).await? {
		return Err(Error::UnknownMessage.into());
	}

	repo::audit::record(
		&mut *tx,
		admin.user_id,
		Action::DeleteMessage,
		&input.message_id.to_string(),
	)
	.await?;

	tx.commit().await?;

	Ok(Notice::json("Message deleted successfully"))
}
