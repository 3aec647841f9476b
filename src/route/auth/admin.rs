//! User moderation. Every route here requires an admin token, and every
//! change is written to the audit log in the same transaction.

use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Admin, Json, Path, Query},
	model::{self as entity, Role},
	openapi::tag,
	repo::{self, audit::Action},
	route::{EmailInput, Notice},
	Database,
};

use super::{Error, RouteError};

async fn profile_of(database: &Database, user: Option<entity::User>) -> Result<entity::Profile, RouteError> {
	let user = user.ok_or(Error::UserNotFound)?;
	let cv = repo::cv::find_by_user(database, user.id).await?;

	Ok(entity::Profile { user, cv })
}

/// Delete user
/// Deletes the user with this email, along with their CV, favorites,
/// applications and comments.
#[route(tag = tag::AUTH, secure, response(status = 403), response(status = 404))]
pub async fn delete_user(
	State(database): State<Database>,
	Admin(admin): Admin,
	Json(input): Json<EmailInput>,
) -> Result<Json<Notice>, RouteError> {
	let mut tx = database.begin().await?;

	repo::user::delete_by_email(&mut *tx, &input.email)
		.await?
		.ok_or(Error::UserNotFound)?;
	repo::audit::record(&mut *tx, admin.user_id, Action::DeleteUser, &input.email).await?;

	tx.commit().await?;

	Ok(Notice::json("User deleted successfully"))
}

/// List users
/// Lists every user with the public parts of their CV.
#[route(tag = tag::AUTH, secure, response(status = 403))]
pub async fn search(
	State(database): State<Database>,
	_: Admin,
) -> Result<Json<Vec<entity::UserSummary>>, RouteError> {
	Ok(Json(repo::user::list_with_cv(&database).await?))
}

/// Find user by email
#[route(tag = tag::AUTH, secure, response(status = 403), response(status = 404))]
pub async fn search_user(
	State(database): State<Database>,
	_: Admin,
	Query(input): Query<EmailInput>,
) -> Result<Json<entity::Profile>, RouteError> {
	let user = repo::user::find_by_email(&database, &input.email).await?;

	Ok(Json(profile_of(&database, user).await?))
}

/// Find user by id
#[route(tag = tag::AUTH, secure, response(status = 403), response(status = 404))]
pub async fn search_user_by_id(
	State(database): State<Database>,
	_: Admin,
	Path(user_id): Path<Uuid>,
) -> Result<Json<entity::Profile>, RouteError> {
	let user = repo::user::find_by_id(&database, user_id).await?;

	Ok(Json(profile_of(&database, user).await?))
}

/// Promote user
/// Grants the admin role to the user with this email.
#[route(tag = tag::AUTH, secure, response(status = 403), response(status = 404))]
pub async fn update_role(
	State(database): State<Database>,
	Admin(admin): Admin,
	Json(input): Json<EmailInput>,
) -> Result<Json<Notice>, RouteError> {
	let mut tx = database.begin().await?;

	repo::user::set_role(&mut *tx, &input.email, Role::Admin)
		.await?
		.ok_or(Error::UserNotFound)?;
	repo::audit::record(&mut *tx, admin.user_id, Action::PromoteUser, &input.email).await?;

	tx.commit().await?;

	Ok(Notice::json("User role updated successfully"))
}

/// Toggle role
/// Switches the user with this email between ordinary and admin.
///
/// Tokens already issued keep the previous role until they expire.
#[route(tag = tag::AUTH, secure, response(status = 403), response(status = 404))]
pub async fn toggle_role(
	State(database): State<Database>,
	Admin(admin): Admin,
	Json(input): Json<EmailInput>,
) -> Result<Json<Notice>, RouteError> {
	let mut tx = database.begin().await?;

	let role = repo::user::toggle_role(&mut *tx, &input.email)
		.await?
		.ok_or(Error::UserNotFound)?;
	repo::audit::record(&mut *tx, admin.user_id, Action::ToggleRole, &input.email).await?;

	tx.commit().await?;

	tracing::debug!(email = %input.email, role = ?role, "role toggled");

	Ok(Notice::json("User role toggled successfully"))
}

async fn set_active(
	database: &Database,
	actor_id: Uuid,
	email: &str,
	active: bool,
) -> Result<(), RouteError> {
	let action = if active {
		Action::ActivateUser
	} else {
		Action::DeactivateUser
	};

	let mut tx = database.begin().await?;

	repo::user::set_active(&mut *tx, email, active)
		.await?
		.ok_or(Error::UserNotFound)?;
	repo::audit::record(&mut *tx, actor_id, action, email).await?;

	tx.commit().await?;

	Ok(())
}

/// Deactivate user
/// Prevents the user with this email from logging in.
#[route(tag = tag::AUTH, secure, response(status = 403), response(status = 404))]
pub async fn deactivate(
	State(database): State<Database>,
	Admin(admin): Admin,
	Json(input): Json<EmailInput>,
) -> Result<Json<Notice>, RouteError> {
	set_active(&database, admin.user_id, &input.email, false).await?;

	Ok(Notice::json("User deactivated successfully"))
}

/// Activate user
/// Allows a deactivated user to log in again.
#[route(tag = tag::AUTH, secure, response(status = 403), response(status = 404))]
pub async fn activate(
	State(database): State<Database>,
	Admin(admin): Admin,
	Json(input): Json<EmailInput>,
) -> Result<Json<Notice>, RouteError> {
	set_active(&database, admin.user_id, &input.email, true).await?;

	Ok(Notice::json("User activated successfully"))
}
