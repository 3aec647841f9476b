use axum::extract::State;
use chrono::{Duration, Utc};
use macros::route;
use uuid::Uuid;
use validator::Validate;

use crate::{
	cookie::ClearToken,
	credential,
	extract::{Identity, Json, Multipart, Path},
	model::{self as entity, Role},
	notify::Notification,
	openapi::tag,
	repo,
	route::{Created, EmailInput, Notice},
	upload, AppState, Database,
};

use super::{model, Error, RouteError};

/// How long a password reset token stays valid.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// Register account
/// Registers an unverified account from a multipart form (`name`, `email`,
/// `password`, `motivation_letter` and an optional `photo` file) and emails a
/// verification link. Nothing is stored if that email cannot be sent.
pub async fn register(
	State(state): State<AppState>,
	Multipart(multipart): Multipart,
) -> Result<Created<Notice>, RouteError> {
	let mut form = upload::read_form(multipart, "photo").await?;
	let input = form.deserialize::<model::RegisterInput>()?;
	input.validate()?;

	let photo = match form.take_file() {
		Some(file) => Some(state.uploads.store(&file).await?),
		None => None,
	};

	let result = create_account(&state, &input, photo.as_deref()).await;
	let user_id = state.uploads.discard_on_error(photo.as_deref(), result).await?;

	tracing::info!(user = %user_id, monotonic_counter.registrations = 1, "user registered");

	Ok(Created(Notice {
		message: "User registered successfully".into(),
	}))
}

/// Inserts the account and sends its verification mail in one transaction.
async fn create_account(
	state: &AppState,
	input: &model::RegisterInput,
	photo: Option<&str>,
) -> Result<Uuid, RouteError> {
	let password_hash = credential::hash_password(&state.hasher, &input.password)?;
	let verification_token = credential::opaque_token();

	let mut tx = state.database.begin().await?;

	let user_id = repo::user::insert(
		&mut *tx,
		repo::user::NewUser {
			name: &input.name,
			email: &input.email,
			password_hash: &password_hash,
			motivation_letter: input.motivation_letter.as_deref(),
			photo,
			verification_token: &verification_token,
		},
	)
	.await
	.map_err(|e| {
		if repo::violates(&e, repo::user::EMAIL_KEY) {
			Error::EmailTaken.into()
		} else {
			RouteError::from(e)
		}
	})?;

	state
		.notifier
		.send(
			&input.email,
			Notification::Verification {
				token: &verification_token,
			},
		)
		.await?;

	tx.commit().await?;

	Ok(user_id)
}

/// Verify email
/// Consumes a verification token, allowing its owner to log in.
#[route(tag = tag::AUTH, response(status = 404, description = "Unknown or already used token."))]
pub async fn verify(
	State(database): State<Database>,
	Path(token): Path<String>,
) -> Result<Json<Notice>, RouteError> {
	let user_id = repo::user::verify_email(&database, &token)
		.await?
		.ok_or(Error::InvalidVerificationToken)?;

	tracing::info!(user = %user_id, "email verified");

	Ok(Notice::json("Email verified successfully"))
}

/// Checks credentials in the order that decides which error the caller sees.
async fn authenticate(state: &AppState, input: &model::LoginInput) -> Result<entity::User, RouteError> {
	let user = repo::user::find_by_email(&state.database, &input.email)
		.await?
		.ok_or(Error::InvalidCredentials)?;

	if !user.verified_email {
		return Err(Error::EmailNotVerified.into());
	}

	if !credential::verify_password(&state.hasher, &input.password, &user.password)? {
		return Err(Error::InvalidCredentials.into());
	}

	if !user.active {
		return Err(Error::AccountDeactivated.into());
	}

	Ok(user)
}

/// Log in
/// Exchanges an email and password for a bearer token.
#[route(
	tag = tag::AUTH,
	response(status = 200, description = "Logged in successfully.", shape = "Json<model::TokenResponse>"),
	response(status = 401, description = "Invalid credentials or unverified email."),
	response(status = 403, description = "The account is deactivated.")
)]
pub async fn login(
	State(state): State<AppState>,
	Json(input): Json<model::LoginInput>,
) -> Result<Json<model::TokenResponse>, RouteError> {
	let user = authenticate(&state, &input).await?;
	let token = state.tokens.issue(user.id, user.role)?;

	tracing::info!(user = %user.id, "user logged in");

	Ok(Json(model::TokenResponse { token }))
}

/// Log in as admin
/// Same as logging in, but only succeeds for admins.
#[route(
	tag = tag::AUTH,
	response(status = 200, description = "Logged in successfully.", shape = "Json<model::TokenResponse>"),
	response(status = 401, description = "Invalid credentials or unverified email."),
	response(status = 403, description = "The account is not an admin or is deactivated.")
)]
pub async fn admin_login(
	State(state): State<AppState>,
	Json(input): Json<model::LoginInput>,
) -> Result<Json<model::TokenResponse>, RouteError> {
	let user = authenticate(&state, &input).await?;

	if user.role != Role::Admin {
		return Err(Error::NotAdmin.into());
	}

	let token = state.tokens.issue(user.id, user.role)?;

	tracing::info!(user = %user.id, "admin logged in");

	Ok(Json(model::TokenResponse { token }))
}

/// Request password reset
/// Stores a reset token valid for one hour and emails it to the user.
#[route(tag = tag::AUTH, response(status = 400, description = "No user has this email."))]
pub async fn request_password_reset(
	State(state): State<AppState>,
	Json(input): Json<EmailInput>,
) -> Result<Json<Notice>, RouteError> {
	let user = repo::user::find_by_email(&state.database, &input.email)
		.await?
		.ok_or(Error::UnknownEmail)?;

	let token = credential::opaque_token();
	repo::user::set_reset_token(&state.database, user.id, &token, Utc::now() + RESET_TOKEN_TTL).await?;

	if let Err(error) = state
		.notifier
		.send(&user.email, Notification::PasswordReset { token: &token })
		.await
	{
		tracing::warn!(user = %user.id, %error, "failed to send password reset email");
	}

	Ok(Notice::json("Password reset instructions sent to your email."))
}

/// Reset password
/// Sets a new password using a reset token. The token can only be used once.
#[route(tag = tag::AUTH, response(status = 400, description = "Unknown, used or expired token."))]
pub async fn reset_password(
	State(state): State<AppState>,
	Path(token): Path<String>,
	Json(input): Json<model::ResetPasswordInput>,
) -> Result<Json<Notice>, RouteError> {
	let mut tx = state.database.begin().await?;

	let user = repo::user::find_by_reset_token_for_update(&mut *tx, &token)
		.await?
		.filter(|user| credential::is_unexpired(user.reset_token_expires_at, Utc::now()))
		.ok_or(Error::InvalidResetToken)?;

	let password_hash = credential::hash_password(&state.hasher, &input.new_password)?;
	repo::user::set_password(&mut *tx, user.id, &password_hash).await?;

	tx.commit().await?;

	tracing::info!(user = %user.id, "password reset");

	Ok(Notice::json("Password reset successful"))
}

/// Get profile
/// Returns the authenticated user together with their CV.
#[route(tag = tag::AUTH, secure, response(status = 404, description = "The user no longer exists."))]
pub async fn get_profile(
	State(database): State<Database>,
	identity: Identity,
) -> Result<Json<entity::Profile>, RouteError> {
	let user = repo::user::find_by_id(&database, identity.user_id)
		.await?
		.ok_or(Error::UserNotFound)?;
	let cv = repo::cv::find_by_user(&database, user.id).await?;

	Ok(Json(entity::Profile { user, cv }))
}

/// Update profile
/// Updates the photo (when a `photo` file is sent), the motivation letter
/// and, if the user has one, every CV field, from a multipart form.
pub async fn update_profile(
	State(state): State<AppState>,
	identity: Identity,
	Multipart(multipart): Multipart,
) -> Result<Json<Notice>, RouteError> {
	let mut form = upload::read_form(multipart, "photo").await?;
	let input = form.deserialize::<model::ProfileInput>()?;
	input.cv.validate()?;

	let photo = match form.take_file() {
		Some(file) => Some(state.uploads.store(&file).await?),
		None => None,
	};

	let result = save_profile(&state.database, identity, &input, photo.as_deref()).await;
	state.uploads.discard_on_error(photo.as_deref(), result).await?;

	Ok(Notice::json("Profile updated successfully"))
}

async fn save_profile(
	database: &Database,
	identity: Identity,
	input: &model::ProfileInput,
	photo: Option<&str>,
) -> Result<(), RouteError> {
	let mut tx = database.begin().await?;

	repo::user::update_profile(&mut *tx, identity.user_id, photo, input.motivation_letter.as_deref())
		.await?
		.ok_or(Error::UserNotFound)?;

	repo::cv::update_for_user(&mut *tx, identity.user_id, &input.cv).await?;

	tx.commit().await?;

	Ok(())
}

/// Delete profile
/// Deletes the authenticated user with their CV, favorites, applications
/// and comments. Jobs they posted are kept. This action is irreversible.
#[route(tag = tag::AUTH, secure, response(status = 404, description = "The user no longer exists."))]
pub async fn delete_profile(
	State(database): State<Database>,
	identity: Identity,
) -> Result<ClearToken<Notice>, RouteError> {
	if !repo::user::delete(&database, identity.user_id).await? {
		return Err(Error::UserNotFound.into());
	}

	tracing::info!(user = %identity.user_id, "profile deleted");

	Ok(ClearToken(Notice {
		message: "Profile deleted successfully".into(),
	}))
}

/// Log out
/// Clears the token cookie. Bearer tokens stay valid until they expire.
#[route(tag = tag::AUTH)]
pub async fn logout() -> ClearToken<Notice> {
	ClearToken(Notice {
		message: "Logout successful".into(),
	})
}
