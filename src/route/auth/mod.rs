use aide::axum::{
	routing::{delete_with, get_with, post_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod admin;
pub mod model;
pub mod route;

/// An error that can occur during authentication or user moderation.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid credentials")]
	InvalidCredentials,
	#[error("Email not verified. Please verify your email before logging in.")]
	EmailNotVerified,
	#[error("Account deactivated")]
	AccountDeactivated,
	#[error("Unauthorized")]
	NotAdmin,
	#[error("Email already exists")]
	EmailTaken,
	#[error("Invalid verification token")]
	InvalidVerificationToken,
	#[error("User not found")]
	UnknownEmail,
	#[error("Invalid or expired reset token")]
	InvalidResetToken,
	#[error("User not found")]
	UserNotFound,
}

pub type RouteError = error::RouteError<Error>;

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidCredentials | Self::EmailNotVerified => StatusCode::UNAUTHORIZED,
			Self::AccountDeactivated | Self::NotAdmin => StatusCode::FORBIDDEN,
			Self::EmailTaken | Self::UnknownEmail | Self::InvalidResetToken => StatusCode::BAD_REQUEST,
			Self::InvalidVerificationToken | Self::UserNotFound => StatusCode::NOT_FOUND,
		}
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use admin::*;
	use route::*;

	ApiRouter::new()
		.route("/register", axum::routing::post(register))
		.api_route("/verify/:token", get_with(verify, verify_docs))
		.api_route("/login", post_with(login, login_docs))
		.api_route("/admin-login", post_with(admin_login, admin_login_docs))
		.api_route(
			"/request-password-reset",
			post_with(request_password_reset, request_password_reset_docs),
		)
		.api_route(
			"/reset-password/:token",
			post_with(reset_password, reset_password_docs),
		)
		.api_route(
			"/profile",
			get_with(get_profile, get_profile_docs).delete_with(delete_profile, delete_profile_docs),
		)
		.route("/profile", axum::routing::put(update_profile))
		.api_route("/logout", post_with(logout, logout_docs))
		.api_route("/delete", delete_with(delete_user, delete_user_docs))
		.api_route("/search", get_with(search, search_docs))
		.api_route("/search_user", get_with(search_user, search_user_docs))
		.api_route(
			"/search_user/:user_id",
			get_with(search_user_by_id, search_user_by_id_docs),
		)
		.api_route("/update-role", put_with(update_role, update_role_docs))
		.api_route("/toggle-role", put_with(toggle_role, toggle_role_docs))
		.api_route("/deactivate", put_with(deactivate, deactivate_docs))
		.api_route("/activate", put_with(activate, activate_docs))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_admin_routes_reject_ordinary_users() {
		let app = lazy_app();
		let token = bearer(Role::Ordinary);

		let response = app.get("/api/auth/search").add_header(AUTHORIZATION, token.clone()).await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.get("/api/auth/search_user")
			.add_query_param("email", "a@x.com")
			.add_header(AUTHORIZATION, token.clone())
			.await;

		assert_eq!(response.status_code(), 403);

		for path in ["/api/auth/update-role", "/api/auth/toggle-role", "/api/auth/deactivate", "/api/auth/activate"] {
			let response = app
				.put(path)
				.add_header(AUTHORIZATION, token.clone())
				.json(&json!({ "email": "a@x.com" }))
				.await;

			assert_eq!(response.status_code(), 403, "{path}");
		}

		let response = app
			.delete("/api/auth/delete")
			.add_header(AUTHORIZATION, token)
			.json(&json!({ "email": "a@x.com" }))
			.await;

		assert_eq!(response.status_code(), 403);
	}

	#[tokio::test]
	async fn test_admin_routes_reject_anonymous_callers() {
		let app = lazy_app();

		assert_eq!(app.get("/api/auth/search").await.status_code(), 401);
		assert_eq!(app.get("/api/auth/profile").await.status_code(), 401);
		assert_eq!(
			app.put("/api/auth/toggle-role")
				.json(&json!({ "email": "a@x.com" }))
				.await
				.status_code(),
			401
		);
	}

	#[tokio::test]
	async fn test_logout_clears_cookie() {
		let response = lazy_app().post("/api/auth/logout").await;

		assert_eq!(response.status_code(), 200);
		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.starts_with("jwtToken="));
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_signup_flow(pool: Database) {
		let (app, mailer) = app(pool.clone());

		let response = app.post("/api/auth/register").multipart(registration("A", "a@x.com", "pw")).await;

		assert_eq!(response.status_code(), 201);

		let response = app
			.post("/api/auth/login")
			.json(&json!({ "email": "a@x.com", "password": "pw" }))
			.await;

		assert_eq!(response.status_code(), 401);

		let token: String = sqlx::query_scalar(r#"SELECT verification_token FROM "user" WHERE email = $1"#)
			.bind("a@x.com")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert!(mailer.sent()[0].html.contains(&token));

		let response = app.get("/api/auth/verify/not-the-token").await;

		assert_eq!(response.status_code(), 404);

		let response = app.get(&format!("/api/auth/verify/{token}")).await;

		assert_eq!(response.status_code(), 200);

		let response = app.get(&format!("/api/auth/verify/{token}")).await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.post("/api/auth/login")
			.json(&json!({ "email": "a@x.com", "password": "pw" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let bearer = format!("Bearer {}", response.json::<Value>()["token"].as_str().unwrap());
		let response = app
			.get("/api/auth/profile")
			.add_header(AUTHORIZATION, bearer.parse().unwrap())
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["name"], "A");
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_duplicate_email_is_rejected(pool: Database) {
		let (app, _) = app(pool.clone());

		let response = app.post("/api/auth/register").multipart(registration("A", "a@x.com", "pw")).await;

		assert_eq!(response.status_code(), 201);

		let (file_name, photo) = unique_file();
		let response = app
			.post("/api/auth/register")
			.multipart(registration("B", "a@x.com", "pw2").add_part("photo", photo))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["error"], "Email already exists");
		assert_eq!(stored_uploads(&file_name), 0);

		let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "user""#)
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(count, 1);
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_registration_rolls_back_when_mail_fails(pool: Database) {
		let app = app_with_mailer(pool.clone(), failing_mailer());

		let response = app.post("/api/auth/register").multipart(registration("A", "a@x.com", "pw")).await;

		assert_eq!(response.status_code(), 500);
		assert_eq!(response.json::<Value>()["error"], "An error occurred");

		let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "user""#)
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(count, 0);
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_password_reset_expiry(pool: Database) {
		let (app, _) = app(pool.clone());
		let user_id = insert_user(&pool, "a@x.com", "old", Role::Ordinary).await;

		let response = app
			.post("/api/auth/request-password-reset")
			.json(&json!({ "email": "unknown@x.com" }))
			.await;

		assert_eq!(response.status_code(), 400);

		let response = app
			.post("/api/auth/request-password-reset")
			.json(&json!({ "email": "a@x.com" }))
			.await;

		assert_eq!(response.status_code(), 200);

		sqlx::query(r#"UPDATE "user" SET reset_token = 'expired', reset_token_expires_at = NOW() - INTERVAL '1 second' WHERE id = $1"#)
			.bind(user_id)
			.execute(&pool)
			.await
			.unwrap();

		let response = app
			.post("/api/auth/reset-password/expired")
			.json(&json!({ "newPassword": "new" }))
			.await;

		assert_eq!(response.status_code(), 400);

		sqlx::query(r#"UPDATE "user" SET reset_token = 'fresh', reset_token_expires_at = NOW() + INTERVAL '1 hour' WHERE id = $1"#)
			.bind(user_id)
			.execute(&pool)
			.await
			.unwrap();

		let response = app
			.post("/api/auth/reset-password/fresh")
			.json(&json!({ "newPassword": "new" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.post("/api/auth/reset-password/fresh")
			.json(&json!({ "newPassword": "newer" }))
			.await;

		assert_eq!(response.status_code(), 400);

		let response = app
			.post("/api/auth/login")
			.json(&json!({ "email": "a@x.com", "password": "new" }))
			.await;

		assert_eq!(response.status_code(), 200);
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_moderation_is_audited(pool: Database) {
		let (app, _) = app(pool.clone());
		let admin_id = insert_user(&pool, "admin@x.com", "pw", Role::Admin).await;
		insert_user(&pool, "a@x.com", "pw", Role::Ordinary).await;

		let token = bearer_for(admin_id, Role::Admin);

		let response = app
			.put("/api/auth/toggle-role")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "email": "a@x.com" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.put("/api/auth/deactivate")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "email": "missing@x.com" }))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app.get("/api/job/get_logs").add_header(AUTHORIZATION, token).await;
		let logs = response.json::<Value>();

		assert_eq!(logs.as_array().unwrap().len(), 1);
		assert_eq!(logs[0]["action"], "toggle_role");
		assert_eq!(logs[0]["target"], "a@x.com");

		let response = app
			.post("/api/auth/admin-login")
			.json(&json!({ "email": "a@x.com", "password": "pw" }))
			.await;

		assert_eq!(response.status_code(), 200);
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_deactivated_user_cannot_log_in(pool: Database) {
		let (app, _) = app(pool.clone());
		insert_user(&pool, "a@x.com", "pw", Role::Ordinary).await;

		sqlx::query(r#"UPDATE "user" SET active = FALSE WHERE email = 'a@x.com'"#)
			.execute(&pool)
			.await
			.unwrap();

		let response = app
			.post("/api/auth/login")
			.json(&json!({ "email": "a@x.com", "password": "pw" }))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = app
			.post("/api/auth/admin-login")
			.json(&json!({ "email": "a@x.com", "password": "wrong" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}
}
