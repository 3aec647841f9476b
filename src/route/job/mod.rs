use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod application;
pub mod comment;
pub mod favorite;
pub mod message;
pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Job not found")]
	UnknownJob,
	#[error("Company not found")]
	UnknownCompany,
	#[error("Comment not found")]
	UnknownComment,
	#[error("Message not found")]
	UnknownMessage,
	#[error("Access denied")]
	Forbidden,
	#[error("Account not found")]
	UnknownAccount,
}

pub type RouteError = error::RouteError<Error>;

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownJob | Self::UnknownCompany | Self::UnknownComment | Self::UnknownMessage => {
				StatusCode::NOT_FOUND
			}
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::UnknownAccount => StatusCode::UNAUTHORIZED,
		}
	}
}

/// Maps a violated foreign key on `job_id` to [`Error::UnknownJob`], and one on
/// `user_id` to [`Error::UnknownAccount`]. The latter happens when a token
/// outlives its deleted account.
fn missing_reference(error: sqlx::Error, job_fkey: &str, user_fkey: &str) -> RouteError {
	if crate::repo::violates(&error, job_fkey) {
		Error::UnknownJob.into()
	} else if crate::repo::violates(&error, user_fkey) {
		Error::UnknownAccount.into()
	} else {
		error.into()
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use application::*;
	use comment::*;
	use favorite::*;
	use message::*;
	use route::*;

	ApiRouter::new()
		.api_route("/add_job", post_with(add_job, add_job_docs))
		.api_route("/create_job", post_with(create_job, create_job_docs))
		.api_route("/get_jobs", get_with(get_jobs, get_jobs_docs))
		.api_route("/get_job/:job_id", get_with(get_job, get_job_docs))
		.api_route("/delete_job", post_with(delete_job, delete_job_docs))
		.api_route("/get_logs", get_with(get_logs, get_logs_docs))
		.api_route(
			"/add_to_favorites",
			post_with(add_to_favorites, add_to_favorites_docs),
		)
		.api_route("/get_favorites", get_with(get_favorites, get_favorites_docs))
		.api_route(
			"/get_favorites/:user_id",
			get_with(get_user_favorites, get_user_favorites_docs),
		)
		.api_route(
			"/get_job_favorites/:job_id",
			get_with(get_job_favorites, get_job_favorites_docs),
		)
		.api_route(
			"/get_all_favorites",
			get_with(get_all_favorites, get_all_favorites_docs),
		)
		.api_route("/apply_to_job", post_with(apply_to_job, apply_to_job_docs))
		.api_route(
			"/get_user_applications",
			get_with(get_applications, get_applications_docs),
		)
		.api_route(
			"/get_user_applications/:user_id",
			get_with(get_user_applications, get_user_applications_docs),
		)
		.api_route(
			"/get_job_applications/:job_id",
			get_with(get_job_applications, get_job_applications_docs),
		)
		.route("/send_mail", axum::routing::post(send_mail))
		.api_route("/comments/:job_id", get_with(get_comments, get_comments_docs))
		.api_route("/add_comment/:job_id", post_with(add_comment, add_comment_docs))
		.api_route("/delete_comment", post_with(delete_comment, delete_comment_docs))
		.api_route("/all_comments", get_with(all_comments, all_comments_docs))
		.api_route("/save_message", post_with(save_message, save_message_docs))
		.api_route("/get_messages", get_with(get_messages, get_messages_docs))
		.api_route("/delete_message", post_with(delete_message, delete_message_docs))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_admin_routes_reject_ordinary_users() {
		let app = lazy_app();
		let token = bearer(Role::Ordinary);

		for path in [
			"/api/job/get_all_favorites",
			"/api/job/get_user_applications",
			"/api/job/all_comments",
			"/api/job/get_messages",
			"/api/job/get_logs",
		] {
			let response = app.get(path).add_header(AUTHORIZATION, token.clone()).await;

			assert_eq!(response.status_code(), 403, "{path}");
		}

		for (path, body) in [
			("/api/job/delete_job", json!({ "job_id": Uuid::new_v4() })),
			("/api/job/delete_comment", json!({ "comment_id": Uuid::new_v4() })),
			("/api/job/delete_message", json!({ "message_id": Uuid::new_v4() })),
		] {
			let response = app
				.post(path)
				.add_header(AUTHORIZATION, token.clone())
				.json(&body)
				.await;

			assert_eq!(response.status_code(), 403, "{path}");
		}
	}

	#[tokio::test]
	async fn test_other_users_favorites_are_forbidden() {
		let response = lazy_app()
			.get(&format!("/api/job/get_favorites/{}", Uuid::new_v4()))
			.add_header(AUTHORIZATION, bearer(Role::Ordinary))
			.await;

		assert_eq!(response.status_code(), 403);

		let response = lazy_app()
			.get(&format!("/api/job/get_user_applications/{}", Uuid::new_v4()))
			.add_header(AUTHORIZATION, bearer(Role::Ordinary))
			.await;

		assert_eq!(response.status_code(), 403);
	}

	#[tokio::test]
	async fn test_posting_requires_a_token() {
		let app = lazy_app();

		let response = app
			.post("/api/job/add_job")
			.json(&json!({ "company_name": "Acme", "mail": "jobs@acme.com" }))
			.await;

		assert_eq!(response.status_code(), 401);

		let response = app
			.post(&format!("/api/job/add_comment/{}", Uuid::new_v4()))
			.json(&json!({ "comment_text": "hi" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[tokio::test]
	async fn test_contact_message_is_validated() {
		let response = lazy_app()
			.post("/api/job/save_message")
			.json(&json!({ "names": "A", "email": "nope", "message_text": "hello" }))
			.await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "email");
	}

	#[tokio::test]
	async fn test_undelivered_application_discards_the_cv() {
		let app = app_with_mailer(lazy_pool(), failing_mailer());
		let (file_name, part) = unique_file();

		let form = MultipartForm::new()
			.add_text("description", "Welder position")
			.add_text("mail", "jobs@acme.com")
			.add_text("email", "a@x.com")
			.add_part("cvFile", part);

		let response = app.post("/api/job/send_mail").multipart(form).await;

		assert_eq!(response.status_code(), 500);
		assert_eq!(stored_uploads(&file_name), 0);
	}

	#[tokio::test]
	async fn test_application_mail_links_the_cv() {
		let mailer = RecordingMailer::default();
		let app = app_with_mailer(lazy_pool(), Arc::new(mailer.clone()));
		let (file_name, part) = unique_file();

		let form = MultipartForm::new()
			.add_text("description", "Welder position")
			.add_text("mail", "jobs@acme.com")
			.add_text("email", "a@x.com")
			.add_part("cvFile", part);

		let response = app.post("/api/job/send_mail").multipart(form).await;

		assert_eq!(response.status_code(), 201);
		assert_eq!(stored_uploads(&file_name), 1);
		assert!(mailer.sent()[0].html.contains(&file_name));
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_job_board_flow(pool: Database) {
		let (app, _) = app(pool.clone());
		let user_id = insert_user(&pool, "a@x.com", "pw", Role::Ordinary).await;
		let admin_id = insert_user(&pool, "admin@x.com", "pw", Role::Admin).await;
		let token = bearer_for(user_id, Role::Ordinary);
		let admin = bearer_for(admin_id, Role::Admin);

		let response = app
			.post("/api/job/add_job")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "company_name": "Acme", "mail": "jobs@acme.com", "titles": "Welder" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let job_id = response.json::<Value>()["job_id"].as_str().unwrap().to_owned();

		let response = app
			.post("/api/job/add_job")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "company_name": "Acme", "mail": "jobs@acme.com", "titles": "Painter" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM company")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(companies, 1);

		let response = app.get(&format!("/api/job/get_job/{job_id}")).await;

		assert_eq!(response.json::<Value>()["company_name"], "Acme");
		assert_eq!(response.json::<Value>()["user_id"], user_id.to_string());

		let response = app
			.post("/api/job/create_job")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "company_id": Uuid::new_v4(), "mail": "jobs@acme.com" }))
			.await;

		assert_eq!(response.status_code(), 404);

		for _ in 0..2 {
			let response = app
				.post("/api/job/apply_to_job")
				.add_header(AUTHORIZATION, token.clone())
				.json(&json!({ "job_id": job_id }))
				.await;

			assert_eq!(response.status_code(), 200);

			let response = app
				.post("/api/job/add_to_favorites")
				.add_header(AUTHORIZATION, token.clone())
				.json(&json!({ "job_id": job_id }))
				.await;

			assert_eq!(response.status_code(), 200);
		}

		let response = app.get(&format!("/api/job/get_job_applications/{job_id}")).await;
		let applications = response.json::<Value>();

		assert_eq!(applications.as_array().unwrap().len(), 1);
		assert_eq!(applications[0]["apply_count"], 2);

		let response = app.get("/api/job/get_favorites").add_header(AUTHORIZATION, token.clone()).await;

		assert_eq!(response.json::<Value>()["favorites"].as_array().unwrap().len(), 1);

		let response = app
			.post("/api/job/apply_to_job")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "job_id": Uuid::new_v4() }))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.post(&format!("/api/job/add_comment/{job_id}"))
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "comment_text": "Great job" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let comment_id = response.json::<Value>()["comment"]["id"].as_str().unwrap().to_owned();
		let response = app.get(&format!("/api/job/comments/{job_id}")).await;
		let comments = response.json::<Value>();

		assert_eq!(comments.as_array().unwrap().len(), 1);
		assert_eq!(comments[0]["user_first_name"], Value::Null);

		let response = app
			.post("/api/job/delete_comment")
			.add_header(AUTHORIZATION, admin.clone())
			.json(&json!({ "comment_id": comment_id }))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.post("/api/job/delete_job")
			.add_header(AUTHORIZATION, admin.clone())
			.json(&json!({ "job_id": job_id }))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.post("/api/job/delete_job")
			.add_header(AUTHORIZATION, admin.clone())
			.json(&json!({ "job_id": job_id }))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app.get("/api/job/get_logs").add_header(AUTHORIZATION, admin).await;
		let actions = response
			.json::<Value>()
			.as_array()
			.unwrap()
			.iter()
			.map(|entry| entry["action"].as_str().unwrap().to_owned())
			.collect::<Vec<_>>();

		assert_eq!(actions, ["delete_job", "delete_comment"]);
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_deleted_account_token_is_unauthorized(pool: Database) {
		let (app, _) = app(pool.clone());
		let poster = insert_user(&pool, "poster@x.com", "pw", Role::Ordinary).await;
		let user_id = insert_user(&pool, "gone@x.com", "pw", Role::Ordinary).await;
		let token = bearer_for(user_id, Role::Ordinary);

		let response = app
			.post("/api/job/add_job")
			.add_header(AUTHORIZATION, bearer_for(poster, Role::Ordinary))
			.json(&json!({ "company_name": "Acme", "mail": "jobs@acme.com" }))
			.await;
		let job_id = response.json::<Value>()["job_id"].as_str().unwrap().to_owned();

		let response = app.delete("/api/auth/profile").add_header(AUTHORIZATION, token.clone()).await;

		assert_eq!(response.status_code(), 200);

		for path in ["/api/job/apply_to_job", "/api/job/add_to_favorites"] {
			let response = app
				.post(path)
				.add_header(AUTHORIZATION, token.clone())
				.json(&json!({ "job_id": job_id }))
				.await;

			assert_eq!(response.status_code(), 401, "{path}");
			assert_eq!(response.json::<Value>()["error"], "Account not found");
		}

		let response = app
			.post(&format!("/api/job/add_comment/{job_id}"))
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "comment_text": "hi" }))
			.await;

		assert_eq!(response.status_code(), 401);

		let response = app
			.post("/api/job/add_job")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "company_name": "Acme", "mail": "jobs@acme.com" }))
			.await;

		assert_eq!(response.status_code(), 401);

		let response = app
			.post("/api/cv/create_cv")
			.add_header(AUTHORIZATION, token)
			.json(&json!({ "first_name": "Ada" }))
			.await;

		assert_eq!(response.status_code(), 401);
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_contact_messages(pool: Database) {
		let (app, _) = app(pool.clone());
		let admin_id = insert_user(&pool, "admin@x.com", "pw", Role::Admin).await;
		let admin = bearer_for(admin_id, Role::Admin);

		let response = app
			.post("/api/job/save_message")
			.json(&json!({ "names": "A", "email": "a@x.com", "message_text": "hello" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let message_id = response.json::<Value>()["messageId"].as_str().unwrap().to_owned();

		let response = app.get("/api/job/get_messages").add_header(AUTHORIZATION, admin.clone()).await;

		assert_eq!(response.json::<Value>()[0]["message_text"], "hello");

		for status in [200, 404] {
			let response = app
				.post("/api/job/delete_message")
				.add_header(AUTHORIZATION, admin.clone())
				.json(&json!({ "message_id": message_id }))
				.await;

			assert_eq!(response.status_code(), status);
		}
	}
}
