use aide::axum::{
	routing::{delete_with, get_with, post_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("CV not found")]
	UnknownCv,
	#[error("Account not found")]
	UnknownAccount,
}

pub type RouteError = error::RouteError<Error>;

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownCv => StatusCode::NOT_FOUND,
			Self::UnknownAccount => StatusCode::UNAUTHORIZED,
		}
	}
}

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/create_cv", post_with(create_cv, create_cv_docs))
		.api_route("/update_cv/:cv_id", put_with(update_cv, update_cv_docs))
		.api_route("/check_cv", get_with(check_cv, check_cv_docs))
		.api_route("/get_cv/:cv_id", get_with(get_cv, get_cv_docs))
		.api_route("/get_all_cvs", get_with(get_all_cvs, get_all_cvs_docs))
		.api_route("/delete_cv", delete_with(delete_cv, delete_cv_docs))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_cv_routes_require_a_token() {
		let app = lazy_app();

		assert_eq!(app.get("/api/cv/check_cv").await.status_code(), 401);
		assert_eq!(app.delete("/api/cv/delete_cv").await.status_code(), 401);
		assert_eq!(
			app.post("/api/cv/create_cv").json(&json!({})).await.status_code(),
			401
		);
	}

	#[tokio::test]
	async fn test_listing_cvs_requires_admin() {
		let response = lazy_app()
			.get("/api/cv/get_all_cvs")
			.add_header(AUTHORIZATION, bearer(Role::Ordinary))
			.await;

		assert_eq!(response.status_code(), 403);
	}

	#[tokio::test]
	async fn test_malformed_cv_id_is_rejected() {
		let response = lazy_app()
			.get("/api/cv/get_cv/not-a-uuid")
			.add_header(AUTHORIZATION, bearer(Role::Ordinary))
			.await;

		assert_eq!(response.status_code(), 400);
		assert!(response.json::<Value>()["error"].is_string());
	}

	#[sqlx::test(migrations = "./migrations")]
	async fn test_cv_lifecycle(pool: Database) {
		let (app, _) = app(pool.clone());
		let owner = insert_user(&pool, "a@x.com", "pw", Role::Ordinary).await;
		let other = insert_user(&pool, "b@x.com", "pw", Role::Ordinary).await;
		let token = bearer_for(owner, Role::Ordinary);

		let response = app.get("/api/cv/check_cv").add_header(AUTHORIZATION, token.clone()).await;

		assert_eq!(response.json::<Value>()["hasCV"], false);

		let response = app
			.post("/api/cv/create_cv")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "first_name": "Ada", "profession": "engineer" }))
			.await;

		assert_eq!(response.status_code(), 201);

		let cv_id = response.json::<Value>()["cvId"].as_str().unwrap().to_owned();

		let response = app
			.post("/api/cv/create_cv")
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "first_name": "Ada", "profession": "welder" }))
			.await;

		assert_eq!(response.json::<Value>()["cvId"], cv_id.as_str());

		let response = app
			.get(&format!("/api/cv/get_cv/{cv_id}"))
			.add_header(AUTHORIZATION, bearer_for(other, Role::Ordinary))
			.await;

		assert_eq!(response.status_code(), 404);

		let response = app
			.put(&format!("/api/cv/update_cv/{cv_id}"))
			.add_header(AUTHORIZATION, token.clone())
			.json(&json!({ "last_name": "Lovelace" }))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = app
			.get(&format!("/api/cv/get_cv/{cv_id}"))
			.add_header(AUTHORIZATION, token.clone())
			.await;
		let cv = response.json::<Value>();

		assert_eq!(cv["last_name"], "Lovelace");
		assert_eq!(cv["profession"], Value::Null);

		let response = app.delete("/api/cv/delete_cv").add_header(AUTHORIZATION, token.clone()).await;

		assert_eq!(response.status_code(), 200);

		let response = app.delete("/api/cv/delete_cv").add_header(AUTHORIZATION, token).await;

		assert_eq!(response.status_code(), 404);
	}
}
