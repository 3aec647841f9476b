//! Shared helpers for router-level tests.

use std::time::Duration;

use argon2::Argon2;
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use sqlx::postgres::PgPoolOptions;

pub use std::sync::Arc;

pub use axum::http::{header::AUTHORIZATION, HeaderValue};
pub use axum_test::{
	multipart::{MultipartForm, Part},
	TestServer,
};
pub use serde_json::{json, Value};
pub use uuid::Uuid;

pub use crate::{model::Role, notify::RecordingMailer, Database};
use crate::{
	credential,
	notify::{Mailer, Notifier, SmtpMailer},
	token::TokenKeys,
	upload::UploadStore,
	State,
};

const SECRET: &[u8] = b"test-secret";

fn keys() -> TokenKeys {
	TokenKeys::new(SECRET, Duration::from_secs(60 * 60))
}

fn server(database: Database, mailer: Arc<dyn Mailer>) -> TestServer {
	let state = State {
		database,
		hasher: Argon2::default(),
		tokens: keys(),
		notifier: Notifier::new(mailer, "http://localhost:3001"),
		uploads: UploadStore::new(std::env::temp_dir(), 1024 * 1024),
	};

	TestServer::new(crate::router(state)).unwrap()
}

/// An app whose pool never connects. Only usable for requests that are
/// rejected before touching the database.
pub fn lazy_app() -> TestServer {
	server(lazy_pool(), Arc::new(RecordingMailer::default()))
}

pub fn lazy_pool() -> Database {
	PgPoolOptions::new()
		.connect_lazy("postgres://localhost/jobboard_test")
		.unwrap()
}

pub fn app(pool: Database) -> (TestServer, RecordingMailer) {
	let mailer = RecordingMailer::default();

	(server(pool, Arc::new(mailer.clone())), mailer)
}

pub fn app_with_mailer(pool: Database, mailer: Arc<dyn Mailer>) -> TestServer {
	server(pool, mailer)
}

/// A mailer pointed at a port nothing listens on.
pub fn failing_mailer() -> Arc<dyn Mailer> {
	let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("127.0.0.1")
		.port(1)
		.build();

	Arc::new(SmtpMailer::from_transport(transport, "no-reply@localhost").unwrap())
}

pub fn bearer_for(user_id: Uuid, role: Role) -> HeaderValue {
	let token = keys().issue(user_id, role).unwrap();

	format!("Bearer {token}").parse().unwrap()
}

pub fn bearer(role: Role) -> HeaderValue {
	bearer_for(Uuid::new_v4(), role)
}

pub fn registration(name: &str, email: &str, password: &str) -> MultipartForm {
	MultipartForm::new()
		.add_text("name", name.to_owned())
		.add_text("email", email.to_owned())
		.add_text("password", password.to_owned())
		.add_text("motivation_letter", "I like working.")
}

/// A file part whose name is unique to the calling test.
pub fn unique_file() -> (String, Part) {
	let name = format!("{}.pdf", Uuid::new_v4());
	let part = Part::bytes(b"%PDF-1.4".to_vec()).file_name(name.clone());

	(name, part)
}

/// How many stored uploads were made from a file with this name.
pub fn stored_uploads(file_name: &str) -> usize {
	std::fs::read_dir(std::env::temp_dir())
		.unwrap()
		.filter_map(Result::ok)
		.filter(|entry| entry.file_name().to_string_lossy().ends_with(&format!("-{file_name}")))
		.count()
}

/// Inserts a verified, active user.
pub async fn insert_user(pool: &Database, email: &str, password: &str, role: Role) -> Uuid {
	let hash = credential::hash_password(&Argon2::default(), password).unwrap();

	sqlx::query_scalar(
		r#"
			INSERT INTO "user" (name, email, password, role, verified_email, active)
			VALUES ($1, $2, $3, $4, TRUE, TRUE)
			RETURNING id
		"#,
	)
	.bind(email.split('@').next().unwrap_or(email))
	.bind(email)
	.bind(hash)
	.bind(role)
	.fetch_one(pool)
	.await
	.unwrap()
}

#[tokio::test]
async fn test_uploads_are_served() {
	let name = format!("{}-served.txt", Uuid::new_v4());
	tokio::fs::write(std::env::temp_dir().join(&name), "hello").await.unwrap();

	let response = lazy_app().get(&format!("/uploads/{name}")).await;

	assert_eq!(response.status_code(), 200);
	assert_eq!(response.text(), "hello");
}

#[tokio::test]
async fn test_docs_are_served() {
	let response = lazy_app().get("/docs/private/api.json").await;
	let api = response.json::<Value>();

	assert_eq!(api["info"]["title"], "Job Board API");
	assert!(api["paths"]["/api/auth/login"]["post"].is_object());
}

#[tokio::test]
async fn test_responses_carry_a_request_id() {
	let response = lazy_app().post("/api/auth/logout").await;

	assert!(response.headers().contains_key("x-request-id"));
}
