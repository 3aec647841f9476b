#![warn(clippy::pedantic)]

mod config;
mod cookie;
mod credential;
mod error;
mod extract;
mod model;
mod notify;
mod openapi;
mod ratelimit;
mod repo;
mod route;
#[cfg(test)]
mod test;
mod token;
mod trace;
mod upload;

use std::{net::SocketAddr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{extract::DefaultBodyLimit, Extension, Router, ServiceExt};
use sqlx::postgres::PgPoolOptions;
use tower::Layer;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	services::ServeDir,
	trace::TraceLayer,
};

use crate::{
	config::Config,
	notify::{LogMailer, Mailer, Notifier, SmtpMailer},
	token::TokenKeys,
	upload::UploadStore,
};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// Handlers extract the parts they need, e.g. `State<Database>` or `State<TokenKeys>`.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub tokens: TokenKeys,
	pub notifier: Notifier,
	pub uploads: UploadStore,
}

/// Builds the full application: the API under `/api`, its documentation under
/// `/docs` and the uploaded files under `/uploads`.
///
/// Rate limiting is left to the caller, since it needs the peer address.
pub fn router(state: State) -> Router {
	aide::gen::on_error(|error| tracing::warn!(%error, "failed to document a route"));
	aide::gen::extract_schemas(true);
	aide::gen::infer_responses(true);

	let mut api = OpenApi::default();
	let upload_limit = state.uploads.limit();
	let upload_dir = state.uploads.root().to_path_buf();

	let app = ApiRouter::new()
		.nest("/api/auth", route::auth::routes())
		.nest("/api/cv", route::cv::routes())
		.nest("/api/job", route::job::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs);

	app.layer(Extension(Arc::new(api)))
		.nest_service("/uploads", ServeDir::new(upload_dir))
		.layer(DefaultBodyLimit::max(upload_limit))
		.layer(CompressionLayer::new())
		.layer(CorsLayer::permissive())
		.layer(TraceLayer::new_for_http())
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.with_state(state)
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
	#[error("invalid configuration: {0}")]
	Config(#[from] config::Error),
	#[error("failed to initialize tracing: {0}")]
	Trace(#[from] trace::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("failed to run migrations: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("invalid mail configuration: {0}")]
	Mail(#[from] notify::Error),
	#[error("rate limits must be greater than zero")]
	RateLimit,
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
	let config = Config::from_env()?;
	let _guard = trace::init(config.otlp_endpoint.as_deref())?;

	let database = PgPoolOptions::new()
		.max_connections(10)
		.connect(&config.database_url)
		.await?;

	sqlx::migrate!("./migrations").run(&database).await?;

	let mailer: Arc<dyn Mailer> = if let Some(smtp) = &config.smtp {
		Arc::new(SmtpMailer::new(smtp, &config.mail_from)?)
	} else {
		tracing::warn!("SMTP_HOST is not set, mail will only be logged");
		Arc::new(LogMailer)
	};

	let uploads = UploadStore::new(&config.upload_dir, config.upload_limit);
	uploads.ensure_dir().await?;

	let state = State {
		database: database.clone(),
		hasher: Argon2::default(),
		tokens: TokenKeys::new(config.jwt_secret.as_bytes(), config.token_ttl),
		notifier: Notifier::new(mailer, &config.public_url),
		uploads,
	};

	let governor = ratelimit::per_ip(&config.rate_limit).ok_or(StartupError::RateLimit)?;
	ratelimit::cleanup_old_limits(&[&governor]);

	// Applied outside the router so trailing slashes are trimmed before routing.
	let app = NormalizePathLayer::trim_trailing_slash()
		.layer(router(state).layer(GovernorLayer { config: governor }));

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

	tracing::info!(port = config.port, public_url = %config.public_url, "listening");

	axum::serve(
		listener,
		ServiceExt::<axum::extract::Request>::into_make_service_with_connect_info::<SocketAddr>(app),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await?;

	database.close().await;

	Ok(())
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(error) = tokio::signal::ctrl_c().await {
			tracing::error!(%error, "failed to listen for ctrl-c");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(error) => {
				tracing::error!(%error, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	tracing::info!("shutting down");
}
