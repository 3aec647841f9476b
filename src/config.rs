use std::{path::PathBuf, str::FromStr, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0} must be set")]
	Missing(&'static str),
	#[error("{name} is not valid: {value:?}")]
	Invalid { name: &'static str, value: String },
}

/// SMTP relay settings. Mail is only logged when these are absent.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
	pub host: String,
	pub username: Option<String>,
	pub password: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
	/// Seconds needed to replenish one request.
	pub per_second: u64,
	pub burst: u32,
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub jwt_secret: String,
	pub token_ttl: Duration,
	pub port: u16,
	pub public_url: String,
	pub upload_dir: PathBuf,
	pub upload_limit: usize,
	pub smtp: Option<SmtpConfig>,
	pub mail_from: String,
	pub rate_limit: RateLimitConfig,
	pub otlp_endpoint: Option<String>,
}

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;
const DEFAULT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

impl Config {
	/// Loads `.env` if present, then reads the process environment.
	pub fn from_env() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
		let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let require = |name: &'static str| var(name).ok_or(Error::Missing(name));

		let port = parse_or(&var, "PORT", DEFAULT_PORT)?;
		let ttl_hours = non_zero("TOKEN_TTL_HOURS", parse_or(&var, "TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?)?;
		let token_ttl = ttl_hours
			.checked_mul(60 * 60)
			.map(Duration::from_secs)
			.ok_or_else(|| Error::Invalid {
				name: "TOKEN_TTL_HOURS",
				value: ttl_hours.to_string(),
			})?;

		let smtp = var("SMTP_HOST").map(|host| SmtpConfig {
			host,
			username: var("SMTP_USERNAME"),
			password: var("SMTP_PASSWORD"),
		});

		Ok(Self {
			database_url: require("DATABASE_URL")?,
			jwt_secret: require("JWT_SECRET")?,
			token_ttl,
			port,
			public_url: var("PUBLIC_URL")
				.map_or_else(|| format!("http://localhost:{port}"), |url| url.trim_end_matches('/').to_owned()),
			upload_dir: var("UPLOAD_DIR").map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
			upload_limit: parse_or(&var, "UPLOAD_LIMIT_BYTES", DEFAULT_UPLOAD_LIMIT)?,
			smtp,
			mail_from: var("MAIL_FROM").unwrap_or_else(|| "no-reply@localhost".into()),
			rate_limit: RateLimitConfig {
				per_second: non_zero("RATE_LIMIT_PER_SECOND", parse_or(&var, "RATE_LIMIT_PER_SECOND", 10)?)?,
				burst: non_zero("RATE_LIMIT_BURST", parse_or(&var, "RATE_LIMIT_BURST", 50)?)?,
			},
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}
}

fn parse_or<T: FromStr>(
	var: &impl Fn(&str) -> Option<String>,
	name: &'static str,
	default: T,
) -> Result<T, Error> {
	match var(name) {
		Some(value) => value
			.trim()
			.parse()
			.map_err(|_| Error::Invalid { name, value }),
		None => Ok(default),
	}
}

fn non_zero<T: Default + PartialEq + ToString>(name: &'static str, value: T) -> Result<T, Error> {
	if value == T::default() {
		return Err(Error::Invalid {
			name,
			value: value.to_string(),
		});
	}

	Ok(value)
}
