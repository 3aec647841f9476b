//! Transactional email.

use std::sync::Arc;

use lettre::{
	message::{header::ContentType, Mailbox},
	transport::smtp::authentication::Credentials,
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid address: {0}")]
	Address(#[from] lettre::address::AddressError),
	#[error("failed to build message: {0}")]
	Message(#[from] lettre::error::Error),
	#[error("smtp delivery failed: {0}")]
	Transport(#[from] lettre::transport::smtp::Error),
}

/// A rendered email, ready to be handed to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
	pub to: String,
	pub subject: String,
	pub html: String,
}

#[axum::async_trait]
pub trait Mailer: Send + Sync {
	async fn send(&self, email: Email) -> Result<(), Error>;
}

/// Delivers mail through an SMTP relay.
pub struct SmtpMailer {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from: Mailbox,
}

impl SmtpMailer {
	pub fn new(config: &SmtpConfig, from: &str) -> Result<Self, Error> {
		let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?;

		if let Some(username) = &config.username {
			builder = builder.credentials(Credentials::new(
				username.clone(),
				config.password.clone().unwrap_or_default(),
			));
		}

		Self::from_transport(builder.build(), from)
	}

	pub fn from_transport(
		transport: AsyncSmtpTransport<Tokio1Executor>,
		from: &str,
	) -> Result<Self, Error> {
		Ok(Self {
			transport,
			from: from.parse()?,
		})
	}
}

#[axum::async_trait]
impl Mailer for SmtpMailer {
	async fn send(&self, email: Email) -> Result<(), Error> {
		let message = Message::builder()
			.from(self.from.clone())
			.to(email.to.parse()?)
			.subject(email.subject)
			.header(ContentType::TEXT_HTML)
			.body(email.html)?;

		self.transport.send(message).await?;

		Ok(())
	}
}

/// Logs mail instead of delivering it. Used when no SMTP relay is configured.
pub struct LogMailer;

#[axum::async_trait]
impl Mailer for LogMailer {
	async fn send(&self, email: Email) -> Result<(), Error> {
		tracing::info!(to = %email.to, subject = %email.subject, body = %email.html, "mail not delivered, smtp is not configured");

		Ok(())
	}
}

/// The kinds of mail the service sends.
#[derive(Debug, Clone, Copy)]
pub enum Notification<'a> {
	Verification {
		token: &'a str,
	},
	PasswordReset {
		token: &'a str,
	},
	JobApplication {
		applicant_email: &'a str,
		description: &'a str,
		/// Storage name of the attached CV, if one was uploaded.
		cv_file: Option<&'a str>,
	},
}

impl Notification<'_> {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Verification { .. } => "verification",
			Self::PasswordReset { .. } => "password_reset",
			Self::JobApplication { .. } => "job_application",
		}
	}

	pub fn subject(&self) -> &'static str {
		match self {
			Self::Verification { .. } => "Email Verification",
			Self::PasswordReset { .. } => "Password Reset",
			Self::JobApplication { .. } => "Apply for job",
		}
	}

	pub fn render(&self, public_url: &str) -> String {
		match self {
			Self::Verification { token } => format!(
				"<p>Dear user,</p>\
				<p>Thank you for registering. Please click the following link to verify your email:</p>\
				<a href=\"{public_url}/api/auth/verify/{token}\">Verify Email</a>",
				token = escape(token),
			),
			Self::PasswordReset { token } => format!(
				"<p>Dear user,</p>\
				<p>A password reset was requested for your account. The following token is valid for one hour:</p>\
				<p><code>{token}</code></p>\
				<p>Send it with your new password to <code>{public_url}/api/auth/reset-password/{token}</code>.</p>\
				<p>If you did not request a reset, you can ignore this email.</p>",
				token = escape(token),
			),
			Self::JobApplication {
				applicant_email,
				description,
				cv_file,
			} => {
				let cv = cv_file.map_or_else(
					|| "<p>No CV file was attached.</p>".to_owned(),
					|file| {
						format!(
							"<p>Here is the CV File: <a href=\"{public_url}/uploads/{}\">Download CV</a></p>",
							escape(file)
						)
					},
				);

				format!(
					"<p>Good Morning,</p><p>This is my mail : {}</p><p>{}</p>{cv}",
					escape(applicant_email),
					escape(description),
				)
			}
		}
	}
}

fn escape(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());

	for c in value.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}

	escaped
}

/// Renders notifications and hands them to the configured [`Mailer`].
#[derive(Clone)]
pub struct Notifier {
	mailer: Arc<dyn Mailer>,
	public_url: Arc<str>,
}

impl Notifier {
	pub fn new(mailer: Arc<dyn Mailer>, public_url: &str) -> Self {
		Self {
			mailer,
			public_url: public_url.trim_end_matches('/').into(),
		}
	}

	#[tracing::instrument(skip(self, notification), fields(kind = notification.kind()))]
	pub async fn send(&self, to: &str, notification: Notification<'_>) -> Result<(), Error> {
		let email = Email {
			to: to.to_owned(),
			subject: notification.subject().to_owned(),
			html: notification.render(&self.public_url),
		};

		self.mailer.send(email).await?;

		tracing::info!(monotonic_counter.mails_sent = 1, "notification sent");

		Ok(())
	}
}

impl std::fmt::Debug for Notifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Notifier")
			.field("public_url", &self.public_url)
			.finish_non_exhaustive()
	}
}

/// Keeps every email in memory.
#[cfg(test)]
#[derive(Default, Clone)]
pub struct RecordingMailer {
	sent: Arc<std::sync::Mutex<Vec<Email>>>,
}

#[cfg(test)]
impl RecordingMailer {
	pub fn sent(&self) -> Vec<Email> {
		self.sent.lock().unwrap().clone()
	}
}

#[cfg(test)]
#[axum::async_trait]
impl Mailer for RecordingMailer {
	async fn send(&self, email: Email) -> Result<(), Error> {
		self.sent.lock().unwrap().push(email);

		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_verification_link() {
		let html = Notification::Verification { token: "abc123" }.render("http://localhost:3001");

		assert!(html.contains("href=\"http://localhost:3001/api/auth/verify/abc123\""));
	}

	#[test]
	fn test_application_escapes_user_input() {
		let html = Notification::JobApplication {
			applicant_email: "a@x.com",
			description: "<script>alert(1)</script>",
			cv_file: Some("1-cv.pdf"),
		}
		.render("https://jobs.example.com");

		assert!(html.contains("&lt;script&gt;"));
		assert!(!html.contains("<script>"));
		assert!(html.contains("https://jobs.example.com/uploads/1-cv.pdf"));
	}

	#[test]
	fn test_application_without_cv() {
		let html = Notification::JobApplication {
			applicant_email: "a@x.com",
			description: "hello",
			cv_file: None,
		}
		.render("http://localhost");

		assert!(html.contains("No CV file"));
		assert!(!html.contains("/uploads/"));
	}

	#[tokio::test]
	async fn test_notifier_sends_rendered_mail() {
		let mailer = RecordingMailer::default();
		let notifier = Notifier::new(Arc::new(mailer.clone()), "http://localhost:3001/");

		notifier
			.send("a@x.com", Notification::PasswordReset { token: "t0k" })
			.await
			.unwrap();

		let sent = mailer.sent();

		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].to, "a@x.com");
		assert_eq!(sent[0].subject, "Password Reset");
		assert!(sent[0].html.contains("http://localhost:3001/api/auth/reset-password/t0k"));
	}

	#[tokio::test]
	async fn test_smtp_failure_is_reported() {
		let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("127.0.0.1")
			.port(1)
			.build();
		let mailer = SmtpMailer::from_transport(transport, "no-reply@localhost").unwrap();

		let result = mailer
			.send(Email {
				to: "a@x.com".into(),
				subject: "s".into(),
				html: "b".into(),
			})
			.await;

		assert!(matches!(result, Err(Error::Transport(..))));
	}
}
