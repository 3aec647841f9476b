//! Multipart forms and the upload directory.

use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use axum::{
	body::Bytes,
	extract::multipart::{Multipart, MultipartError, MultipartRejection},
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Rejection(#[from] MultipartRejection),
	#[error("malformed multipart body: {0}")]
	Multipart(#[from] MultipartError),
	#[error("only one file may be uploaded under `{0}`")]
	TooManyFiles(String),
	#[error("unexpected file under `{0}`")]
	UnexpectedFile(String),
	#[error("invalid form: {0}")]
	Fields(#[source] serde_json::Error),
	#[error("failed to store upload: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Whether the failure was caused by the request rather than the server.
	pub fn is_client_error(&self) -> bool {
		!matches!(self, Self::Io(..))
	}
}

/// A file received in a multipart form, buffered in memory.
#[derive(Debug)]
pub struct UploadedFile {
	pub file_name: String,
	pub bytes: Bytes,
}

/// The text fields of a multipart form, plus at most one file.
#[derive(Debug, Default)]
pub struct Form {
	fields: Map<String, Value>,
	file: Option<UploadedFile>,
}

impl Form {
	/// Deserializes the text fields into `T`. Missing optional fields become `None`.
	pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
		serde_json::from_value(Value::Object(self.fields.clone())).map_err(Error::Fields)
	}

	pub fn take_file(&mut self) -> Option<UploadedFile> {
		self.file.take()
	}
}

/// Reads a whole multipart body, accepting a single file under `file_field`.
///
/// Parts without a file name are text fields. A file part with an empty name
/// and no content is what browsers send for an empty file input, so it is ignored.
pub async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<Form, Error> {
	let mut form = Form::default();

	while let Some(field) = multipart.next_field().await? {
		let name = field.name().unwrap_or_default().to_owned();

		let Some(file_name) = field.file_name().map(str::to_owned) else {
			let value = field.text().await?;
			form.fields.insert(name, Value::String(value));
			continue;
		};

		if name != file_field {
			return Err(Error::UnexpectedFile(name));
		}

		let bytes = field.bytes().await?;

		if file_name.is_empty() && bytes.is_empty() {
			continue;
		}

		if form.file.is_some() {
			return Err(Error::TooManyFiles(name));
		}

		form.file = Some(UploadedFile { file_name, bytes });
	}

	Ok(form)
}

/// The directory uploaded files are written to and served from.
#[derive(Debug, Clone)]
pub struct UploadStore {
	root: Arc<PathBuf>,
	limit: usize,
}

impl UploadStore {
	pub fn new(root: impl Into<PathBuf>, limit: usize) -> Self {
		Self {
			root: Arc::new(root.into()),
			limit,
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Maximum size of a multipart body, in bytes.
	pub fn limit(&self) -> usize {
		self.limit
	}

	pub async fn ensure_dir(&self) -> std::io::Result<()> {
		tokio::fs::create_dir_all(self.root.as_path()).await
	}

	/// Writes the file to disk and returns the name it was stored under.
	pub async fn store(&self, file: &UploadedFile) -> Result<String, Error> {
		let name = storage_name(&file.file_name, Utc::now());

		tokio::fs::write(self.root.join(&name), &file.bytes).await?;

		tracing::info!(
			file = %name,
			size = file.bytes.len(),
			monotonic_counter.uploads_stored = 1,
			"stored upload"
		);

		Ok(name)
	}

	/// Deletes a stored file whose request failed afterwards. Failures are only logged.
	pub async fn discard(&self, name: &str) {
		if let Err(error) = tokio::fs::remove_file(self.root.join(name)).await {
			tracing::warn!(%error, file = %name, "failed to discard upload");
		}
	}

	/// Discards the stored file when `result` is an error, then passes `result` through.
	pub async fn discard_on_error<T, E>(&self, name: Option<&str>, result: Result<T, E>) -> Result<T, E> {
		if let (Err(..), Some(name)) = (&result, name) {
			self.discard(name).await;
		}

		result
	}
}

/// Builds `<unix millis>-<name>` from the client's file name.
///
/// Only the final path component is kept, and characters outside
/// `[A-Za-z0-9._-]` are replaced. Two uploads of the same name within the
/// same millisecond collide.
pub fn storage_name(original: &str, now: DateTime<Utc>) -> String {
	let base = original
		.rsplit(['/', '\\'])
		.find(|part| !part.is_empty())
		.unwrap_or_default();

	let mut sanitized = base
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
				c
			} else {
				'_'
			}
		})
		.collect::<String>();

	if sanitized.trim_matches('.').is_empty() {
		sanitized = "file".into();
	}

	format!("{}-{sanitized}", now.timestamp_millis())
}
