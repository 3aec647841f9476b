use sqlx::PgExecutor;
use uuid::Uuid;

use crate::model::{ContactMessage, CreateContactMessage};

pub async fn insert<'e>(
	executor: impl PgExecutor<'e>,
	message: &CreateContactMessage,
) -> Result<ContactMessage, sqlx::Error> {
	sqlx::query_as(
		r#"
			INSERT INTO message (names, email, phone_number, subject, message_text)
			VALUES ($1, $2, $3, $4, $5)
			RETURNING *
		"#,
	)
	.bind(&message.names)
	.bind(&message.email)
	.bind(&message.phone_number)
	.bind(&message.subject)
	.bind(&message.message_text)
	.fetch_one(executor)
	.await
}

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<ContactMessage>, sqlx::Error> {
	sqlx::query_as("SELECT * FROM message ORDER BY created_at DESC")
		.fetch_all(executor)
		.await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query("DELETE FROM message WHERE id = $1")
		.bind(id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}
