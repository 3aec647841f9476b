use sqlx::PgExecutor;
use uuid::Uuid;

use crate::model::AuditEntry;

/// A moderation action written to the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	DeleteUser,
	PromoteUser,
	ToggleRole,
	DeactivateUser,
	ActivateUser,
	DeleteJob,
	DeleteComment,
	DeleteMessage,
}

impl Action {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::DeleteUser => "delete_user",
			Self::PromoteUser => "promote_user",
			Self::ToggleRole => "toggle_role",
			Self::DeactivateUser => "deactivate_user",
			Self::ActivateUser => "activate_user",
			Self::DeleteJob => "delete_job",
			Self::DeleteComment => "delete_comment",
			Self::DeleteMessage => "delete_message",
		}
	}
}

pub async fn record<'e>(
	executor: impl PgExecutor<'e>,
	actor_id: Uuid,
	action: Action,
	target: &str,
) -> Result<(), sqlx::Error> {
	sqlx::query("INSERT INTO audit_log (actor_id, action, target) VALUES ($1, $2, $3)")
		.bind(actor_id)
		.bind(action.as_str())
		.bind(target)
		.execute(executor)
		.await?;

	tracing::info!(actor = %actor_id, action = action.as_str(), subject = target, "moderation action");

	Ok(())
}

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<AuditEntry>, sqlx::Error> {
	sqlx::query_as("SELECT * FROM audit_log ORDER BY created_at DESC")
		.fetch_all(executor)
		.await
}
