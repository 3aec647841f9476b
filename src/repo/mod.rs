//! Parameterized statements over the relational store, one module per entity.
//!
//! Every function takes an executor so that callers decide whether it runs on
//! the pool or inside a transaction.

pub mod application;
pub mod audit;
pub mod comment;
pub mod cv;
pub mod favorite;
pub mod job;
pub mod message;
pub mod user;

/// Whether the error is a violation of the named constraint.
pub fn violates(error: &sqlx::Error, constraint: &str) -> bool {
	matches!(error, sqlx::Error::Database(e) if e.constraint() == Some(constraint))
}
