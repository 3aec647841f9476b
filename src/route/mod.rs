pub mod auth;
pub mod cv;
pub mod docs;
pub mod job;
pub mod model;

pub use model::{Created, EmailInput, Notice};
