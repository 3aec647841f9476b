use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize, JsonSchema)]
pub struct CvCreated {
	#[serde(rename = "cvId")]
	pub cv_id: Uuid,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CvStatus {
	/// Whether the caller has created a CV.
	#[serde(rename = "hasCV")]
	pub has_cv: bool,
}
