use aide::{
	openapi::{SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json};

pub const SECURITY_SCHEME_BEARER: &str = "Bearer";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const CV: &str = "CV";
	pub const JOB: &str = "Job";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Job Board API")
		.summary("Job postings, applications and candidate profiles")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::AUTH.into(),
			description: Some("Accounts, profiles and user moderation".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::CV.into(),
			description: Some("Candidate CVs".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::JOB.into(),
			description: Some("Job postings, favorites, applications, comments and contact messages".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_BEARER,
			SecurityScheme::Http {
				scheme: "bearer".into(),
				bearer_format: Some("JWT".into()),
				description: Some("A token returned by the login endpoints".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorBody<'static>>, _>(|res| {
			res.example(error::ErrorBody {
				error: "error message".into(),
				errors: vec![error::Message {
					content: "error message".into(),
					field: Some("optional field".into()),
				}],
			})
		})
}
