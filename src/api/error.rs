use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use snafu::{Location, Snafu};
use utoipa::openapi::schema::{ObjectBuilder, Schema, SchemaType};
use utoipa::openapi::RefOr;
use utoipa::ToSchema;

use crate::database::DatabaseError;
use crate::model::VideoId;

#[derive(Debug, Snafu, Serialize)]
#[snafu(visibility(pub(crate)))]
#[serde(tag = "error", content = "data")]
pub enum ApiError {
    #[snafu(display("missing required field `{field}` ({help})"))]
    MissingArgument {
        field: &'static str,
        help: &'static str,
    },

    #[snafu(display("invalid value for field `{field}`, expected {expected} ({help})"))]
    InvalidArgument {
        field: &'static str,
        expected: &'static str,
        help: &'static str,
    },

    #[snafu(display("malformed request body: {reason}"))]
    MalformedBody { reason: String },

    #[snafu(display("invalid video id: {reason}"))]
    InvalidVideoId { reason: String },

    #[snafu(display("no video found with id {id}"))]
    VideoNotFound { id: VideoId },

    #[snafu(display("a video with id {id} already exists"))]
    VideoAlreadyExists { id: VideoId },

    #[snafu(display("failed to access the video store"))]
    Store {
        #[serde(skip)]
        source: DatabaseError,

        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingArgument { .. }
            | ApiError::InvalidArgument { .. }
            | ApiError::MalformedBody { .. }
            | ApiError::InvalidVideoId { .. } => StatusCode::BAD_REQUEST,
            ApiError::VideoNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::VideoAlreadyExists { .. } => StatusCode::CONFLICT,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        InvalidVideoIdSnafu {
            reason: rejection.body_text(),
        }
        .build()
    }
}

/// Body of every error response: `{ "message": ..., "error": <kind>, "data": {...} }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
    #[serde(flatten)]
    data: ApiError,
}

impl<'s> ToSchema<'s> for ErrorResponse {
    fn schema() -> (&'s str, RefOr<Schema>) {
        let schema = ObjectBuilder::new()
            .property("message", ObjectBuilder::new().schema_type(SchemaType::String))
            .required("message")
            .property(
                "error",
                ObjectBuilder::new()
                    .schema_type(SchemaType::String)
                    .description(Some("Error kind, such as `VideoNotFound` or `InvalidArgument`")),
            )
            .required("error")
            .property(
                "data",
                ObjectBuilder::new()
                    .schema_type(SchemaType::Object)
                    .description(Some("Details of the error; empty for store failures")),
            )
            .example(Some(json!({
                "message": "no video found with id 7",
                "error": "VideoNotFound",
                "data": { "id": 7 }
            })))
            .into();

        ("ErrorResponse", schema)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Store { source, location } => {
                tracing::error!(%source, %location, "request failed on the video store");
            }
            error => tracing::debug!(%error, "request rejected"),
        }

        let content = ErrorResponse {
            message: self.to_string(),
            data: self,
        };

        (status, Json(content)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use snafu::ResultExt as _;

    use super::*;
    use crate::database::EmptyQuerySnafu;

    #[test]
    fn error_body_carries_message_and_kind() {
        let error = VideoNotFoundSnafu { id: VideoId::new(7) }.build();
        let content = ErrorResponse {
            message: error.to_string(),
            data: error,
        };

        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({
                "message": "no video found with id 7",
                "error": "VideoNotFound",
                "data": { "id": 7 }
            })
        );
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let missing = MissingArgumentSnafu {
            field: "name",
            help: "name of the video",
        }
        .build();
        let not_found = VideoNotFoundSnafu { id: VideoId::new(1) }.build();
        let conflict = VideoAlreadyExistsSnafu { id: VideoId::new(1) }.build();

        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn store_failure_hides_its_source() {
        let error = Err::<(), _>(EmptyQuerySnafu.build())
            .context(StoreSnafu)
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(
            body,
            json!({
                "message": "failed to access the video store",
                "error": "Store",
                "data": {}
            })
        );
    }
}
