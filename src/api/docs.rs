use axum::Json;
use utoipa::OpenApi;

use super::{videos, ErrorResponse};
use crate::model::{NewVideo, Video, VideoPatch};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "video-api",
        description = "Create, read, update and delete videos addressed by an integer id."
    ),
    paths(videos::get, videos::put, videos::patch, videos::delete),
    components(schemas(Video, NewVideo, VideoPatch, ErrorResponse)),
    tags((name = "videos", description = "Video records"))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
