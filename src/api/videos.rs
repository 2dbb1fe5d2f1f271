use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use snafu::{ensure, OptionExt as _, ResultExt as _};
use tracing::instrument;

use super::args::{self, Payload};
use super::{
    ApiError, App, ErrorResponse, Result, StoreSnafu, VideoAlreadyExistsSnafu, VideoNotFoundSnafu,
};
use crate::database::DatabaseError;
use crate::model::{NewVideo, Video, VideoId, VideoPatch};

type VideoPath = WithRejection<Path<VideoId>, ApiError>;

#[utoipa::path(
    get,
    path = "/video/{id}",
    tag = "videos",
    params(("id" = i64, Path, description = "Video id")),
    responses(
        (status = 200, description = "The stored video", body = Video),
        (status = 400, description = "The id is not an integer", body = ErrorResponse),
        (status = 404, description = "No video with this id", body = ErrorResponse),
        (status = 500, description = "The store failed", body = ErrorResponse),
    )
)]
#[instrument(skip(app))]
pub async fn get(
    State(app): State<App>,
    WithRejection(Path(id), _): VideoPath,
) -> Result<Json<Video>> {
    let video = app
        .videos()
        .find(id)
        .await
        .context(StoreSnafu)?
        .context(VideoNotFoundSnafu { id })?;

    Ok(Json(video))
}

/// Create a video under a caller-chosen id. Arguments are validated before the id is checked.
#[utoipa::path(
    put,
    path = "/video/{id}",
    tag = "videos",
    params(("id" = i64, Path, description = "Video id")),
    request_body(
        content = NewVideo,
        description = "All fields are required. Also accepted as a url-encoded form or query string."
    ),
    responses(
        (status = 201, description = "The created video", body = Video),
        (status = 400, description = "A field is missing or has the wrong type", body = ErrorResponse),
        (status = 409, description = "A video with this id already exists", body = ErrorResponse),
        (status = 500, description = "The store failed", body = ErrorResponse),
    )
)]
#[instrument(skip(app, payload))]
pub async fn put(
    State(app): State<App>,
    WithRejection(Path(id), _): VideoPath,
    payload: Payload,
) -> Result<(StatusCode, Json<Video>)> {
    let content = args::create(&payload)?;
    let videos = app.videos();

    let exists = videos.exists(id).await.context(StoreSnafu)?;
    ensure!(!exists, VideoAlreadyExistsSnafu { id });

    let video = match videos.insert(id, &content).await {
        // lost a race against another create for the same id
        Err(DatabaseError::RecordExists { .. }) => return VideoAlreadyExistsSnafu { id }.fail(),
        result => result.context(StoreSnafu)?,
    };

    tracing::info!(%id, name = %video.name, "created video");
    Ok((StatusCode::CREATED, Json(video)))
}

/// Update the supplied fields of a video. Omitted or `null` fields keep their value.
#[utoipa::path(
    patch,
    path = "/video/{id}",
    tag = "videos",
    params(("id" = i64, Path, description = "Video id")),
    request_body(content = VideoPatch, description = "Every field is optional."),
    responses(
        (status = 200, description = "The video after the update", body = Video),
        (status = 400, description = "A field has the wrong type", body = ErrorResponse),
        (status = 404, description = "No video with this id", body = ErrorResponse),
        (status = 500, description = "The store failed", body = ErrorResponse),
    )
)]
#[instrument(skip(app, payload))]
pub async fn patch(
    State(app): State<App>,
    WithRejection(Path(id), _): VideoPath,
    payload: Payload,
) -> Result<Json<Video>> {
    let videos = app.videos();

    let current = videos
        .find(id)
        .await
        .context(StoreSnafu)?
        .context(VideoNotFoundSnafu { id })?;

    let patch = args::update(&payload)?;
    if patch.is_empty() {
        tracing::debug!(%id, "nothing to update");
        return Ok(Json(current));
    }

    let video = videos
        .update(id, &patch)
        .await
        .context(StoreSnafu)?
        .context(VideoNotFoundSnafu { id })?;

    tracing::info!(%id, ?patch, "updated video");
    Ok(Json(video))
}

#[utoipa::path(
    delete,
    path = "/video/{id}",
    tag = "videos",
    params(("id" = i64, Path, description = "Video id")),
    responses(
        (status = 204, description = "The video was deleted"),
        (status = 400, description = "The id is not an integer", body = ErrorResponse),
        (status = 404, description = "No video with this id", body = ErrorResponse),
        (status = 500, description = "The store failed", body = ErrorResponse),
    )
)]
#[instrument(skip(app))]
pub async fn delete(
    State(app): State<App>,
    WithRejection(Path(id), _): VideoPath,
) -> Result<StatusCode> {
    app.videos()
        .remove(id)
        .await
        .context(StoreSnafu)?
        .context(VideoNotFoundSnafu { id })?;

    tracing::info!(%id, "deleted video");
    Ok(StatusCode::NO_CONTENT)
}
