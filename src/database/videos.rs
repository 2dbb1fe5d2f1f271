use derive_new::new;
use serde::Deserialize;
use snafu::{OptionExt as _, ResultExt as _};
use surrealdb::sql::{Id, Thing};
use tracing::instrument;

use super::*;
use crate::model::{NewVideo, Video, VideoId, VideoPatch};

pub const TABLE: &str = "videos";

/// A video as it is stored, keyed by the record id `videos:<id>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoRow {
    pub id: Thing,
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

impl TryFrom<VideoRow> for Video {
    type Error = DatabaseError;

    fn try_from(row: VideoRow) -> Result<Self> {
        let id = match &row.id {
            Thing {
                tb,
                id: Id::Number(id),
            } if tb == TABLE => VideoId::new(*id),
            thing => {
                return MalformedRecordSnafu {
                    record: thing.to_string(),
                }
                .fail()
            }
        };

        Ok(Video {
            id,
            name: row.name,
            views: row.views,
            likes: row.likes,
        })
    }
}

fn record(id: VideoId) -> Thing {
    Thing {
        tb: TABLE.to_string(),
        id: Id::Number(id.get()),
    }
}

fn key(id: VideoId) -> (&'static str, i64) {
    (TABLE, id.get())
}

fn into_video(row: Option<VideoRow>) -> Result<Option<Video>> {
    row.map(Video::try_from).transpose()
}

/// Typed access to the `videos` table. Every method is a single statement against the store.
#[derive(Debug, Clone, Copy, new)]
pub struct Videos<'a> {
    database: &'a Database,
}

impl Videos<'_> {
    #[instrument(skip(self))]
    pub async fn find(&self, id: VideoId) -> Result<Option<Video>> {
        let row: Option<VideoRow> = self
            .database
            .select(key(id))
            .await
            .context(DatabaseQuerySnafu)?;

        into_video(row)
    }

    pub async fn exists(&self, id: VideoId) -> Result<bool> {
        Ok(self.find(id).await?.is_some())
    }

    /// Insert a new record. Fails with [DatabaseError::RecordExists] when the id is already taken.
    #[instrument(skip(self))]
    pub async fn insert(&self, id: VideoId, video: &NewVideo) -> Result<Video> {
        let result: surrealdb::Result<Option<VideoRow>> =
            self.database.create(key(id)).content(video).await;

        let row = match result {
            Err(surrealdb::Error::Db(surrealdb::error::Db::RecordExists { .. })) => {
                return RecordExistsSnafu {
                    record: record(id).to_string(),
                }
                .fail()
            }
            result => result.context(DatabaseQuerySnafu)?,
        };

        tracing::debug!(%id, "inserted video into database");
        row.context(EmptyQuerySnafu)?.try_into()
    }

    /// Merge the supplied fields into an existing record.
    #[instrument(skip(self))]
    pub async fn update(&self, id: VideoId, patch: &VideoPatch) -> Result<Option<Video>> {
        let row: Option<VideoRow> = self
            .database
            .update(key(id))
            .merge(patch)
            .await
            .context(DatabaseQuerySnafu)?;

        tracing::debug!(%id, "updated video in database");
        into_video(row)
    }

    /// Remove a record, returning what was removed or `None` if nothing was there.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: VideoId) -> Result<Option<Video>> {
        let row: Option<VideoRow> = self
            .database
            .delete(key(id))
            .await
            .context(DatabaseQuerySnafu)?;

        tracing::debug!(%id, removed = row.is_some(), "deleted video from database");
        into_video(row)
    }
}
