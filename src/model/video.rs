use derive_new::new;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller-supplied primary key of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, new)]
#[serde(transparent)]
pub struct VideoId(i64);

impl VideoId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The public projection of a stored video. Serializes to exactly `id`, `name`, `views` and `likes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, new)]
#[schema(example = json!({ "id": 1, "name": "Intro", "views": 100, "likes": 10 }))]
pub struct Video {
    #[schema(value_type = i64)]
    pub id: VideoId,
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

/// Content of a video about to be created. The id comes from the record key, not from the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, new)]
#[schema(example = json!({ "name": "Intro", "views": 100, "likes": 10 }))]
pub struct NewVideo {
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

impl NewVideo {
    pub fn into_video(self, id: VideoId) -> Video {
        Video {
            id,
            name: self.name,
            views: self.views,
            likes: self.likes,
        }
    }
}

/// A partial update. Fields left as `None` are not serialized and so keep their stored value when merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "likes": 20 }))]
pub struct VideoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
}

impl VideoPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.views.is_none() && self.likes.is_none()
    }
}
