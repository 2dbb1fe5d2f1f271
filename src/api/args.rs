use std::collections::HashMap;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Query, Request};
use axum::http::header;
use axum::Form;
use serde_json::{Map, Value};
use snafu::OptionExt as _;

use super::error::*;
use super::Result;
use crate::model::{NewVideo, VideoPatch};

/// A declared request field: where to find it, how to coerce it and how to describe it when it is wrong.
pub struct Field<T> {
    pub name: &'static str,
    pub help: &'static str,
    pub expected: &'static str,
    coerce: fn(&Value) -> Option<T>,
}

pub const NAME: Field<String> = Field {
    name: "name",
    help: "name of the video",
    expected: "a string",
    coerce: string,
};

pub const VIEWS: Field<i64> = Field {
    name: "views",
    help: "number of views of the video",
    expected: "an integer",
    coerce: integer,
};

pub const LIKES: Field<i64> = Field {
    name: "likes",
    help: "number of likes of the video",
    expected: "an integer",
    coerce: integer,
};

fn string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Raw request fields, from a JSON object or an url-encoded form body, backed by the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn from_json(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload::default());
        }

        let value: Value = serde_json::from_slice(body).map_err(|source| {
            MalformedBodySnafu {
                reason: source.to_string(),
            }
            .build()
        })?;

        match value {
            Value::Object(fields) => Ok(Payload { fields }),
            Value::Null => Ok(Payload::default()),
            _ => MalformedBodySnafu {
                reason: "expected a JSON object",
            }
            .fail(),
        }
    }

    pub fn from_form(fields: HashMap<String, String>) -> Self {
        let fields = fields
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        Payload { fields }
    }

    /// Fill in fields the body did not carry from the query string. The body wins on a clash.
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        for (key, value) in query {
            self.fields.entry(key).or_insert(Value::String(value));
        }

        self
    }

    /// `null` counts as absent.
    fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    pub fn optional<T>(&self, field: &Field<T>) -> Result<Option<T>> {
        self.value(field.name)
            .map(|value| {
                (field.coerce)(value).context(InvalidArgumentSnafu {
                    field: field.name,
                    expected: field.expected,
                    help: field.help,
                })
            })
            .transpose()
    }

    pub fn required<T>(&self, field: &Field<T>) -> Result<T> {
        self.optional(field)?.context(MissingArgumentSnafu {
            field: field.name,
            help: field.help,
        })
    }
}

/// Arguments for creating a video, every field is required.
pub fn create(payload: &Payload) -> Result<NewVideo> {
    Ok(NewVideo {
        name: payload.required(&NAME)?,
        views: payload.required(&VIEWS)?,
        likes: payload.required(&LIKES)?,
    })
}

/// Arguments for updating a video, every field is optional.
pub fn update(payload: &Payload) -> Result<VideoPatch> {
    Ok(VideoPatch {
        name: payload.optional(&NAME)?,
        views: payload.optional(&VIEWS)?,
        likes: payload.optional(&LIKES)?,
    })
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .map_err(|rejection| {
                MalformedBodySnafu {
                    reason: rejection.body_text(),
                }
                .build()
            })?;

        if is_form(&request) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(request, state)
                .await
                .map_err(|rejection| {
                    MalformedBodySnafu {
                        reason: rejection.body_text(),
                    }
                    .build()
                })?;

            return Ok(Payload::from_form(fields).with_query(query));
        }

        let body = Bytes::from_request(request, state).await.map_err(|rejection| {
            MalformedBodySnafu {
                reason: rejection.body_text(),
            }
            .build()
        })?;

        Ok(Payload::from_json(&body)?.with_query(query))
    }
}
