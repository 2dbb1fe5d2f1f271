use serde::Deserialize;
use snafu::{Location, ResultExt, Snafu};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth;
use surrealdb::Surreal;

/// Persistence for the `videos` table.
pub mod videos;

use crate::error::{ApplicationError, ConnectDatabaseSnafu};
pub use videos::{VideoRow, Videos};

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

const SETUP: &str = include_str!("../../schema.surrealql");

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseError {
    #[snafu(display("cannot connect to the database `{url}` at {location}: {source}"))]
    Connection {
        url: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("cannot sign in to the database `{url}` as `{username}` at {location}: {source}"))]
    SignIn {
        url: String,
        username: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to apply the database schema at {location}: {source}"))]
    Schema {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to query the database at {location}: {source}"))]
    DatabaseQuery {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to parse the database response at {location}: response is empty"))]
    EmptyQuery {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("record `{record}` already exists"))]
    RecordExists {
        record: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("record `{record}` is not a video record at {location}"))]
    MalformedRecord {
        record: String,
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(rename = "ns", default = "default_name")]
    pub namespace: String,
    #[serde(rename = "db", default = "default_name")]
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_url() -> String {
    "mem://".to_string()
}

fn default_name() -> String {
    "videos".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: default_url(),
            namespace: default_name(),
            database: default_name(),
            username: None,
            password: None,
        }
    }
}

impl DatabaseConfig {
    fn credentials(&self) -> Option<auth::Database<'_>> {
        let username = self.username.as_deref()?;

        Some(auth::Database {
            namespace: &self.namespace,
            database: &self.database,
            username,
            password: self.password.as_deref().unwrap_or(""),
        })
    }
}

pub async fn connect(config: &DatabaseConfig) -> Result<Database, ApplicationError> {
    Database::connect(config).await.context(ConnectDatabaseSnafu)
}

/// Handle to the record store. Cloning is cheap, every clone talks to the same connection.
#[derive(Debug, Clone)]
pub struct Database {
    database: Surreal<Any>,
}

impl Database {
    /// Connect, sign in when credentials are configured, select the namespace and apply the schema.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let database = surrealdb::engine::any::connect(config.url.as_str())
            .await
            .context(ConnectionSnafu { url: &config.url })?;

        if let Some(credentials) = config.credentials() {
            let username = credentials.username;
            database
                .signin(credentials)
                .await
                .context(SignInSnafu { url: &config.url, username })?;
        }

        database
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .context(ConnectionSnafu { url: &config.url })?;

        database
            .query(SETUP)
            .await
            .and_then(surrealdb::Response::check)
            .context(SchemaSnafu)?;

        tracing::info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connected to the database"
        );

        Ok(Database { database })
    }

    /// A fresh in-memory database with the schema applied.
    pub async fn memory() -> Result<Self> {
        Self::connect(&DatabaseConfig::default()).await
    }

    pub fn videos(&self) -> Videos<'_> {
        Videos::new(self)
    }
}

impl std::ops::Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}
