use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use snafu::ResultExt;

use crate::database::DatabaseConfig;
use crate::error::{ApplicationError, ConfigLoadSnafu};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(rename = "host_address", default = "default_host")]
    pub host: SocketAddr,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_host() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Load the configuration from the process environment.
pub fn load() -> Result<Config, ApplicationError> {
    from_vars(std::env::vars())
}

/// Server settings are read from unprefixed variables, database settings from `SURREAL_*` variables.
pub fn from_vars(
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<Config, ApplicationError> {
    let vars: Vec<(String, String)> = vars.into_iter().collect();

    let server = envy::from_iter(vars.clone()).context(ConfigLoadSnafu)?;
    let database = envy::prefixed("SURREAL_")
        .from_iter(vars)
        .context(ConfigLoadSnafu)?;

    Ok(Config { server, database })
}
