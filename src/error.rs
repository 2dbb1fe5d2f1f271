use std::net::SocketAddr;

use snafu::{Location, Snafu};

use crate::database::DatabaseError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    /// could not parse the configuration from the environment
    #[snafu(display("could not load configuration at {location}: {source}"))]
    ConfigLoad {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("could not connect to the database at {location}: {source}"))]
    ConnectDatabase {
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not serve the application
    #[snafu(display("web server stopped unexpectedly at {location}: {source}"))]
    WebServer {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not bind to the given address, check if it's already in use
    #[snafu(display("could not bind to `{address}` at {location}: {source}"))]
    BindAddress {
        address: SocketAddr,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("invalid log filter `{filter}` at {location}: {source}"))]
    LogFilter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    #[snafu(display("could not initialize the logger at {location}: {source}"))]
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },
}
