use dotenvy::dotenv;

use video_api::error::ApplicationError;
use video_api::{api, config, database, logger};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = config::load()?;

    let _guard = logger::init(&config.server)?;

    let database = database::connect(&config.database).await?;

    api::serve(config.server.host, api::App::new(database)).await
}
