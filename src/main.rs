use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use seatify::{SeatRecommendationService, SeatifyConfig, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = SeatifyConfig::load_from_path(config_path)?;
    logging::init(&config.logging)?;

    tracing::info!("Starting Seatify {}", seatify::VERSION);
    let service = Arc::new(SeatRecommendationService::from_config(&config)?);

    web::run(&config.server, service).await
}
