// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, services and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;
#[cfg(test)]
mod testing;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use config::Config;
use db::{LikeRepository, PlaceRepository};
use dotenv::dotenv;
use services::{
    BucketPhotoArchive, GcsBucket, GoogleMapsClient, LikeService, NearbySearchService,
    PlaceResolver, ServiceAccountKey,
};
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting hungries-places service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Wire stores, provider and photo archive into the services
    let (search, likes) = build_services(&config, pool)?;
    let search = web::Data::new(search);
    let likes = web::Data::new(likes);
    log::info!(
        "Backfill concurrency: {}, photo bucket: {}",
        config.backfill_concurrency,
        config.storage_bucket
    );

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(search.clone())
            .app_data(likes.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::places_config)
            .configure(handlers::likes_config)
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await
    .context("HTTP server stopped with an error")
}

fn build_services(
    config: &Config,
    pool: sqlx::PgPool,
) -> anyhow::Result<(NearbySearchService, LikeService)> {
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let places = Arc::new(PlaceRepository::new(pool.clone()));
    let like_store = Arc::new(LikeRepository::new(pool));

    let provider = Arc::new(
        GoogleMapsClient::new(config.google_maps_api_key.clone(), timeout)
            .context("failed to create Google Maps client")?,
    );
    let storage_key = ServiceAccountKey::from_json(&config.storage_key_json)
        .context("STORAGE_KEY_JSON is not a service account key")?;
    let bucket = GcsBucket::new(config.storage_bucket.clone(), storage_key, timeout)
        .context("failed to create storage client")?;
    let photos = Arc::new(BucketPhotoArchive::new(bucket));

    let resolver = PlaceResolver::new(
        places.clone(),
        provider.clone(),
        photos,
        config.backfill_concurrency,
    );
    let search = NearbySearchService::new(provider, resolver, places.clone(), like_store.clone());
    let likes = LikeService::new(places, like_store);

    Ok((search, likes))
}
