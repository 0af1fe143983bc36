mod config;
mod db;
mod error;
mod handlers;
mod models;
mod render;
mod resolver;
mod routes;
mod state;
mod structs;
mod utils;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use anyhow::Context;
use dotenv::dotenv;
use env_logger::Env;

use crate::config::settings::AppConfig;
use crate::db::mongodb::get_database;
use crate::routes::init_routes;
use crate::state::app_state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    let db = get_database(&config)
        .await
        .with_context(|| format!("Error connecting to database {}", config.db_name))?;

    if !config.analytics_enabled {
        log::info!("Scan analytics disabled by configuration");
    }

    let bind_addr = (config.host.clone(), config.port);
    let cors_origins = config.cors_origins.clone();
    let app_state = web::Data::new(AppState { db, config });

    log::info!("Starting server on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![http::header::ACCEPT, http::header::CONTENT_TYPE])
            .expose_headers(vec![http::header::CONTENT_DISPOSITION])
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(init_routes)
    })
    .bind(bind_addr)
    .context("Failed to bind server address")?
    .run()
    .await
    .context("Server error")
}
