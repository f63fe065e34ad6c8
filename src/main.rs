mod classifier;
mod config;
mod context;
mod error;
mod handlers;
mod models;
mod preprocess;
mod templates;
mod upload;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use classifier::{Classifier, OnnxClassifier};
use config::AppConfig;
use context::AppContext;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::default();
    upload::ensure_dir(&config.upload_dir)?;

    log::info!("Loading model from {}", config.model_path.display());
    let classifier: Arc<dyn Classifier> = Arc::new(OnnxClassifier::load(&config.model_path)?);

    let pages = templates::Pages::new()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let ctx = web::Data::new(AppContext::new(&config, classifier, pages));

    let (host, port) = config.bind_addr.clone();
    log::info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(ctx.clone())
            .configure(handlers::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
