use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info};

use dermanode::config::ServerConfig;
use dermanode::inference::{Classifier, ModelInference};
use dermanode::routes::{self, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let config = ServerConfig::from_env();

    info!("Loading model from {}", config.model_path.display());
    let classifier: Option<Arc<dyn Classifier>> = match ModelInference::load(&config.model_path) {
        Ok(model) => {
            info!("Model loaded and ready");
            Some(Arc::new(model) as Arc<dyn Classifier>)
        }
        Err(e) => {
            error!("Could not load model: {:#}", e);
            None
        }
    };

    let state = web::Data::new(AppState::new(classifier, config.max_upload_bytes));
    let bind_address = config.bind_address();

    info!("Server listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("   GET  /      - liveness");
    info!("   POST /scan  - classify a lesion image (multipart field 'file')");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
