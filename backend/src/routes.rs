use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use log::{error, info};

use crate::error::ScanError;
use crate::inference::Classifier;
use crate::models::{HealthResponse, ScanResponse};
use crate::preprocess::preprocess;
use crate::verdict::evaluate;

pub const UPLOAD_FIELD: &str = "file";

/// Shared, read-only request context. `classifier` is `None` when the model
/// failed to load at startup.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Option<Arc<dyn Classifier>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(classifier: Option<Arc<dyn Classifier>>, max_upload_bytes: usize) -> Self {
        AppState {
            classifier,
            max_upload_bytes,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health_check))
        .route("/scan", web::post().to(scan));
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::online())
}

async fn scan(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse, ScanError> {
    let result = run_scan(&state, payload).await;
    if let Err(e) = &result {
        error!("scan failed: {}", e);
    }
    result
}

async fn run_scan(state: &AppState, payload: Multipart) -> Result<HttpResponse, ScanError> {
    let classifier = state
        .classifier
        .clone()
        .ok_or(ScanError::ModelUnavailable)?;

    let bytes = read_upload(payload, state.max_upload_bytes).await?;
    info!("scan request received: {} bytes", bytes.len());

    let verdict = web::block(move || {
        let input = preprocess(&bytes)?;
        let probs = classifier.classify(&input)?;
        Ok::<_, ScanError>(evaluate(&probs))
    })
    .await
    .map_err(|e| ScanError::Inference(e.to_string()))??;

    info!(
        "scan verdict: {} ({:.2}%, {:?})",
        verdict.diagnosis, verdict.confidence, verdict.severity
    );
    Ok(HttpResponse::Ok().json(ScanResponse::success(verdict)))
}

async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Vec<u8>, ScanError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ScanError::Upload(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| ScanError::Upload(e.to_string()))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(ScanError::Upload(format!(
                    "upload exceeds {} bytes",
                    limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(bytes);
    }

    Err(ScanError::MissingFile)
}
