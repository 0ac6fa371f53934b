use std::collections::BTreeMap;
use std::sync::Arc;
use axum::{routing::post, Router, Json};
use tower_http::cors::{CorsLayer, Any};
use serde::{Deserialize, Serialize};
use axum::http::StatusCode;
use tracing::{info, warn};
use crate::aggregator::ArchiveAggregator;
use crate::datetime::TemporalValue;
use crate::urls::{fix_url, is_valid_url};

#[derive(Deserialize)]
pub struct LookupRequest {
    pub url: String,
    /// RFC 1123, defaults to now.
    #[serde(default)]
    pub datetime: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MementoEntry {
    pub url: String,
    pub datetime: String,
    pub rel: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LookupResponse {
    pub status: String,
    pub elapsed_ms: f64,
    pub url: String,
    #[serde(default)]
    pub mementos: Vec<MementoEntry>,
    #[serde(default)]
    pub years: BTreeMap<i32, usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl LookupResponse {
    fn rejected(url: String, elapsed_ms: f64, error: String) -> Self {
        Self { status: "error".into(), elapsed_ms, url, mementos: Vec::new(), years: BTreeMap::new(), error: Some(error) }
    }
}

pub fn router(aggregator: Arc<ArchiveAggregator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::POST])
        .allow_headers(Any);
    Router::new()
        .route("/v1/lookup", post(move |Json(req): Json<LookupRequest>| {
        let aggregator = Arc::clone(&aggregator);
        async move {
            let started = std::time::Instant::now();
            let url = fix_url(req.url.trim());
            if req.url.trim().is_empty() || !is_valid_url(&url) {
                warn!(url=%req.url, "invalid url");
                let body = LookupResponse::rejected(req.url, 0.0, "Invalid URL".into());
                return (StatusCode::BAD_REQUEST, Json(body));
            }
            let datetime = match req.datetime.as_deref().map(TemporalValue::parse_rfc1123) {
                None => TemporalValue::now(),
                Some(Ok(datetime)) => datetime,
                Some(Err(e)) => {
                    let msg = format!("{e}");
                    warn!(%msg, "invalid datetime");
                    let body = LookupResponse::rejected(url, 0.0, msg);
                    return (StatusCode::BAD_REQUEST, Json(body));
                }
            };
            let timeline = aggregator.lookup_at(&url, datetime).await;
            let elapsed_ms_f64 = started.elapsed().as_secs_f64() * 1000.0;
            let mementos: Vec<MementoEntry> = timeline.iter().map(|m| MementoEntry {
                url: m.url().to_owned(),
                datetime: m.datetime_string(),
                rel: m.rel().to_owned(),
                icon: aggregator.icon_for(m).map(str::to_owned),
            }).collect();
            info!(ms=elapsed_ms_f64, count=mementos.len(), %url, "lookup served");
            let body = LookupResponse { status: "ok".into(), elapsed_ms: elapsed_ms_f64, url, mementos, years: timeline.year_counts(), error: None };
            (StatusCode::OK, Json(body))
        }
    }))
    .layer(cors)
}
