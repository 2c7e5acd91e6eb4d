use crate::api::YahooClient;
use crate::config::Config;
use crate::error::Result;
use crate::indicators::{self, IndicatorReport};
use crate::models::{ChartQuery, ChartRequest, ChartSeries, IndicatorsQuery};
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub struct AppState {
    pub client: YahooClient,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            client: YahooClient::new(config),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(health_check))
        .route("/proxy", get(proxy_chart))
        .route("/indicators", get(chart_indicators))
        .layer(cors)
        .with_state(state)
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn proxy_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Value>> {
    let request = ChartRequest::from_query(&query)?;
    info!(
        "Proxying chart request for {} ({})",
        request.ticker, request.interval
    );

    let body = state.client.fetch_chart(&request).await?;
    Ok(Json(body))
}

pub async fn chart_indicators(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndicatorsQuery>,
) -> Result<Json<IndicatorReport>> {
    let request = ChartRequest::from_query(&query.chart())?;
    let periods = indicators::parse_periods(query.periods.as_deref())?;

    let body = state.client.fetch_chart(&request).await?;
    let series = ChartSeries::from_chart(&body, &request.ticker)?;

    let report = indicators::build_report(&request, &series, &periods);
    info!(
        "Calculated indicators for {} ({} data points)",
        request.ticker,
        series.closes.len()
    );
    Ok(Json(report))
}
