use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::models::{ChartEnvelope, ChartRequest};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};
use urlencoding::encode;

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.yahoo_base_url.clone(),
        }
    }

    // Single GET against the chart endpoint; no retry, no timeout override.
    pub async fn fetch_chart(&self, request: &ChartRequest) -> Result<Value> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval={}",
            self.base_url,
            encode(&request.ticker),
            request.period1,
            request.period2,
            request.interval
        );

        debug!("Fetching chart data: {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            // Upstream error bodies are not guaranteed to be JSON; read as text
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Upstream raw response: {}", error_text);
            let message = if error_text.trim().is_empty() {
                format!("Upstream returned status: {}", status)
            } else {
                error_text
            };
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        let envelope = ChartEnvelope::deserialize(&body)?;

        if !envelope.has_data() {
            return Err(ProxyError::NoData {
                ticker: request.ticker.clone(),
            });
        }

        debug!("Parsed chart response for {}", request.ticker);
        Ok(body)
    }
}
