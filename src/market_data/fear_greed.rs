// =============================================================================
// Fear & Greed Index client (alternative.me)
// =============================================================================
//
// Response shape:
//   { "data": [ { "value": "25", "value_classification": "Extreme Fear", ... } ] }
// =============================================================================

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::sentiment::SentimentScore;

#[derive(Debug, Clone)]
pub struct FearGreedClient {
    url: String,
    client: reqwest::Client,
}

impl FearGreedClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// GET the latest index reading.
    #[instrument(skip(self), name = "fear_greed::get_latest")]
    pub async fn get_latest(&self) -> Result<SentimentScore> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Fear & Greed request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Fear & Greed response")?;

        if !status.is_success() {
            anyhow::bail!("Fear & Greed returned {}: {}", status, body);
        }

        let score = parse_fear_greed(&body)?;
        debug!(value = score.value, classification = %score.classification, "sentiment fetched");
        Ok(score)
    }
}

pub fn parse_fear_greed(body: &serde_json::Value) -> Result<SentimentScore> {
    let entry = body["data"]
        .as_array()
        .and_then(|d| d.first())
        .context("Fear & Greed response has no data entries")?;

    let value = match &entry["value"] {
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .with_context(|| format!("invalid Fear & Greed value '{s}'"))?,
        v => v.as_i64().context("Fear & Greed value is not an integer")?,
    };

    let classification = entry["value_classification"]
        .as_str()
        .unwrap_or("Unknown");

    Ok(SentimentScore::new(value, classification))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_value() {
        let body = json!({
            "name": "Fear and Greed Index",
            "data": [{ "value": "23", "value_classification": "Extreme Fear", "timestamp": "1700000000" }]
        });
        let s = parse_fear_greed(&body).unwrap();
        assert_eq!(s.value, 23);
        assert_eq!(s.classification, "Extreme Fear");
    }

    #[test]
    fn parses_numeric_value() {
        let body = json!({ "data": [{ "value": 81, "value_classification": "Extreme Greed" }] });
        assert_eq!(parse_fear_greed(&body).unwrap().value, 81);
    }

    #[test]
    fn empty_data_errors() {
        assert!(parse_fear_greed(&json!({ "data": [] })).is_err());
        assert!(parse_fear_greed(&json!({})).is_err());
    }

    #[test]
    fn garbage_value_errors() {
        let body = json!({ "data": [{ "value": "high" }] });
        assert!(parse_fear_greed(&body).is_err());
    }
}
