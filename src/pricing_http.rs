//! HTTP price strategy.
//!
//! Same `{distance_km, duration_min, seats, when} -> {price}` contract as
//! the subprocess transport, spoken to a pricing service over HTTP.

use serde::Deserialize;

use crate::pricing::{EstimateError, TripFeatures};
use crate::traits::PriceStrategy;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout_secs: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpStrategy {
    config: HttpConfig,
    client: reqwest::blocking::Client,
}

impl HttpStrategy {
    pub fn new(config: HttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl PriceStrategy for HttpStrategy {
    fn estimate(&self, features: &TripFeatures) -> Result<f64, EstimateError> {
        let url = format!("{}/price", self.config.base_url);

        let response: PriceResponse = self
            .client
            .post(url)
            .json(features)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())?;

        if response.price.is_finite() {
            Ok(response.price)
        } else {
            Err(EstimateError::Process(
                "pricing service returned a non-finite price".to_string(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    price: f64,
}
