use crate::error::{AppError, Result};
use crate::models::weather::WeatherForecast;
use crate::models::Coordinates;
use reqwest::Client;

const WEATHERBIT_FORECAST_URL: &str = "https://api.weatherbit.io/v2.0/forecast/daily";

#[derive(Clone)]
pub struct WeatherbitClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherbitClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, WEATHERBIT_FORECAST_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        WeatherbitClient {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Daily forecast for a city, e.g. ("New York", "US", 7).
    pub async fn forecast_by_city(
        &self,
        city: &str,
        country: &str,
        days: u8,
    ) -> Result<WeatherForecast> {
        self.fetch(&[
            ("city", city.to_string()),
            ("country", country.to_string()),
            ("days", days.to_string()),
        ])
        .await
    }

    pub async fn forecast_by_coordinates(&self, coordinates: &Coordinates) -> Result<WeatherForecast> {
        self.fetch(&[
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lng.to_string()),
        ])
        .await
    }

    async fn fetch(&self, params: &[(&str, String)]) -> Result<WeatherForecast> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("Weather request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, "Weatherbit HTTP error {}", status);
            return Err(AppError::ProviderUnavailable(format!(
                "Getting the weather failed: HTTP {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ProviderUnavailable(format!("Failed to parse weather response: {}", e))
        })
    }
}
