use serde::{Deserialize, Serialize};

/// Weatherbit 16-day daily forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherForecast {
    // Weatherbit has sent these both as strings and as numbers
    #[serde(default)]
    pub lat: serde_json::Value,
    #[serde(default)]
    pub lon: serde_json::Value,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub data: Vec<WeatherDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDay {
    pub valid_date: String,
    #[serde(default)]
    pub ts: Option<i64>,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub max_temp: Option<f64>,
    #[serde(default)]
    pub min_temp: Option<f64>,
    #[serde(default)]
    pub app_max_temp: Option<f64>,
    #[serde(default)]
    pub app_min_temp: Option<f64>,
    /// Probability of precipitation, percent.
    #[serde(default)]
    pub pop: Option<f64>,
    #[serde(default)]
    pub precip: Option<f64>,
    #[serde(default)]
    pub snow: Option<f64>,
    #[serde(default)]
    pub wind_spd: Option<f64>,
    #[serde(default)]
    pub wind_cdir: Option<String>,
    #[serde(default)]
    pub rh: Option<f64>,
    #[serde(default)]
    pub clouds: Option<f64>,
    #[serde(default)]
    pub uv: Option<f64>,
    #[serde(default)]
    pub weather: Option<WeatherSummary>,
    #[serde(default)]
    pub sunrise_ts: Option<i64>,
    #[serde(default)]
    pub sunset_ts: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub icon: String,
    pub code: serde_json::Value,
    pub description: String,
}

/// `GET /data/weather/location` query.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherLocationQuery {
    pub city: String,
    pub country: String,
    #[serde(default = "default_forecast_days")]
    pub days: u8,
}

fn default_forecast_days() -> u8 {
    7
}

impl WeatherLocationQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.city.trim().is_empty() || self.country.trim().is_empty() {
            return Err("city and country are required".to_string());
        }
        if !(1..=16).contains(&self.days) {
            return Err("days must be between 1 and 16".to_string());
        }
        Ok(())
    }
}

/// `GET /data/weather/coordinates` query.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherCoordinatesQuery {
    pub lat: f64,
    pub lng: f64,
}
