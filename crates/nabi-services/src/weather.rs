//! Current-weather lookups via OpenWeatherMap, with IP-based geolocation.

use serde::Deserialize;

use crate::error::{Error, Result};

const GEOLOCATION_URL: &str = "https://ipinfo.io/json";
const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// A current-conditions report for one location.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub city: String,
    pub description: String,
    pub temperature_c: f64,
}

impl std::fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} 현재 날씨: {}, 온도: {}°C",
            self.city, self.description, self.temperature_c
        )
    }
}

/// Weather client
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
    weather_url: String,
    geolocation_url: String,
}

impl WeatherClient {
    /// Create a new weather client with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            weather_url: WEATHER_URL.to_string(),
            geolocation_url: GEOLOCATION_URL.to_string(),
        }
    }

    /// Create from the WEATHERMAP_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("WEATHERMAP_API_KEY")
            .map_err(|_| Error::MissingEnv("WEATHERMAP_API_KEY"))?;
        Ok(Self::new(api_key))
    }

    /// Resolve the caller's approximate coordinates from their public IP.
    pub async fn locate(&self) -> Result<(f64, f64)> {
        #[derive(Deserialize)]
        struct IpInfo {
            loc: Option<String>,
        }

        let response = self.client.get(&self.geolocation_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), text));
        }

        let info: IpInfo = response.json().await?;
        let loc = info
            .loc
            .ok_or_else(|| Error::UnexpectedResponse("no loc field in geolocation".into()))?;
        parse_coordinates(&loc)
    }

    /// Fetch current conditions for a coordinate pair, in metric units.
    pub async fn current(&self, lat: f64, lon: f64) -> Result<WeatherReport> {
        tracing::debug!(lat, lon, "current-weather request");
        let response = self
            .client
            .get(&self.weather_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), text));
        }

        let data: OwmResponse = response.json().await?;
        let condition = data
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnexpectedResponse("no weather conditions".into()))?;

        Ok(WeatherReport {
            city: data.name,
            description: condition.description,
            temperature_c: data.main.temp,
        })
    }

    /// Locate the caller and fetch their current weather in one call.
    pub async fn current_here(&self) -> Result<WeatherReport> {
        let (lat, lon) = self.locate().await?;
        self.current(lat, lon).await
    }
}

#[derive(Deserialize)]
struct OwmResponse {
    #[serde(default)]
    name: String,
    weather: Vec<OwmCondition>,
    main: OwmMain,
}

#[derive(Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: f64,
}

/// Parse an ipinfo-style "lat,lon" pair.
fn parse_coordinates(loc: &str) -> Result<(f64, f64)> {
    let mut parts = loc.splitn(2, ',');
    let lat = parts.next().and_then(|s| s.trim().parse::<f64>().ok());
    let lon = parts.next().and_then(|s| s.trim().parse::<f64>().ok());
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(Error::UnexpectedResponse(format!(
            "malformed coordinates: {loc}"
        ))),
    }
}
