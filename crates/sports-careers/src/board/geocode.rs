use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::domain::GeoPoint;
use crate::config::GeocodeConfig;

/// Resolves a free-text location to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, location: &str) -> Result<GeoPoint, GeocodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("geocoding service answered HTTP {0}")]
    Http(u16),
    #[error("geocoding failed with status {0}")]
    Status(String),
    #[error("no geocoding results for '{0}'")]
    NoResults(String),
}

impl GeocodeError {
    /// Message suitable for showing to the person who asked for the map.
    pub fn user_message(&self, location: &str) -> String {
        match self {
            GeocodeError::Transport(_) | GeocodeError::Http(_) => "Failed to load map.".to_string(),
            GeocodeError::Status(_) | GeocodeError::NoResults(_) => {
                format!("Unable to load map for {location}.")
            }
        }
    }
}

/// Geocoder calling a Google-compatible `geocode/json` endpoint.
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpGeocoder {
    pub fn new(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn locate(&self, location: &str) -> Result<GeoPoint, GeocodeError> {
        tracing::debug!(%location, endpoint = %self.endpoint, "geocoding location");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("address", location), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%location, %status, "geocoding service returned an error status");
            return Err(GeocodeError::Http(status.as_u16()));
        }

        let body: GeocodeResponse = response.json().await?;
        body.into_point(location)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn into_point(self, location: &str) -> Result<GeoPoint, GeocodeError> {
        if self.status != "OK" {
            tracing::warn!(%location, status = %self.status, "geocoding failed");
            return Err(GeocodeError::Status(self.status));
        }
        let best = self
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResults(location.to_string()))?;
        Ok(GeoPoint {
            name: location.to_string(),
            lat: best.geometry.location.lat,
            lng: best.geometry.location.lng,
        })
    }
}
