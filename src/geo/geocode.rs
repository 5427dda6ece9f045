use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::pickup::Coordinates;
use crate::config::GeocodingConfig;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder answered with status {0}")]
    Status(String),

    #[error("geocoder returned unusable coordinates")]
    BadCoordinates,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: NominatimAddress,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

impl NominatimAddress {
    pub fn locality(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
            .or_else(|| self.county.clone())
    }
}

impl NominatimPlace {
    pub fn coordinates(&self) -> Result<Coordinates, GeoError> {
        let lat = self.lat.parse().map_err(|_| GeoError::BadCoordinates)?;
        let lng = self.lon.parse().map_err(|_| GeoError::BadCoordinates)?;

        Coordinates::new(lat, lng).ok_or(GeoError::BadCoordinates)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleGeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResult {
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
pub struct GoogleGeometry {
    pub location: GoogleLatLng,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Forward and reverse geocoding against Google (when keyed) and Nominatim.
pub struct Geocoder<'a> {
    http: &'a Client,
    config: &'a GeocodingConfig,
}

impl<'a> Geocoder<'a> {
    pub fn new(http: &'a Client, config: &'a GeocodingConfig) -> Self {
        Self { http, config }
    }

    /// Centroid of an Indian postal code. Paid geocoder first, public one as fallback.
    pub async fn geocode_pincode(&self, pincode: &str) -> Option<Coordinates> {
        if let Some(key) = &self.config.google_api_key {
            match self.google_pincode(key, pincode).await {
                Ok(Some(coords)) => return Some(coords),
                Ok(None) => debug!(pincode, "google geocoder found nothing"),
                Err(e) => warn!(pincode, error = %e, "google geocoding failed"),
            }
        }

        match self.nominatim_pincode(pincode).await {
            Ok(coords) => coords,
            Err(e) => {
                warn!(pincode, error = %e, "nominatim geocoding failed");
                None
            }
        }
    }

    async fn google_pincode(&self, key: &str, pincode: &str) -> Result<Option<Coordinates>, GeoError> {
        let url = format!("{}/maps/api/geocode/json", self.config.google_base);
        let components = format!("country:IN|postal_code:{pincode}");

        let response: GoogleGeocodeResponse = self
            .http
            .get(url)
            .query(&[
                ("address", pincode),
                ("components", components.as_str()),
                ("key", key),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.status.as_str() {
            "OK" => Ok(response
                .results
                .first()
                .and_then(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))),
            "ZERO_RESULTS" => Ok(None),
            other => Err(GeoError::Status(other.to_owned())),
        }
    }

    async fn nominatim_pincode(&self, pincode: &str) -> Result<Option<Coordinates>, GeoError> {
        let places: Vec<NominatimPlace> = self
            .http
            .get(format!("{}/search", self.config.nominatim_base))
            .query(&[
                ("postalcode", pincode),
                ("country", "India"),
                ("format", "json"),
                ("limit", "1"),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        places.first().map(NominatimPlace::coordinates).transpose()
    }

    pub async fn search(&self, query: &str) -> Result<Option<NominatimPlace>, GeoError> {
        let places: Vec<NominatimPlace> = self
            .http
            .get(format!("{}/search", self.config.nominatim_base))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("countrycodes", "in"),
                ("limit", "1"),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(places.into_iter().next())
    }

    pub async fn reverse(&self, coords: Coordinates) -> Result<Option<NominatimPlace>, GeoError> {
        let response = self
            .http
            .get(format!("{}/reverse", self.config.nominatim_base))
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lng.to_string()),
                ("format", "json".to_owned()),
                ("addressdetails", "1".to_owned()),
            ])
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?;

        // Nominatim answers {"error": "..."} with 200 when nothing is nearby.
        let body: serde_json::Value = response.json().await?;
        if body.get("error").is_some() {
            return Ok(None);
        }

        Ok(serde_json::from_value(body).ok())
    }
}
