use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::models::Location;

pub const BIGDATACLOUD_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

/// Place name for a coordinate pair. Either part may be unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Place {
    pub city: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Place>;
}

/// Geocoder used when lookups are disabled. Resolves nothing.
pub struct NoopGeocoder;

#[async_trait]
impl ReverseGeocoder for NoopGeocoder {
    async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> Result<Place> {
        Ok(Place::default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BigDataCloudResponse {
    city: Option<String>,
    locality: Option<String>,
    country_name: Option<String>,
}

pub struct BigDataCloudGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl BigDataCloudGeocoder {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build geocoding HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl ReverseGeocoder for BigDataCloudGeocoder {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Place> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await
            .context("Failed to send reverse geocoding request")?
            .error_for_status()
            .context("Reverse geocoding request rejected")?;
        let body: BigDataCloudResponse = resp
            .json()
            .await
            .context("Failed to parse reverse geocoding response")?;
        Ok(Place {
            city: non_empty(body.city).or_else(|| non_empty(body.locality)),
            country: non_empty(body.country_name),
        })
    }
}

/// Fill in missing city/country on a submitted location. Lookup failures
/// are logged and leave the location as submitted.
pub async fn enrich_location(geocoder: &dyn ReverseGeocoder, mut location: Location) -> Location {
    if location.city.is_some() && location.country.is_some() {
        return location;
    }
    match geocoder
        .reverse_geocode(location.latitude, location.longitude)
        .await
    {
        Ok(place) => {
            location.city = location.city.or(place.city);
            location.country = location.country.or(place.country);
        }
        Err(e) => {
            tracing::warn!(error = %e, "reverse geocoding failed; keeping location unresolved");
        }
    }
    location
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder(Place);

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> Result<Place> {
            Ok(self.0.clone())
        }
    }

    struct BrokenGeocoder;

    #[async_trait]
    impl ReverseGeocoder for BrokenGeocoder {
        async fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> Result<Place> {
            anyhow::bail!("connection reset")
        }
    }

    fn bare_location() -> Location {
        Location {
            latitude: 19.07,
            longitude: 72.87,
            city: None,
            country: None,
        }
    }

    #[tokio::test]
    async fn test_enrich_fills_missing_parts() {
        let geocoder = FixedGeocoder(Place {
            city: Some("Mumbai".into()),
            country: Some("India".into()),
        });
        let mut loc = bare_location();
        loc.city = Some("Bombay".into());
        let enriched = enrich_location(&geocoder, loc).await;
        assert_eq!(enriched.city.as_deref(), Some("Bombay"));
        assert_eq!(enriched.country.as_deref(), Some("India"));
    }

    #[tokio::test]
    async fn test_enrich_failure_leaves_location_unresolved() {
        let enriched = enrich_location(&BrokenGeocoder, bare_location()).await;
        assert_eq!(enriched, bare_location());
    }

    #[tokio::test]
    async fn test_noop_geocoder_resolves_nothing() {
        let enriched = enrich_location(&NoopGeocoder, bare_location()).await;
        assert!(enriched.city.is_none());
        assert!(enriched.country.is_none());
    }

    #[test]
    fn test_response_prefers_city_then_locality() {
        let body: BigDataCloudResponse = serde_json::from_str(
            r#"{"city": "", "locality": "Andheri", "countryName": "India"}"#,
        )
        .unwrap();
        assert_eq!(
            non_empty(body.city).or_else(|| non_empty(body.locality)),
            Some("Andheri".to_string())
        );
        assert_eq!(non_empty(body.country_name), Some("India".to_string()));
    }
}
