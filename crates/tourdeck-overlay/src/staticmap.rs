//! Composite static map fetching.

use crate::OverlayError;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tourdeck_core::config::MapConfig;
use tourdeck_core::constants::{MAP_MARKER_COLOR, MAP_SCALE_SUFFIX};

/// One geographic coordinate, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Source of composite map images.
///
/// Implementations place one marker per point, in input order, and frame
/// the result so all markers are visible.
#[async_trait]
pub trait StaticMapProvider: Send + Sync {
    async fn composite_map(
        &self,
        points: &[GeoPoint],
        width: u32,
        height: u32,
    ) -> Result<Bytes, OverlayError>;
}

/// Mapbox Static Images API client.
pub struct MapboxStaticMaps {
    http: reqwest::Client,
    api_base: String,
    style: String,
    access_token: String,
}

impl MapboxStaticMaps {
    /// Build a client from configuration. The access token is injected
    /// here, never embedded in code. An explicit request timeout is imposed
    /// because the provider call has none upstream.
    pub fn new(config: &MapConfig) -> Result<Self, OverlayError> {
        let access_token = config
            .access_token
            .clone()
            .ok_or_else(|| OverlayError::Config("MAPBOX_ACCESS_TOKEN not configured".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OverlayError::Config(e.to_string()))?;

        Ok(MapboxStaticMaps {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            style: config.style.clone(),
            access_token,
        })
    }

    /// The full request URL: one `pin-s+{color}({lon},{lat})` marker per
    /// point in input order, auto bounding-box framing, retina scale.
    fn request_url(
        &self,
        points: &[GeoPoint],
        width: u32,
        height: u32,
    ) -> Result<String, OverlayError> {
        if points.is_empty() {
            return Err(OverlayError::EmptyStops);
        }
        for p in points {
            if !p.lat.is_finite() || !p.lon.is_finite() {
                return Err(OverlayError::InvalidCoordinate {
                    lat: p.lat,
                    lon: p.lon,
                });
            }
        }

        let markers = points
            .iter()
            .map(|p| format!("pin-s+{}({},{})", MAP_MARKER_COLOR, p.lon, p.lat))
            .collect::<Vec<_>>()
            .join(",");

        Ok(format!(
            "{}/styles/v1/{}/static/{}/auto/{}x{}{}?access_token={}",
            self.api_base, self.style, markers, width, height, MAP_SCALE_SUFFIX, self.access_token
        ))
    }
}

#[async_trait]
impl StaticMapProvider for MapboxStaticMaps {
    async fn composite_map(
        &self,
        points: &[GeoPoint],
        width: u32,
        height: u32,
    ) -> Result<Bytes, OverlayError> {
        let url = self.request_url(points, width, height)?;
        let start = std::time::Instant::now();

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // URL carries the access token; log only derived fields.
            tracing::error!(
                status = status.as_u16(),
                markers = points.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "static map request failed"
            );
            return Err(OverlayError::MapStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;

        tracing::info!(
            markers = points.len(),
            width = width,
            height = height,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "static map fetched"
        );

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MapboxStaticMaps {
        MapboxStaticMaps::new(&MapConfig {
            access_token: Some("test-token".to_string()),
            style: "mapbox/streets-v11".to_string(),
            api_base: "https://api.mapbox.com".to_string(),
            timeout_secs: 5,
            width: 600,
            height: 500,
        })
        .unwrap()
    }

    #[test]
    fn url_has_one_marker_per_point_in_input_order() {
        let url = client()
            .request_url(
                &[
                    GeoPoint {
                        lat: 42.3763,
                        lon: -71.2351,
                    },
                    GeoPoint {
                        lat: 42.40,
                        lon: -71.30,
                    },
                ],
                600,
                500,
            )
            .unwrap();

        assert_eq!(
            url,
            "https://api.mapbox.com/styles/v1/mapbox/streets-v11/static/\
             pin-s+555555(-71.2351,42.3763),pin-s+555555(-71.3,42.4)\
             /auto/600x500@2x?access_token=test-token"
        );
    }

    #[test]
    fn url_marker_count_tracks_input_length() {
        let points: Vec<GeoPoint> = (0..5)
            .map(|i| GeoPoint {
                lat: 42.0 + i as f64,
                lon: -71.0 - i as f64,
            })
            .collect();
        let url = client().request_url(&points, 600, 500).unwrap();
        assert_eq!(url.matches("pin-s+").count(), 5);
    }

    #[test]
    fn empty_point_list_is_rejected() {
        assert!(matches!(
            client().request_url(&[], 600, 500),
            Err(OverlayError::EmptyStops)
        ));
    }

    #[test]
    fn non_finite_point_is_rejected() {
        assert!(matches!(
            client().request_url(
                &[GeoPoint {
                    lat: f64::NAN,
                    lon: -71.3
                }],
                600,
                500
            ),
            Err(OverlayError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let result = MapboxStaticMaps::new(&MapConfig {
            access_token: None,
            style: "mapbox/streets-v11".to_string(),
            api_base: "https://api.mapbox.com".to_string(),
            timeout_secs: 5,
            width: 600,
            height: 500,
        });
        assert!(matches!(result, Err(OverlayError::Config(_))));
    }
}
