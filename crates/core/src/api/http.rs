//! HTTP implementation of [`TransitApi`].
//!
//! Wire payloads carry route geometry as encoded polyline strings; decoding
//! happens right here at the boundary, so everything past this module works
//! with plain coordinate sequences.

use std::future::Future;
use std::pin::Pin;

use buslive_transit::geometry::polyline;
use buslive_transit::identifiers::{LineIdentifier, VehicleIdentifier};
use buslive_transit::models::{
    Direction, DirectionRoute, LineInfo, RouteGeometry, Stop, TransitError, TransitMode,
    VehicleFix,
};
use geo::Point;
use serde::Deserialize;

use crate::error::{Error, Result};

use super::TransitApi;

pub struct HttpTransitApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransitApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: String) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

impl TransitApi for HttpTransitApi {
    fn line_directory<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<LineInfo>>> + Send + 'a>> {
        Box::pin(async move {
            let lines: Vec<LineDto> = self.get_json("lines".to_string()).await?;
            lines.into_iter().map(LineDto::into_model).collect()
        })
    }

    fn direction_routes<'a>(
        &'a self,
        line: &'a LineIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DirectionRoute>>> + Send + 'a>> {
        Box::pin(async move {
            let detail: RouteDetailDto = self.get_json(format!("lines/{line}/route")).await?;
            detail
                .directions
                .into_iter()
                .map(DirectionDto::into_model)
                .collect()
        })
    }

    fn vehicle_positions<'a>(
        &'a self,
        line: &'a LineIdentifier,
        direction: Direction,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<VehicleFix>>> + Send + 'a>> {
        Box::pin(async move {
            let vehicles: Vec<VehicleDto> = self
                .get_json(format!("lines/{line}/vehicles?direction={}", direction.as_str()))
                .await?;
            Ok(vehicles
                .into_iter()
                .map(|dto| dto.into_model(line.clone(), direction))
                .collect())
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct LineDto {
    id: String,
    short_name: String,
    long_name: String,
    mode: String,
    color: Option<String>,
    text_color: Option<String>,
}

impl LineDto {
    fn into_model(self) -> Result<LineInfo> {
        let mode = TransitMode::from_api(&self.mode)
            .ok_or(TransitError::UnknownMode(self.mode))
            .map_err(Error::Transit)?;
        Ok(LineInfo {
            id: LineIdentifier::new(self.id),
            short_name: self.short_name.into(),
            long_name: self.long_name.into(),
            mode,
            color: self.color.map(Into::into),
            text_color: self.text_color.map(Into::into),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RouteDetailDto {
    directions: Vec<DirectionDto>,
}

#[derive(Debug, Deserialize)]
struct DirectionDto {
    direction: String,
    /// Encoded polyline per disjoint segment; kept apart downstream.
    polylines: Vec<String>,
    stops: Vec<StopDto>,
}

impl DirectionDto {
    fn into_model(self) -> Result<DirectionRoute> {
        let direction = Direction::from_api(&self.direction)
            .ok_or(TransitError::UnknownDirection(self.direction))
            .map_err(Error::Transit)?;
        let segments = self.polylines.iter().map(|s| polyline::decode(s)).collect();
        Ok(DirectionRoute {
            direction,
            geometry: RouteGeometry::new(segments),
            stops: self
                .stops
                .into_iter()
                .map(|s| Stop::new(s.name, Point::new(s.lng, s.lat)))
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StopDto {
    name: String,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct VehicleDto {
    id: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    bearing: f64,
}

impl VehicleDto {
    fn into_model(self, line: LineIdentifier, direction: Direction) -> VehicleFix {
        VehicleFix {
            vehicle: VehicleIdentifier::new(self.id),
            line,
            direction,
            position: Point::new(self.lng, self.lat),
            bearing_deg: self.bearing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_payload_converts() {
        let dto: LineDto = serde_json::from_str(
            r##"{"id":"12","short_name":"12","long_name":"Gara de Nord - Piata Romana",
                 "mode":"bus","color":"e4572e","text_color":null}"##,
        )
        .unwrap();
        let info = dto.into_model().unwrap();
        assert_eq!(info.id.as_str(), "12");
        assert_eq!(info.mode, TransitMode::Bus);
        assert_eq!(info.color.as_deref(), Some("e4572e"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let dto: LineDto = serde_json::from_str(
            r#"{"id":"f1","short_name":"F1","long_name":"Ferry","mode":"ferry"}"#,
        )
        .unwrap();
        assert!(dto.into_model().is_err());
    }

    #[test]
    fn direction_payload_decodes_polylines_at_the_boundary() {
        let dto: DirectionDto = serde_json::from_str(
            r#"{"direction":"outward",
                "polylines":["_p~iF~ps|U_ulLnnqC_mqNvxq`@"],
                "stops":[{"name":"Terminal","lat":38.5,"lng":-120.2}]}"#,
        )
        .unwrap();
        let route = dto.into_model().unwrap();
        assert_eq!(route.direction, Direction::Outward);
        assert!(route.geometry.has_path());
        assert_eq!(route.geometry.segments().len(), 1);
        assert_eq!(route.stops.len(), 1);
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let dto: DirectionDto = serde_json::from_str(
            r#"{"direction":"loop","polylines":[],"stops":[]}"#,
        )
        .unwrap();
        assert!(dto.into_model().is_err());
    }

    #[test]
    fn vehicle_payload_is_tagged_with_its_request() {
        let dto: VehicleDto =
            serde_json::from_str(r#"{"id":"741","lat":44.43,"lng":26.10,"bearing":85.0}"#).unwrap();
        let fix = dto.into_model(LineIdentifier::new("12"), Direction::Return);
        assert_eq!(fix.vehicle.as_str(), "741");
        assert_eq!(fix.line.as_str(), "12");
        assert_eq!(fix.direction, Direction::Return);
        assert_eq!(fix.position, Point::new(26.10, 44.43));
    }

    #[test]
    fn bearing_defaults_to_zero() {
        let dto: VehicleDto =
            serde_json::from_str(r#"{"id":"741","lat":44.43,"lng":26.10}"#).unwrap();
        assert_eq!(dto.bearing, 0.0);
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let api = HttpTransitApi::new("https://transit.example/api/");
        assert_eq!(api.base_url, "https://transit.example/api");
    }
}
