#[macro_use] extern crate log;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Metres per degree used by the planar distance approximation
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Errors shared by every map service client
#[derive(Debug, Error)]
pub enum MapError {
    /// Transport failure before a response was received.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-2xx status. The body is kept so the
    /// caller can decide what to do with it.
    #[error("service error: HTTP {status} ({} bytes)", .body.len())]
    Service { status: u16, body: Vec<u8> },

    /// A field was missing or had the wrong shape.
    #[error("unexpected response data: {0}")]
    Data(String),

    /// Out-of-range coordinate, zoom, layer index or image size.
    #[error("invalid value: {0}")]
    Validation(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MapError {
    fn from(e: serde_json::Error) -> Self {
        MapError::Data(e.to_string())
    }
}

/// Geographic coordinate, longitude first like the map services expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    lon: f64,
    lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Result<Self, MapError> {
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(MapError::Validation(format!(
                "longitude {} outside [{}, {}]",
                lon, MIN_LON, MAX_LON
            )));
        }
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(MapError::Validation(format!(
                "latitude {} outside [{}, {}]",
                lat, MIN_LAT, MAX_LAT
            )));
        }
        Ok(Self { lon, lat })
    }

    /// Build a coordinate by clamping both axes into the valid range.
    /// NaN components collapse to zero.
    pub fn clamped(lon: f64, lat: f64) -> Self {
        let lon = if lon.is_nan() { 0.0 } else { lon.clamp(MIN_LON, MAX_LON) };
        let lat = if lat.is_nan() { 0.0 } else { lat.clamp(MIN_LAT, MAX_LAT) };
        Self { lon, lat }
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Shift by the given deltas, or `None` if the result leaves the valid range
    pub fn offset(&self, delta_lon: f64, delta_lat: f64) -> Option<Self> {
        Self::new(self.lon + delta_lon, self.lat + delta_lat).ok()
    }

    /// Planar distance approximation in metres.
    ///
    /// Longitude difference is scaled by the cosine of the mean latitude. Good
    /// enough for a few hundred metres, meaningless near the poles.
    pub fn planar_distance(&self, other: &Coordinate) -> f64 {
        let mean_lat = ((self.lat + other.lat) / 2.0).to_radians();
        let dx = (self.lon - other.lon).abs() * METERS_PER_DEGREE * mean_lat.cos();
        let dy = (self.lat - other.lat).abs() * METERS_PER_DEGREE;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

/// Accepts `"lon,lat"` as well as the geocoder's `"lon lat"`
impl FromStr for Coordinate {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        let (lon, lat) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lon), Some(lat), None) => (lon, lat),
            _ => return Err(MapError::Data(format!("malformed coordinate '{}'", s))),
        };
        let lon: f64 = lon
            .parse()
            .map_err(|_| MapError::Data(format!("malformed longitude '{}'", lon)))?;
        let lat: f64 = lat
            .parse()
            .map_err(|_| MapError::Data(format!("malformed latitude '{}'", lat)))?;
        Coordinate::new(lon, lat)
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = MapError;

    fn try_from(pair: [f64; 2]) -> Result<Self, Self::Error> {
        Coordinate::new(pair[0], pair[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

/// Query parameters with the API key masked, for logging
pub fn redacted<'a>(params: &'a [(&'a str, String)]) -> Vec<(&'a str, &'a str)> {
    params
        .iter()
        .map(|(name, value)| match *name {
            "apikey" => (*name, "***"),
            _ => (*name, value.as_str()),
        })
        .collect()
}

/// Issue a GET with the given query and return the body of a 2xx response
pub async fn fetch_bytes(
    client: &Client,
    url: &str,
    params: &[(&str, String)],
) -> Result<Vec<u8>, MapError> {
    debug!("GET {} {:?}", url, redacted(params));
    let response = client.get(url).query(params).send().await?;
    let status = response.status();

    if !status.is_success() {
        debug!("{} answered HTTP {}", url, status);
        // Keep the status even if the body cannot be read
        let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        return Err(MapError::Service {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.bytes().await?.to_vec())
}
