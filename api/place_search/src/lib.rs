#[macro_use] extern crate log;

use maps_core::{fetch_bytes, Coordinate, MapError};
use reqwest::Client;
use serde::Deserialize;

/// Default acceptance radius around the query point, in metres
pub const DEFAULT_RADIUS: f64 = 50.0;

/// A business returned by the organisation search
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceResult {
    pub position: Coordinate,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Coordinate,
}

#[derive(Debug, Deserialize)]
struct Properties {
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "CompanyMetaData")]
    company: Option<CompanyMetaData>,
}

#[derive(Debug, Deserialize)]
struct CompanyMetaData {
    name: Option<String>,
    address: Option<String>,
}

impl From<Feature> for PlaceResult {
    fn from(feature: Feature) -> Self {
        let props = feature.properties;
        let (company_name, company_address) = match props.company {
            Some(company) => (company.name, company.address),
            None => (None, None),
        };
        PlaceResult {
            position: feature.geometry.coordinates,
            name: company_name.or(props.name).unwrap_or_default(),
            address: company_address.or(props.description).unwrap_or_default(),
        }
    }
}

/// Parse a search response into candidates, in service order
pub fn parse_response(body: &[u8]) -> Result<Vec<PlaceResult>, MapError> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response.features.into_iter().map(PlaceResult::from).collect())
}

/// The candidate closest to `center`, provided it lies within `radius` metres
pub fn nearest_within(center: Coordinate, candidates: Vec<PlaceResult>, radius: f64) -> Option<PlaceResult> {
    candidates
        .into_iter()
        .map(|place| (center.planar_distance(&place.position), place))
        .filter(|(distance, _)| *distance <= radius)
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(distance, place)| {
            debug!("'{}' is {:.1} m from {}", place.name, distance, center);
            place
        })
}

/// Business search client
pub struct PlaceSearchAPI {
    client: Client,
    base_url: String,
    api_key: String,
    lang: String,
    radius: f64,
}

impl PlaceSearchAPI {
    pub fn new(api_key: &str) -> Result<Self, MapError> {
        Self::with_base_url(api_key, "https://search-maps.yandex.ru/v1/")
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, MapError> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            lang: "ru_RU".to_string(),
            radius: DEFAULT_RADIUS,
        })
    }

    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Result<Self, MapError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(MapError::Validation(format!("search radius {} must be a non-negative number", radius)));
        }
        self.radius = radius;
        Ok(self)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn query_params(&self, center: Coordinate, text: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.api_key.clone()),
            ("ll", center.to_string()),
            ("text", text.to_string()),
            ("lang", self.lang.clone()),
            ("type", "biz".to_string()),
        ]
    }

    /// Search businesses matching `text` and keep the one nearest to `center`
    /// within the configured radius
    pub async fn search_nearby(&self, center: Coordinate, text: &str) -> Result<Option<PlaceResult>, MapError> {
        let body = fetch_bytes(&self.client, &self.base_url, &self.query_params(center, text)).await?;
        let candidates = parse_response(&body)?;
        info!("Place search returned {} candidates for '{}' near {}", candidates.len(), text, center);

        let found = nearest_within(center, candidates, self.radius);
        if found.is_none() {
            info!("No '{}' within {} m of {}", text, self.radius, center);
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, lon: f64, lat: f64) -> PlaceResult {
        PlaceResult {
            position: Coordinate::new(lon, lat).unwrap(),
            name: name.to_string(),
            address: String::new(),
        }
    }

    #[test]
    fn test_parse_features() {
        let body = r#"{
          "type": "FeatureCollection",
          "properties": {"ResponseMetaData": {"SearchRequest": {"request": "аптека"}}},
          "features": [
            {"type": "Feature",
             "geometry": {"type": "Point", "coordinates": [37.588628, 55.734046]},
             "properties": {"name": "Аптека", "description": "ул. Льва Толстого, 16",
                            "CompanyMetaData": {"id": "1", "name": "Горздрав", "address": "Москва, ул. Льва Толстого, 16"}}},
            {"type": "Feature",
             "geometry": {"type": "Point", "coordinates": [37.59, 55.735]},
             "properties": {"name": "Ригла", "description": "Москва, Зубовский бульвар"}}
          ]
        }"#.as_bytes();
        let results = parse_response(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Горздрав");
        assert_eq!(results[0].address, "Москва, ул. Льва Толстого, 16");
        assert_eq!(results[0].position, Coordinate::new(37.588628, 55.734046).unwrap());
        assert_eq!(results[1].name, "Ригла");
        assert_eq!(results[1].address, "Москва, Зубовский бульвар");
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(parse_response(br#"{"features": []}"#).unwrap().is_empty());
        assert!(parse_response(br#"{}"#).unwrap().is_empty());
        assert!(matches!(parse_response(b"<html>"), Err(MapError::Data(_))));
        let bad_point = br#"{"features": [{"geometry": {"coordinates": [37.5, 95.0]}, "properties": {}}]}"#;
        assert!(matches!(parse_response(bad_point), Err(MapError::Data(_))));
    }

    #[test]
    fn test_nothing_within_radius() {
        let center = Coordinate::new(37.5, 55.7).unwrap();
        // ~111 m and ~1 km north of the center
        let candidates = vec![place("a", 37.5, 55.701), place("b", 37.5, 55.709)];
        assert_eq!(nearest_within(center, candidates, DEFAULT_RADIUS), None);
        assert_eq!(nearest_within(center, Vec::new(), DEFAULT_RADIUS), None);
    }

    #[test]
    fn test_nearest_within_radius() {
        let center = Coordinate::new(37.5, 55.7).unwrap();
        // ~11 m, ~33 m and ~111 m north of the center
        let candidates = vec![
            place("far", 37.5, 55.701),
            place("near", 37.5, 55.7001),
            place("mid", 37.5, 55.7003),
        ];
        let found = nearest_within(center, candidates, DEFAULT_RADIUS).unwrap();
        assert_eq!(found.name, "near");
    }

    #[test]
    fn test_radius_is_inclusive() {
        let center = Coordinate::new(0.0, 0.0).unwrap();
        let candidates = vec![place("edge", 0.0, 0.0001)];
        let distance = center.planar_distance(&candidates[0].position);
        assert!(nearest_within(center, candidates.clone(), distance).is_some());
        assert!(nearest_within(center, candidates, distance - 1e-6).is_none());
    }

    #[test]
    fn test_query_params() {
        let api = PlaceSearchAPI::new("key").unwrap().with_lang("en_US");
        let center = Coordinate::new(37.5, 55.7).unwrap();
        assert_eq!(
            api.query_params(center, "cafe"),
            vec![
                ("apikey", "key".to_string()),
                ("ll", "37.5,55.7".to_string()),
                ("text", "cafe".to_string()),
                ("lang", "en_US".to_string()),
                ("type", "biz".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_api_creation() {
        let api = PlaceSearchAPI::new("key").unwrap();
        assert_eq!(api.radius(), DEFAULT_RADIUS);
        assert!(api.with_radius(-1.0).is_err());
        assert!(PlaceSearchAPI::new("key").unwrap().with_radius(120.0).is_ok());
    }
}
