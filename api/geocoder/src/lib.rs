#[macro_use] extern crate log;

use maps_core::{fetch_bytes, Coordinate, MapError};
use reqwest::Client;
use serde::Deserialize;

/// One candidate location returned by the geocoder
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub position: Coordinate,
    pub formatted_address: String,
    pub postal_code: Option<String>,
}

// Wire format. Only the fields we read are modelled; everything else is ignored.

#[derive(Debug, Deserialize)]
struct GeocoderEnvelope {
    response: GeocoderResponse,
}

#[derive(Debug, Deserialize)]
struct GeocoderResponse {
    #[serde(rename = "GeoObjectCollection")]
    collection: GeoObjectCollection,
}

#[derive(Debug, Deserialize)]
struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    feature_members: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    #[serde(rename = "metaDataProperty")]
    meta_data: MetaDataProperty,
    #[serde(rename = "Point")]
    point: Point,
}

#[derive(Debug, Deserialize)]
struct MetaDataProperty {
    #[serde(rename = "GeocoderMetaData")]
    geocoder: GeocoderMetaData,
}

#[derive(Debug, Deserialize)]
struct GeocoderMetaData {
    text: Option<String>,
    #[serde(rename = "Address")]
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    formatted: Option<String>,
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Point {
    pos: String,
}

impl TryFrom<GeoObject> for GeocodeResult {
    type Error = MapError;

    fn try_from(object: GeoObject) -> Result<Self, Self::Error> {
        let position: Coordinate = object.point.pos.parse()?;
        let meta = object.meta_data.geocoder;
        let (formatted, postal_code) = match meta.address {
            Some(address) => (address.formatted, address.postal_code),
            None => (None, None),
        };
        let formatted_address = formatted
            .or(meta.text)
            .ok_or_else(|| MapError::Data(format!("geo object at {} has no address", position)))?;

        Ok(GeocodeResult {
            position,
            formatted_address,
            postal_code,
        })
    }
}

/// Parse a geocoder JSON document into candidates, in the order the service ranked them
pub fn parse_response(body: &[u8]) -> Result<Vec<GeocodeResult>, MapError> {
    let envelope: GeocoderEnvelope = serde_json::from_slice(body)?;
    envelope
        .response
        .collection
        .feature_members
        .into_iter()
        .map(|member| GeocodeResult::try_from(member.geo_object))
        .collect()
}

/// Forward and reverse geocoding client
pub struct GeocoderAPI {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeocoderAPI {
    pub fn new(api_key: &str) -> Result<Self, MapError> {
        Self::with_base_url(api_key, "https://geocode-maps.yandex.ru/1.x/")
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, MapError> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn query_params(&self, geocode: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.api_key.clone()),
            ("geocode", geocode.to_string()),
            ("format", "json".to_string()),
        ]
    }

    async fn search(&self, geocode: &str) -> Result<Vec<GeocodeResult>, MapError> {
        let body = fetch_bytes(&self.client, &self.base_url, &self.query_params(geocode)).await?;
        let results = parse_response(&body)?;
        info!("Geocoder returned {} candidates for '{}'", results.len(), geocode);
        Ok(results)
    }

    /// Free-text address to candidate locations
    pub async fn search_by_address(&self, text: &str) -> Result<Vec<GeocodeResult>, MapError> {
        self.search(text).await
    }

    /// Coordinate to the addresses found there
    pub async fn search_by_coordinate(&self, coord: Coordinate) -> Result<Vec<GeocodeResult>, MapError> {
        self.search(&coord.to_string()).await
    }

    /// Best-ranked candidate for an address, if any
    pub async fn first_match(&self, text: &str) -> Result<Option<GeocodeResult>, MapError> {
        Ok(self.search_by_address(text).await?.into_iter().next())
    }
}
