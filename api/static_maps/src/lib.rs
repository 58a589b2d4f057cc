#[macro_use] extern crate log;

use maps_core::{fetch_bytes, Coordinate, MapError};
use reqwest::Client;
use std::fs;
use std::path::Path;

pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 17;
pub const MAX_WIDTH: u32 = 600;
pub const MAX_HEIGHT: u32 = 450;

/// Layer combinations offered by the static map service, in cycling order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerSet {
    Map,
    Satellite,
    Hybrid,
    HybridTraffic,
    MapTraffic,
}

impl LayerSet {
    pub const ALL: [LayerSet; 5] = [
        LayerSet::Map,
        LayerSet::Satellite,
        LayerSet::Hybrid,
        LayerSet::HybridTraffic,
        LayerSet::MapTraffic,
    ];

    pub fn from_index(index: usize) -> Result<Self, MapError> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            MapError::Validation(format!(
                "layer index {} outside [0, {})",
                index,
                Self::ALL.len()
            ))
        })
    }

    pub fn index(&self) -> usize {
        match self {
            LayerSet::Map => 0,
            LayerSet::Satellite => 1,
            LayerSet::Hybrid => 2,
            LayerSet::HybridTraffic => 3,
            LayerSet::MapTraffic => 4,
        }
    }

    /// Layer codes sent in the `l` parameter
    pub fn layers(&self) -> &'static [&'static str] {
        match self {
            LayerSet::Map => &["map"],
            LayerSet::Satellite => &["sat"],
            LayerSet::Hybrid => &["sat", "skl"],
            LayerSet::HybridTraffic => &["sat", "trf", "skl"],
            LayerSet::MapTraffic => &["map", "trf", "skl"],
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// Requested raster size. The service refuses anything above 600x450.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    width: u32,
    height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self, MapError> {
        if width == 0 || width > MAX_WIDTH || height == 0 || height > MAX_HEIGHT {
            return Err(MapError::Validation(format!(
                "image size {}x{} outside 1..={}x1..={}",
                width, height, MAX_WIDTH, MAX_HEIGHT
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: MAX_WIDTH,
            height: MAX_HEIGHT,
        }
    }
}

/// A marker drawn on top of the map
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPoint {
    pub position: Coordinate,
    pub style: String,
    pub color: String,
    pub size: String,
    pub label: String,
}

impl OverlayPoint {
    pub fn new(position: Coordinate, style: &str) -> Self {
        Self {
            position,
            style: style.to_string(),
            color: String::new(),
            size: String::new(),
            label: String::new(),
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn with_size(mut self, size: &str) -> Self {
        self.size = size.to_string();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Marker string as used in the `pt` parameter: `lon,lat,<style><color><size><label>`
    pub fn serialize(&self) -> String {
        format!(
            "{},{}{}{}{}",
            self.position, self.style, self.color, self.size, self.label
        )
    }
}

/// Everything needed to request one static map image
#[derive(Debug, Clone)]
pub struct MapView {
    center: Coordinate,
    zoom: u8,
    layer: LayerSet,
    size: ImageSize,
    points: Vec<OverlayPoint>,
}

impl MapView {
    pub fn new(center: Coordinate, zoom: u8, layer_index: usize) -> Result<Self, MapError> {
        if zoom > MAX_ZOOM {
            return Err(MapError::Validation(format!(
                "zoom {} outside [{}, {}]",
                zoom, MIN_ZOOM, MAX_ZOOM
            )));
        }
        Ok(Self {
            center,
            zoom,
            layer: LayerSet::from_index(layer_index)?,
            size: ImageSize::default(),
            points: Vec::new(),
        })
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn set_center(&mut self, center: Coordinate) {
        self.center = center;
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn layer(&self) -> LayerSet {
        self.layer
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn points(&self) -> &[OverlayPoint] {
        &self.points
    }

    /// Move the center. Leaves the view untouched when the result would fall
    /// outside the valid range; returns whether the center moved.
    pub fn pan(&mut self, delta_lon: f64, delta_lat: f64) -> bool {
        match self.center.offset(delta_lon, delta_lat) {
            Some(center) => {
                self.center = center;
                true
            }
            None => {
                debug!("pan by ({}, {}) rejected at {}", delta_lon, delta_lat, self.center);
                false
            }
        }
    }

    pub fn zoom_in(&mut self) {
        if self.zoom < MAX_ZOOM {
            self.zoom += 1;
        }
    }

    pub fn zoom_out(&mut self) {
        if self.zoom > MIN_ZOOM {
            self.zoom -= 1;
        }
    }

    pub fn cycle_layer(&mut self) {
        self.layer = self.layer.next();
    }

    pub fn set_points(&mut self, points: Vec<OverlayPoint>) {
        self.points = points;
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
    }

    /// Query parameters for the static map endpoint, in a stable order.
    /// `ll` is dropped when auto-positioning around existing markers.
    pub fn query_params(&self, auto_position: bool) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("l", self.layer.layers().join(",")),
            ("z", self.zoom.to_string()),
            ("size", format!("{},{}", self.size.width, self.size.height)),
        ];

        if !(auto_position && !self.points.is_empty()) {
            params.push(("ll", self.center.to_string()));
        }

        if !self.points.is_empty() {
            let markers: Vec<String> = self.points.iter().map(OverlayPoint::serialize).collect();
            params.push(("pt", markers.join("~")));
        }

        params
    }
}

/// Static map API client
pub struct StaticMapsAPI {
    client: Client,
    base_url: String,
}

impl StaticMapsAPI {
    /// Create a new client against the public endpoint
    pub fn new() -> Result<Self, MapError> {
        Self::with_base_url("https://static-maps.yandex.ru/1.x/")
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, MapError> {
        Ok(Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for the view, as it goes over the wire
    pub fn request_url(&self, view: &MapView, auto_position: bool) -> String {
        let query = serde_urlencoded::to_string(view.query_params(auto_position)).unwrap_or_default();
        format!("{}?{}", self.base_url, query)
    }

    /// Download the rendered image
    pub async fn render(&self, view: &MapView, auto_position: bool) -> Result<Vec<u8>, MapError> {
        let params = view.query_params(auto_position);
        info!(
            "Rendering map at {} z{} [{}]",
            view.center(),
            view.zoom(),
            view.layer().layers().join(",")
        );

        let bytes = fetch_bytes(&self.client, &self.base_url, &params).await?;
        debug!("Received {} bytes of map image", bytes.len());
        Ok(bytes)
    }

    /// Render and write the image to `path`. A failed render leaves the file untouched.
    pub async fn render_to_file(
        &self,
        view: &MapView,
        auto_position: bool,
        path: &Path,
    ) -> Result<Vec<u8>, MapError> {
        let bytes = self.render(view, auto_position).await?;
        fs::write(path, &bytes)?;
        info!("Saved map to {:?}", path);
        Ok(bytes)
    }
}
