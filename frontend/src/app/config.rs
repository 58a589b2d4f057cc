use maps_core::{Coordinate, MapError};
use serde::Deserialize;
use static_maps::{ImageSize, MapView};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "map_viewer.json";

/// Viewer settings, read from `map_viewer.json`. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Start position as `[lon, lat]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub layer: usize,
    pub width: u32,
    pub height: u32,
    /// Degrees moved per arrow key press
    pub pan_step: f64,
    /// Business search acceptance radius in metres
    pub search_radius: f64,
    pub lang: String,
    pub output: PathBuf,
    pub auto_position: bool,
    pub geocoder_api_key: String,
    pub search_api_key: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            center: [37.530887, 55.703118],
            zoom: 17,
            layer: 0,
            width: 600,
            height: 450,
            pan_step: 0.01,
            search_radius: place_search::DEFAULT_RADIUS,
            lang: "ru_RU".to_string(),
            output: PathBuf::from("map.png"),
            auto_position: false,
            geocoder_api_key: String::new(),
            search_api_key: String::new(),
        }
    }
}

impl ViewerConfig {
    /// Load from `path`; a missing file yields the defaults.
    /// `GEOCODER_API_KEY` and `SEARCH_API_KEY` take precedence over the file.
    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{:?} not found, using default settings", path);
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };

        config.apply_key_overrides(
            std::env::var("GEOCODER_API_KEY").ok(),
            std::env::var("SEARCH_API_KEY").ok(),
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, anyhow::Error> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn apply_key_overrides(&mut self, geocoder: Option<String>, search: Option<String>) {
        if let Some(key) = geocoder.filter(|k| !k.is_empty()) {
            self.geocoder_api_key = key;
        }
        if let Some(key) = search.filter(|k| !k.is_empty()) {
            self.search_api_key = key;
        }
    }

    /// Initial map view described by the settings
    pub fn initial_view(&self) -> Result<MapView, MapError> {
        let center = Coordinate::new(self.center[0], self.center[1])?;
        let size = ImageSize::new(self.width, self.height)?;
        Ok(MapView::new(center, self.zoom, self.layer)?.with_size(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::from_json("{}").unwrap();
        assert_eq!(config.zoom, 17);
        assert_eq!(config.output, PathBuf::from("map.png"));
        assert_eq!(config.search_radius, 50.0);

        let view = config.initial_view().unwrap();
        assert_eq!(view.center().to_string(), "37.530887,55.703118");
        assert_eq!(view.size().width(), 600);
        assert_eq!(view.size().height(), 450);
    }

    #[test]
    fn test_partial_file() {
        let config = ViewerConfig::from_json(
            r#"{"center": [30.3, 59.94], "zoom": 12, "layer": 2, "geocoder_api_key": "abc"}"#,
        )
        .unwrap();
        assert_eq!(config.geocoder_api_key, "abc");
        assert_eq!(config.pan_step, 0.01);

        let view = config.initial_view().unwrap();
        assert_eq!(view.zoom(), 12);
        assert_eq!(view.layer().layers(), &["sat", "skl"]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(ViewerConfig::from_json(r#"{"zoom": "high"}"#).is_err());

        let config = ViewerConfig::from_json(r#"{"zoom": 18}"#).unwrap();
        assert!(config.initial_view().is_err());
        let config = ViewerConfig::from_json(r#"{"width": 1024}"#).unwrap();
        assert!(config.initial_view().is_err());
        let config = ViewerConfig::from_json(r#"{"center": [0.0, 91.0]}"#).unwrap();
        assert!(config.initial_view().is_err());
    }

    #[test]
    fn test_key_overrides() {
        let mut config = ViewerConfig::from_json(r#"{"geocoder_api_key": "file", "search_api_key": "file"}"#).unwrap();
        config.apply_key_overrides(Some("env".to_string()), Some(String::new()));
        assert_eq!(config.geocoder_api_key, "env");
        assert_eq!(config.search_api_key, "file");

        config.apply_key_overrides(None, None);
        assert_eq!(config.geocoder_api_key, "env");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = ViewerConfig::load(Path::new("definitely/not/here/map_viewer.json")).unwrap();
        assert_eq!(config.layer, 0);
    }
}
