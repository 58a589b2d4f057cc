pub mod commands;
pub mod config;
pub mod map;
pub mod projector;
pub mod state;

use commands::Command;
use config::ViewerConfig;
use geocoder::GeocoderAPI;
use place_search::PlaceSearchAPI;
use state::{AppState, Effect};
use static_maps::StaticMapsAPI;

/// The viewer: state plus the three service clients
pub struct App {
    pub state: AppState,
    config: ViewerConfig,
    static_maps: StaticMapsAPI,
    geocoder: GeocoderAPI,
    places: PlaceSearchAPI,
}

impl App {
    pub fn new(config: ViewerConfig) -> Result<Self, anyhow::Error> {
        let view = config.initial_view()?;
        Ok(Self {
            state: AppState::new(view, config.pan_step),
            static_maps: StaticMapsAPI::new()?,
            geocoder: GeocoderAPI::new(&config.geocoder_api_key)?,
            places: PlaceSearchAPI::new(&config.search_api_key)?
                .with_lang(&config.lang)
                .with_radius(config.search_radius)?,
            config,
        })
    }

    pub async fn redraw(&self) -> Result<(), anyhow::Error> {
        map::redraw(
            &self.static_maps,
            &self.state.view,
            self.config.auto_position,
            &self.config.output,
        )
        .await
    }

    /// Apply one command and carry out its effect. Returns `false` on quit.
    pub async fn handle(&mut self, command: Command) -> Result<bool, anyhow::Error> {
        debug!("Handling {:?}", command);
        match self.state.apply(command) {
            Effect::None => {}
            Effect::Quit => return Ok(false),
            Effect::Redraw => self.redraw().await?,
            Effect::Geocode(text) => match self.geocoder.first_match(&text).await? {
                Some(result) => {
                    info!("Found '{}' at {}", result.formatted_address, result.position);
                    self.state.show_search_result(result);
                    self.redraw().await?;
                }
                None => warn!("Nothing found for '{}'", text),
            },
            Effect::ReverseGeocode(position) => {
                // The click marker is already placed, draw it even if the lookup fails
                let lookup = self.geocoder.search_by_coordinate(position).await;
                match lookup {
                    Ok(results) => match results.into_iter().next() {
                        Some(result) => self.state.show_address(result),
                        None => warn!("No address at {}", position),
                    },
                    Err(e) => error!("Reverse geocoding {} failed: {}", position, e),
                }
                self.redraw().await?;
            }
            Effect::NearbySearch { center, text } => {
                match self.places.search_nearby(center, &text).await? {
                    Some(place) => {
                        info!("Found '{}' near {}", place.name, center);
                        self.state.show_place(place);
                        self.redraw().await?;
                    }
                    None => warn!("No '{}' within {} m of {}", text, self.places.radius(), center),
                }
            }
        }
        Ok(true)
    }
}
