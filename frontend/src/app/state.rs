use crate::app::commands::Command;
use crate::app::projector;
use geocoder::GeocodeResult;
use maps_core::Coordinate;
use place_search::PlaceResult;
use static_maps::{MapView, OverlayPoint};

/// What has to happen after a command was applied to the state
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Redraw,
    Geocode(String),
    ReverseGeocode(Coordinate),
    NearbySearch { center: Coordinate, text: String },
    Quit,
}

fn search_marker(position: Coordinate) -> OverlayPoint {
    OverlayPoint::new(position, "pm2").with_color("rd").with_size("m")
}

fn click_marker(position: Coordinate) -> OverlayPoint {
    OverlayPoint::new(position, "pm2").with_color("bl").with_size("m")
}

fn place_marker(position: Coordinate) -> OverlayPoint {
    OverlayPoint::new(position, "pm2").with_color("gn").with_size("m")
}

/// Everything the viewer window shows
#[derive(Debug, Clone)]
pub struct AppState {
    pub view: MapView,
    pan_step: f64,
    query: String,
    address: Option<String>,
    postal_code: Option<String>,
    show_postal_code: bool,
}

impl AppState {
    pub fn new(view: MapView, pan_step: f64) -> Self {
        Self {
            view,
            pan_step,
            query: String::new(),
            address: None,
            postal_code: None,
            show_postal_code: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Apply a command to the local state and report the follow-up work
    pub fn apply(&mut self, command: Command) -> Effect {
        match command {
            Command::ZoomIn => {
                self.view.zoom_in();
                Effect::Redraw
            }
            Command::ZoomOut => {
                self.view.zoom_out();
                Effect::Redraw
            }
            Command::Pan(direction) => {
                let (dlon, dlat) = direction.delta(self.pan_step);
                if self.view.pan(dlon, dlat) {
                    Effect::Redraw
                } else {
                    Effect::None
                }
            }
            Command::CycleLayer => {
                self.view.cycle_layer();
                Effect::Redraw
            }
            Command::Search(text) => {
                self.query = text.clone();
                Effect::Geocode(text)
            }
            Command::LeftClick { x, y } => match self.project((x, y)) {
                Some(position) => {
                    self.view.set_points(vec![click_marker(position)]);
                    Effect::ReverseGeocode(position)
                }
                None => Effect::None,
            },
            Command::RightClick { x, y } => {
                if self.query.is_empty() {
                    warn!("Nothing to look for yet, run a search first");
                    return Effect::None;
                }
                match self.project((x, y)) {
                    Some(center) => Effect::NearbySearch {
                        center,
                        text: self.query.clone(),
                    },
                    None => Effect::None,
                }
            }
            Command::Reset => {
                self.view.clear_points();
                self.address = None;
                self.postal_code = None;
                Effect::Redraw
            }
            Command::TogglePostalCode => {
                self.show_postal_code = !self.show_postal_code;
                Effect::None
            }
            Command::Redraw => Effect::Redraw,
            Command::Quit => Effect::Quit,
        }
    }

    fn project(&self, pixel: (u32, u32)) -> Option<Coordinate> {
        if !projector::contains(pixel, &self.view) {
            warn!("Click at {:?} is outside the map image", pixel);
            return None;
        }
        let position = projector::pixel_to_coordinate(pixel, &self.view);
        debug!("Pixel {:?} projects to {}", pixel, position);
        Some(position)
    }

    /// Show a forward geocoding hit: jump there and mark it
    pub fn show_search_result(&mut self, result: GeocodeResult) {
        self.view.set_center(result.position);
        self.view.set_points(vec![search_marker(result.position)]);
        self.show_address(result);
    }

    /// Show the address found at a clicked point, keeping the click marker
    pub fn show_address(&mut self, result: GeocodeResult) {
        self.address = Some(result.formatted_address);
        self.postal_code = result.postal_code;
    }

    pub fn show_place(&mut self, place: PlaceResult) {
        self.view.set_points(vec![place_marker(place.position)]);
        self.address = Some(if place.address.is_empty() {
            place.name
        } else {
            format!("{}, {}", place.name, place.address)
        });
        self.postal_code = None;
    }

    /// Text under the map: the current address, with the postal code when enabled
    pub fn status_line(&self) -> Option<String> {
        let address = self.address.as_ref()?;
        match (&self.postal_code, self.show_postal_code) {
            (Some(code), true) => Some(format!("{}, {}", address, code)),
            _ => Some(address.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::Direction;

    fn state() -> AppState {
        let center = Coordinate::new(37.530887, 55.703118).unwrap();
        AppState::new(MapView::new(center, 17, 0).unwrap(), 0.01)
    }

    fn geocoded(address: &str, postal: Option<&str>) -> GeocodeResult {
        GeocodeResult {
            position: Coordinate::new(37.611347, 55.757965).unwrap(),
            formatted_address: address.to_string(),
            postal_code: postal.map(str::to_string),
        }
    }

    #[test]
    fn test_view_commands_redraw() {
        let mut s = state();
        assert_eq!(s.apply(Command::ZoomIn), Effect::Redraw);
        assert_eq!(s.view.zoom(), 17);
        assert_eq!(s.apply(Command::ZoomOut), Effect::Redraw);
        assert_eq!(s.view.zoom(), 16);
        assert_eq!(s.apply(Command::CycleLayer), Effect::Redraw);
        assert_eq!(s.view.layer().layers(), &["sat"]);
        assert_eq!(s.apply(Command::Pan(Direction::Up)), Effect::Redraw);
        assert!((s.view.center().lat() - 55.713118).abs() < 1e-9);
        assert_eq!(s.apply(Command::Redraw), Effect::Redraw);
        assert_eq!(s.apply(Command::Quit), Effect::Quit);
    }

    #[test]
    fn test_rejected_pan_needs_no_redraw() {
        let center = Coordinate::new(0.0, 89.995).unwrap();
        let mut s = AppState::new(MapView::new(center, 5, 0).unwrap(), 0.01);
        assert_eq!(s.apply(Command::Pan(Direction::Up)), Effect::None);
        assert_eq!(s.view.center(), center);
    }

    #[test]
    fn test_search_then_show() {
        let mut s = state();
        assert_eq!(
            s.apply(Command::Search("Тверская 6".to_string())),
            Effect::Geocode("Тверская 6".to_string())
        );
        assert_eq!(s.query(), "Тверская 6");

        s.show_search_result(geocoded("Москва, Тверская улица, 6с1", Some("125009")));
        assert_eq!(s.view.center().to_string(), "37.611347,55.757965");
        assert_eq!(s.view.points().len(), 1);
        assert_eq!(s.view.points()[0].serialize(), "37.611347,55.757965,pm2rdm");
        assert_eq!(s.status_line().as_deref(), Some("Москва, Тверская улица, 6с1"));

        s.apply(Command::TogglePostalCode);
        assert_eq!(s.status_line().as_deref(), Some("Москва, Тверская улица, 6с1, 125009"));

        assert_eq!(s.apply(Command::Reset), Effect::Redraw);
        assert!(s.view.points().is_empty());
        assert_eq!(s.status_line(), None);
    }

    #[test]
    fn test_postal_code_missing() {
        let mut s = state();
        s.apply(Command::TogglePostalCode);
        s.show_address(geocoded("Москва, Тверская улица", None));
        assert_eq!(s.status_line().as_deref(), Some("Москва, Тверская улица"));
    }

    #[test]
    fn test_left_click_marks_and_reverse_geocodes() {
        let mut s = state();
        let effect = s.apply(Command::LeftClick { x: 300, y: 225 });
        assert_eq!(effect, Effect::ReverseGeocode(s.view.center()));
        assert_eq!(s.view.points().len(), 1);
        assert_eq!(s.view.points()[0].position, s.view.center());

        assert_eq!(s.apply(Command::LeftClick { x: 600, y: 10 }), Effect::None);
    }

    #[test]
    fn test_right_click_needs_query() {
        let mut s = state();
        assert_eq!(s.apply(Command::RightClick { x: 300, y: 225 }), Effect::None);

        s.apply(Command::Search("аптека".to_string()));
        let center = s.view.center();
        assert_eq!(
            s.apply(Command::RightClick { x: 300, y: 225 }),
            Effect::NearbySearch { center, text: "аптека".to_string() }
        );
        assert_eq!(s.apply(Command::RightClick { x: 300, y: 450 }), Effect::None);
    }

    #[test]
    fn test_show_place() {
        let mut s = state();
        s.show_place(PlaceResult {
            position: Coordinate::new(37.53, 55.7031).unwrap(),
            name: "Горздрав".to_string(),
            address: "Москва, ул. Льва Толстого, 16".to_string(),
        });
        assert_eq!(s.status_line().as_deref(), Some("Горздрав, Москва, ул. Льва Толстого, 16"));
        assert_eq!(s.view.points()[0].serialize(), "37.53,55.7031,pm2gnm");
    }
}
