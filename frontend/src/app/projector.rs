use maps_core::Coordinate;
use static_maps::MapView;

/// Pixels per tile edge at zoom 0; the whole world spans 256 * 2^z pixels
pub const TILE_SIZE: f64 = 256.0;

/// Degrees covered by one pixel at `zoom`, horizontally and vertically.
/// The vertical span shrinks with latitude like a Mercator tile does locally.
pub fn degrees_per_pixel(zoom: u8, lat: f64) -> (f64, f64) {
    let lon_span = 360.0 / (TILE_SIZE * 2f64.powi(zoom as i32));
    (lon_span, lon_span * lat.to_radians().cos())
}

/// Approximate geographic position of a pixel on the rendered image.
///
/// The pixel offset from the image center is scaled by the local span and
/// added to the view center, with the y axis flipped. This is a local linear
/// approximation and will not match the service's projection exactly far
/// from the center or at low zoom.
pub fn pixel_to_coordinate(pixel: (u32, u32), view: &MapView) -> Coordinate {
    let size = view.size();
    let center = view.center();
    let (lon_span, lat_span) = degrees_per_pixel(view.zoom(), center.lat());

    let dx = pixel.0 as f64 - size.width() as f64 / 2.0;
    let dy = size.height() as f64 / 2.0 - pixel.1 as f64;

    Coordinate::clamped(center.lon() + dx * lon_span, center.lat() + dy * lat_span)
}

/// Whether the pixel lies on the rendered image
pub fn contains(pixel: (u32, u32), view: &MapView) -> bool {
    pixel.0 < view.size().width() && pixel.1 < view.size().height()
}
