use anyhow::anyhow;
use maps_core::MapError;
use static_maps::{MapView, StaticMapsAPI};
use std::path::Path;

/// Check the downloaded bytes really are a raster and return its dimensions
pub fn decode_dimensions(image_data: &[u8]) -> Result<(u32, u32), image::ImageError> {
    let img = image::load_from_memory(image_data)?;
    Ok((img.width(), img.height()))
}

/// Fetch the map for the current view and overwrite `output` with it.
///
/// A non-2xx answer leaves the previous image on disk and comes back as an
/// error carrying the service's message; the caller logs it.
pub async fn redraw(
    api: &StaticMapsAPI,
    view: &MapView,
    auto_position: bool,
    output: &Path,
) -> Result<(), anyhow::Error> {
    match api.render_to_file(view, auto_position, output).await {
        Ok(bytes) => {
            match decode_dimensions(&bytes) {
                Ok((width, height)) => info!("Map updated: {:?} ({}x{})", output, width, height),
                Err(e) => warn!("{:?} does not decode as an image: {}", output, e),
            }
            Ok(())
        }
        Err(MapError::Service { status, body }) => Err(service_failure(status, &body)),
        Err(e) => Err(e.into()),
    }
}

fn service_failure(status: u16, body: &[u8]) -> anyhow::Error {
    anyhow!(
        "map service answered HTTP {}: {}; keeping the previous image",
        status,
        String::from_utf8_lossy(body).trim()
    )
}
