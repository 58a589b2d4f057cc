extern crate pretty_env_logger;
#[macro_use] extern crate log;

use maps_core::Coordinate;
use static_maps::{MapView, OverlayPoint, StaticMapsAPI};
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 5 {
        eprintln!("Usage: {} <lon> <lat> <zoom> <layer 0-4> [output] [marker lon,lat ...]", args[0]);
        eprintln!("");
        eprintln!("Examples:");
        eprintln!("  {} 37.530887 55.703118 17 0", args[0]);
        eprintln!("  {} 37.530887 55.703118 12 3 out.png 37.6,55.7 37.7,55.8", args[0]);
        std::process::exit(1);
    }

    let center = Coordinate::new(args[1].parse()?, args[2].parse()?)?;
    let zoom: u8 = args[3].parse()?;
    let layer: usize = args[4].parse()?;
    let output = args.get(5).map(|s| s.as_str()).unwrap_or("map.png");

    let mut view = MapView::new(center, zoom, layer)?;
    let markers = args
        .iter()
        .skip(6)
        .map(|s| -> Result<OverlayPoint, anyhow::Error> {
            Ok(OverlayPoint::new(s.parse::<Coordinate>()?, "pm2rdm"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let auto_position = !markers.is_empty();
    view.set_points(markers);

    let api = StaticMapsAPI::new()?;
    info!("Requesting {}", api.request_url(&view, auto_position));

    match api.render_to_file(&view, auto_position, Path::new(output)).await {
        Ok(bytes) => {
            let img = image::load_from_memory(&bytes)?;
            info!("✅ Map saved to {} ({}x{})", output, img.width(), img.height());
        }
        Err(e) => {
            error!("❌ Map request failed: {}", e);
        }
    }

    Ok(())
}
