extern crate pretty_env_logger;
#[macro_use] extern crate log;

use maps_core::Coordinate;
use place_search::PlaceSearchAPI;
use std::env;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: {} <lon> <lat> <text...>", args[0]);
        eprintln!("");
        eprintln!("Example:");
        eprintln!("  SEARCH_API_KEY=... {} 37.588628 55.734046 аптека", args[0]);
        std::process::exit(1);
    }

    let center = Coordinate::new(args[1].parse()?, args[2].parse()?)?;
    let text = args[3..].join(" ");

    let api_key = env::var("SEARCH_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        warn!("SEARCH_API_KEY is not set, the service will likely refuse the request");
    }
    let api = PlaceSearchAPI::new(&api_key)?;

    info!("Searching '{}' within {} m of {}", text, api.radius(), center);
    match api.search_nearby(center, &text).await? {
        Some(place) => println!("{}  {}, {}", place.position, place.name, place.address),
        None => println!("Nothing within {} m", api.radius()),
    }

    Ok(())
}
