extern crate pretty_env_logger;
#[macro_use] extern crate log;

use geocoder::GeocoderAPI;
use maps_core::Coordinate;
use std::env;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <command> [args...]", args[0]);
        eprintln!("Commands:");
        eprintln!("  address <text...>   - Geocode a free-text address");
        eprintln!("  reverse <lon> <lat> - Addresses at a coordinate");
        eprintln!("");
        eprintln!("The API key is read from GEOCODER_API_KEY.");
        std::process::exit(1);
    }

    let api_key = env::var("GEOCODER_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        warn!("GEOCODER_API_KEY is not set, the service will likely refuse the request");
    }
    let api = GeocoderAPI::new(&api_key)?;

    let results = match args[1].as_str() {
        "address" => {
            let text = args[2..].join(" ");
            info!("Geocoding '{}'", text);
            api.search_by_address(&text).await?
        }
        "reverse" => {
            if args.len() < 4 {
                eprintln!("reverse needs <lon> <lat>");
                std::process::exit(1);
            }
            let coord = Coordinate::new(args[2].parse()?, args[3].parse()?)?;
            info!("Reverse geocoding {}", coord);
            api.search_by_coordinate(coord).await?
        }
        other => {
            eprintln!("Unknown command: {}", other);
            std::process::exit(1);
        }
    };

    if results.is_empty() {
        println!("Nothing found");
    }
    for result in &results {
        match &result.postal_code {
            Some(code) => println!("{}  {} ({})", result.position, result.formatted_address, code),
            None => println!("{}  {}", result.position, result.formatted_address),
        }
    }

    Ok(())
}
