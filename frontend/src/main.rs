mod app;

extern crate pretty_env_logger;
#[macro_use] extern crate log;

use app::commands::Command;
use app::config::{ViewerConfig, DEFAULT_CONFIG_PATH};
use app::App;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Keys:     pageup pagedown space left right up down  (also + - layer)
Search:   search <address>
Clicks:   click <x> <y>    mark a point and show its address
          rclick <x> <y>   find the last searched business near a point
Other:    reset  postal  redraw  quit";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    pretty_env_logger::init();

    info!("Starting map viewer...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = ViewerConfig::load(&config_path)?;
    let output = config.output.clone();

    let mut app = App::new(config)?;

    if let Err(e) = app.redraw().await {
        error!("Failed to load initial map: {}", e);
    }

    println!("{}", HELP);
    println!("Map image: {}", output.display());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(e) => {
                warn!("{}", e);
                println!("{}", HELP);
                continue;
            }
        };

        match app.handle(command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => error!("{}", e),
        }

        if let Some(status) = app.state.status_line() {
            println!("{}", status);
        }
    }

    info!("Map viewer closed");
    Ok(())
}
