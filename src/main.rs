mod app;
mod assets;
mod config;
mod core;
mod game;
mod screens;
mod ui;

use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .try_init();

    let track_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(config::DEFAULT_TRACK_PATH), PathBuf::from);
    app::run(track_path)
}
