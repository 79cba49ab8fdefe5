// src/main.rs
mod api;
mod db;
mod error;
mod models;

use env_logger::Builder;
use log::{info, LevelFilter};
use warp::Filter;

#[tokio::main]
async fn main() {
    Builder::new()
        .filter_level(LevelFilter::Debug)
        .format_timestamp_secs()
        .init();

    info!("Starting the wallet tracker application...");

    // Define routes; every request opens its own document store scope, so
    // there is no shared connection to set up here.
    let api = api::routes().recover(error::handle_rejection);

    // Start the server
    info!("Server running on http://127.0.0.1:3030");
    warp::serve(api).run(([127, 0, 0, 1], 3030)).await;
}
