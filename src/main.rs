use std::{env, fs, sync::Arc};

use tracing_subscriber::EnvFilter;

extern crate stock_graph;
use stock_graph::ui;
use stock_graph::{Config, PolygonAgent};


#[tokio::main]
async fn main() -> Result<(), stock_graph::Error> {
    let config = Config::load(env::args().skip(1))?;

    // log to a file, the terminal belongs to the chart
    let log_file = fs::File::create(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    tracing::info!(
        tickers = ?config.tickers,
        base_url = %config.base_url,
        "starting stock-graph"
    );
    if config.api_key.is_empty() {
        tracing::warn!("POLYGON_API_KEY is not set, requests will be rejected");
    }

    let agent = Arc::new(PolygonAgent::new(&config));
    let mut app = ui::App::new(config.tickers.clone());
    app.run(agent).await
}
