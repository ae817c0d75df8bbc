use crossterm::event::KeyEvent;

use crate::{StockSeries, Ticker};

/// Messages delivered to the loop that owns `AppState`.
#[derive(Debug, Clone)]
pub enum Event {
    Input(KeyEvent),
    Tick,
    Fetched(StockSeries),
    FetchFailed { ticker: Ticker, reason: String },
}
