use async_trait::async_trait;

mod error;
pub use error::{Error, Result};

pub mod agents;
pub mod app;
pub mod config;
pub mod de;
pub mod event;
pub mod series;
pub mod ui;

pub use agents::PolygonAgent;
pub use config::Config;
pub use series::{SeriesCollection, StockPoint, StockSeries};

pub type Ticker = String;

/// Source of daily price series.
#[async_trait]
pub trait SeriesAgent: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<StockSeries>;
}

pub trait FloatMinMax {
    fn f64_min(&mut self) -> f64;
    fn f64_max(&mut self) -> f64;
}

impl<T> FloatMinMax for T where T: Iterator<Item=f64> {
    fn f64_max(&mut self) -> f64 {
        self.fold(f64::NAN, |a,b| a.max(b) )
    }

    fn f64_min(&mut self) -> f64 {
        self.fold(f64::NAN, |a,b| a.min(b) )
    }
}
