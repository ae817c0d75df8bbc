use std::slice;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Ticker;

pub const MS_PER_DAY: f64 = 86_400_000.0;

/// One trading day's aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPoint {
    #[serde(rename = "o")]
    pub open: f64,

    #[serde(rename = "c")]
    pub close: f64,

    /// milliseconds since epoch, unique within the owning series
    #[serde(rename = "t")]
    pub timestamp: i64,
}

impl StockPoint {
    pub fn date(&self) -> Option<NaiveDate> {
        date_of_millis(self.timestamp)
    }

    /// x coordinate on the chart, in days since epoch
    pub fn day(&self) -> f64 {
        self.timestamp as f64 / MS_PER_DAY
    }
}

pub fn date_of_millis(ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

/// Daily aggregates for one ticker, ordered by timestamp ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSeries {
    pub ticker: Ticker,

    #[serde(rename = "results")]
    pub points: Vec<StockPoint>,
}

impl StockSeries {
    pub fn new<T: Into<Ticker>>(ticker: T, points: Vec<StockPoint>) -> Self {
        StockSeries {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }
}

/// Series received so far. Absent until the first one arrives, append-only after.
#[derive(Debug, Default)]
pub struct SeriesCollection {
    series: Option<Vec<StockSeries>>,
}

impl SeriesCollection {
    pub fn new() -> Self {
        SeriesCollection::default()
    }

    pub fn append(&mut self, series: StockSeries) {
        self.series.get_or_insert_with(Vec::new).push(series);
    }

    pub fn is_absent(&self) -> bool {
        self.series.is_none()
    }

    pub fn len(&self) -> usize {
        self.series.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> slice::Iter<'_, StockSeries> {
        self.series.as_deref().unwrap_or(&[]).iter()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.iter().any(|s| s.ticker == ticker)
    }

    /// every entry recorded for `ticker`, in arrival order
    pub fn entries<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a StockSeries> + 'a {
        self.iter().filter(move |s| s.ticker == ticker)
    }

    pub fn points(&self) -> impl Iterator<Item = &StockPoint> {
        self.iter().flat_map(|s| s.points.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(t: i64, c: f64) -> StockPoint {
        StockPoint { open: c - 1.0, close: c, timestamp: t }
    }

    #[test]
    fn collection_starts_absent() {
        let collection = SeriesCollection::new();
        assert!(collection.is_absent());
        assert_eq!(collection.len(), 0);
        assert_eq!(collection.iter().count(), 0);
    }

    #[test]
    fn distinct_tickers_in_either_order() {
        let aapl = StockSeries::new("AAPL", vec![point(1, 1.0)]);
        let tsla = StockSeries::new("TSLA", vec![point(1, 2.0)]);

        for order in [[aapl.clone(), tsla.clone()], [tsla.clone(), aapl.clone()]].iter() {
            let mut collection = SeriesCollection::new();
            for series in order.iter() {
                collection.append(series.clone());
            }
            assert!(!collection.is_absent());
            assert_eq!(collection.len(), 2);
            assert!(collection.contains("AAPL"));
            assert!(collection.contains("TSLA"));
        }
    }

    #[test]
    fn repeated_ticker_keeps_earlier_entry() {
        let mut collection = SeriesCollection::new();
        collection.append(StockSeries::new("AAPL", vec![point(1, 1.0)]));
        collection.append(StockSeries::new("AAPL", vec![point(1, 5.0), point(2, 6.0)]));

        let entries: Vec<_> = collection.entries("AAPL").collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].points.len(), 1);
        assert_eq!(entries[1].points.len(), 2);
    }

    #[test]
    fn point_date_is_utc_day() {
        let p = point(1_700_000_000_000, 1.0);
        assert_eq!(p.date(), NaiveDate::from_ymd_opt(2023, 11, 14));
        assert!((p.day() - 19_675.925_925).abs() < 1e-3);
    }
}
