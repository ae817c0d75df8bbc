pub mod polygon;

pub use polygon::{aggregates_url, DateRange, PolygonAgent};
