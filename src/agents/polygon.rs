use async_trait::async_trait;
use chrono::{Local, Months, NaiveDate};
use hyper::client::HttpConnector;
use hyper::{Body, Client, Uri};
use hyper_tls::HttpsConnector;

use crate::de::FromJsonResponse;
use crate::{Config, Error, Result, SeriesAgent, StockSeries};

type Connector = HttpsConnector<HttpConnector>;
type HttpsClient = Client<Connector, Body>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TRAILING_MONTHS: u32 = 3;

/// Inclusive span of calendar days requested from the aggregates endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `today` back to the same day `months` calendar months earlier,
    /// clamped to the end of shorter months.
    pub fn trailing_months(today: NaiveDate, months: u32) -> Result<DateRange> {
        let start = today
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| Error::Date(format!("{} minus {} months", today, months)))?;

        Ok(DateRange { start, end: today })
    }
}

/// Aggregates URL for one ticker. Query order is fixed.
pub fn aggregates_url(base: &str, ticker: &str, range: &DateRange, api_key: &str) -> String {
    format!(
        "{}/v2/aggs/ticker/{}/range/1/day/{}/{}\
        ?adjusted=true&sort=asc&limit=120&apiKey={}",
        base.trim_end_matches('/'),
        ticker,
        range.start.format(DATE_FORMAT),
        range.end.format(DATE_FORMAT),
        api_key
    )
}

/// The url with its key masked, for logs.
fn redacted(url: &str) -> String {
    match url.find("apiKey=") {
        Some(i) => format!("{}apiKey=***", &url[..i]),
        None => url.to_string(),
    }
}

pub struct PolygonAgent {
    client: HttpsClient,
    base_url: String,
    api_key: String,
}

impl PolygonAgent {
    pub fn new(config: &Config) -> PolygonAgent {
        PolygonAgent {
            client: Client::builder().build(Connector::new()),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, ticker: &str, range: &DateRange) -> Result<Uri> {
        let url = aggregates_url(&self.base_url, ticker, range, &self.api_key);
        tracing::info!(ticker, url = %redacted(&url), "calling url");
        Ok(url.parse()?)
    }

    /// Fetch the trailing window ending at `today`.
    pub async fn fetch_on(&self, ticker: &str, today: NaiveDate) -> Result<StockSeries> {
        let range = DateRange::trailing_months(today, TRAILING_MONTHS)?;
        let url = self.url(ticker, &range)?;

        let resp = self.client.get(url).await?;
        let series: StockSeries = resp.from_json().await?;

        tracing::debug!(ticker, points = series.points.len(), "decoded series");
        Ok(series)
    }
}

#[async_trait]
impl SeriesAgent for PolygonAgent {
    async fn fetch(&self, ticker: &str) -> Result<StockSeries> {
        self.fetch_on(ticker, Local::now().date_naive()).await
    }
}
