use std::env;
use std::path::PathBuf;

use crate::{Error, Result, Ticker};

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
pub const DEFAULT_LOG_FILE: &str = "stock-graph.log";
pub const DEFAULT_TICKERS: [&str; 2] = ["AAPL", "TSLA"];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub log_file: PathBuf,
    pub tickers: Vec<Ticker>,
}

impl Config {
    /// Read `.env`, then the process environment. `args` are ticker symbols.
    pub fn load<I>(args: I) -> Result<Config>
        where I: IntoIterator<Item=String>
    {
        dotenvy::dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok(), args)
    }

    pub fn from_lookup<F, I>(lookup: F, args: I) -> Result<Config>
        where F: Fn(&str) -> Option<String>,
              I: IntoIterator<Item=String>
    {
        // a missing key is left for the remote to reject
        let api_key = lookup("POLYGON_API_KEY").unwrap_or_default();

        let base_url = lookup("POLYGON_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let log_file = lookup("STOCK_GRAPH_LOG")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
            .into();

        let mut tickers = vec![];
        for arg in args {
            let symbol = arg.trim();
            if symbol.is_empty() {
                return Err(Error::config("ticker symbol must not be empty"));
            }
            tickers.push(symbol.to_string());
        }
        if tickers.is_empty() {
            tickers = DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect();
        }

        Ok(Config { api_key, base_url, log_file, tickers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[]), Vec::<String>::new()).unwrap();
        assert_eq!(config.api_key, "");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(config.tickers, vec!["AAPL", "TSLA"]);
    }

    #[test]
    fn reads_vars_and_args() {
        let vars = lookup(&[
            ("POLYGON_API_KEY", "k3y"),
            ("POLYGON_BASE_URL", "http://127.0.0.1:9000"),
            ("STOCK_GRAPH_LOG", "/tmp/graph.log"),
        ]);
        let config = Config::from_lookup(vars, vec!["MSFT".to_string(), " NVDA ".to_string()]).unwrap();

        assert_eq!(config.api_key, "k3y");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.log_file, PathBuf::from("/tmp/graph.log"));
        assert_eq!(config.tickers, vec!["MSFT", "NVDA"]);
    }

    #[test]
    fn blank_ticker_is_rejected() {
        let err = Config::from_lookup(lookup(&[]), vec!["AAPL".to_string(), "  ".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
