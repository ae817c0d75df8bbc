use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::event::Event;
use crate::{SeriesAgent, SeriesCollection, Ticker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Empty,
    Loading,
    Populated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Pending,
    Loaded,
    Failed,
}

/// Screen state. Only the loop owning it calls `apply`.
#[derive(Debug)]
pub struct AppState {
    tickers: Vec<Ticker>,
    collection: SeriesCollection,
    statuses: BTreeMap<Ticker, FetchStatus>,
    appeared: bool,
    frame: usize,
}

impl AppState {
    pub fn new(tickers: Vec<Ticker>) -> Self {
        AppState {
            tickers,
            collection: SeriesCollection::new(),
            statuses: BTreeMap::new(),
            appeared: false,
            frame: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        if !self.collection.is_absent() {
            Screen::Populated
        } else if self.appeared {
            Screen::Loading
        } else {
            Screen::Empty
        }
    }

    /// First appearance. Returns the tickers to fetch once, `None` afterwards.
    pub fn appear(&mut self) -> Option<Vec<Ticker>> {
        if self.appeared {
            return None;
        }
        self.appeared = true;

        for ticker in &self.tickers {
            self.statuses.insert(ticker.clone(), FetchStatus::Pending);
        }
        Some(self.tickers.clone())
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::Fetched(series) => {
                tracing::info!(ticker = %series.ticker, points = series.points.len(), "series arrived");
                self.statuses.insert(series.ticker.clone(), FetchStatus::Loaded);
                self.collection.append(series);
            },
            Event::FetchFailed { ticker, .. } => {
                // collection is untouched, an earlier success stays visible
                let status = self.statuses.entry(ticker).or_insert(FetchStatus::Pending);
                if *status != FetchStatus::Loaded {
                    *status = FetchStatus::Failed;
                }
            },
            Event::Tick => self.frame = self.frame.wrapping_add(1),
            Event::Input(_) => {}
        }
    }

    pub fn collection(&self) -> &SeriesCollection {
        &self.collection
    }

    pub fn statuses(&self) -> impl Iterator<Item = (&Ticker, &FetchStatus)> {
        self.statuses.iter()
    }

    pub fn status(&self, ticker: &str) -> Option<FetchStatus> {
        self.statuses.get(ticker).copied()
    }

    pub fn frame(&self) -> usize {
        self.frame
    }
}

/// Start one task per ticker. Results come back over `tx` in completion order.
pub fn spawn_fetches<A>(agent: Arc<A>, tickers: Vec<Ticker>, tx: UnboundedSender<Event>) -> Vec<JoinHandle<()>>
    where A: SeriesAgent + ?Sized + 'static
{
    tickers.into_iter().map(|ticker| {
        let agent = agent.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let event = match agent.fetch(&ticker).await {
                Ok(series) => Event::Fetched(series),
                Err(err) => {
                    tracing::warn!(ticker = %ticker, error = %err, "fetch failed");
                    Event::FetchFailed { ticker, reason: err.to_string() }
                }
            };

            if tx.send(event).is_err() {
                tracing::debug!("event receiver dropped");
            }
        })
    }).collect()
}
