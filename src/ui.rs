use std::{io, thread, time::Duration, sync::Arc};
use tui::{
    backend::{Backend, CrosstermBackend}, buffer::Buffer, layout::{ Alignment, Constraint, Direction, Layout, Rect },
    style::{ Color, Modifier, Style }, symbols, text::{ Span, Spans },
    widgets::{ Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget },
    Terminal
};
use crossterm::{
    event::{ self, KeyCode, KeyEvent, KeyModifiers }, execute, terminal
};
use tokio::sync::mpsc::{ self, UnboundedSender };

use crate::app::{ self, AppState, FetchStatus, Screen };
use crate::event::Event;
use crate::series::{ date_of_millis, MS_PER_DAY };
use crate::{ FloatMinMax, Result, SeriesAgent, SeriesCollection, Ticker };

pub const TITLE: &str = "Stock Graph Demo";
const TICK_RATE: Duration = Duration::from_millis(200);
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const PALETTE: [Color; 6] = [
    Color::Cyan, Color::Magenta, Color::Yellow, Color::LightGreen, Color::LightBlue, Color::LightRed
];

/// Colour for a ticker, stable regardless of arrival order.
pub fn ticker_color(ticker: &str) -> Color {
    let sum = ticker.bytes().fold(0usize, |acc, b| acc.wrapping_add(b as usize));
    PALETTE[sum % PALETTE.len()]
}

pub struct App {
    state: AppState
}

impl App {
    pub fn new(tickers: Vec<Ticker>) -> Self {
        App {
            state: AppState::new(tickers)
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn draw<B>(&self, terminal: &mut Terminal<B>) -> Result<()>
        where B: Backend
    {
        terminal.draw(|f| {
                f.render_widget(AppWidget::new(&self.state), f.size());
            }
        )?;
        Ok(())
    }

    async fn run_draw_loop<A>(&mut self, agent: Arc<A>) -> Result<()>
        where A: SeriesAgent + ?Sized + 'static
    {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_input(tx.clone());

        //== loop rx events, the only place state is mutated
        loop {
            self.draw(&mut terminal)?;

            if let Some(tickers) = self.state.appear() {
                tracing::info!(?tickers, "fetching series");
                app::spawn_fetches(agent.clone(), tickers, tx.clone());
            }

            match rx.recv().await {
                Some(Event::Input(key)) => {
                    if is_quit(&key) {
                        break;
                    }
                },
                Some(event) => self.state.apply(event),
                None => break
            }
        }

        terminal.show_cursor()?;
        Ok(())
    }

    pub async fn run<A>(&mut self, agent: Arc<A>) -> Result<()>
        where A: SeriesAgent + ?Sized + 'static
    {
        //== terminal setup
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen)?;

        let result = self.run_draw_loop(agent).await;

        //== terminal cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout, terminal::LeaveAlternateScreen)?;

        result
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false
    }
}

/// Forward terminal input on a dedicated thread, ticking while idle.
fn spawn_input(tx: UnboundedSender<Event>) {
    thread::spawn(move || {
        loop {
            let event = match event::poll(TICK_RATE) {
                Ok(true) => match event::read() {
                    Ok(event::Event::Key(key)) => Event::Input(key),
                    Ok(_) => Event::Tick,
                    Err(err) => {
                        tracing::error!(error = %err, "cannot read terminal event");
                        break;
                    }
                },
                Ok(false) => Event::Tick,
                Err(err) => {
                    tracing::error!(error = %err, "cannot poll terminal events");
                    break;
                }
            };

            if tx.send(event).is_err() {
                break;
            }
        }
    });
}

pub struct AppWidget<'a> {
    state: &'a AppState
}

impl<'a> AppWidget<'a> {
    pub fn new(state: &'a AppState) -> Self {
        AppWidget { state }
    }
}

impl<'a> Widget for AppWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(1)
            .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let title = Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD));
        Paragraph::new(title)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        match self.state.screen() {
            Screen::Empty | Screen::Loading => {
                LoadingWidget { frame: self.state.frame() }.render(chunks[1], buf)
            },
            Screen::Populated => {
                ChartWidget { collection: self.state.collection() }.render(chunks[1], buf)
            }
        }

        StatusWidget { state: self.state }.render(chunks[2], buf);
    }
}

struct LoadingWidget {
    frame: usize
}

impl Widget for LoadingWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        let spinner = SPINNER[self.frame % SPINNER.len()];
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        Paragraph::new(format!("{} Loading", spinner))
            .alignment(Alignment::Center)
            .render(rows[1], buf);
    }
}

struct ChartWidget<'a> {
    collection: &'a SeriesCollection
}

/// Axis bounds, padded when empty or flat.
fn bounds(lo: f64, hi: f64) -> [f64; 2] {
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi - lo < f64::EPSILON {
        return [lo - 1.0, hi + 1.0];
    }
    [lo, hi]
}

fn day_label(day: f64) -> String {
    date_of_millis((day * MS_PER_DAY) as i64)
        .map(|d| d.format("%b %d").to_string())
        .unwrap_or_default()
}

impl<'a> Widget for ChartWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        //== (day, close) coords per series, drawn in arrival order
        let points: Vec<Vec<(f64, f64)>> = self.collection.iter()
            .map(|s| s.points.iter().map(|p| (p.day(), p.close)).collect())
            .collect();

        let datasets: Vec<Dataset> = self.collection.iter().zip(points.iter())
            .map(|(series, data)| {
                Dataset::default()
                    .name(series.ticker.as_str())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(ticker_color(&series.ticker)))
                    .data(data.as_slice())
            })
            .collect();

        let x = bounds(
            self.collection.points().map(|p| p.day()).f64_min(),
            self.collection.points().map(|p| p.day()).f64_max()
        );
        let y = bounds(
            self.collection.points().map(|p| p.close).f64_min(),
            self.collection.points().map(|p| p.close).f64_max()
        );

        let mut x_axis = Axis::default()
            .title("Day")
            .style(Style::default().fg(Color::Gray))
            .bounds(x);
        let mut y_axis = Axis::default()
            .title("Price")
            .style(Style::default().fg(Color::Gray))
            .bounds(y);

        //== first/middle/last labels, none until a point exists
        if self.collection.points().next().is_some() {
            x_axis = x_axis.labels(
                vec![x[0], (x[0] + x[1]) / 2.0, x[1]].into_iter().map(|d| Span::from(day_label(d))).collect()
            );
            y_axis = y_axis.labels(
                vec![y[0], (y[0] + y[1]) / 2.0, y[1]].into_iter().map(|p| Span::from(format!("${:.2}", p))).collect()
            );
        }

        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL))
            .x_axis(x_axis)
            .y_axis(y_axis);

        chart.render(area, buf);
    }
}

struct StatusWidget<'a> {
    state: &'a AppState
}

impl<'a> Widget for StatusWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![];
        for (ticker, status) in self.state.statuses() {
            let (label, style) = match status {
                FetchStatus::Pending => ("loading", Style::default().fg(Color::DarkGray)),
                FetchStatus::Loaded => ("loaded", Style::default().fg(ticker_color(ticker))),
                FetchStatus::Failed => ("failed", Style::default().fg(Color::Red))
            };
            spans.push(Span::styled(format!("{} {}", ticker, label), style));
            spans.push(Span::raw("  "));
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(area);

        Paragraph::new(Spans::from(spans)).render(chunks[0], buf);
        Paragraph::new(Span::styled("q quit", Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Right)
            .render(chunks[1], buf);
    }
}
