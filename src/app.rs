use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use image::DynamicImage;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
    style::Color,
    widgets::ListState,
};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::catalog::{Catalog, Movie, PosterState, SortKey};
use crate::config::Config;
use crate::error::Result;
use crate::image_cache::ImageCache;
use crate::pager::{BatchPager, BatchTicket, PagerState};
use crate::player::Player;
use crate::scraper::{OutputPoll, PollOutcome, Scraper};
use crate::search::Filters;
use crate::ui::{BrowserView, render_browser_view, render_help_overlay, widgets};

/// Rows of headroom before the end of the visible window at which the next
/// batch is requested (the scroll-proximity trigger).
const SCROLL_AHEAD: usize = 10;

/// Background results marshaled back onto the UI thread. All mutable state
/// (catalog, pager, visible window) is written only while draining these.
pub enum AppMessage {
    FilterReady {
        generation: u64,
        indices: Vec<usize>,
    },
    BatchReady(BatchTicket),
    PosterLoaded {
        image_url: String,
        image: Arc<DynamicImage>,
    },
    PosterFailed {
        image_url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browser,
    Search,
    Help,
}

pub struct App {
    pub config: Config,
    pub catalog: Catalog,
    pub running: bool,
    pub view: View,
    pub accent: Color,

    pub filters: Filters,
    last_applied_query: String,
    genre_values: Vec<String>,
    country_values: Vec<String>,

    pager: BatchPager,
    pub visible: Vec<usize>,
    pub list_state: ListState,

    msg_tx: mpsc::UnboundedSender<AppMessage>,
    msg_rx: mpsc::UnboundedReceiver<AppMessage>,

    image_cache: Arc<ImageCache>,
    picker: Picker,
    /// Render protocol for the selected movie's poster, keyed by image URL.
    poster_protocol: Option<(String, StatefulProtocol)>,

    player: Option<Player>,
    scrape: Option<(Scraper, OutputPoll)>,
    status: String,
}

impl App {
    pub fn new(config: Config, catalog: Catalog, image_cache: ImageCache, picker: Picker) -> Self {
        let accent = widgets::parse_accent_color(&config.ui.accent_color);
        let genre_values = catalog.genre_values();
        let country_values = catalog.country_values();

        let (msg_tx, msg_rx) = mpsc::unbounded_channel();

        Self {
            config,
            catalog,
            running: true,
            view: View::Browser,
            accent,

            filters: Filters::default(),
            last_applied_query: String::new(),
            genre_values,
            country_values,

            pager: BatchPager::default(),
            visible: Vec::new(),
            list_state: ListState::default(),

            msg_tx,
            msg_rx,

            image_cache: Arc::new(image_cache),
            picker,
            poster_protocol: None,

            player: None,
            scrape: None,
            status: String::new(),
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        // initial unfiltered view + first batch
        self.apply_filters();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events().await?;
            self.process_messages();
            self.poll_scraper();
            self.reap_player();
        }

        if let Some((scraper, _)) = &mut self.scrape {
            scraper.cancel();
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Filtering and pagination
    // ------------------------------------------------------------------

    /// Recompute the filtered view off-thread. Invalidating the pager first
    /// means any in-flight batch or older filter computation lands stale and
    /// gets dropped.
    fn apply_filters(&mut self) {
        let generation = self.pager.invalidate();
        self.visible.clear();
        self.list_state.select(None);

        let filters = self.filters.clone();
        let movies = self.catalog.movies().to_vec();
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            let indices = filters.apply(&movies);
            let _ = tx.send(AppMessage::FilterReady {
                generation,
                indices,
            });
        });
    }

    /// Re-filter only when the query actually changed since the last apply.
    fn maybe_apply_search(&mut self) {
        if self.filters.query != self.last_applied_query {
            self.last_applied_query = self.filters.query.clone();
            self.apply_filters();
        }
    }

    fn request_next_batch(&mut self) {
        if let Some(ticket) = self.pager.request_next_batch() {
            let tx = self.msg_tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(AppMessage::BatchReady(ticket));
            });
        }
    }

    fn maybe_request_more(&mut self) {
        if let Some(selected) = self.list_state.selected()
            && selected + SCROLL_AHEAD >= self.visible.len()
        {
            self.request_next_batch();
        }
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                AppMessage::FilterReady {
                    generation,
                    indices,
                } => {
                    if self.pager.install_source(generation, indices) {
                        self.visible.clear();
                        self.request_next_batch();
                    } else {
                        debug!("Discarding stale filter result");
                    }
                }
                AppMessage::BatchReady(ticket) => {
                    if self.pager.complete(&ticket) {
                        for &idx in &ticket.indices {
                            self.visible.push(idx);
                        }
                        for idx in ticket.indices {
                            self.spawn_poster_load(idx);
                        }
                        if self.list_state.selected().is_none() && !self.visible.is_empty() {
                            self.list_state.select(Some(0));
                        }
                    } else {
                        debug!("Discarding stale batch");
                    }
                }
                AppMessage::PosterLoaded { image_url, image } => {
                    self.catalog.set_poster_ready(&image_url, image);
                }
                AppMessage::PosterFailed { image_url } => {
                    self.catalog.set_poster_failed(&image_url);
                }
            }
        }
    }

    /// Fire-and-forget poster load for one row. No-op unless the movie is
    /// still `NotLoaded`, which keeps every movie at one fetch per run.
    fn spawn_poster_load(&mut self, idx: usize) {
        let Some(movie) = self.catalog.movie_mut(idx) else {
            return;
        };
        if !matches!(movie.poster, PosterState::NotLoaded) {
            return;
        }
        if movie.image_url.is_empty() {
            movie.poster = PosterState::Failed;
            return;
        }

        movie.poster = PosterState::Loading;
        let url = movie.image_url.clone();
        let cache = self.image_cache.clone();
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            match cache.get(&url).await {
                Ok(image) => {
                    let _ = tx.send(AppMessage::PosterLoaded {
                        image_url: url,
                        image,
                    });
                }
                Err(e) => {
                    debug!(url, "Poster load failed: {}", e);
                    let _ = tx.send(AppMessage::PosterFailed { image_url: url });
                }
            }
        });
    }

    // ------------------------------------------------------------------
    // Catalog mutations
    // ------------------------------------------------------------------

    fn sort_catalog(&mut self, key: SortKey) {
        self.catalog.sort(key);
        self.status = match key {
            SortKey::Title => "Sorted by title".to_string(),
            SortKey::Year => "Sorted by year".to_string(),
        };
        self.apply_filters();
    }

    fn shuffle_catalog(&mut self) {
        self.catalog.shuffle();
        self.status = "Shuffled".to_string();
        self.apply_filters();
    }

    // ------------------------------------------------------------------
    // Selection and external processes
    // ------------------------------------------------------------------

    fn selected_movie(&self) -> Option<&Movie> {
        self.list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .and_then(|&idx| self.catalog.movie(idx))
    }

    fn move_selection_down(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(next));
        self.maybe_request_more();
    }

    fn move_selection_up(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let prev = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(prev));
    }

    fn play_selected(&mut self) {
        let Some(movie) = self.selected_movie() else {
            return;
        };
        let url = movie.url.clone();
        let title = movie.title.clone();

        let mut player = Player::new(
            self.config.player.command.clone(),
            self.config.player.args.clone(),
        );
        match player.play(&url) {
            Ok(()) => {
                self.status = format!("Playing {}", title);
                self.player = Some(player);
            }
            Err(e) => {
                error!("Could not launch player: {}", e);
                self.status = format!("Player error: {}", e);
            }
        }
    }

    fn scrape_selected(&mut self) {
        if self.scrape.is_some() {
            self.status = "Scraper already running".to_string();
            return;
        }
        let Some(command) = self.config.scraper.command.clone() else {
            self.status = "No scraper configured".to_string();
            return;
        };
        let Some(movie) = self.selected_movie() else {
            return;
        };
        let url = movie.url.clone();

        let output = match self.config.scraper_output_file() {
            Ok(path) => path,
            Err(e) => {
                error!("No scraper output path: {}", e);
                return;
            }
        };

        let mut scraper = Scraper::new(command, self.config.scraper.args.clone());
        match scraper.launch(&url) {
            Ok(()) => {
                let poll = OutputPoll::new(output, self.config.scraper_timeout());
                self.scrape = Some((scraper, poll));
                self.status = "Scraping...".to_string();
            }
            Err(e) => {
                error!("Could not launch scraper: {}", e);
                self.status = format!("Scraper error: {}", e);
            }
        }
    }

    fn reap_player(&mut self) {
        if let Some(player) = &mut self.player
            && !player.is_running()
        {
            self.player = None;
        }
    }

    fn poll_scraper(&mut self) {
        let Some((scraper, poll)) = &mut self.scrape else {
            return;
        };

        match poll.check() {
            PollOutcome::Pending => {}
            PollOutcome::Ready(path) => {
                info!(path = %path.display(), "Scrape result ready");
                self.status = format!("Scrape result: {}", path.display());
                self.scrape = None;
            }
            PollOutcome::TimedOut => {
                scraper.cancel();
                self.status = "Scraper timed out".to_string();
                self.scrape = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Facet cycling
    // ------------------------------------------------------------------

    fn cycle_genre(&mut self, forward: bool) {
        self.filters.genre = cycle_value(&self.genre_values, self.filters.genre.take(), forward);
        self.apply_filters();
    }

    fn cycle_country(&mut self, forward: bool) {
        self.filters.country =
            cycle_value(&self.country_values, self.filters.country.take(), forward);
        self.apply_filters();
    }

    fn clear_filters(&mut self) {
        if self.filters.is_default() {
            return;
        }
        self.filters = Filters::default();
        self.last_applied_query.clear();
        self.apply_filters();
    }

    // ------------------------------------------------------------------
    // Rendering and input
    // ------------------------------------------------------------------

    fn render(&mut self, frame: &mut Frame) {
        self.sync_poster_protocol();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(frame.area());

        let view = BrowserView {
            catalog: &self.catalog,
            visible: &self.visible,
            filters: &self.filters,
            searching: self.view == View::Search,
            fetching: self.pager.state() == PagerState::Fetching,
            matched: self.pager.source_len(),
            status: &self.status,
            accent: self.accent,
        };

        render_browser_view(
            frame,
            chunks[0],
            &view,
            &mut self.list_state,
            self.poster_protocol.as_mut().map(|(_, p)| p),
        );

        let help = match self.view {
            View::Search => widgets::help_bar(&[("Enter/Esc", "done"), ("type", "to search")]),
            _ => widgets::help_bar(&[
                ("/", "search"),
                ("g/c", "filters"),
                ("Enter", "play"),
                ("?", "help"),
                ("q", "quit"),
            ]),
        };
        frame.render_widget(help, chunks[1]);

        if self.view == View::Help {
            render_help_overlay(frame, self.accent);
        }
    }

    /// Keep the poster render protocol in step with the selected movie.
    fn sync_poster_protocol(&mut self) {
        let target = self
            .selected_movie()
            .and_then(|m| m.poster.image().map(|img| (m.image_url.clone(), img.clone())));

        match target {
            Some((url, img)) => {
                let stale = self
                    .poster_protocol
                    .as_ref()
                    .is_none_or(|(current, _)| current != &url);
                if stale {
                    let protocol = self.picker.new_resize_protocol((*img).clone());
                    self.poster_protocol = Some((url, protocol));
                }
            }
            None => self.poster_protocol = None,
        }
    }

    async fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    self.running = false;
                    return Ok(());
                }

                match self.view {
                    View::Browser => self.handle_browser_input(key),
                    View::Search => self.handle_search_input(key),
                    View::Help => self.view = View::Browser,
                }
            }
        }
        Ok(())
    }

    fn handle_browser_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection_up(),
            KeyCode::Char('/') => self.view = View::Search,
            KeyCode::Char('g') => self.cycle_genre(true),
            KeyCode::Char('G') => self.cycle_genre(false),
            KeyCode::Char('c') => self.cycle_country(true),
            KeyCode::Char('C') => self.cycle_country(false),
            KeyCode::Char('s') => self.sort_catalog(SortKey::Title),
            KeyCode::Char('y') => self.sort_catalog(SortKey::Year),
            KeyCode::Char('S') => self.shuffle_catalog(),
            KeyCode::Enter => self.play_selected(),
            KeyCode::Char('o') => self.scrape_selected(),
            KeyCode::Esc => self.clear_filters(),
            KeyCode::Char('?') => self.view = View::Help,
            _ => {}
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.view = View::Browser;
                self.maybe_apply_search();
            }
            KeyCode::Backspace => {
                self.filters.query.pop();
                self.maybe_apply_search();
            }
            KeyCode::Char(c) => {
                self.filters.query.push(c);
                self.maybe_apply_search();
            }
            _ => {}
        }
    }
}

/// Step through `None -> values[0] -> ... -> values[last] -> None`.
fn cycle_value(values: &[String], current: Option<String>, forward: bool) -> Option<String> {
    if values.is_empty() {
        return None;
    }

    let pos = current
        .as_deref()
        .and_then(|v| values.iter().position(|candidate| candidate == v));

    if forward {
        match pos {
            None => Some(values[0].clone()),
            Some(i) if i + 1 < values.len() => Some(values[i + 1].clone()),
            Some(_) => None,
        }
    } else {
        match pos {
            None => Some(values[values.len() - 1].clone()),
            Some(0) => None,
            Some(i) => Some(values[i - 1].clone()),
        }
    }
}

pub fn init_terminal() -> io::Result<DefaultTerminal> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    Ok(ratatui::init())
}

pub fn restore_terminal() -> io::Result<()> {
    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_value_forward_wraps_to_all() {
        let values = vec!["Action".to_string(), "Drama".to_string()];
        let step1 = cycle_value(&values, None, true);
        assert_eq!(step1.as_deref(), Some("Action"));
        let step2 = cycle_value(&values, step1, true);
        assert_eq!(step2.as_deref(), Some("Drama"));
        let step3 = cycle_value(&values, step2, true);
        assert_eq!(step3, None);
    }

    #[test]
    fn test_cycle_value_backward() {
        let values = vec!["Action".to_string(), "Drama".to_string()];
        let step1 = cycle_value(&values, None, false);
        assert_eq!(step1.as_deref(), Some("Drama"));
        let step2 = cycle_value(&values, step1, false);
        assert_eq!(step2.as_deref(), Some("Action"));
        let step3 = cycle_value(&values, step2, false);
        assert_eq!(step3, None);
    }

    #[test]
    fn test_cycle_value_empty() {
        assert_eq!(cycle_value(&[], None, true), None);
    }
}
