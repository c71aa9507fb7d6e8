use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use ratatui_image::{StatefulImage, protocol::StatefulProtocol};

use crate::catalog::{Catalog, Movie, PosterState};
use crate::search::Filters;

use super::widgets::titled_block;

/// Everything the browser view needs to draw one frame. All state lives on
/// the app; this module only renders.
pub struct BrowserView<'a> {
    pub catalog: &'a Catalog,
    pub visible: &'a [usize],
    pub filters: &'a Filters,
    /// True while the search input has focus.
    pub searching: bool,
    /// True while a batch fetch is in flight.
    pub fetching: bool,
    /// Size of the current filtered view.
    pub matched: usize,
    pub status: &'a str,
    pub accent: Color,
}

pub fn render_browser_view(
    frame: &mut Frame,
    area: Rect,
    view: &BrowserView,
    list_state: &mut ListState,
    poster: Option<&mut StatefulProtocol>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_search_input(frame, chunks[0], view);
    render_facet_bar(frame, chunks[1], view);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    render_movie_list(frame, main[0], view, list_state);
    render_details(frame, main[1], view, list_state, poster);

    let status = Paragraph::new(Span::styled(
        view.status,
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(status, chunks[3]);
}

fn render_search_input(frame: &mut Frame, area: Rect, view: &BrowserView) {
    let title = if view.searching {
        " Search (typing) "
    } else {
        " Search "
    };
    let border = if view.searching {
        view.accent
    } else {
        Color::DarkGray
    };

    let text = if view.searching {
        format!("{}\u{2588}", view.filters.query) // block cursor
    } else {
        view.filters.query.clone()
    };

    let input = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title)
                .title_style(Style::default().fg(view.accent).add_modifier(Modifier::BOLD)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(input, area);
}

fn render_facet_bar(frame: &mut Frame, area: Rect, view: &BrowserView) {
    let genre = view.filters.genre.as_deref().unwrap_or("All Genres");
    let country = view.filters.country.as_deref().unwrap_or("All Countries");

    let line = Line::from(vec![
        Span::styled("genre: ", Style::default().fg(Color::DarkGray)),
        Span::styled(genre, Style::default().fg(view.accent)),
        Span::raw("  "),
        Span::styled("country: ", Style::default().fg(Color::DarkGray)),
        Span::styled(country, Style::default().fg(view.accent)),
        Span::raw("  "),
        Span::styled(
            format!(
                "{} / {} movies",
                view.matched,
                view.catalog.len()
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_movie_list(
    frame: &mut Frame,
    area: Rect,
    view: &BrowserView,
    list_state: &mut ListState,
) {
    let items: Vec<ListItem> = view
        .visible
        .iter()
        .filter_map(|&idx| view.catalog.movie(idx))
        .map(|movie| {
            let line = Line::from(vec![
                Span::raw(movie.title.clone()),
                Span::styled(
                    format!("  ({})", movie.year),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = if view.fetching {
        format!("Movies ({} shown, loading...)", view.visible.len())
    } else {
        format!("Movies ({} shown)", view.visible.len())
    };

    let list = List::new(items)
        .block(titled_block(&title, view.accent))
        .highlight_style(
            Style::default()
                .bg(view.accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, list_state);
}

fn render_details(
    frame: &mut Frame,
    area: Rect,
    view: &BrowserView,
    list_state: &mut ListState,
    poster: Option<&mut StatefulProtocol>,
) {
    let block = titled_block("Details", view.accent);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let selected = list_state
        .selected()
        .and_then(|i| view.visible.get(i))
        .and_then(|&idx| view.catalog.movie(idx));

    let Some(movie) = selected else {
        let empty = Paragraph::new("Nothing selected").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(7)])
        .split(inner);

    render_poster(frame, chunks[0], movie, poster);
    frame.render_widget(movie_info(movie), chunks[1]);
}

fn render_poster(
    frame: &mut Frame,
    area: Rect,
    movie: &Movie,
    poster: Option<&mut StatefulProtocol>,
) {
    match (&movie.poster, poster) {
        (PosterState::Ready(_), Some(protocol)) => {
            frame.render_stateful_widget(StatefulImage::default(), area, protocol);
        }
        (PosterState::Loading, _) => placeholder(frame, area, "loading poster..."),
        (PosterState::Failed, _) => placeholder(frame, area, "no poster"),
        _ => placeholder(frame, area, ""),
    }
}

fn placeholder(frame: &mut Frame, area: Rect, text: &str) {
    let p = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(p, area);
}

fn movie_info(movie: &Movie) -> Paragraph<'_> {
    let dim = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(Span::styled(
            movie.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::styled("year     ", dim), Span::raw(&movie.year)]),
        Line::from(vec![Span::styled("genre    ", dim), Span::raw(&movie.genre)]),
        Line::from(vec![
            Span::styled("duration ", dim),
            Span::raw(&movie.duration),
        ]),
        Line::from(vec![
            Span::styled("country  ", dim),
            Span::raw(&movie.country),
        ]),
        Line::from(vec![Span::styled("url      ", dim), Span::raw(&movie.url)]),
    ];

    Paragraph::new(lines).wrap(Wrap { trim: true })
}

pub fn render_help_overlay(frame: &mut Frame, accent: Color) {
    let popup = super::widgets::centered_rect(44, 14, frame.area());

    let lines = vec![
        Line::from("j/k or arrows  move selection"),
        Line::from("/              edit search"),
        Line::from("g / G          cycle genre filter"),
        Line::from("c / C          cycle country filter"),
        Line::from("s / y          sort by title / year"),
        Line::from("S              shuffle"),
        Line::from("Enter          play selected"),
        Line::from("o              scrape selected"),
        Line::from("Esc            clear filters"),
        Line::from("q              quit"),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(titled_block("Help", accent)),
        popup,
    );
}
