use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

/// Bordered block with an accented bold title.
pub fn titled_block(title: &str, accent: Color) -> Block<'static> {
    let style = Style::default().fg(accent);
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(style)
        .title(Line::styled(
            format!(" {title} "),
            style.add_modifier(Modifier::BOLD),
        ))
}

/// One-line key hint bar: `key action  key action  ...`.
pub fn help_bar(hints: &[(&'static str, &'static str)]) -> Paragraph<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 4);
    for (key, action) in hints {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Modifier::BOLD));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(*action, Color::DarkGray));
    }
    Paragraph::new(Line::from(spans))
}

/// Rect of at most `width` x `height` centered in `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Map a config color name to a terminal color, defaulting to magenta.
pub fn parse_accent_color(name: &str) -> Color {
    match name.to_ascii_lowercase().as_str() {
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" => Color::Gray,
        _ => Color::Magenta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let r = centered_rect(100, 100, area);
        assert_eq!(r, area);

        let r = centered_rect(10, 4, area);
        assert_eq!(r, Rect::new(5, 3, 10, 4));
    }

    #[test]
    fn test_accent_color_defaults_to_magenta() {
        assert_eq!(parse_accent_color("CYAN"), Color::Cyan);
        assert_eq!(parse_accent_color("magenta"), Color::Magenta);
        assert_eq!(parse_accent_color("plaid"), Color::Magenta);
    }
}
