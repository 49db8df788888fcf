use crate::text::DisplayLine;
use crate::ui::theme::ThemeTokens;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
};

/// Helper function to calculate centered popup position
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Converts one styled display line into a ratatui line. When a search regex
/// is given, matches inside each span get `search_style` patched on top.
pub fn display_line_to_line(
    line: &DisplayLine,
    tokens: &ThemeTokens,
    search_regex: Option<&regex::Regex>,
    search_style: Style,
) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    for span in &line.spans {
        let text = line.span_text(span);
        let style = tokens.style_for(span.tag);
        if let Some(regex) = search_regex {
            spans.extend(highlight_matches(text, style, search_style, regex));
        } else {
            spans.push(Span::styled(text.to_string(), style));
        }
    }

    if spans.is_empty() {
        spans.push(Span::raw(line.text.clone()));
    }

    Line::from(spans)
}

fn highlight_matches(
    text: &str,
    base_style: Style,
    search_style: Style,
    regex: &regex::Regex,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for mat in regex.find_iter(text) {
        if mat.start() > last {
            spans.push(Span::styled(
                text[last..mat.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[mat.start()..mat.end()].to_string(),
            base_style.patch(search_style),
        ));
        last = mat.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_string(), base_style));
    }
    if spans.is_empty() {
        spans.push(Span::styled(text.to_string(), base_style));
    }
    spans
}

/// Case-insensitive literal-match regex for the active search query.
pub fn search_regex(query: &str) -> Option<regex::Regex> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    regex::RegexBuilder::new(&regex::escape(trimmed))
        .case_insensitive(true)
        .build()
        .ok()
}

pub fn fmt_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        "-".to_string()
    } else {
        keys.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::{display_line_to_line, fmt_keys, search_regex};
    use crate::config::Theme;
    use crate::text::stylize;
    use crate::ui::theme::ThemeTokens;
    use ratatui::style::{Modifier, Style};

    #[test]
    fn styled_spans_become_ratatui_spans() {
        let tokens = ThemeTokens::from_theme(&Theme::default());
        let display = stylize("some **bold** text");
        let line = display_line_to_line(&display, &tokens, None, Style::default());

        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "bold");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn search_matches_are_patched_on_top() {
        let tokens = ThemeTokens::from_theme(&Theme::default());
        let display = stylize("find the needle here");
        let regex = search_regex("NEEDLE").unwrap();
        let highlight = Style::default().add_modifier(Modifier::REVERSED);
        let line = display_line_to_line(&display, &tokens, Some(&regex), highlight);

        let hit = line
            .spans
            .iter()
            .find(|s| s.content == "needle")
            .expect("needle span");
        assert!(hit.style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn blank_query_yields_no_regex() {
        assert!(search_regex("   ").is_none());
        assert!(search_regex("a.b").unwrap().is_match("A.B"));
        assert!(!search_regex("a.b").unwrap().is_match("axb"));
    }

    #[test]
    fn key_lists_format_compactly() {
        assert_eq!(fmt_keys(&[]), "-");
        assert_eq!(
            fmt_keys(&["k".to_string(), "up".to_string()]),
            "k, up"
        );
    }
}
