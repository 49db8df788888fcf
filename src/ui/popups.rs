use crate::app::{App, Screen};
use crate::ui::components::{centered_rect, fmt_keys};
use crate::ui::theme::ThemeTokens;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

pub fn draw_delete_popup(f: &mut Frame, app: &App, tokens: &ThemeTokens) {
    let Some((_, title)) = &app.delete_target else {
        return;
    };

    let block = Block::default()
        .title(" Delete entry? ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_editing));
    let area = centered_rect(60, 20, f.area());
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(inner);

    let body = Paragraph::new(format!("\"{title}\" will be deleted permanently."))
        .wrap(Wrap { trim: true });
    f.render_widget(body, sections[0]);

    let footer = Paragraph::new("[Enter/Y] Delete    [Esc/N] Keep")
        .style(Style::default().fg(tokens.timestamp));
    f.render_widget(footer, sections[1]);
}

pub fn draw_discard_popup(f: &mut Frame, tokens: &ThemeTokens) {
    let block = Block::default()
        .title(" Discard changes? ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_editing));
    let area = centered_rect(50, 20, f.area());
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(inner);

    let body = Paragraph::new("The entry has unsaved changes.").wrap(Wrap { trim: true });
    f.render_widget(body, sections[0]);

    let footer = Paragraph::new("[Enter/Y] Discard    [Esc/N] Keep editing")
        .style(Style::default().fg(tokens.timestamp));
    f.render_widget(footer, sections[1]);
}

pub fn draw_filter_popup(f: &mut Frame, app: &App, tokens: &ThemeTokens) {
    let Screen::Filter(filter) = &app.screen else {
        return;
    };

    let title = format!(
        " Tags {}/{} · Enter: filter · Esc: clear ",
        filter.selected + 1,
        filter.tags.len()
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_search));
    let area = centered_rect(50, 60, f.area());
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = filter
        .tags
        .iter()
        .map(|(tag, count)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("#{tag}"),
                    Style::default().fg(tokens.tag).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" ({count})")),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_symbol("> ").highlight_style(
        Style::default()
            .bg(tokens.highlight_bg)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    state.select(Some(filter.selected));
    f.render_stateful_widget(list, inner, &mut state);
}

pub fn draw_help_popup(f: &mut Frame, app: &App, tokens: &ThemeTokens) {
    let kb = &app.config.keybindings;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));
    let area = centered_rect(70, 80, f.area());
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .margin(1)
        .split(inner);

    let mut lines: Vec<Line> = Vec::new();
    let section = |title: &str, entries: &[(&str, String)], lines: &mut Vec<Line>| {
        lines.push(Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(tokens.header)
                .add_modifier(Modifier::BOLD),
        )));
        for (label, keys) in entries {
            lines.push(Line::from(vec![
                Span::raw(format!("  {label:<18}")),
                Span::styled(keys.clone(), Style::default().fg(tokens.emphasis)),
            ]));
        }
        lines.push(Line::from(""));
    };

    section(
        "Global",
        &[
            ("Quit", fmt_keys(&kb.global.quit)),
            ("Help", fmt_keys(&kb.global.help)),
            ("Theme", fmt_keys(&kb.global.theme)),
        ],
        &mut lines,
    );
    section(
        "List",
        &[
            (
                "Move",
                fmt_keys(&kb.list.up) + " / " + &fmt_keys(&kb.list.down),
            ),
            (
                "Pages",
                fmt_keys(&kb.list.prev_page) + " / " + &fmt_keys(&kb.list.next_page),
            ),
            ("Open", fmt_keys(&kb.list.open)),
            ("New", fmt_keys(&kb.list.new)),
            ("Edit", fmt_keys(&kb.list.edit)),
            ("Delete", fmt_keys(&kb.list.delete)),
            ("Search", fmt_keys(&kb.list.search)),
            ("Filter by tag", fmt_keys(&kb.list.filter)),
            ("Export", fmt_keys(&kb.list.export)),
        ],
        &mut lines,
    );
    section(
        "View",
        &[
            (
                "Scroll",
                fmt_keys(&kb.view.up) + " / " + &fmt_keys(&kb.view.down),
            ),
            (
                "Page",
                fmt_keys(&kb.view.page_up) + " / " + &fmt_keys(&kb.view.page_down),
            ),
            (
                "Top / Bottom",
                fmt_keys(&kb.view.top) + " / " + &fmt_keys(&kb.view.bottom),
            ),
            ("Edit", fmt_keys(&kb.view.edit)),
        ],
        &mut lines,
    );
    section(
        "Editor",
        &[
            ("Save", fmt_keys(&kb.editor.commit)),
            ("Next field", fmt_keys(&kb.editor.next_field)),
            ("Discard", fmt_keys(&kb.editor.cancel)),
        ],
        &mut lines,
    );

    f.render_widget(Paragraph::new(lines), sections[0]);

    let footer = Paragraph::new("Esc / ? close").style(Style::default().fg(tokens.timestamp));
    f.render_widget(footer, sections[1]);
}
