pub mod color_parser;
pub mod components;
pub mod popups;
pub mod theme;

use crate::app::{App, EditField, MAIN_MENU_ITEMS, Screen};
use crate::text::render;
use crate::ui::components::{centered_rect, display_line_to_line, fmt_keys, search_regex};
use crate::ui::theme::ThemeTokens;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

/// Draws one frame. Mutates the app only to cache viewport geometry and to
/// re-clamp scrolling against the current terminal size.
pub fn draw(f: &mut Frame, app: &mut App) {
    let tokens = ThemeTokens::from_theme(&app.config.theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let body = chunks[0];
    let status = chunks[1];

    match &app.screen {
        Screen::MainMenu { .. } => draw_main_menu(f, app, body, &tokens),
        Screen::List(_) => draw_list(f, app, body, &tokens),
        Screen::View(_) => draw_view(f, app, body, &tokens),
        Screen::Edit(_) => draw_edit(f, app, body, &tokens),
        Screen::Filter(_) => {
            draw_list_backdrop(f, body, &tokens);
            popups::draw_filter_popup(f, app, &tokens);
        }
        Screen::Search(_) => {
            draw_list_backdrop(f, body, &tokens);
            draw_search_input(f, app, &tokens);
        }
    }

    draw_status_bar(f, app, status, &tokens);

    if app.delete_target.is_some() {
        popups::draw_delete_popup(f, app, &tokens);
    }
    if app.show_discard_popup {
        popups::draw_discard_popup(f, &tokens);
    }
    if app.show_help_popup {
        popups::draw_help_popup(f, app, &tokens);
    }
}

fn draw_main_menu(f: &mut Frame, app: &App, area: Rect, tokens: &ThemeTokens) {
    let Screen::MainMenu { selected } = &app.screen else {
        return;
    };

    let block = Block::default()
        .title(" jotlog ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let menu_area = centered_rect(40, 50, inner);
    let items: Vec<ListItem> = MAIN_MENU_ITEMS
        .iter()
        .map(|item| ListItem::new(Line::from(*item)))
        .collect();

    let list = List::new(items).highlight_symbol("> ").highlight_style(
        Style::default()
            .bg(tokens.highlight_bg)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    state.select(Some(*selected));
    f.render_stateful_widget(list, menu_area, &mut state);
}

fn draw_list(f: &mut Frame, app: &mut App, area: Rect, tokens: &ThemeTokens) {
    let page_size = app.page_size();
    let Screen::List(list) = &app.screen else {
        return;
    };

    let mut title = format!(
        " Entries · page {}/{} · {} total ",
        list.page + 1,
        list.page_count(page_size),
        list.total
    );
    if let Some(tag) = &app.filter.tag {
        title.push_str(&format!("· #{tag} "));
    }
    if let Some(query) = &app.filter.query {
        title.push_str(&format!("· \"{query}\" "));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = list
        .entries
        .iter()
        .map(|entry| {
            let mut spans = vec![
                Span::styled(
                    entry.created_at.clone(),
                    Style::default().fg(tokens.timestamp),
                ),
                Span::raw("  "),
                Span::raw(entry.title.clone()),
            ];
            for tag in &entry.tags {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("#{tag}"),
                    Style::default().fg(tokens.tag),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let widget = List::new(items).highlight_symbol("> ").highlight_style(
        Style::default()
            .bg(tokens.highlight_bg)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    state.select(if list.entries.is_empty() {
        None
    } else {
        Some(list.selected)
    });
    f.render_stateful_widget(widget, inner, &mut state);

    if list.entries.is_empty() {
        let empty = Paragraph::new("No entries. Press n to write one.")
            .style(Style::default().fg(tokens.timestamp));
        f.render_widget(empty, inner);
    }

    app.list_viewport_height = inner.height as usize;
}

fn draw_list_backdrop(f: &mut Frame, area: Rect, tokens: &ThemeTokens) {
    let block = Block::default()
        .title(" Entries ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));
    f.render_widget(block, area);
}

fn draw_view(f: &mut Frame, app: &mut App, area: Rect, tokens: &ThemeTokens) {
    let regex = app.filter.query.as_deref().and_then(search_regex);
    let search_style = Style::default()
        .bg(tokens.highlight_bg)
        .add_modifier(Modifier::BOLD);

    let Screen::View(view) = &mut app.screen else {
        return;
    };

    let title = format!(" {} · {} ", view.entry.title, view.entry.created_at);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_default));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    let content_area = sections[0];
    let meta_area = sections[1];

    let width = content_area.width.max(1) as usize;
    let height = content_area.height as usize;

    // Re-wrap against the current terminal size; the clamp keeps the scroll
    // position stable across resizes.
    app.view_content_width = width;
    app.view_content_height = height;
    view.viewport.set_lines(render(&view.entry.content, width));
    view.viewport.set_height(height);

    let lines: Vec<Line> = view
        .viewport
        .visible()
        .iter()
        .map(|line| display_line_to_line(line, tokens, regex.as_ref(), search_style))
        .collect();
    f.render_widget(Paragraph::new(lines), content_area);

    let mut meta = Vec::new();
    for tag in &view.entry.tags {
        meta.push(Span::styled(
            format!("#{tag} "),
            Style::default().fg(tokens.tag),
        ));
    }
    meta.push(Span::styled(
        format!(
            "line {}/{}",
            view.viewport
                .offset()
                .saturating_add(1)
                .min(view.viewport.total_lines()),
            view.viewport.total_lines()
        ),
        Style::default().fg(tokens.timestamp),
    ));
    f.render_widget(Paragraph::new(Line::from(meta)), meta_area);
}

fn draw_edit(f: &mut Frame, app: &mut App, area: Rect, tokens: &ThemeTokens) {
    let Screen::Edit(edit) = &app.screen else {
        return;
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let border_for = |field: EditField| {
        if edit.field == field {
            Style::default().fg(tokens.border_editing)
        } else {
            Style::default().fg(tokens.border_default)
        }
    };

    let title_block = Block::default()
        .title(" Title ")
        .borders(Borders::ALL)
        .border_style(border_for(EditField::Title));
    let title_inner = title_block.inner(sections[0]);
    f.render_widget(title_block, sections[0]);
    f.render_widget(Paragraph::new(edit.title.as_str()), title_inner);

    let tags_block = Block::default()
        .title(" Tags (comma separated) ")
        .borders(Borders::ALL)
        .border_style(border_for(EditField::Tags));
    let tags_inner = tags_block.inner(sections[1]);
    f.render_widget(tags_block, sections[1]);
    f.render_widget(Paragraph::new(edit.tags.as_str()), tags_inner);

    let heading = if edit.entry_id.is_some() {
        " Body (editing) "
    } else {
        " Body "
    };
    let body_block = Block::default()
        .title(heading)
        .borders(Borders::ALL)
        .border_style(border_for(EditField::Body));
    let body_inner = body_block.inner(sections[2]);
    f.render_widget(body_block, sections[2]);

    let body_width = body_inner.width.max(1) as usize;
    let (rows, (cursor_row, cursor_col)) = edit.body.display(body_width);

    // Keep the cursor row on screen.
    let visible_height = body_inner.height as usize;
    let scroll = cursor_row.saturating_sub(visible_height.saturating_sub(1));
    let lines: Vec<Line> = rows
        .iter()
        .skip(scroll)
        .take(visible_height)
        .map(|row| Line::from(row.text.clone()))
        .collect();
    f.render_widget(Paragraph::new(lines), body_inner);

    match edit.field {
        EditField::Title => {
            f.set_cursor_position(Position::new(
                title_inner.x + edit.title.chars().count().min(title_inner.width as usize) as u16,
                title_inner.y,
            ));
        }
        EditField::Tags => {
            f.set_cursor_position(Position::new(
                tags_inner.x + edit.tags.chars().count().min(tags_inner.width as usize) as u16,
                tags_inner.y,
            ));
        }
        EditField::Body => {
            let row = cursor_row.saturating_sub(scroll);
            f.set_cursor_position(Position::new(
                body_inner.x + cursor_col.min(body_inner.width.saturating_sub(1) as usize) as u16,
                body_inner.y + row.min(body_inner.height.saturating_sub(1) as usize) as u16,
            ));
        }
    }
}

fn draw_search_input(f: &mut Frame, app: &App, tokens: &ThemeTokens) {
    let Screen::Search(search) = &app.screen else {
        return;
    };

    let area = centered_rect(60, 20, f.area());
    let popup = Rect {
        height: 3.min(area.height),
        ..area
    };
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tokens.border_search));
    let inner = block.inner(popup);
    f.render_widget(block, popup);
    f.render_widget(Paragraph::new(search.query.as_str()), inner);

    f.set_cursor_position(Position::new(
        inner.x + search.query.chars().count().min(inner.width as usize) as u16,
        inner.y,
    ));
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect, tokens: &ThemeTokens) {
    if let Some(message) = &app.toast_message {
        let toast = Paragraph::new(message.as_str()).style(
            Style::default()
                .fg(tokens.toast)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(toast, area);
        return;
    }

    let kb = &app.config.keybindings;
    let hint = match &app.screen {
        Screen::MainMenu { .. } => format!(
            "↑/↓ select · enter open · {} quit",
            fmt_keys(&kb.global.quit)
        ),
        Screen::List(_) => format!(
            "{} new · {} edit · {} delete · {} search · {} filter · {} export · ? help",
            fmt_keys(&kb.list.new),
            fmt_keys(&kb.list.edit),
            fmt_keys(&kb.list.delete),
            fmt_keys(&kb.list.search),
            fmt_keys(&kb.list.filter),
            fmt_keys(&kb.list.export),
        ),
        Screen::View(_) => format!(
            "{} edit · {} delete · {} export · esc back",
            fmt_keys(&kb.view.edit),
            fmt_keys(&kb.view.delete),
            fmt_keys(&kb.view.export),
        ),
        Screen::Edit(_) => format!(
            "{} save · {} switch field · {} discard",
            fmt_keys(&kb.editor.commit),
            fmt_keys(&kb.editor.next_field),
            fmt_keys(&kb.editor.cancel),
        ),
        Screen::Filter(_) => "↑/↓ select · enter apply · esc clear filter".to_string(),
        Screen::Search(_) => "enter search · esc clear".to_string(),
    };

    let bar = Paragraph::new(hint).style(Style::default().fg(tokens.timestamp));
    f.render_widget(bar, area);
}
