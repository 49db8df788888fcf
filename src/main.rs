use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::{error::Error, io};

mod app;
mod config;
mod logging;
mod models;
mod repo;
mod text;
mod ui;

use crate::config::{Config, key_match};
use crate::models::InputEvent;
use crate::repo::SqliteEntryRepository;
use app::{App, Screen};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load();

    if let Err(err) = logging::init(&logging::default_log_level(), &config.data.log_dir) {
        eprintln!("Logging disabled: {err}");
    }

    let repo = SqliteEntryRepository::open(&config.data.db_path)?;
    let mut app = App::new(config, Box::new(repo));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture,)?;

    // Keyboard enhancement flags may fail on unsupported terminals (e.g., Windows Legacy Console).
    // Errors are ignored as they don't affect app functionality.
    let _ = execute!(
        stdout,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    );

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick();

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(250))? {
            let event = event::read()?;

            if let Event::Mouse(mouse_event) = event {
                match mouse_event.kind {
                    event::MouseEventKind::ScrollUp => app.handle(InputEvent::Up),
                    event::MouseEventKind::ScrollDown => app.handle(InputEvent::Down),
                    _ => {}
                }
            }

            if let Event::Key(key) = event {
                if key.kind == KeyEventKind::Press
                    && let Some(input) = translate_key(app, key)
                {
                    app.handle(input);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Resolves a raw key press into one input event using the configured
/// bindings for the active screen. Screens that take text input only see
/// their chrome bindings (commit, cancel, field switch); every other key
/// arrives as a plain character or base navigation event.
fn translate_key(app: &App, key: event::KeyEvent) -> Option<InputEvent> {
    let kb = &app.config.keybindings;

    if key_match(&key, &kb.global.quit) {
        return Some(InputEvent::Quit);
    }

    if app.wants_text_input() {
        if matches!(app.screen, Screen::Edit(_)) {
            if key_match(&key, &kb.editor.commit) {
                return Some(InputEvent::Commit);
            }
            if key_match(&key, &kb.editor.cancel) {
                return Some(InputEvent::Escape);
            }
            if key_match(&key, &kb.editor.next_field) {
                return Some(InputEvent::Tab);
            }
        } else {
            if key_match(&key, &kb.search.submit) {
                return Some(InputEvent::Enter);
            }
            if key_match(&key, &kb.search.cancel) {
                return Some(InputEvent::Escape);
            }
            if key_match(&key, &kb.search.clear) {
                return Some(InputEvent::Home);
            }
        }
        return base_event(key);
    }

    if key_match(&key, &kb.global.help) {
        return Some(InputEvent::Help);
    }
    if key_match(&key, &kb.global.theme) {
        return Some(InputEvent::ToggleTheme);
    }
    if key_match(&key, &kb.global.back) {
        return Some(InputEvent::Escape);
    }

    // Popups consume their own confirm/cancel characters.
    if app.show_help_popup || app.show_discard_popup || app.delete_target.is_some() {
        return base_event(key);
    }

    match &app.screen {
        Screen::List(_) => {
            if key_match(&key, &kb.list.up) {
                Some(InputEvent::Up)
            } else if key_match(&key, &kb.list.down) {
                Some(InputEvent::Down)
            } else if key_match(&key, &kb.list.prev_page) {
                Some(InputEvent::PageUp)
            } else if key_match(&key, &kb.list.next_page) {
                Some(InputEvent::PageDown)
            } else if key_match(&key, &kb.list.open) {
                Some(InputEvent::Enter)
            } else if key_match(&key, &kb.list.new) {
                Some(InputEvent::NewEntry)
            } else if key_match(&key, &kb.list.edit) {
                Some(InputEvent::EditEntry)
            } else if key_match(&key, &kb.list.delete) {
                Some(InputEvent::DeleteEntry)
            } else if key_match(&key, &kb.list.search) {
                Some(InputEvent::Search)
            } else if key_match(&key, &kb.list.filter) {
                Some(InputEvent::Filter)
            } else if key_match(&key, &kb.list.export) {
                Some(InputEvent::Export)
            } else {
                base_event(key)
            }
        }
        Screen::View(_) => {
            if key_match(&key, &kb.view.up) {
                Some(InputEvent::Up)
            } else if key_match(&key, &kb.view.down) {
                Some(InputEvent::Down)
            } else if key_match(&key, &kb.view.page_up) {
                Some(InputEvent::PageUp)
            } else if key_match(&key, &kb.view.page_down) {
                Some(InputEvent::PageDown)
            } else if key_match(&key, &kb.view.top) {
                Some(InputEvent::Home)
            } else if key_match(&key, &kb.view.bottom) {
                Some(InputEvent::End)
            } else if key_match(&key, &kb.view.edit) {
                Some(InputEvent::EditEntry)
            } else if key_match(&key, &kb.view.delete) {
                Some(InputEvent::DeleteEntry)
            } else if key_match(&key, &kb.view.export) {
                Some(InputEvent::Export)
            } else {
                base_event(key)
            }
        }
        Screen::Filter(_) => {
            if key_match(&key, &kb.popup.up) {
                Some(InputEvent::Up)
            } else if key_match(&key, &kb.popup.down) {
                Some(InputEvent::Down)
            } else if key_match(&key, &kb.popup.confirm) {
                Some(InputEvent::Enter)
            } else {
                base_event(key)
            }
        }
        Screen::MainMenu { .. } | Screen::Edit(_) | Screen::Search(_) => base_event(key),
    }
}

/// Fallback mapping for keys with no configured binding on this screen.
fn base_event(key: event::KeyEvent) -> Option<InputEvent> {
    match key.code {
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        KeyCode::Up => Some(InputEvent::Up),
        KeyCode::Down => Some(InputEvent::Down),
        KeyCode::Left => Some(InputEvent::Left),
        KeyCode::Right => Some(InputEvent::Right),
        KeyCode::PageUp => Some(InputEvent::PageUp),
        KeyCode::PageDown => Some(InputEvent::PageDown),
        KeyCode::Home => Some(InputEvent::Home),
        KeyCode::End => Some(InputEvent::End),
        KeyCode::Enter => Some(InputEvent::Enter),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Tab => Some(InputEvent::Tab),
        KeyCode::Esc => Some(InputEvent::Escape),
        _ => None,
    }
}
