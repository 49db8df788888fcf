use crate::config::Config;
use crate::models::{Entry, EntryDraft, EntrySummary, InputEvent, parse_tag_field};
use crate::repo::{EntryRepository, ListFilter, RepoError};
use crate::text::{Editor, EditorInput, Viewport, render};
use chrono::{DateTime, Duration, Local};
use log::{info, warn};

pub const MAIN_MENU_ITEMS: [&str; 4] = ["View Entries", "New Entry", "Search", "Exit"];

const TOAST_SECONDS: i64 = 3;

pub struct ListScreen {
    pub entries: Vec<EntrySummary>,
    pub selected: usize,
    pub page: usize,
    pub total: usize,
}

impl ListScreen {
    pub fn selected_entry(&self) -> Option<&EntrySummary> {
        self.entries.get(self.selected)
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        self.total.div_ceil(page_size).max(1)
    }
}

pub struct ViewScreen {
    pub entry: Entry,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Tags,
    Body,
}

impl EditField {
    fn next(self) -> Self {
        match self {
            EditField::Title => EditField::Tags,
            EditField::Tags => EditField::Body,
            EditField::Body => EditField::Title,
        }
    }
}

pub struct EditScreen {
    /// `None` for a new entry, `Some` when editing an existing one.
    pub entry_id: Option<i64>,
    pub title: String,
    pub tags: String,
    pub body: Editor,
    pub field: EditField,
}

pub struct FilterScreen {
    pub tags: Vec<(String, usize)>,
    pub selected: usize,
}

pub struct SearchScreen {
    pub query: String,
}

pub enum Screen {
    MainMenu { selected: usize },
    List(ListScreen),
    View(ViewScreen),
    Edit(EditScreen),
    Filter(FilterScreen),
    Search(SearchScreen),
}

pub struct App {
    pub config: Config,
    pub repo: Box<dyn EntryRepository>,
    pub screen: Screen,
    pub should_quit: bool,

    pub show_help_popup: bool,
    pub show_discard_popup: bool,
    pub delete_target: Option<(i64, String)>,

    pub filter: ListFilter,
    last_list_page: usize,
    pub toast_message: Option<String>,
    pub toast_expiry: Option<DateTime<Local>>,

    // Cached viewport geometry, set during render.
    pub list_viewport_height: usize,
    pub view_content_width: usize,
    pub view_content_height: usize,
}

impl App {
    pub fn new(config: Config, repo: Box<dyn EntryRepository>) -> App {
        App {
            config,
            repo,
            screen: Screen::MainMenu { selected: 0 },
            should_quit: false,
            show_help_popup: false,
            show_discard_popup: false,
            delete_target: None,
            filter: ListFilter::default(),
            last_list_page: 0,
            toast_message: None,
            toast_expiry: None,
            list_viewport_height: 0,
            view_content_width: 80,
            view_content_height: 24,
        }
    }

    pub fn set_toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_expiry = Some(Local::now() + Duration::seconds(TOAST_SECONDS));
    }

    /// Called on every poll tick; expires the toast.
    pub fn tick(&mut self) {
        if let Some(expiry) = self.toast_expiry {
            if Local::now() >= expiry {
                self.toast_message = None;
                self.toast_expiry = None;
            }
        }
    }

    pub fn page_size(&self) -> usize {
        self.config.ui.page_size.max(1)
    }

    /// Whether keystrokes should be delivered as raw characters rather than
    /// resolved against navigation bindings.
    pub fn wants_text_input(&self) -> bool {
        matches!(self.screen, Screen::Edit(_) | Screen::Search(_))
    }

    /// Routes one input event. Popups take priority over the active screen.
    pub fn handle(&mut self, event: InputEvent) {
        if event == InputEvent::Quit && !matches!(self.screen, Screen::Edit(_)) {
            self.should_quit = true;
            return;
        }

        if self.show_help_popup {
            self.handle_help_popup(event);
            return;
        }
        if self.delete_target.is_some() {
            self.handle_delete_popup(event);
            return;
        }
        if self.show_discard_popup {
            self.handle_discard_popup(event);
            return;
        }

        if event == InputEvent::Help && !self.wants_text_input() {
            self.show_help_popup = true;
            return;
        }
        if event == InputEvent::ToggleTheme {
            let next = self.config.theme_preset().next();
            self.config.apply_preset(next);
            self.set_toast(format!("Theme: {}", next.name()));
            return;
        }

        match &mut self.screen {
            Screen::MainMenu { .. } => self.handle_main_menu(event),
            Screen::List(_) => self.handle_list(event),
            Screen::View(_) => self.handle_view(event),
            Screen::Edit(_) => self.handle_edit(event),
            Screen::Filter(_) => self.handle_filter(event),
            Screen::Search(_) => self.handle_search(event),
        }
    }

    fn handle_help_popup(&mut self, event: InputEvent) {
        if matches!(event, InputEvent::Escape | InputEvent::Help | InputEvent::Enter) {
            self.show_help_popup = false;
        }
    }

    fn handle_delete_popup(&mut self, event: InputEvent) {
        match event {
            InputEvent::Enter | InputEvent::Char('y') | InputEvent::Char('Y') => {
                if let Some((id, _)) = self.delete_target.take() {
                    self.apply_delete(id);
                }
            }
            InputEvent::Escape | InputEvent::Char('n') | InputEvent::Char('N') => {
                self.delete_target = None;
            }
            _ => {}
        }
    }

    fn handle_discard_popup(&mut self, event: InputEvent) {
        match event {
            InputEvent::Enter | InputEvent::Char('y') | InputEvent::Char('Y') => {
                self.show_discard_popup = false;
                self.cancel_editor();
            }
            InputEvent::Escape | InputEvent::Char('n') | InputEvent::Char('N') => {
                self.show_discard_popup = false;
            }
            _ => {}
        }
    }

    fn handle_main_menu(&mut self, event: InputEvent) {
        let Screen::MainMenu { selected } = &mut self.screen else {
            return;
        };
        match event {
            InputEvent::Up => *selected = selected.saturating_sub(1),
            InputEvent::Down => {
                *selected = (*selected + 1).min(MAIN_MENU_ITEMS.len() - 1);
            }
            InputEvent::Enter => match *selected {
                0 => self.open_list(0),
                1 => self.open_editor(None),
                2 => self.screen = Screen::Search(SearchScreen { query: String::new() }),
                _ => self.should_quit = true,
            },
            _ => {}
        }
    }

    fn handle_list(&mut self, event: InputEvent) {
        match event {
            InputEvent::Up => {
                if let Screen::List(list) = &mut self.screen {
                    list.selected = list.selected.saturating_sub(1);
                }
            }
            InputEvent::Down => {
                if let Screen::List(list) = &mut self.screen {
                    if list.selected + 1 < list.entries.len() {
                        list.selected += 1;
                    }
                }
            }
            InputEvent::Left | InputEvent::PageUp => {
                if let Screen::List(list) = &self.screen {
                    if list.page > 0 {
                        let page = list.page - 1;
                        self.open_list(page);
                    }
                }
            }
            InputEvent::Right | InputEvent::PageDown => {
                if let Screen::List(list) = &self.screen {
                    let last = list.page_count(self.page_size()) - 1;
                    if list.page < last {
                        let page = list.page + 1;
                        self.open_list(page);
                    }
                }
            }
            InputEvent::Enter => {
                if let Screen::List(list) = &self.screen {
                    if let Some(summary) = list.selected_entry() {
                        let id = summary.id;
                        self.open_view(id);
                    }
                }
            }
            InputEvent::NewEntry => self.open_editor(None),
            InputEvent::EditEntry => {
                if let Screen::List(list) = &self.screen {
                    if let Some(summary) = list.selected_entry() {
                        let id = summary.id;
                        self.open_editor(Some(id));
                    }
                }
            }
            InputEvent::DeleteEntry => {
                if let Screen::List(list) = &self.screen {
                    if let Some(summary) = list.selected_entry() {
                        self.delete_target = Some((summary.id, summary.title.clone()));
                    }
                }
            }
            InputEvent::Search => {
                self.screen = Screen::Search(SearchScreen {
                    query: self.filter.query.clone().unwrap_or_default(),
                });
            }
            InputEvent::Filter => self.open_filter(),
            InputEvent::Export => {
                if let Screen::List(list) = &self.screen {
                    if let Some(summary) = list.selected_entry() {
                        let id = summary.id;
                        self.export_entry(id);
                    }
                }
            }
            InputEvent::Escape => {
                if !self.filter.is_empty() {
                    self.filter = ListFilter::default();
                    self.set_toast("Filter cleared");
                    self.open_list(0);
                } else {
                    self.screen = Screen::MainMenu { selected: 0 };
                }
            }
            _ => {}
        }
    }

    fn handle_view(&mut self, event: InputEvent) {
        match event {
            InputEvent::Up => {
                if let Screen::View(view) = &mut self.screen {
                    view.viewport.scroll_by(-1);
                }
            }
            InputEvent::Down => {
                if let Screen::View(view) = &mut self.screen {
                    view.viewport.scroll_by(1);
                }
            }
            InputEvent::PageUp => {
                if let Screen::View(view) = &mut self.screen {
                    view.viewport.page_up();
                }
            }
            InputEvent::PageDown => {
                if let Screen::View(view) = &mut self.screen {
                    view.viewport.page_down();
                }
            }
            InputEvent::Home => {
                if let Screen::View(view) = &mut self.screen {
                    view.viewport.scroll_to_top();
                }
            }
            InputEvent::End => {
                if let Screen::View(view) = &mut self.screen {
                    view.viewport.scroll_to_bottom();
                }
            }
            InputEvent::EditEntry => {
                if let Screen::View(view) = &self.screen {
                    let id = view.entry.id;
                    self.open_editor(Some(id));
                }
            }
            InputEvent::DeleteEntry => {
                if let Screen::View(view) = &self.screen {
                    self.delete_target = Some((view.entry.id, view.entry.title.clone()));
                }
            }
            InputEvent::Export => {
                if let Screen::View(view) = &self.screen {
                    let id = view.entry.id;
                    self.export_entry(id);
                }
            }
            InputEvent::Escape => {
                let page = self.last_list_page;
                self.open_list(page);
            }
            _ => {}
        }
    }

    fn handle_edit(&mut self, event: InputEvent) {
        match event {
            InputEvent::Commit => {
                self.commit_editor();
                return;
            }
            InputEvent::Escape => {
                let dirty = match &self.screen {
                    Screen::Edit(edit) => edit.body.is_dirty() || self.title_or_tags_touched(edit),
                    _ => false,
                };
                if dirty {
                    self.show_discard_popup = true;
                } else {
                    self.cancel_editor();
                }
                return;
            }
            _ => {}
        }

        let Screen::Edit(edit) = &mut self.screen else {
            return;
        };

        if event == InputEvent::Tab {
            edit.field = edit.field.next();
            return;
        }

        match edit.field {
            EditField::Body => {
                let input = match event {
                    InputEvent::Char(c) => Some(EditorInput::Char(c)),
                    InputEvent::Enter => Some(EditorInput::Newline),
                    InputEvent::Backspace => Some(EditorInput::Backspace),
                    InputEvent::Left => Some(EditorInput::Left),
                    InputEvent::Right => Some(EditorInput::Right),
                    InputEvent::Up => Some(EditorInput::Up),
                    InputEvent::Down => Some(EditorInput::Down),
                    InputEvent::Home => Some(EditorInput::Home),
                    InputEvent::End => Some(EditorInput::End),
                    _ => None,
                };
                if let Some(input) = input {
                    if edit.body.handle(input).is_err() {
                        warn!("editor input after close was ignored");
                    }
                }
            }
            EditField::Title => match event {
                InputEvent::Char(c) => edit.title.push(c),
                InputEvent::Backspace => {
                    edit.title.pop();
                }
                _ => {}
            },
            EditField::Tags => match event {
                InputEvent::Char(c) => edit.tags.push(c),
                InputEvent::Backspace => {
                    edit.tags.pop();
                }
                _ => {}
            },
        }
    }

    fn handle_filter(&mut self, event: InputEvent) {
        match event {
            InputEvent::Up => {
                if let Screen::Filter(filter) = &mut self.screen {
                    filter.selected = filter.selected.saturating_sub(1);
                }
            }
            InputEvent::Down => {
                if let Screen::Filter(filter) = &mut self.screen {
                    if filter.selected + 1 < filter.tags.len() {
                        filter.selected += 1;
                    }
                }
            }
            InputEvent::Enter => {
                let picked = match &self.screen {
                    Screen::Filter(filter) => filter
                        .tags
                        .get(filter.selected)
                        .map(|(tag, _)| tag.clone()),
                    _ => return,
                };
                if let Some(tag) = picked {
                    self.set_toast(format!("Filtering by #{tag}"));
                    self.filter.tag = Some(tag);
                }
                self.open_list(0);
            }
            InputEvent::Escape => {
                self.filter.tag = None;
                self.open_list(0);
            }
            _ => {}
        }
    }

    fn handle_search(&mut self, event: InputEvent) {
        match event {
            InputEvent::Char(c) => {
                if let Screen::Search(search) = &mut self.screen {
                    search.query.push(c);
                }
            }
            InputEvent::Backspace => {
                if let Screen::Search(search) = &mut self.screen {
                    search.query.pop();
                }
            }
            // The configured clear binding arrives as Home.
            InputEvent::Home => {
                if let Screen::Search(search) = &mut self.screen {
                    search.query.clear();
                }
            }
            InputEvent::Enter => {
                if let Screen::Search(search) = &self.screen {
                    let query = search.query.trim().to_string();
                    self.filter.query = if query.is_empty() { None } else { Some(query) };
                    self.open_list(0);
                }
            }
            InputEvent::Escape => {
                self.filter.query = None;
                self.open_list(0);
            }
            _ => {}
        }
    }

    pub fn open_list(&mut self, page: usize) {
        let page_size = self.page_size();
        match self.load_page(page, page_size) {
            Ok(list) => {
                self.last_list_page = list.page;
                self.screen = Screen::List(list);
            }
            Err(err) => self.report_error("load entries", err),
        }
    }

    fn load_page(&mut self, page: usize, page_size: usize) -> Result<ListScreen, RepoError> {
        let total = self.repo.count(&self.filter)?;
        let last_page = total.div_ceil(page_size).max(1) - 1;
        let page = page.min(last_page);
        let entries = self.repo.list(page, page_size, &self.filter)?;
        Ok(ListScreen {
            entries,
            selected: 0,
            page,
            total,
        })
    }

    pub fn open_view(&mut self, id: i64) {
        match self.repo.load(id) {
            Ok(entry) => {
                let mut viewport = Viewport::new(self.view_content_height);
                viewport.set_lines(render(&entry.content, self.view_content_width.max(1)));
                self.screen = Screen::View(ViewScreen { entry, viewport });
            }
            Err(err) => self.report_error("open entry", err),
        }
    }

    pub fn open_editor(&mut self, id: Option<i64>) {
        match id {
            None => {
                self.screen = Screen::Edit(EditScreen {
                    entry_id: None,
                    title: String::new(),
                    tags: String::new(),
                    body: Editor::new(),
                    field: EditField::Title,
                });
            }
            Some(id) => match self.repo.load(id) {
                Ok(entry) => {
                    self.screen = Screen::Edit(EditScreen {
                        entry_id: Some(entry.id),
                        title: entry.title,
                        tags: entry.tags.join(", "),
                        body: Editor::from_text(&entry.content),
                        field: EditField::Body,
                    });
                }
                Err(err) => self.report_error("edit entry", err),
            },
        }
    }

    fn open_filter(&mut self) {
        match self.repo.all_tags() {
            Ok(tags) => {
                if tags.is_empty() {
                    self.set_toast("No tags yet");
                } else {
                    self.screen = Screen::Filter(FilterScreen { tags, selected: 0 });
                }
            }
            Err(err) => self.report_error("list tags", err),
        }
    }

    /// Commits the composer: the buffer is handed over exactly once, then the
    /// editor is closed.
    fn commit_editor(&mut self) {
        let Screen::Edit(edit) = &mut self.screen else {
            return;
        };

        let content = match edit.body.commit() {
            Ok(content) => content,
            Err(_) => {
                warn!("commit on a closed editor was ignored");
                return;
            }
        };

        let title = edit.title.trim().to_string();
        let tags = parse_tag_field(&edit.tags);
        let entry_id = edit.entry_id;

        let result = match entry_id {
            None => self.repo.save(&EntryDraft {
                title,
                content,
                tags,
            }),
            Some(id) => match self.repo.load(id) {
                Ok(mut entry) => {
                    entry.title = title;
                    entry.content = content;
                    entry.tags = tags;
                    self.repo.update(&entry).map(|_| id)
                }
                Err(err) => Err(err),
            },
        };

        match result {
            Ok(id) => {
                info!("entry {id} committed");
                self.set_toast("Entry saved");
                self.open_view(id);
            }
            Err(RepoError::Validation(message)) => {
                // Keep the buffer; reopen the composer so nothing is lost.
                // The reopened editor stays dirty so Escape still confirms.
                self.set_toast(message);
                if let Screen::Edit(edit) = &mut self.screen {
                    edit.body = Editor::from_unsaved(&edit.body.contents());
                    edit.field = EditField::Title;
                }
            }
            Err(err) => self.report_error("save entry", err),
        }
    }

    /// Cancels the composer. The repository is never touched.
    fn cancel_editor(&mut self) {
        if let Screen::Edit(edit) = &mut self.screen {
            let _ = edit.body.cancel();
            let entry_id = edit.entry_id;
            match entry_id {
                Some(id) => self.open_view(id),
                None => self.open_list(0),
            }
        }
    }

    fn apply_delete(&mut self, id: i64) {
        match self.repo.delete(id) {
            Ok(()) => {
                self.set_toast("Entry deleted");
                let page = match &self.screen {
                    Screen::List(list) => list.page,
                    _ => 0,
                };
                self.open_list(page);
            }
            Err(err) => self.report_error("delete entry", err),
        }
    }

    fn export_entry(&mut self, id: i64) {
        let path = self.config.data.export_dir.join(format!("entry-{id}.md"));
        match self.repo.export(id, &path) {
            Ok(()) => self.set_toast(format!("Exported to {}", path.display())),
            Err(err) => self.report_error("export entry", err),
        }
    }

    fn title_or_tags_touched(&self, edit: &EditScreen) -> bool {
        match edit.entry_id {
            None => !edit.title.is_empty() || !edit.tags.is_empty(),
            // For existing entries the body dirty flag is the signal; title
            // and tags edits are cheap to redo.
            Some(_) => false,
        }
    }

    fn report_error(&mut self, action: &str, err: RepoError) {
        warn!("failed to {action}: {err}");
        self.set_toast(format!("Could not {action}: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::{App, EditField, Screen};
    use crate::config::Config;
    use crate::models::{Entry, EntryDraft, EntrySummary, InputEvent};
    use crate::repo::{EntryRepository, ListFilter, RepoError, RepoResult};
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    #[derive(Default)]
    struct RepoLog {
        saves: Vec<EntryDraft>,
        updates: Vec<Entry>,
        deletes: Vec<i64>,
    }

    struct FakeRepo {
        entries: Vec<Entry>,
        log: Rc<RefCell<RepoLog>>,
    }

    impl FakeRepo {
        fn new(entries: Vec<Entry>) -> (Self, Rc<RefCell<RepoLog>>) {
            let log = Rc::new(RefCell::new(RepoLog::default()));
            (
                Self {
                    entries,
                    log: Rc::clone(&log),
                },
                log,
            )
        }

        fn matches(entry: &Entry, filter: &ListFilter) -> bool {
            if let Some(tag) = &filter.tag {
                if !entry.tags.iter().any(|t| t == tag) {
                    return false;
                }
            }
            if let Some(query) = &filter.query {
                let q = query.to_lowercase();
                if !entry.title.to_lowercase().contains(&q)
                    && !entry.content.to_lowercase().contains(&q)
                {
                    return false;
                }
            }
            true
        }
    }

    impl EntryRepository for FakeRepo {
        fn load(&self, id: i64) -> RepoResult<Entry> {
            self.entries
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or(RepoError::NotFound(id))
        }

        fn list(
            &self,
            page: usize,
            page_size: usize,
            filter: &ListFilter,
        ) -> RepoResult<Vec<EntrySummary>> {
            Ok(self
                .entries
                .iter()
                .filter(|e| Self::matches(e, filter))
                .skip(page * page_size)
                .take(page_size)
                .map(|e| EntrySummary {
                    id: e.id,
                    title: e.title.clone(),
                    tags: e.tags.clone(),
                    created_at: e.created_at.clone(),
                })
                .collect())
        }

        fn count(&self, filter: &ListFilter) -> RepoResult<usize> {
            Ok(self
                .entries
                .iter()
                .filter(|e| Self::matches(e, filter))
                .count())
        }

        fn save(&mut self, draft: &EntryDraft) -> RepoResult<i64> {
            if draft.title.trim().is_empty() {
                return Err(RepoError::Validation("title must not be empty".to_string()));
            }
            let id = self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
            self.entries.push(Entry {
                id,
                title: draft.title.clone(),
                content: draft.content.clone(),
                tags: draft.tags.clone(),
                created_at: "2026-01-01 00:00:00".to_string(),
            });
            self.log.borrow_mut().saves.push(draft.clone());
            Ok(id)
        }

        fn update(&mut self, entry: &Entry) -> RepoResult<()> {
            let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry.id) else {
                return Err(RepoError::NotFound(entry.id));
            };
            *slot = entry.clone();
            self.log.borrow_mut().updates.push(entry.clone());
            Ok(())
        }

        fn delete(&mut self, id: i64) -> RepoResult<()> {
            let before = self.entries.len();
            self.entries.retain(|e| e.id != id);
            if self.entries.len() == before {
                return Err(RepoError::NotFound(id));
            }
            self.log.borrow_mut().deletes.push(id);
            Ok(())
        }

        fn all_tags(&self) -> RepoResult<Vec<(String, usize)>> {
            let mut tags: Vec<(String, usize)> = Vec::new();
            for entry in &self.entries {
                for tag in &entry.tags {
                    match tags.iter_mut().find(|(name, _)| name == tag) {
                        Some((_, count)) => *count += 1,
                        None => tags.push((tag.clone(), 1)),
                    }
                }
            }
            tags.sort();
            Ok(tags)
        }

        fn export(&self, id: i64, _path: &Path) -> RepoResult<()> {
            self.load(id).map(|_| ())
        }
    }

    fn entry(id: i64, title: &str, tags: &[&str]) -> Entry {
        Entry {
            id,
            title: title.to_string(),
            content: format!("content of {title}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    fn app_with(entries: Vec<Entry>) -> (App, Rc<RefCell<RepoLog>>) {
        let (repo, log) = FakeRepo::new(entries);
        (App::new(Config::default(), Box::new(repo)), log)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(InputEvent::Char(c));
        }
    }

    #[test]
    fn main_menu_opens_the_list() {
        let (mut app, _) = app_with(vec![entry(1, "First", &[])]);
        app.handle(InputEvent::Enter);

        let Screen::List(list) = &app.screen else {
            panic!("expected list screen");
        };
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.total, 1);
    }

    #[test]
    fn list_enter_opens_the_selected_entry() {
        let (mut app, _) = app_with(vec![entry(1, "First", &[]), entry(2, "Second", &[])]);
        app.open_list(0);
        app.handle(InputEvent::Down);
        app.handle(InputEvent::Enter);

        let Screen::View(view) = &app.screen else {
            panic!("expected view screen");
        };
        assert_eq!(view.entry.title, "Second");
    }

    #[test]
    fn new_entry_commit_saves_through_the_repository() {
        let (mut app, log) = app_with(Vec::new());
        app.open_editor(None);

        type_str(&mut app, "My title");
        app.handle(InputEvent::Tab);
        type_str(&mut app, "work, Ideas");
        app.handle(InputEvent::Tab);
        type_str(&mut app, "hello");
        app.handle(InputEvent::Commit);

        let log = log.borrow();
        assert_eq!(log.saves.len(), 1);
        assert_eq!(log.saves[0].title, "My title");
        assert_eq!(log.saves[0].content, "hello");
        assert_eq!(log.saves[0].tags, ["ideas", "work"]);
        assert!(matches!(app.screen, Screen::View(_)));
    }

    #[test]
    fn cancel_never_reaches_the_repository() {
        let (mut app, log) = app_with(Vec::new());
        app.open_editor(None);

        type_str(&mut app, "draft title");
        app.handle(InputEvent::Tab);
        app.handle(InputEvent::Tab);
        type_str(&mut app, "draft body");
        app.handle(InputEvent::Escape);
        // Confirm the discard.
        app.handle(InputEvent::Enter);

        let log = log.borrow();
        assert!(log.saves.is_empty());
        assert!(log.updates.is_empty());
        assert!(matches!(app.screen, Screen::List(_)));
    }

    #[test]
    fn clean_editor_escape_skips_the_discard_popup() {
        let (mut app, _) = app_with(Vec::new());
        app.open_editor(None);
        app.handle(InputEvent::Escape);

        assert!(!app.show_discard_popup);
        assert!(matches!(app.screen, Screen::List(_)));
    }

    #[test]
    fn empty_title_keeps_the_composer_buffer() {
        let (mut app, log) = app_with(Vec::new());
        app.open_editor(None);

        app.handle(InputEvent::Tab);
        app.handle(InputEvent::Tab);
        type_str(&mut app, "body without title");
        app.handle(InputEvent::Commit);

        assert!(log.borrow().saves.is_empty());
        let Screen::Edit(edit) = &app.screen else {
            panic!("expected the composer to stay open");
        };
        assert_eq!(edit.body.contents(), "body without title");
        assert_eq!(edit.field, EditField::Title);
        assert!(app.toast_message.is_some());
    }

    #[test]
    fn escape_after_failed_commit_still_confirms_discard() {
        let (mut app, log) = app_with(Vec::new());
        app.open_editor(None);

        app.handle(InputEvent::Tab);
        app.handle(InputEvent::Tab);
        type_str(&mut app, "precious body text");
        app.handle(InputEvent::Commit);
        assert!(log.borrow().saves.is_empty());

        app.handle(InputEvent::Escape);
        assert!(app.show_discard_popup);
        assert!(matches!(app.screen, Screen::Edit(_)));

        // Keep editing; the buffer survives.
        app.handle(InputEvent::Escape);
        let Screen::Edit(edit) = &app.screen else {
            panic!("expected the composer to stay open");
        };
        assert_eq!(edit.body.contents(), "precious body text");
    }

    #[test]
    fn editing_an_entry_updates_it() {
        let (mut app, log) = app_with(vec![entry(7, "Old", &["old"])]);
        app.open_editor(Some(7));

        let Screen::Edit(edit) = &mut app.screen else {
            panic!("expected edit screen");
        };
        assert_eq!(edit.title, "Old");
        assert_eq!(edit.field, EditField::Body);

        app.handle(InputEvent::End);
        type_str(&mut app, "!");
        app.handle(InputEvent::Commit);

        let log = log.borrow();
        assert_eq!(log.updates.len(), 1);
        assert!(log.updates[0].content.ends_with('!'));
    }

    #[test]
    fn delete_requires_confirmation() {
        let (mut app, log) = app_with(vec![entry(1, "Doomed", &[])]);
        app.open_list(0);
        app.handle(InputEvent::DeleteEntry);
        assert!(app.delete_target.is_some());

        app.handle(InputEvent::Escape);
        assert!(app.delete_target.is_none());
        assert!(log.borrow().deletes.is_empty());

        app.handle(InputEvent::DeleteEntry);
        app.handle(InputEvent::Enter);
        assert_eq!(log.borrow().deletes, [1]);
    }

    #[test]
    fn search_submits_a_query_filter() {
        let (mut app, _) = app_with(vec![
            entry(1, "Groceries", &[]),
            entry(2, "Workout", &[]),
        ]);
        app.open_list(0);
        app.handle(InputEvent::Search);
        type_str(&mut app, "grocer");
        app.handle(InputEvent::Enter);

        let Screen::List(list) = &app.screen else {
            panic!("expected list screen");
        };
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].title, "Groceries");
        assert_eq!(app.filter.query.as_deref(), Some("grocer"));
    }

    #[test]
    fn filter_picks_a_tag_and_escape_clears_it() {
        let (mut app, _) = app_with(vec![
            entry(1, "A", &["work"]),
            entry(2, "B", &["life"]),
        ]);
        app.open_list(0);
        app.handle(InputEvent::Filter);
        assert!(matches!(app.screen, Screen::Filter(_)));

        // Tags are sorted: life, work. Select "work".
        app.handle(InputEvent::Down);
        app.handle(InputEvent::Enter);

        let Screen::List(list) = &app.screen else {
            panic!("expected list screen");
        };
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].title, "A");

        app.handle(InputEvent::Escape);
        let Screen::List(list) = &app.screen else {
            panic!("expected list screen");
        };
        assert_eq!(list.entries.len(), 2);
    }

    #[test]
    fn pagination_moves_between_pages() {
        let entries: Vec<_> = (1..=25).map(|i| entry(i, &format!("Entry {i}"), &[])).collect();
        let (mut app, _) = app_with(entries);
        app.open_list(0);

        app.handle(InputEvent::Right);
        let Screen::List(list) = &app.screen else {
            panic!("expected list screen");
        };
        assert_eq!(list.page, 1);
        assert_eq!(list.entries.len(), 10);

        app.handle(InputEvent::Right);
        app.handle(InputEvent::Right);
        let Screen::List(list) = &app.screen else {
            panic!("expected list screen");
        };
        // Page is clamped to the last page.
        assert_eq!(list.page, 2);
        assert_eq!(list.entries.len(), 5);
    }

    #[test]
    fn missing_entry_surfaces_a_toast_not_a_crash() {
        let (mut app, _) = app_with(Vec::new());
        app.open_view(99);
        assert!(app.toast_message.is_some());
        assert!(matches!(app.screen, Screen::MainMenu { .. }));
    }

    #[test]
    fn quit_is_ignored_while_composing() {
        let (mut app, _) = app_with(Vec::new());
        app.open_editor(None);
        app.handle(InputEvent::Quit);
        assert!(!app.should_quit);

        app.handle(InputEvent::Escape);
        app.handle(InputEvent::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn theme_toggle_flips_the_preset() {
        use crate::config::ThemePreset;
        let (mut app, _) = app_with(Vec::new());
        app.handle(InputEvent::ToggleTheme);
        assert_eq!(app.config.theme_preset(), ThemePreset::Light);
        app.handle(InputEvent::ToggleTheme);
        assert_eq!(app.config.theme_preset(), ThemePreset::Dark);
    }
}
