use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn key_match(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|binding| is_match(key, binding))
}

fn is_match(key: &KeyEvent, binding: &str) -> bool {
    let binding = binding.to_lowercase();
    let parts: Vec<&str> = binding.split('+').collect();

    let mut target_modifiers = KeyModifiers::NONE;
    let mut target_code = KeyCode::Null;

    for part in parts {
        match part {
            "ctrl" => target_modifiers.insert(KeyModifiers::CONTROL),
            "opt" | "alt" => target_modifiers.insert(KeyModifiers::ALT),
            "shift" => target_modifiers.insert(KeyModifiers::SHIFT),
            "enter" => target_code = KeyCode::Enter,
            "esc" => target_code = KeyCode::Esc,
            "backspace" => target_code = KeyCode::Backspace,
            "tab" => target_code = KeyCode::Tab,
            "backtab" => target_code = KeyCode::BackTab,
            "space" => target_code = KeyCode::Char(' '),
            "up" => target_code = KeyCode::Up,
            "down" => target_code = KeyCode::Down,
            "left" => target_code = KeyCode::Left,
            "right" => target_code = KeyCode::Right,
            "home" => target_code = KeyCode::Home,
            "end" => target_code = KeyCode::End,
            "pageup" => target_code = KeyCode::PageUp,
            "pagedown" => target_code = KeyCode::PageDown,
            "delete" => target_code = KeyCode::Delete,
            "insert" => target_code = KeyCode::Insert,
            c if c.chars().count() == 1 => {
                if let Some(ch) = c.chars().next() {
                    target_code = KeyCode::Char(ch);
                }
            }
            _ => {}
        }
    }

    // KeyCode match (case-insensitive for Char).
    let code_matches = if key.code == target_code {
        true
    } else if let (KeyCode::Char(c), KeyCode::Char(tc)) = (key.code, target_code) {
        c.to_lowercase().next() == Some(tc)
    } else {
        false
    };
    if !code_matches {
        return false;
    }

    // Modifier match:
    // - Enter must match modifiers exactly so `enter` and `shift+enter` can coexist.
    // - For other keys, ignore Shift unless explicitly requested (helps BackTab and char keys like '?').
    if target_code == KeyCode::Enter {
        return key.modifiers == target_modifiers;
    }

    let mut key_mods = key.modifiers;
    let mut target_mods = target_modifiers;

    if !target_mods.contains(KeyModifiers::SHIFT) {
        key_mods.remove(KeyModifiers::SHIFT);
    }

    if !target_mods.contains(KeyModifiers::SHIFT) {
        target_mods.remove(KeyModifiers::SHIFT);
    }

    key_mods.contains(target_mods)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "meghendra", "jotlog")
}

fn default_data_dir() -> PathBuf {
    if let Some(path) = std::env::var_os("JOTLOG_DATA_DIR") {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.data_dir().to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".jotlog")
}

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("JOTLOG_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.config_dir().join("config.toml");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".jotlog-config.toml")
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub keybindings: KeyBindings,
    pub theme: Theme,
    pub data: DataConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            db_path: default_data_dir().join("journal.db"),
            export_dir: default_data_dir().join("exports"),
            log_dir: default_data_dir().join("logs"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    /// Entries per list page.
    pub page_size: usize,
    /// Named preset applied when the per-color fields are left at defaults.
    pub theme_preset: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            theme_preset: "dark".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct KeyBindings {
    pub global: GlobalBindings,
    pub list: ListBindings,
    pub view: ViewBindings,
    pub editor: EditorBindings,
    pub search: SearchBindings,
    pub popup: PopupBindings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GlobalBindings {
    pub quit: Vec<String>,
    pub help: Vec<String>,
    pub back: Vec<String>,
    pub theme: Vec<String>,
}

impl Default for GlobalBindings {
    fn default() -> Self {
        Self {
            quit: vec!["ctrl+q".to_string()],
            help: vec!["?".to_string()],
            back: vec!["esc".to_string()],
            theme: vec!["ctrl+t".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ListBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub prev_page: Vec<String>,
    pub next_page: Vec<String>,
    pub open: Vec<String>,
    pub new: Vec<String>,
    pub edit: Vec<String>,
    pub delete: Vec<String>,
    pub search: Vec<String>,
    pub filter: Vec<String>,
    pub export: Vec<String>,
}

impl Default for ListBindings {
    fn default() -> Self {
        Self {
            up: vec!["k".to_string(), "up".to_string()],
            down: vec!["j".to_string(), "down".to_string()],
            prev_page: vec!["left".to_string(), "pageup".to_string()],
            next_page: vec!["right".to_string(), "pagedown".to_string()],
            open: vec!["enter".to_string()],
            new: vec!["n".to_string()],
            edit: vec!["e".to_string()],
            delete: vec!["d".to_string()],
            search: vec!["/".to_string()],
            filter: vec!["f".to_string()],
            export: vec!["x".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ViewBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub page_up: Vec<String>,
    pub page_down: Vec<String>,
    pub top: Vec<String>,
    pub bottom: Vec<String>,
    pub edit: Vec<String>,
    pub delete: Vec<String>,
    pub export: Vec<String>,
}

impl Default for ViewBindings {
    fn default() -> Self {
        Self {
            up: vec!["k".to_string(), "up".to_string()],
            down: vec!["j".to_string(), "down".to_string()],
            page_up: vec!["ctrl+u".to_string(), "pageup".to_string()],
            page_down: vec!["ctrl+d".to_string(), "pagedown".to_string()],
            top: vec!["home".to_string()],
            bottom: vec!["end".to_string()],
            edit: vec!["e".to_string()],
            delete: vec!["d".to_string()],
            export: vec!["x".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EditorBindings {
    pub commit: Vec<String>,
    pub cancel: Vec<String>,
    pub next_field: Vec<String>,
}

impl Default for EditorBindings {
    fn default() -> Self {
        Self {
            commit: vec!["ctrl+s".to_string()],
            cancel: vec!["esc".to_string()],
            next_field: vec!["tab".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SearchBindings {
    pub submit: Vec<String>,
    pub cancel: Vec<String>,
    pub clear: Vec<String>,
}

impl Default for SearchBindings {
    fn default() -> Self {
        Self {
            submit: vec!["enter".to_string()],
            cancel: vec!["esc".to_string()],
            clear: vec!["ctrl+l".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PopupBindings {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
}

impl Default for PopupBindings {
    fn default() -> Self {
        Self {
            confirm: vec!["enter".to_string(), "y".to_string()],
            cancel: vec!["esc".to_string(), "n".to_string()],
            up: vec!["k".to_string(), "up".to_string()],
            down: vec!["j".to_string(), "down".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Theme {
    pub border_default: String,
    pub border_editing: String,
    pub border_search: String,
    pub text_highlight: String,
    pub header: String,
    pub emphasis: String,
    pub code: String,
    pub bullet: String,
    pub tag: String,
    pub timestamp: String,
    pub toast: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::preset(ThemePreset::Dark)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemePreset {
    Dark,
    Light,
}

impl ThemePreset {
    pub fn all() -> [ThemePreset; 2] {
        [ThemePreset::Dark, ThemePreset::Light]
    }

    pub fn name(self) -> &'static str {
        match self {
            ThemePreset::Dark => "dark",
            ThemePreset::Light => "light",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn next(self) -> Self {
        match self {
            ThemePreset::Dark => ThemePreset::Light,
            ThemePreset::Light => ThemePreset::Dark,
        }
    }
}

impl Theme {
    pub fn preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Dark => Self {
                border_default: "Reset".to_string(),
                border_editing: "Green".to_string(),
                border_search: "Cyan".to_string(),
                text_highlight: "50,50,50".to_string(),
                header: "Cyan".to_string(),
                emphasis: "Yellow".to_string(),
                code: "Green".to_string(),
                bullet: "Magenta".to_string(),
                tag: "Yellow".to_string(),
                timestamp: "Blue".to_string(),
                toast: "Green".to_string(),
            },
            ThemePreset::Light => Self {
                border_default: "DarkGray".to_string(),
                border_editing: "Green".to_string(),
                border_search: "Blue".to_string(),
                text_highlight: "220,220,220".to_string(),
                header: "Blue".to_string(),
                emphasis: "#8f5902".to_string(),
                code: "#4e9a06".to_string(),
                bullet: "Magenta".to_string(),
                tag: "#8f5902".to_string(),
                timestamp: "DarkGray".to_string(),
                toast: "Green".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = config_path();

        let mut config = if let Ok(content) = fs::read_to_string(&config_path) {
            match toml::from_str::<Config>(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to parse config.toml ({config_path:?}), using defaults: {e}");
                    Config::default()
                }
            }
        } else {
            Config::default()
        };

        let changed = config.normalize();

        if changed || !config_path.exists() {
            let _ = config.save_to_path(&config_path);
        }

        config
    }

    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).unwrap_or_default();
        fs::write(path, content)
    }

    /// The preset named in `ui.theme_preset`, falling back to dark when the
    /// name is unknown.
    pub fn theme_preset(&self) -> ThemePreset {
        ThemePreset::from_name(&self.ui.theme_preset).unwrap_or(ThemePreset::Dark)
    }

    pub fn apply_preset(&mut self, preset: ThemePreset) {
        self.ui.theme_preset = preset.name().to_string();
        self.theme = Theme::preset(preset);
    }

    fn normalize(&mut self) -> bool {
        let mut changed = false;

        if self.data.db_path.as_os_str().is_empty() {
            self.data.db_path = DataConfig::default().db_path;
            changed = true;
        }
        if self.data.export_dir.as_os_str().is_empty() {
            self.data.export_dir = DataConfig::default().export_dir;
            changed = true;
        }
        if self.data.log_dir.as_os_str().is_empty() {
            self.data.log_dir = DataConfig::default().log_dir;
            changed = true;
        }

        for path in [
            &mut self.data.db_path,
            &mut self.data.export_dir,
            &mut self.data.log_dir,
        ] {
            if path.is_relative() {
                *path = default_data_dir().join(&*path);
                changed = true;
            }
        }

        if self.ui.page_size == 0 {
            self.ui.page_size = UiConfig::default().page_size;
            changed = true;
        }

        changed
    }
}
