use crate::config::Theme;
use crate::text::StyleTag;
use crate::ui::color_parser::parse_color;
use ratatui::style::{Color, Modifier, Style};

/// Theme colors resolved into ratatui values once per theme change, so the
/// draw path never parses strings.
#[derive(Debug, Clone)]
pub struct ThemeTokens {
    pub border_default: Color,
    pub border_editing: Color,
    pub border_search: Color,
    pub highlight_bg: Color,
    pub header: Color,
    pub emphasis: Color,
    pub code: Color,
    pub bullet: Color,
    pub tag: Color,
    pub timestamp: Color,
    pub toast: Color,
}

impl ThemeTokens {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            border_default: parse_color(&theme.border_default),
            border_editing: parse_color(&theme.border_editing),
            border_search: parse_color(&theme.border_search),
            highlight_bg: parse_color(&theme.text_highlight),
            header: parse_color(&theme.header),
            emphasis: parse_color(&theme.emphasis),
            code: parse_color(&theme.code),
            bullet: parse_color(&theme.bullet),
            tag: parse_color(&theme.tag),
            timestamp: parse_color(&theme.timestamp),
            toast: parse_color(&theme.toast),
        }
    }

    /// Terminal style for one markdown span kind.
    pub fn style_for(&self, tag: StyleTag) -> Style {
        match tag {
            StyleTag::Header1 => Style::default()
                .fg(self.header)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            StyleTag::Header2 => Style::default().fg(self.header).add_modifier(Modifier::BOLD),
            StyleTag::Header3 => Style::default().fg(self.header),
            StyleTag::Bold => Style::default()
                .fg(self.emphasis)
                .add_modifier(Modifier::BOLD),
            StyleTag::Italic => Style::default()
                .fg(self.emphasis)
                .add_modifier(Modifier::ITALIC),
            StyleTag::InlineCode => Style::default().fg(self.code).bg(self.highlight_bg),
            StyleTag::CodeBlock => Style::default().fg(self.code),
            StyleTag::ListBullet => Style::default().fg(self.bullet),
            StyleTag::Plain => Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ThemeTokens;
    use crate::config::{Theme, ThemePreset};
    use crate::text::StyleTag;
    use ratatui::style::{Color, Modifier};

    #[test]
    fn maps_theme_strings_to_colors() {
        let theme = Theme {
            border_default: "Red".to_string(),
            header: "1,2,3".to_string(),
            code: "#00ff00".to_string(),
            ..Theme::preset(ThemePreset::Dark)
        };

        let tokens = ThemeTokens::from_theme(&theme);
        assert_eq!(tokens.border_default, Color::Red);
        assert_eq!(tokens.header, Color::Rgb(1, 2, 3));
        assert_eq!(tokens.code, Color::Rgb(0, 255, 0));
    }

    #[test]
    fn header_levels_step_down_in_weight() {
        let tokens = ThemeTokens::from_theme(&Theme::default());
        let h1 = tokens.style_for(StyleTag::Header1);
        let h3 = tokens.style_for(StyleTag::Header3);
        assert!(h1.add_modifier.contains(Modifier::BOLD));
        assert!(!h3.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn plain_spans_have_no_styling() {
        let tokens = ThemeTokens::from_theme(&Theme::default());
        let plain = tokens.style_for(StyleTag::Plain);
        assert_eq!(plain.fg, None);
        assert!(plain.add_modifier.is_empty());
    }
}
