use ratatui::style::{Color, Modifier, Style};

/// Theme data structure containing all colors used in the application
#[derive(Debug, Clone)]
pub struct Theme {
    // Tree
    pub node_default: Color,
    pub node_disabled: Color,
    pub jump_label: Color,
    pub guides: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub placeholder: Color,

    // Search box and prompts
    pub search_border: Color,
    pub prompt_border: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_help_text: Color,
    pub status_error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            node_default: Color::Reset,
            node_disabled: Color::Rgb(0x77, 0x77, 0x77),
            jump_label: Color::Rgb(0x66, 0x66, 0x66),
            guides: Color::DarkGray,
            selected_bg: Color::White,
            selected_fg: Color::Black,
            placeholder: Color::Red,

            search_border: Color::Blue,
            prompt_border: Color::Yellow,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_help_text: Color::Gray,
            status_error: Color::LightRed,
        }
    }
}

impl Theme {
    /// Emphasis for characters consumed by the search term
    pub fn match_style(&self) -> Style {
        Style::default().add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }
}

/// Get the current theme
pub fn get_theme() -> Theme {
    Theme::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_theme_returns_valid_theme() {
        let theme = get_theme();
        assert_eq!(theme.node_disabled, Color::Rgb(0x77, 0x77, 0x77));
        assert_eq!(theme.jump_label, Color::Rgb(0x66, 0x66, 0x66));
        assert_eq!(theme.placeholder, Color::Red);
    }

    #[test]
    fn test_match_style_is_underlined_bold() {
        let style = get_theme().match_style();
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }
}
