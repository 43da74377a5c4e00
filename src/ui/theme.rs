use ratatui::style::{Color, Modifier, Style};
use supports_color::Stream;

/// Default theme name used throughout the application
pub const DEFAULT_THEME_NAME: &str = "dark";

/// Names accepted by `Theme::load`.
pub const THEME_NAMES: [&str; 2] = ["dark", "light"];

// ═══════════════════════════════════════════════════════════════════════════════
// Icon characters
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct ThemeChars {
    pub folder: char,
    pub file: char,
    pub symlink: char,
    pub expanded: char,
    pub collapsed: char,
}

impl Default for ThemeChars {
    fn default() -> Self {
        Self {
            folder: '▪',
            file: ' ',
            symlink: '→',
            expanded: '▾',
            collapsed: '▸',
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Base palette
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub bg: Color,
    pub bg_alt: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_strong: Color,
    pub fg_inverse: Color,
    pub accent: Color,
    pub shortcut: Color,
    pub positive: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct StateColors {
    pub warning: Color,
    pub error: Color,
}

/// Tree and listing panes.
#[derive(Clone, Copy, Debug)]
pub struct PanelColors {
    pub border: Color,
    pub border_active: Color,
    pub header_bg: Color,
    pub header_bg_active: Color,
    pub header_text: Color,
    pub header_text_active: Color,
    pub file_text: Color,
    pub directory_text: Color,
    pub symlink_text: Color,
    pub selected_bg: Color,
    pub selected_text: Color,
    pub size_text: Color,
    pub date_text: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct ToolbarColors {
    pub bg: Color,
    pub label: Color,
    pub input_text: Color,
    pub input_bg: Color,
    pub input_bg_active: Color,
    pub selector_text: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct PreviewColors {
    pub text: Color,
    pub info_text: Color,
    pub error_text: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct StatusBarColors {
    pub bg: Color,
    pub text: Color,
    pub text_dim: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct FunctionBarColors {
    pub key: Color,
    pub label: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct MessageColors {
    pub text: Color,
    pub warning: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct DialogColors {
    pub bg: Color,
    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub input_text: Color,
    pub input_cursor_fg: Color,
    pub input_cursor_bg: Color,
    pub input_prompt: Color,
    pub button_text: Color,
    pub button_selected_bg: Color,
    pub button_selected_text: Color,
}

#[derive(Clone, Copy, Debug)]
pub struct HelpColors {
    pub bg: Color,
    pub border: Color,
    pub title: Color,
    pub section_title: Color,
    pub section_decorator: Color,
    pub key: Color,
    pub description: Color,
    pub hint_text: Color,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub name: String,
    pub palette: Palette,
    pub state: StateColors,
    pub panel: PanelColors,
    pub toolbar: ToolbarColors,
    pub preview: PreviewColors,
    pub status_bar: StatusBarColors,
    pub function_bar: FunctionBarColors,
    pub message: MessageColors,
    pub dialog: DialogColors,
    pub help: HelpColors,
    pub chars: ThemeChars,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Built-in theme by name, downgraded to basic ANSI colours when the
    /// terminal does not report 256-colour support. Unknown names use the
    /// default theme.
    pub fn load(name: &str) -> Self {
        let theme = Self::by_name(name);
        if Self::supports_256_colors() {
            theme
        } else {
            Self::basic(theme.is_light())
        }
    }

    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, using {}", DEFAULT_THEME_NAME);
                Self::dark()
            }
        }
    }

    fn supports_256_colors() -> bool {
        supports_color::on(Stream::Stdout)
            .map(|level| level.has_256)
            .unwrap_or(false)
    }

    pub fn is_light(&self) -> bool {
        self.name == "light"
    }

    fn build(name: &str, p: Palette, state: StateColors, panel: PanelColors) -> Self {
        Self {
            name: name.to_string(),
            palette: p,
            state,
            panel,
            toolbar: ToolbarColors {
                bg: p.bg_alt,
                label: p.fg_dim,
                input_text: p.fg,
                input_bg: p.bg,
                input_bg_active: p.bg_alt,
                selector_text: p.accent,
            },
            preview: PreviewColors {
                text: p.fg,
                info_text: p.accent,
                error_text: state.error,
            },
            status_bar: StatusBarColors {
                bg: p.bg_alt,
                text: p.fg,
                text_dim: p.fg_dim,
            },
            function_bar: FunctionBarColors {
                key: p.shortcut,
                label: p.fg_dim,
            },
            message: MessageColors {
                text: p.positive,
                warning: state.warning,
            },
            dialog: DialogColors {
                bg: p.bg_alt,
                border: p.fg_strong,
                title: p.fg_strong,
                text: p.fg,
                input_text: p.fg,
                input_cursor_fg: p.fg_inverse,
                input_cursor_bg: p.fg,
                input_prompt: p.accent,
                button_text: p.fg_dim,
                button_selected_bg: p.accent,
                button_selected_text: p.fg_inverse,
            },
            help: HelpColors {
                bg: p.bg_alt,
                border: p.fg_strong,
                title: p.fg_strong,
                section_title: p.accent,
                section_decorator: p.fg_dim,
                key: p.shortcut,
                description: p.fg,
                hint_text: p.fg_dim,
            },
            chars: ThemeChars::default(),
        }
    }

    pub fn dark() -> Self {
        let palette = Palette {
            bg: Color::Indexed(235),
            bg_alt: Color::Indexed(236),
            fg: Color::Indexed(252),
            fg_dim: Color::Indexed(245),
            fg_strong: Color::Indexed(255),
            fg_inverse: Color::Indexed(235),
            accent: Color::Indexed(81),
            shortcut: Color::Indexed(117),
            positive: Color::Indexed(114),
        };
        let state = StateColors {
            warning: Color::Indexed(214),
            error: Color::Indexed(204),
        };
        let panel = PanelColors {
            border: Color::Indexed(240),
            border_active: Color::Indexed(252),
            header_bg: Color::Indexed(236),
            header_bg_active: Color::Indexed(237),
            header_text: Color::Indexed(250),
            header_text_active: Color::Indexed(255),
            file_text: Color::Indexed(252),
            directory_text: Color::Indexed(117),
            symlink_text: Color::Indexed(44),
            selected_bg: Color::Indexed(117),
            selected_text: Color::Indexed(16),
            size_text: Color::Indexed(245),
            date_text: Color::Indexed(245),
        };
        Self::build("dark", palette, state, panel)
    }

    pub fn light() -> Self {
        let palette = Palette {
            bg: Color::Indexed(255),
            bg_alt: Color::Indexed(254),
            fg: Color::Indexed(238),
            fg_dim: Color::Indexed(246),
            fg_strong: Color::Indexed(235),
            fg_inverse: Color::Indexed(231),
            accent: Color::Indexed(25),
            shortcut: Color::Indexed(31),
            positive: Color::Indexed(28),
        };
        let state = StateColors {
            warning: Color::Indexed(166),
            error: Color::Indexed(161),
        };
        let panel = PanelColors {
            border: Color::Indexed(250),
            border_active: Color::Indexed(238),
            header_bg: Color::Indexed(254),
            header_bg_active: Color::Indexed(253),
            header_text: Color::Indexed(246),
            header_text_active: Color::Indexed(236),
            file_text: Color::Indexed(238),
            directory_text: Color::Indexed(25),
            symlink_text: Color::Indexed(30),
            selected_bg: Color::Indexed(67),
            selected_text: Color::Indexed(231),
            size_text: Color::Indexed(246),
            date_text: Color::Indexed(246),
        };
        Self::build("light", palette, state, panel)
    }

    /// Sixteen-colour fallback for terminals without 256-colour support.
    pub fn basic(light: bool) -> Self {
        let (bg, fg, strong, inverse) = if light {
            (Color::White, Color::Black, Color::Black, Color::White)
        } else {
            (Color::Black, Color::Gray, Color::White, Color::Black)
        };
        let palette = Palette {
            bg,
            bg_alt: bg,
            fg,
            fg_dim: Color::DarkGray,
            fg_strong: strong,
            fg_inverse: inverse,
            accent: Color::Blue,
            shortcut: Color::Cyan,
            positive: Color::Green,
        };
        let state = StateColors {
            warning: Color::Yellow,
            error: Color::Red,
        };
        let panel = PanelColors {
            border: Color::DarkGray,
            border_active: strong,
            header_bg: bg,
            header_bg_active: bg,
            header_text: Color::DarkGray,
            header_text_active: strong,
            file_text: fg,
            directory_text: Color::Blue,
            symlink_text: Color::Cyan,
            selected_bg: Color::Blue,
            selected_text: Color::White,
            size_text: Color::DarkGray,
            date_text: Color::DarkGray,
        };
        Self::build(if light { "light" } else { "dark" }, palette, state, panel)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Style helpers
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.panel.file_text)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.palette.fg_dim)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.panel.selected_text)
            .bg(self.panel.selected_bg)
    }

    pub fn directory_style(&self) -> Style {
        Style::default()
            .fg(self.panel.directory_text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn symlink_style(&self) -> Style {
        Style::default().fg(self.panel.symlink_text)
    }

    pub fn border_style(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.panel.border_active)
        } else {
            Style::default().fg(self.panel.border)
        }
    }

    pub fn title_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.panel.border_active)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.panel.header_text)
        }
    }

    pub fn warning_style(&self) -> Style {
        Style::default()
            .fg(self.message.warning)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar.text)
            .bg(self.status_bar.bg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("light").name, "light");
        assert_eq!(Theme::by_name("dark").name, "dark");
        assert_eq!(Theme::by_name("neon").name, DEFAULT_THEME_NAME);
    }

    #[test]
    fn test_basic_uses_named_colors() {
        let theme = Theme::basic(false);
        assert!(!matches!(theme.palette.bg, Color::Indexed(_)));
        assert!(!matches!(theme.panel.directory_text, Color::Indexed(_)));
        assert!(Theme::basic(true).is_light());
    }

    #[test]
    fn test_dialog_colors_follow_palette() {
        let theme = Theme::dark();
        assert_eq!(theme.dialog.button_selected_bg, theme.palette.accent);
        assert_eq!(theme.status_bar.bg, theme.palette.bg_alt);
        assert_eq!(theme.warning_style().fg, Some(theme.state.warning));
    }
}
