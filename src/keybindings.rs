use std::collections::HashMap;
use std::hash::Hash;

use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};

// ─── Generic key binding infrastructure ────────────────────────────────

/// A key combination (key code + modifiers).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Reverse-lookup map from key combination to action, plus the formatted
/// key labels shown in the help overlay and function bar.
pub struct ActionMap<A> {
    map: HashMap<KeyBind, A>,
    display: HashMap<A, Vec<String>>,
    descriptions: HashMap<A, String>,
}

impl<A: Copy + Eq + Hash> ActionMap<A> {
    /// Merge `overrides` on top of `defaults`. An action named in `overrides`
    /// loses all of its default keys; other actions keep theirs.
    pub fn build(
        defaults: &HashMap<A, Vec<String>>,
        overrides: &HashMap<A, Vec<String>>,
    ) -> Self {
        let mut merged = defaults.clone();
        for (action, keys) in overrides {
            merged.insert(*action, keys.clone());
        }

        let mut map = HashMap::new();
        let mut display = HashMap::new();
        let mut descriptions = HashMap::new();

        for (action, entries) in &merged {
            let mut labels = Vec::new();
            for entry in entries {
                let trimmed = entry.trim();
                if let Some(comment) = trimmed.strip_prefix("//") {
                    descriptions.entry(*action).or_insert_with(|| comment.trim().to_string());
                    continue;
                }
                for bind in parse_key(trimmed) {
                    map.insert(bind, *action);
                }
                labels.push(format_key_display(trimmed));
            }
            display.insert(*action, labels);
        }

        // A user override without a comment still shows the default description
        for (action, entries) in defaults {
            if descriptions.contains_key(action) {
                continue;
            }
            if let Some(comment) = entries.iter().find_map(|e| e.trim().strip_prefix("//")) {
                descriptions.insert(*action, comment.trim().to_string());
            }
        }

        Self { map, display, descriptions }
    }

    /// Formatted keys bound to `action`, e.g. `["F2", "R"]`.
    pub fn keys(&self, action: A) -> &[String] {
        self.display.get(&action).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// First formatted key, or "" when the action is unbound.
    pub fn first_key(&self, action: A) -> &str {
        self.keys(action).first().map(|s| s.as_str()).unwrap_or("")
    }

    pub fn keys_joined(&self, action: A, sep: &str) -> String {
        self.keys(action).join(sep)
    }

    /// Text of the `//` comment entry for `action`.
    pub fn description(&self, action: A) -> &str {
        self.descriptions.get(&action).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn lookup(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<A> {
        if let Some(action) = self.map.get(&KeyBind { code, modifiers }) {
            return Some(*action);
        }
        // Terminals report SHIFT for upper-case letters and shifted symbols
        // such as '?'; retry without it.
        if matches!(code, KeyCode::Char(_)) && modifiers.contains(KeyModifiers::SHIFT) {
            let stripped = modifiers & !KeyModifiers::SHIFT;
            return self.map.get(&KeyBind { code, modifiers: stripped }).copied();
        }
        None
    }
}

// ─── Key string parsing ───────────────────────────────────────────────

/// Named keys: (config spelling, aliases, display label, code).
const NAMED_KEYS: &[(&str, &[&str], &str, KeyCode)] = &[
    ("up", &[], "Up", KeyCode::Up),
    ("down", &[], "Down", KeyCode::Down),
    ("left", &[], "Left", KeyCode::Left),
    ("right", &[], "Right", KeyCode::Right),
    ("enter", &["return"], "Enter", KeyCode::Enter),
    ("esc", &["escape"], "Esc", KeyCode::Esc),
    ("tab", &[], "Tab", KeyCode::Tab),
    ("backtab", &[], "BackTab", KeyCode::BackTab),
    ("space", &[], "Space", KeyCode::Char(' ')),
    ("backspace", &[], "BkSp", KeyCode::Backspace),
    ("delete", &["del"], "Del", KeyCode::Delete),
    ("home", &[], "Home", KeyCode::Home),
    ("end", &[], "End", KeyCode::End),
    ("pageup", &[], "PgUp", KeyCode::PageUp),
    ("pagedown", &[], "PgDn", KeyCode::PageDown),
];

fn named_key(name: &str) -> Option<(&'static str, KeyCode)> {
    NAMED_KEYS
        .iter()
        .find(|(spelling, aliases, _, _)| *spelling == name || aliases.contains(&name))
        .map(|(_, _, label, code)| (*label, *code))
}

fn function_key(name: &str) -> Option<u8> {
    let n: u8 = name.strip_prefix('f')?.parse().ok()?;
    (1..=12).contains(&n).then_some(n)
}

fn modifier(name: &str) -> Option<(KeyModifiers, &'static str)> {
    match name {
        "ctrl" | "control" => Some((KeyModifiers::CONTROL, "Ctrl")),
        "shift" => Some((KeyModifiers::SHIFT, "Shift")),
        "alt" => Some((KeyModifiers::ALT, "Alt")),
        _ => None,
    }
}

/// Split "ctrl+shift+x" into modifier parts and the key part. A trailing
/// "+" (as in "shift++") is the plus key itself.
fn split_key(s: &str) -> (Vec<&str>, &str) {
    if s == "+" {
        return (Vec::new(), "+");
    }
    if let Some(prefix) = s.strip_suffix("++") {
        return (prefix.split('+').collect(), "+");
    }
    let mut parts: Vec<&str> = s.split('+').collect();
    let key = parts.pop().unwrap_or("");
    (parts, key)
}

/// Parse a key string like `"ctrl+l"`, `"shift+up"`, `"?"` or `"f2"` into
/// the bindings it stands for. Letters register both cases. `//` comment
/// entries and unknown names parse to nothing.
pub fn parse_key(s: &str) -> Vec<KeyBind> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return Vec::new();
    }
    let lower = trimmed.to_lowercase();
    let (mods, key) = split_key(&lower);

    let modifiers = mods
        .iter()
        .filter_map(|m| modifier(m))
        .fold(KeyModifiers::NONE, |acc, (m, _)| acc | m);

    let code = if let Some((_, code)) = named_key(key) {
        code
    } else if let Some(n) = function_key(key) {
        KeyCode::F(n)
    } else {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => KeyCode::Char(ch),
            _ => return Vec::new(),
        }
    };

    match code {
        KeyCode::Char(ch) if ch.is_ascii_alphabetic() => vec![
            KeyBind { code: KeyCode::Char(ch.to_ascii_lowercase()), modifiers },
            KeyBind { code: KeyCode::Char(ch.to_ascii_uppercase()), modifiers },
        ],
        _ => vec![KeyBind { code, modifiers }],
    }
}

/// User-facing label for a key string: `"ctrl+l"` → `"Ctrl+L"`,
/// `"pagedown"` → `"PgDn"`, `"alt+left"` → `"Alt+Left"`.
pub fn format_key_display(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    let (mods, key) = split_key(&lower);

    let mut parts: Vec<String> = mods
        .iter()
        .map(|m| modifier(m).map(|(_, label)| label.to_string()).unwrap_or_else(|| m.to_string()))
        .collect();

    let key_label = if let Some((label, _)) = named_key(key) {
        label.to_string()
    } else if let Some(n) = function_key(key) {
        format!("F{}", n)
    } else {
        key.to_uppercase()
    };
    parts.push(key_label);
    parts.join("+")
}

// ─── Browser context ───────────────────────────────────────────────────

/// Everything the main browser screen can do from the keyboard.
///
/// Movement actions are interpreted by the focused pane: in the tree,
/// `MoveLeft`/`MoveRight` collapse and expand; in the grid view they move
/// between columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserAction {
    Quit,
    Help,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    GoFirst,
    GoLast,
    Open,
    Back,
    Up,
    Refresh,
    NewFolder,
    Delete,
    Rename,
    Properties,
    ToggleView,
    FocusAddress,
    FocusSearch,
    CycleSort,
    SortByName,
    SortBySize,
    SortByType,
    SortByDate,
    ContextMenu,
    SwitchFocus,
    PreviewScrollUp,
    PreviewScrollDown,
}

impl BrowserAction {
    /// Actions in the order the help overlay lists them, grouped by section.
    pub const HELP_SECTIONS: &'static [(&'static str, &'static [BrowserAction])] = &[
        (
            "Navigation",
            &[
                BrowserAction::MoveUp,
                BrowserAction::MoveDown,
                BrowserAction::MoveLeft,
                BrowserAction::MoveRight,
                BrowserAction::PageUp,
                BrowserAction::PageDown,
                BrowserAction::GoFirst,
                BrowserAction::GoLast,
                BrowserAction::Open,
                BrowserAction::Back,
                BrowserAction::Up,
                BrowserAction::Refresh,
                BrowserAction::FocusAddress,
                BrowserAction::SwitchFocus,
            ],
        ),
        (
            "File Operations",
            &[
                BrowserAction::NewFolder,
                BrowserAction::Rename,
                BrowserAction::Delete,
                BrowserAction::Properties,
                BrowserAction::ContextMenu,
                BrowserAction::FocusSearch,
            ],
        ),
        (
            "View",
            &[
                BrowserAction::ToggleView,
                BrowserAction::CycleSort,
                BrowserAction::SortByName,
                BrowserAction::SortBySize,
                BrowserAction::SortByType,
                BrowserAction::SortByDate,
                BrowserAction::PreviewScrollUp,
                BrowserAction::PreviewScrollDown,
            ],
        ),
        ("General", &[BrowserAction::Help, BrowserAction::Quit]),
    ];
}

fn bind(m: &mut HashMap<BrowserAction, Vec<String>>, action: BrowserAction, comment: &str, keys: &[&str]) {
    let mut entries = vec![format!("//{}", comment)];
    entries.extend(keys.iter().map(|k| k.to_string()));
    m.insert(action, entries);
}

/// Default browser bindings. The leading `//` entry of each list is the
/// description shown in the help overlay.
pub fn default_browser_keybindings() -> HashMap<BrowserAction, Vec<String>> {
    use BrowserAction::*;
    let mut m = HashMap::new();

    bind(&mut m, Quit, "Quit", &["q", "ctrl+c"]);
    bind(&mut m, Help, "Show key bindings", &["f1", "?"]);

    bind(&mut m, MoveUp, "Move selection up", &["up"]);
    bind(&mut m, MoveDown, "Move selection down", &["down"]);
    bind(&mut m, MoveLeft, "Collapse folder / move left in grid", &["left"]);
    bind(&mut m, MoveRight, "Expand folder / move right in grid", &["right"]);
    bind(&mut m, PageUp, "Page up", &["pageup"]);
    bind(&mut m, PageDown, "Page down", &["pagedown"]);
    bind(&mut m, GoFirst, "Go to first item", &["home"]);
    bind(&mut m, GoLast, "Go to last item", &["end"]);
    bind(&mut m, Open, "Open file or enter folder", &["enter", "ctrl+o"]);
    bind(&mut m, Back, "Back to previous folder", &["backspace", "alt+left"]);
    bind(&mut m, Up, "Go to parent folder", &["alt+up", "u"]);
    bind(&mut m, Refresh, "Refresh listing", &["f5", "ctrl+r"]);
    bind(&mut m, FocusAddress, "Edit address bar", &["ctrl+l", "/"]);
    bind(&mut m, SwitchFocus, "Cycle focus: tree, listing, preview", &["tab"]);

    bind(&mut m, NewFolder, "New folder", &["f7", "k"]);
    bind(&mut m, Delete, "Delete selected entry", &["delete", "x"]);
    bind(&mut m, Rename, "Rename selected entry", &["f2", "r"]);
    bind(&mut m, Properties, "Show properties", &["i"]);
    bind(&mut m, ContextMenu, "Open context menu", &["m", "shift+f10"]);
    bind(&mut m, FocusSearch, "Search files below this folder", &["ctrl+f", "f"]);

    bind(&mut m, ToggleView, "Toggle list / grid view", &["v"]);
    bind(&mut m, CycleSort, "Cycle sort column", &["s"]);
    bind(&mut m, SortByName, "Sort by name", &["1"]);
    bind(&mut m, SortBySize, "Sort by size", &["2"]);
    bind(&mut m, SortByType, "Sort by type", &["3"]);
    bind(&mut m, SortByDate, "Sort by date modified", &["4"]);
    bind(&mut m, PreviewScrollUp, "Scroll preview up", &["shift+up"]);
    bind(&mut m, PreviewScrollDown, "Scroll preview down", &["shift+down"]);

    m
}

// ─── JSON config & runtime container ───────────────────────────────────

/// Per-action override lists as stored in `settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeybindingsConfig {
    #[serde(default = "default_browser_keybindings")]
    pub browser: HashMap<BrowserAction, Vec<String>>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            browser: default_browser_keybindings(),
        }
    }
}

/// Runtime keybindings built once from the config.
pub struct Keybindings {
    browser: ActionMap<BrowserAction>,
}

impl Keybindings {
    pub fn from_config(config: &KeybindingsConfig) -> Self {
        Self {
            browser: ActionMap::build(&default_browser_keybindings(), &config.browser),
        }
    }

    pub fn browser_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<BrowserAction> {
        self.browser.lookup(code, modifiers)
    }
    pub fn browser_first_key(&self, action: BrowserAction) -> &str { self.browser.first_key(action) }
    pub fn browser_keys_joined(&self, action: BrowserAction, sep: &str) -> String {
        self.browser.keys_joined(action, sep)
    }
    pub fn browser_description(&self, action: BrowserAction) -> &str {
        self.browser.description(action)
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== parse_key tests ==========

    #[test]
    fn test_parse_letter_both_cases() {
        let binds = parse_key("r");
        assert_eq!(binds.len(), 2);
        assert!(binds.contains(&KeyBind { code: KeyCode::Char('r'), modifiers: KeyModifiers::NONE }));
        assert!(binds.contains(&KeyBind { code: KeyCode::Char('R'), modifiers: KeyModifiers::NONE }));
    }

    #[test]
    fn test_parse_comment_and_garbage() {
        assert!(parse_key("//Rename").is_empty());
        assert!(parse_key("  // spaced").is_empty());
        assert!(parse_key("").is_empty());
        assert!(parse_key("notakey").is_empty());
        assert!(parse_key("f13").is_empty());
    }

    #[test]
    fn test_parse_modifiers() {
        let binds = parse_key("ctrl+l");
        assert!(binds.contains(&KeyBind { code: KeyCode::Char('l'), modifiers: KeyModifiers::CONTROL }));

        let binds = parse_key("alt+left");
        assert_eq!(binds, vec![KeyBind { code: KeyCode::Left, modifiers: KeyModifiers::ALT }]);

        let binds = parse_key("shift+f10");
        assert_eq!(binds, vec![KeyBind { code: KeyCode::F(10), modifiers: KeyModifiers::SHIFT }]);
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(parse_key("enter")[0].code, KeyCode::Enter);
        assert_eq!(parse_key("return")[0].code, KeyCode::Enter);
        assert_eq!(parse_key("del")[0].code, KeyCode::Delete);
        assert_eq!(parse_key("backspace")[0].code, KeyCode::Backspace);
        assert_eq!(parse_key("space")[0].code, KeyCode::Char(' '));
        assert_eq!(parse_key("F5")[0].code, KeyCode::F(5));
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!(parse_key("?"), vec![KeyBind { code: KeyCode::Char('?'), modifiers: KeyModifiers::NONE }]);
        assert_eq!(parse_key("/"), vec![KeyBind { code: KeyCode::Char('/'), modifiers: KeyModifiers::NONE }]);
        assert_eq!(parse_key("+"), vec![KeyBind { code: KeyCode::Char('+'), modifiers: KeyModifiers::NONE }]);
        assert_eq!(
            parse_key("ctrl++"),
            vec![KeyBind { code: KeyCode::Char('+'), modifiers: KeyModifiers::CONTROL }]
        );
    }

    // ========== format_key_display tests ==========

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key_display("q"), "Q");
        assert_eq!(format_key_display("ctrl+l"), "Ctrl+L");
        assert_eq!(format_key_display("alt+up"), "Alt+Up");
        assert_eq!(format_key_display("shift+f10"), "Shift+F10");
        assert_eq!(format_key_display("backspace"), "BkSp");
        assert_eq!(format_key_display("delete"), "Del");
        assert_eq!(format_key_display("pagedown"), "PgDn");
        assert_eq!(format_key_display("?"), "?");
    }

    // ========== Keybindings tests ==========

    #[test]
    fn test_default_browser_lookup() {
        let kb = Keybindings::default();
        assert_eq!(kb.browser_action(KeyCode::Char('q'), KeyModifiers::NONE), Some(BrowserAction::Quit));
        assert_eq!(kb.browser_action(KeyCode::F(2), KeyModifiers::NONE), Some(BrowserAction::Rename));
        assert_eq!(kb.browser_action(KeyCode::F(7), KeyModifiers::NONE), Some(BrowserAction::NewFolder));
        assert_eq!(kb.browser_action(KeyCode::Backspace, KeyModifiers::NONE), Some(BrowserAction::Back));
        assert_eq!(kb.browser_action(KeyCode::Left, KeyModifiers::ALT), Some(BrowserAction::Back));
        assert_eq!(kb.browser_action(KeyCode::Up, KeyModifiers::ALT), Some(BrowserAction::Up));
        assert_eq!(kb.browser_action(KeyCode::Char('l'), KeyModifiers::CONTROL), Some(BrowserAction::FocusAddress));
        assert_eq!(kb.browser_action(KeyCode::Up, KeyModifiers::SHIFT), Some(BrowserAction::PreviewScrollUp));
        assert_eq!(kb.browser_action(KeyCode::Up, KeyModifiers::NONE), Some(BrowserAction::MoveUp));
    }

    #[test]
    fn test_shift_symbol_fallback() {
        let kb = Keybindings::default();
        assert_eq!(kb.browser_action(KeyCode::Char('?'), KeyModifiers::SHIFT), Some(BrowserAction::Help));
        assert_eq!(kb.browser_action(KeyCode::Char('R'), KeyModifiers::SHIFT), Some(BrowserAction::Rename));
    }

    #[test]
    fn test_display_and_descriptions() {
        let kb = Keybindings::default();
        assert_eq!(kb.browser_first_key(BrowserAction::Rename), "F2");
        assert_eq!(kb.browser_keys_joined(BrowserAction::Back, " / "), "BkSp / Alt+Left");
        assert_eq!(kb.browser_description(BrowserAction::NewFolder), "New folder");
        // Comment entries never show up as keys
        assert_eq!(kb.browser_keys_joined(BrowserAction::Quit, ", "), "Q, Ctrl+C");
    }

    #[test]
    fn test_every_action_is_bound_and_listed() {
        let defaults = default_browser_keybindings();
        let listed: Vec<BrowserAction> = BrowserAction::HELP_SECTIONS
            .iter()
            .flat_map(|(_, actions)| actions.iter().copied())
            .collect();
        assert_eq!(listed.len(), defaults.len());
        for action in listed {
            assert!(defaults.contains_key(&action), "{:?} has no default", action);
        }
    }

    #[test]
    fn test_override_replaces_only_named_action() {
        let json = r#"{"browser": {"quit": ["ctrl+q"]}}"#;
        let config: KeybindingsConfig = serde_json::from_str(json).unwrap();
        let kb = Keybindings::from_config(&config);

        assert_eq!(kb.browser_action(KeyCode::Char('q'), KeyModifiers::CONTROL), Some(BrowserAction::Quit));
        assert_eq!(kb.browser_action(KeyCode::Char('q'), KeyModifiers::NONE), None);
        assert_eq!(kb.browser_action(KeyCode::F(5), KeyModifiers::NONE), Some(BrowserAction::Refresh));
        // Description survives an override without a comment entry
        assert_eq!(kb.browser_description(BrowserAction::Quit), "Quit");
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let config: KeybindingsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.browser.len(), default_browser_keybindings().len());
    }

    #[test]
    fn test_action_map_with_custom_enum() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        enum MenuAction { Accept, Cancel }

        let mut defaults = HashMap::new();
        defaults.insert(MenuAction::Accept, vec!["enter".to_string()]);
        defaults.insert(MenuAction::Cancel, vec!["esc".to_string()]);
        let map = ActionMap::build(&defaults, &HashMap::new());

        assert_eq!(map.lookup(KeyCode::Enter, KeyModifiers::NONE), Some(MenuAction::Accept));
        assert_eq!(map.lookup(KeyCode::Esc, KeyModifiers::NONE), Some(MenuAction::Cancel));
        assert_eq!(map.lookup(KeyCode::Tab, KeyModifiers::NONE), None);
    }
}
