use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use super::context_menu::{ContextAction, ContextMenuState};
use super::input::TextInput;
use super::theme::Theme;
use super::tree::TreeState;
use crate::config::{Settings, ViewMode};
use crate::error::BrowserError;
use crate::keybindings::{BrowserAction, Keybindings};
use crate::services::directory::{self, DirectoryEntry, SortKey};
use crate::services::file_ops;
use crate::services::navigation::Navigator;
use crate::services::preview::{build_preview, Preview, Properties};
use crate::services::search;

/// How long "Refreshed" stays in the status bar.
pub const REFRESH_MESSAGE_DURATION: Duration = Duration::from_secs(2);
/// How long operation results stay in the status bar.
pub const MESSAGE_DURATION: Duration = Duration::from_secs(3);
const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Listing,
    Preview,
    Address,
    Search,
}

impl Focus {
    /// Tab order between the three panes.
    fn next_pane(self) -> Self {
        match self {
            Focus::Tree => Focus::Listing,
            Focus::Listing => Focus::Preview,
            _ => Focus::Tree,
        }
    }

    pub fn is_text_input(self) -> bool {
        matches!(self, Focus::Address | Focus::Search)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogType {
    Mkdir,
    Rename,
    Delete,
    Info,
    Warning,
    Error,
    Properties,
}

#[derive(Debug, Clone)]
pub struct Dialog {
    pub dialog_type: DialogType,
    pub title: String,
    pub message: String,
    pub input: TextInput,
    pub selected_button: usize, // 0: Yes, 1: No
    pub target: Option<PathBuf>,
}

impl Dialog {
    fn notice(dialog_type: DialogType, title: &str, message: &str) -> Self {
        Self {
            dialog_type,
            title: title.to_string(),
            message: message.to_string(),
            input: TextInput::default(),
            selected_button: 0,
            target: None,
        }
    }

    fn prompt(dialog_type: DialogType, title: &str, message: &str, initial: &str, target: Option<PathBuf>) -> Self {
        Self {
            input: TextInput::new(initial),
            target,
            ..Self::notice(dialog_type, title, message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: MessageLevel,
    expires: Instant,
}

/// Status bar text: a persistent message (the current path) that transient
/// messages temporarily replace.
#[derive(Debug, Default)]
pub struct StatusLine {
    persistent: String,
    transient: Option<StatusMessage>,
}

impl StatusLine {
    pub fn set_persistent(&mut self, text: &str) {
        self.persistent = text.to_string();
    }

    pub fn show(&mut self, text: &str, level: MessageLevel, duration: Duration) {
        self.transient = Some(StatusMessage {
            text: text.to_string(),
            level,
            expires: Instant::now() + duration,
        });
    }

    pub fn expire(&mut self, now: Instant) {
        if self.transient.as_ref().is_some_and(|m| now >= m.expires) {
            self.transient = None;
        }
    }

    pub fn transient(&self) -> Option<&StatusMessage> {
        self.transient.as_ref()
    }

    /// Text to display now, with its level.
    pub fn current(&self) -> (&str, MessageLevel) {
        match &self.transient {
            Some(m) if Instant::now() < m.expires => (m.text.as_str(), m.level),
            _ => (self.persistent.as_str(), MessageLevel::Info),
        }
    }
}

#[derive(Debug, Default)]
pub struct HelpState {
    pub scroll_offset: usize,
    pub visible_height: usize,
    pub max_scroll: usize,
}

/// Geometry of the last drawn frame, used to route mouse events and to
/// size page movements.
#[derive(Debug, Clone)]
pub struct LayoutCache {
    pub screen: Rect,
    pub tree: Rect,
    /// Listing rows, below the header.
    pub listing: Rect,
    pub listing_columns: usize,
    pub listing_cell_width: u16,
    pub listing_first: usize,
    pub preview: Rect,
    pub address: Rect,
    pub search: Rect,
    pub buttons: Vec<(Rect, BrowserAction)>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self {
            screen: Rect::default(),
            tree: Rect::default(),
            listing: Rect::default(),
            listing_columns: 1,
            listing_cell_width: 0,
            listing_first: 0,
            preview: Rect::default(),
            address: Rect::default(),
            search: Rect::default(),
            buttons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Listing(usize),
}

pub struct App {
    pub navigator: Navigator,
    pub entries: Vec<DirectoryEntry>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub sort_key: SortKey,
    pub view_mode: ViewMode,
    pub show_hidden: bool,
    pub search_limit: usize,

    pub focus: Focus,
    pub tree: TreeState,
    pub preview: Preview,
    pub preview_scroll: u16,
    pub preview_max_scroll: u16,
    pub address: TextInput,
    pub search_input: TextInput,

    pub status: StatusLine,
    pub dialog: Option<Dialog>,
    pub context_menu: Option<ContextMenuState>,
    pub show_help: bool,
    pub help_state: HelpState,

    pub theme: Theme,
    pub keybindings: Keybindings,
    pub settings: Settings,
    pub layout: LayoutCache,
    last_click: Option<(ClickTarget, Instant)>,
}

impl App {
    pub fn new(start: PathBuf, settings: Settings, theme: Theme) -> Self {
        let tree = TreeState::new(TreeState::root_for(&start), settings.show_hidden);
        let mut app = Self {
            navigator: Navigator::new(start),
            entries: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            sort_key: settings.sort_by,
            view_mode: settings.view_mode,
            show_hidden: settings.show_hidden,
            search_limit: settings.search_limit,
            focus: Focus::Listing,
            tree,
            preview: Preview::Empty,
            preview_scroll: 0,
            preview_max_scroll: 0,
            address: TextInput::default(),
            search_input: TextInput::default(),
            status: StatusLine::default(),
            dialog: None,
            context_menu: None,
            show_help: false,
            help_state: HelpState::default(),
            theme,
            keybindings: Keybindings::from_config(&settings.keybindings),
            settings,
            layout: LayoutCache::default(),
            last_click: None,
        };
        app.after_directory_change(None);
        app
    }

    pub fn current_path(&self) -> &Path {
        self.navigator.current()
    }

    pub fn selected_entry(&self) -> Option<&DirectoryEntry> {
        self.entries.get(self.selected_index)
    }

    // ========== Listing & preview ==========

    /// Re-enumerate the current directory. `focus_name` selects that entry
    /// when present; otherwise the selection index is clamped.
    fn load_listing(&mut self, focus_name: Option<&str>) {
        let dir = self.current_path().to_path_buf();
        self.entries = match directory::list_directory(&dir, self.sort_key, self.show_hidden) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "listing failed");
                self.status.show(&e.to_string(), MessageLevel::Warning, MESSAGE_DURATION);
                Vec::new()
            }
        };

        if let Some(idx) = focus_name.and_then(|name| self.entries.iter().position(|e| e.name == name)) {
            self.selected_index = idx;
        }
        self.selected_index = self.selected_index.min(self.entries.len().saturating_sub(1));
        self.update_preview();
    }

    /// Recompute the preview for the selected entry.
    pub fn update_preview(&mut self) {
        self.preview = match self.selected_entry() {
            Some(entry) => build_preview(&entry.path),
            None => Preview::Empty,
        };
        self.preview_scroll = 0;
    }

    pub fn select_index(&mut self, index: usize) {
        if self.entries.is_empty() {
            return;
        }
        let index = index.min(self.entries.len() - 1);
        if index != self.selected_index || self.preview == Preview::Empty {
            self.selected_index = index;
            self.update_preview();
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let last = (self.entries.len() - 1) as isize;
        let target = (self.selected_index as isize + delta).clamp(0, last);
        self.select_index(target as usize);
    }

    fn listing_page(&self) -> isize {
        let rows = self.layout.listing.height.max(1) as usize;
        (rows * self.layout.listing_columns.max(1)) as isize
    }

    pub fn scroll_preview(&mut self, delta: i32) {
        let next = (self.preview_scroll as i32 + delta).clamp(0, self.preview_max_scroll as i32);
        self.preview_scroll = next as u16;
    }

    // ========== Navigation ==========

    /// Redisplay everything that depends on the current directory.
    fn after_directory_change(&mut self, focus_name: Option<&str>) {
        let current = self.current_path().to_path_buf();
        let display = current.display().to_string();
        self.selected_index = 0;
        self.scroll_offset = 0;
        self.context_menu = None;
        self.load_listing(focus_name);
        self.tree.reveal(&current);
        self.address.set(&display);
        self.status.set_persistent(&display);
    }

    fn name_of(path: &Path) -> Option<String> {
        path.file_name().map(|n| n.to_string_lossy().to_string())
    }

    /// Change directory without touching history. Invalid targets leave
    /// the state unchanged.
    pub fn change_directory(&mut self, path: &Path) -> bool {
        self.change_directory_selecting(path, None)
    }

    fn change_directory_selecting(&mut self, path: &Path, select: Option<&str>) -> bool {
        match self.navigator.change_directory(path) {
            Ok(()) => {
                self.after_directory_change(select);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "change directory rejected");
                false
            }
        }
    }

    /// Push the current directory to history, then change to `path`.
    pub fn navigate_forward(&mut self, path: &Path) -> bool {
        match self.navigator.navigate_forward(path) {
            Ok(()) => {
                self.after_directory_change(None);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "navigation rejected");
                false
            }
        }
    }

    pub fn go_back(&mut self) -> bool {
        let from = Self::name_of(self.current_path());
        if !self.navigator.go_back() {
            return false;
        }
        self.after_directory_change(from.as_deref());
        true
    }

    pub fn go_up(&mut self) -> bool {
        let from = Self::name_of(self.current_path());
        if !self.navigator.go_up() {
            return false;
        }
        self.after_directory_change(from.as_deref());
        true
    }

    /// Re-read the current directory and the folder tree.
    fn reload(&mut self, focus_name: Option<&str>) {
        let keep = focus_name
            .map(str::to_string)
            .or_else(|| self.selected_entry().map(|e| e.name.clone()));
        self.load_listing(keep.as_deref());
        self.tree.invalidate();
        let current = self.current_path().to_path_buf();
        self.tree.reveal(&current);
    }

    pub fn refresh(&mut self) {
        self.reload(None);
        self.status.show("Refreshed", MessageLevel::Info, REFRESH_MESSAGE_DURATION);
    }

    /// Resolve typed address-bar text: `~` is the home directory, relative
    /// input is taken from the current directory.
    pub fn resolve_address(&self, input: &str) -> PathBuf {
        let home = dirs::home_dir();
        let path = match (input, home) {
            ("~", Some(home)) => home,
            (s, Some(home)) if s.starts_with("~/") => home.join(&s[2..]),
            (s, _) => {
                let p = PathBuf::from(s);
                if p.is_absolute() {
                    p
                } else {
                    self.current_path().join(p)
                }
            }
        };
        path.canonicalize().unwrap_or(path)
    }

    /// Address bar Enter.
    pub fn execute_goto(&mut self, input: &str) {
        let input = input.trim();
        self.focus = Focus::Listing;
        if input.is_empty() {
            self.address.set(&self.current_path().display().to_string());
            return;
        }
        let target = self.resolve_address(input);
        if !target.is_dir() || !self.change_directory(&target) {
            let err = BrowserError::InvalidPath(PathBuf::from(input));
            tracing::warn!(error = %err, "address rejected");
            self.status.show(&err.to_string(), MessageLevel::Warning, MESSAGE_DURATION);
            self.address.set(&self.current_path().display().to_string());
        }
    }

    // ========== Dialog helpers ==========

    fn show_notice(&mut self, dialog_type: DialogType, title: &str, message: &str) {
        self.dialog = Some(Dialog::notice(dialog_type, title, message));
    }

    pub fn show_info(&mut self, title: &str, message: &str) {
        self.show_notice(DialogType::Info, title, message);
    }

    fn show_error(&mut self, title: &str, err: &BrowserError) {
        tracing::warn!(title, error = %err, "operation failed");
        let message = match err {
            BrowserError::Io { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        self.show_notice(DialogType::Error, title, &message);
    }

    // ========== File operations ==========

    pub fn start_mkdir(&mut self) {
        self.dialog = Some(Dialog::prompt(DialogType::Mkdir, "New Folder", "Folder name:", "", None));
    }

    pub fn execute_mkdir(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        let parent = self.current_path().to_path_buf();
        match file_ops::create_directory(&parent, name) {
            Ok(path) => {
                self.reload(Some(name));
                self.status.show(
                    &format!("Created folder: {}", path.display()),
                    MessageLevel::Info,
                    MESSAGE_DURATION,
                );
            }
            Err(e) if e.is_already_exists() => {
                tracing::warn!(error = %e, "create folder");
                self.show_notice(DialogType::Warning, "Exists", "Folder already exists.");
            }
            Err(e) => self.show_error("Error", &e),
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(path) = self.selected_entry().map(|e| e.path.clone()) else {
            self.show_info("Delete", "No file or folder selected.");
            return;
        };
        let mut dialog = Dialog::notice(
            DialogType::Delete,
            "Confirm Delete",
            &format!("Delete '{}'?", path.display()),
        );
        dialog.selected_button = 1;
        dialog.target = Some(path);
        self.dialog = Some(dialog);
    }

    pub fn execute_delete(&mut self, path: &Path) {
        match file_ops::delete_entry(path) {
            Ok(()) => {
                self.reload(None);
                self.status.show(
                    &format!("Deleted: {}", path.display()),
                    MessageLevel::Info,
                    MESSAGE_DURATION,
                );
            }
            Err(e) => self.show_error("Delete Error", &e),
        }
    }

    pub fn start_rename(&mut self) {
        let Some(entry) = self.selected_entry() else {
            self.show_info("Rename", "No file or folder selected.");
            return;
        };
        let (name, path) = (entry.name.clone(), entry.path.clone());
        self.dialog = Some(Dialog::prompt(DialogType::Rename, "Rename", "New name:", &name, Some(path)));
    }

    pub fn execute_rename(&mut self, path: &Path, new_name: &str) {
        match file_ops::rename_entry(path, new_name) {
            Ok(Some(new_path)) => {
                self.reload(Some(new_name));
                self.status.show(
                    &format!("Renamed to: {}", new_path.display()),
                    MessageLevel::Info,
                    MESSAGE_DURATION,
                );
            }
            Ok(None) => {}
            Err(e) => self.show_error("Rename Error", &e),
        }
    }

    pub fn open_selected(&mut self) {
        let Some(path) = self.selected_entry().map(|e| e.path.clone()) else {
            self.show_info("Open", "No file selected.");
            return;
        };
        self.open_path(&path);
    }

    /// Directories are entered, files go to the default application.
    pub fn open_path(&mut self, path: &Path) {
        if path.is_dir() {
            self.navigate_forward(path);
            return;
        }
        if let Err(e) = file_ops::open_with_default(path) {
            self.show_error("Open Error", &e);
        }
    }

    pub fn show_properties(&mut self, path: &Path) {
        let lines = Properties::read(path).lines();
        let mut dialog = Dialog::notice(DialogType::Properties, "Properties", &lines.join("\n"));
        dialog.target = Some(path.to_path_buf());
        self.dialog = Some(dialog);
    }

    fn show_selected_properties(&mut self) {
        match self.selected_entry().map(|e| e.path.clone()) {
            Some(path) => self.show_properties(&path),
            None => self.show_info("Properties", "No file or folder selected."),
        }
    }

    // ========== Search ==========

    pub fn execute_search(&mut self, pattern: &str) {
        self.focus = Focus::Listing;
        let pattern = pattern.trim();
        let root = self.current_path().to_path_buf();
        match search::search(pattern, &root, self.search_limit, self.show_hidden) {
            Err(e) => self.show_error("Search", &e),
            Ok(matches) if matches.is_empty() => {
                self.show_info("Search", "No files matched your query.");
            }
            Ok(matches) => {
                let first = &matches[0];
                if let Some(dir) = first.parent() {
                    let name = Self::name_of(first);
                    self.change_directory_selecting(dir, name.as_deref());
                }
                self.status.show(
                    &format!("Found {} file(s). Showing directory of first match.", matches.len()),
                    MessageLevel::Info,
                    MESSAGE_DURATION,
                );
            }
        }
    }

    // ========== Sorting & view ==========

    pub fn set_sort(&mut self, key: SortKey) {
        self.sort_key = key;
        let keep = self.selected_entry().map(|e| e.path.clone());
        directory::sort_entries(&mut self.entries, key);
        if let Some(idx) = keep.and_then(|p| self.entries.iter().position(|e| e.path == p)) {
            self.selected_index = idx;
        }
        tracing::debug!(sort = key.label(), "sort changed");
    }

    pub fn cycle_sort(&mut self) {
        self.set_sort(self.sort_key.next());
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = self.view_mode.toggled();
        if self.view_mode == ViewMode::List {
            self.layout.listing_columns = 1;
        }
    }

    // ========== Focus ==========

    pub fn focus_address(&mut self) {
        self.address.set(&self.current_path().display().to_string());
        self.focus = Focus::Address;
    }

    pub fn focus_search(&mut self) {
        let text = self.search_input.text().to_string();
        self.search_input.set(&text);
        self.focus = Focus::Search;
    }

    /// Leave a text field without applying it.
    pub fn cancel_text_input(&mut self) {
        if self.focus == Focus::Address {
            self.address.set(&self.current_path().display().to_string());
        }
        self.focus = Focus::Listing;
    }

    // ========== Context menu ==========

    pub fn open_context_menu(&mut self, x: u16, y: u16) {
        let Some(path) = self.selected_entry().map(|e| e.path.clone()) else {
            return;
        };
        self.context_menu = Some(ContextMenuState::new(x, y, path));
    }

    /// Menu anchored next to the selected listing row.
    fn open_context_menu_at_selection(&mut self) {
        let area = self.layout.listing;
        let columns = self.layout.listing_columns.max(1);
        let offset = self.selected_index.saturating_sub(self.layout.listing_first);
        let row = (offset / columns) as u16;
        let col = (offset % columns) as u16;
        let x = area.x + col * self.layout.listing_cell_width + 2;
        let y = area.y + row.min(area.height.saturating_sub(1)) + 1;
        self.open_context_menu(x, y);
    }

    pub fn execute_context_action(&mut self, action: ContextAction, target: &Path) {
        self.context_menu = None;
        match action {
            ContextAction::Open => self.open_path(target),
            ContextAction::Rename => self.start_rename(),
            ContextAction::Delete => self.confirm_delete(),
            ContextAction::Properties => self.show_properties(target),
        }
    }

    // ========== Mouse helpers ==========

    /// Record a click; returns `true` when it completes a double click on
    /// the same target.
    pub fn register_click(&mut self, target: ClickTarget) -> bool {
        let now = Instant::now();
        let double = matches!(
            self.last_click,
            Some((prev, at)) if prev == target && now.duration_since(at) <= DOUBLE_CLICK_INTERVAL
        );
        self.last_click = if double { None } else { Some((target, now)) };
        double
    }

    /// Activate the selected tree row: forward navigation to that folder.
    pub fn activate_tree_selection(&mut self) {
        let Some(path) = self.tree.selected_path().map(Path::to_path_buf) else {
            return;
        };
        if path != self.current_path() {
            self.navigate_forward(&path);
        }
    }

    // ========== Dispatch ==========

    /// Run a browser action. Returns `true` when the application should quit.
    pub fn dispatch(&mut self, action: BrowserAction) -> bool {
        use BrowserAction::*;
        let grid = self.view_mode == ViewMode::Grid;
        let columns = self.layout.listing_columns.max(1) as isize;

        match action {
            Quit => return true,
            Help => {
                self.help_state.scroll_offset = 0;
                self.show_help = true;
            }
            MoveUp | MoveDown => {
                let down = action == MoveDown;
                match self.focus {
                    Focus::Tree => self.tree.move_by(if down { 1 } else { -1 }),
                    Focus::Preview => self.scroll_preview(if down { 1 } else { -1 }),
                    _ => {
                        let step = if grid { columns } else { 1 };
                        self.move_selection(if down { step } else { -step });
                    }
                }
            }
            MoveLeft | MoveRight => {
                let right = action == MoveRight;
                match self.focus {
                    Focus::Tree if right => self.tree.expand_selected(),
                    Focus::Tree => self.tree.collapse_selected(),
                    Focus::Listing if grid => self.move_selection(if right { 1 } else { -1 }),
                    _ => {}
                }
            }
            PageUp | PageDown => {
                let down = action == PageDown;
                match self.focus {
                    Focus::Tree => {
                        let page = self.tree.page();
                        self.tree.move_by(if down { page } else { -page });
                    }
                    Focus::Preview => {
                        let page = self.layout.preview.height.max(1) as i32;
                        self.scroll_preview(if down { page } else { -page });
                    }
                    _ => {
                        let page = self.listing_page();
                        self.move_selection(if down { page } else { -page });
                    }
                }
            }
            GoFirst | GoLast => {
                let last = action == GoLast;
                match self.focus {
                    Focus::Tree if last => self.tree.select_last(),
                    Focus::Tree => self.tree.select_first(),
                    Focus::Preview => {
                        self.preview_scroll = if last { self.preview_max_scroll } else { 0 };
                    }
                    _ if last => self.select_index(self.entries.len().saturating_sub(1)),
                    _ => self.select_index(0),
                }
            }
            Open => match self.focus {
                Focus::Tree => self.activate_tree_selection(),
                _ => self.open_selected(),
            },
            Back => {
                self.go_back();
            }
            Up => {
                self.go_up();
            }
            Refresh => self.refresh(),
            NewFolder => self.start_mkdir(),
            Delete => self.confirm_delete(),
            Rename => self.start_rename(),
            Properties => self.show_selected_properties(),
            ToggleView => self.toggle_view(),
            FocusAddress => self.focus_address(),
            FocusSearch => self.focus_search(),
            CycleSort => self.cycle_sort(),
            SortByName => self.set_sort(SortKey::Name),
            SortBySize => self.set_sort(SortKey::Size),
            SortByType => self.set_sort(SortKey::Type),
            SortByDate => self.set_sort(SortKey::Modified),
            ContextMenu => self.open_context_menu_at_selection(),
            SwitchFocus => {
                self.focus = self.focus.next_pane();
            }
            PreviewScrollUp => self.scroll_preview(-1),
            PreviewScrollDown => self.scroll_preview(1),
        }
        false
    }

    /// Persist the sort key and view mode chosen during the session.
    pub fn save_settings(&mut self) {
        self.settings.sort_by = self.sort_key;
        self.settings.view_mode = self.view_mode;
        if let Err(e) = self.settings.save() {
            tracing::warn!(error = %e, "could not save settings");
        }
    }
}
