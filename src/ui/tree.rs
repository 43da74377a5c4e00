use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::theme::Theme;
use crate::services::directory::list_subdirectories;
use crate::utils::format::{pad_to_display_width, truncate_to_display_width};

/// One visible line of the folder tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub path: PathBuf,
    pub name: String,
    pub depth: usize,
    pub expanded: bool,
}

/// Folder tree with lazily listed children.
///
/// Children of a directory are read the first time it is expanded and kept
/// until `invalidate`. `rows` is the flattened visible tree.
#[derive(Debug)]
pub struct TreeState {
    root: PathBuf,
    show_hidden: bool,
    expanded: HashSet<PathBuf>,
    children: HashMap<PathBuf, Vec<PathBuf>>,
    pub rows: Vec<TreeRow>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub visible_height: usize,
}

impl TreeState {
    pub fn new(root: PathBuf, show_hidden: bool) -> Self {
        let mut state = Self {
            expanded: HashSet::from([root.clone()]),
            root,
            show_hidden,
            children: HashMap::new(),
            rows: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            visible_height: 1,
        };
        state.rebuild();
        state
    }

    /// Home directory when `start` lies below it, else the filesystem root
    /// above `start`.
    pub fn root_for(start: &Path) -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            if start.starts_with(&home) {
                return home;
            }
        }
        start.ancestors().last().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"))
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.rows.get(self.selected_index).map(|r| r.path.as_path())
    }

    fn children_of(&mut self, dir: &Path) -> Vec<PathBuf> {
        if let Some(cached) = self.children.get(dir) {
            return cached.clone();
        }
        let listed = list_subdirectories(dir, self.show_hidden);
        self.children.insert(dir.to_path_buf(), listed.clone());
        listed
    }

    fn push_rows(&mut self, dir: &Path, depth: usize, out: &mut Vec<TreeRow>) {
        for child in self.children_of(dir) {
            let expanded = self.expanded.contains(&child);
            out.push(TreeRow {
                name: child
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                path: child.clone(),
                depth,
                expanded,
            });
            if expanded {
                self.push_rows(&child, depth + 1, out);
            }
        }
    }

    /// Flatten the expanded part of the tree into `rows`, keeping the
    /// selected path selected when it is still visible.
    pub fn rebuild(&mut self) {
        let selected = self.selected_path().map(Path::to_path_buf);
        let root = self.root.clone();
        let root_expanded = self.expanded.contains(&root);
        let mut rows = vec![TreeRow {
            name: root.display().to_string(),
            path: root.clone(),
            depth: 0,
            expanded: root_expanded,
        }];
        if root_expanded {
            self.push_rows(&root, 1, &mut rows);
        }
        self.rows = rows;

        self.selected_index = selected
            .and_then(|p| self.rows.iter().position(|r| r.path == p))
            .unwrap_or(0)
            .min(self.rows.len().saturating_sub(1));
    }

    /// Forget cached children, e.g. after folders were created, renamed or
    /// deleted.
    pub fn invalidate(&mut self) {
        self.children.clear();
        self.expanded.retain(|p| p.is_dir());
        self.rebuild();
    }

    /// Expand every ancestor of `path` and select it. A path outside the
    /// current root re-roots the tree at the filesystem root.
    pub fn reveal(&mut self, path: &Path) {
        if !path.starts_with(&self.root) {
            let fs_root = path
                .ancestors()
                .last()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/"));
            self.root = fs_root;
        }
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.starts_with(&self.root) {
                break;
            }
            self.expanded.insert(ancestor.to_path_buf());
        }
        self.expanded.insert(self.root.clone());
        self.rebuild();

        // Hidden directories are not rows; fall back to the closest ancestor
        if let Some(idx) = path
            .ancestors()
            .find_map(|a| self.rows.iter().position(|r| r.path == a))
        {
            self.selected_index = idx;
        }
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        let target = self.selected_index as isize + delta;
        self.selected_index = target.clamp(0, last as isize) as usize;
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.rows.len().saturating_sub(1);
    }

    pub fn page(&self) -> isize {
        self.visible_height.saturating_sub(1).max(1) as isize
    }

    /// Expand the selected folder, or step into its first child when it is
    /// already expanded.
    pub fn expand_selected(&mut self) {
        let Some(row) = self.rows.get(self.selected_index).cloned() else {
            return;
        };
        if !row.expanded {
            self.expanded.insert(row.path);
            self.rebuild();
        } else if self
            .rows
            .get(self.selected_index + 1)
            .is_some_and(|next| next.depth > row.depth)
        {
            self.selected_index += 1;
        }
    }

    /// Collapse the selected folder, or move to its parent row when it is
    /// already collapsed.
    pub fn collapse_selected(&mut self) {
        let Some(row) = self.rows.get(self.selected_index).cloned() else {
            return;
        };
        if row.expanded {
            self.expanded.remove(&row.path);
            self.rebuild();
            return;
        }
        if let Some(parent_idx) = self.rows[..self.selected_index]
            .iter()
            .rposition(|r| r.depth + 1 == row.depth)
        {
            self.selected_index = parent_idx;
        }
    }

    /// Row index under a screen row of the last drawn frame.
    pub fn row_at(&self, offset_in_view: usize) -> Option<usize> {
        let idx = self.scroll_offset + offset_in_view;
        (idx < self.rows.len()).then_some(idx)
    }
}

pub fn draw(frame: &mut Frame, tree: &mut TreeState, area: Rect, focused: bool, theme: &Theme) {
    let block = Block::default()
        .title(" Folders ")
        .title_style(theme.title_style(focused))
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width < 4 {
        return;
    }

    let visible_height = inner.height as usize;
    tree.visible_height = visible_height;
    let total = tree.rows.len();

    // Keep the cursor in view, centring it when it jumped out of range
    let start = if total <= visible_height {
        0
    } else if tree.selected_index >= tree.scroll_offset
        && tree.selected_index < tree.scroll_offset + visible_height
    {
        tree.scroll_offset.min(total - visible_height)
    } else {
        tree.selected_index
            .saturating_sub(visible_height / 2)
            .min(total - visible_height)
    };
    tree.scroll_offset = start;

    let width = inner.width.saturating_sub(1) as usize;
    for (i, row) in tree.rows.iter().enumerate().skip(start).take(visible_height) {
        let marker = if row.expanded { theme.chars.expanded } else { theme.chars.collapsed };
        let indent = "  ".repeat(row.depth);
        let text = truncate_to_display_width(&format!("{}{} {}", indent, marker, row.name), width);
        let style = if i == tree.selected_index && focused {
            theme.selected_style()
        } else if i == tree.selected_index {
            Style::default()
                .fg(theme.panel.directory_text)
                .bg(theme.panel.header_bg_active)
        } else {
            theme.directory_style()
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(pad_to_display_width(&text, width), style))),
            Rect::new(inner.x, inner.y + (i - start) as u16, inner.width.saturating_sub(1), 1),
        );
    }

    if total > visible_height {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut state = ScrollbarState::new(total).position(tree.selected_index);
        frame.render_stateful_widget(
            scrollbar,
            Rect::new(inner.x + inner.width - 1, inner.y, 1, inner.height),
            &mut state,
        );
    }
}
