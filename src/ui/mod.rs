pub mod app;
pub mod context_menu;
pub mod dialogs;
pub mod draw;
pub mod events;
pub mod help;
pub mod input;
pub mod panel;
pub mod preview_pane;
pub mod theme;
pub mod toolbar;
pub mod tree;
