pub mod directory;
pub mod file_ops;
pub mod navigation;
pub mod preview;
pub mod search;
