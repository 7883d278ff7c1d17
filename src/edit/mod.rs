//! Editing state: history, previews, floating selections, and tools

pub mod history;
pub mod preview;
pub mod selection;
pub mod tool;

pub use history::{EditHistory, HistoryEntry};
pub use preview::{PreviewMode, PreviewOverlay};
pub use selection::FloatingSelection;
pub use tool::ToolKind;
