//! Application shell.
//!
//! Wires the session, the on-disk history slot and the map synchronizer
//! together for the command-line binary, and renders results to the console.

mod history;
mod locate;
mod render;

// Re-export public API
pub use history::{
    clear_history, delete_from_history, list_history, open_history, remove_entries, HistoryReport,
};
pub use locate::{locate_with, run_locate, LocateReport};
pub use render::{print_history, print_history_report, print_locate_report};
