//! Service layer
//!
//! Pure logic shared by the TUI handlers: drill-down navigation rules and
//! client-side diff computation.

pub mod diff;
pub mod navigation;

pub use navigation::{NavigationResult, NavigationService};
