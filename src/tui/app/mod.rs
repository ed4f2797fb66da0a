//! Application state, event handling, and rendering

pub mod async_ops;
mod commands;
mod core;
mod events;
pub(crate) mod rendering;
pub mod state;

pub use async_ops::{dispatch_command, Command, DiffScope, ExternalRequest};
pub use core::{App, ListEntry};
