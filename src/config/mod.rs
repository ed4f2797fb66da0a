//! Configuration module
//!
//! Loads and persists the argonaut configuration file (theme selection and
//! default view). Paths follow the XDG base directory spec.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{AppearanceConfig, Config};
