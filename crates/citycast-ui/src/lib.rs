//! Presentation layer for citycast: view models for the city list and detail
//! view, the page controller that owns them, and a plain-text renderer.

pub mod command;
pub mod error_mapping;
pub mod models;
pub mod render;

pub use command::{Command, HELP_TEXT};
pub use models::{PageModel, PageSnapshot, ViewState};
pub use render::render;
