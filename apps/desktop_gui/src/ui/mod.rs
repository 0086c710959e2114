//! UI layer for desktop GUI: entry screen, user grid, edit modal and notices.

pub mod app;

pub use app::{StartupConfig, UserDeskApp};
