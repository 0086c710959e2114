//! Backend worker: performs directory requests and avatar downloads off the UI thread.

pub mod commands;
pub mod runtime;
