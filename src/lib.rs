pub mod api;
pub mod cli;
pub mod core;
pub mod format;
pub mod input;
pub mod logging;
