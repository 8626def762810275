mod app;
pub mod config;
mod effects;
mod render;

pub use app::{run_app, RunSummary};
