//! Report rendering modules.
//!
//! Terminal, Markdown and JSON views of the dashboard, plus the
//! render-time formatting contract.

pub mod format;
pub mod generator;

pub use generator::{build_report, generate_json_report, generate_markdown_report, render_dashboard};
