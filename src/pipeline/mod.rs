pub mod acquire;
pub mod cards;
pub mod deliver;
pub mod extract;
pub mod orchestrator;
pub mod render;
pub mod summarize;

pub use cards::{InsightCard, summary_to_cards};
pub use orchestrator::{Pipeline, RunReport, run_daily_report};
pub use render::{escape_html, render_html};
