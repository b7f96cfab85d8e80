//! Output rendering (terminal text, JSON reports)

pub mod report;
pub mod text;

pub use report::{report_value, write_report, ReportOptions};
pub use text::{render_identifier, render_report, render_selection};
