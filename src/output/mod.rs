//! Report construction and rendering

pub mod formatter;
pub mod report;

pub use formatter::{report_destination, save_report_to_file, suggest_filename, OutputFormatter, ReportGenerator};
pub use report::{ScoreBand, ScoreReport};
