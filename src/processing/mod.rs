//! Text processing and scoring module

pub mod analyzer;
pub mod features;
pub mod format_inspector;
pub mod keyword_matcher;
pub mod layout;
pub mod scoring;
pub mod text_processor;

pub use analyzer::{analyze, AnalysisResult, Analyzer};
