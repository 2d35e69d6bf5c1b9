//! Input processing module
//! Handles document loading, file detection, text extraction and PDF layout extraction

pub mod document;
pub mod file_detector;
pub mod layout_extractor;
pub mod manager;
pub mod text_extractor;

pub use document::ResumeDocument;
pub use manager::InputManager;
