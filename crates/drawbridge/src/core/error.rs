//! Core error types for diagram processing
//!
//! Parsers in this crate are permissive and never fail on odd lines; these
//! errors cover the conditions the orchestration layer refuses to continue
//! from, timelines too long to lay out, plus I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for diagram processing
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("No task data could be parsed; check the table header and column layout")]
    NoTasks,

    #[error("Input file '{}' does not exist", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Layout error: {message}")]
    LayoutError { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new layout error
    pub fn layout_error(message: String) -> Self {
        Self::LayoutError { message }
    }

    /// Create a new render error
    pub fn render_error(message: String) -> Self {
        Self::RenderError { message }
    }

    /// Create a new database error
    pub fn database_error(message: String) -> Self {
        Self::DatabaseError { message }
    }

    /// Create a new missing-input error
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    /// Whether this error describes bad user input rather than a fault
    ///
    /// The CLI prints these as a single line; anything else gets the full
    /// error chain. Layout errors only come from out-of-range months.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::NoTasks
                | Self::InputNotFound { .. }
                | Self::LayoutError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_error() {
        let error = DiagramError::layout_error("Layout failed".to_string());
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Layout error"));
        assert!(error_msg.contains("Layout failed"));
    }

    #[test]
    fn test_render_error() {
        let error = DiagramError::render_error("Render failed".to_string());
        assert!(error.to_string().contains("Render error"));
    }

    #[test]
    fn test_database_error() {
        let error = DiagramError::database_error("unknown task".to_string());
        assert!(error.to_string().contains("Database error"));
    }

    #[test]
    fn test_input_not_found() {
        let error = DiagramError::input_not_found("missing.txt");
        assert_eq!(error.to_string(), "Input file 'missing.txt' does not exist");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_user_errors() {
        assert!(DiagramError::EmptyInput.is_user_error());
        assert!(DiagramError::NoTasks.is_user_error());
        assert!(DiagramError::layout_error("x".to_string()).is_user_error());
        assert!(!DiagramError::render_error("x".to_string()).is_user_error());
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: DiagramError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }
}
