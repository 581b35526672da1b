//! Structured error types for the Folio pagination engine.
//!
//! Only configuration problems are fatal. Structural oddities in a page
//! master (no body region, multi-column with scrolling overflow) are logged
//! and layout continues; lookup misses are plain `None`s.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// The unified error type returned by the public Folio API.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The selected page master's body region does not carry the content
    /// flow's name. Aborts the page sequence.
    #[error("Flow '{flow}' does not map to the region-body '{region}' in page-master '{master}'")]
    Configuration {
        flow: String,
        region: String,
        master: String,
    },

    /// The master sequencing policy had no alternative for this page.
    #[error("No page master matches page {page_number}")]
    NoMatchingMaster { page_number: u32 },

    /// A sequence referenced a page master by a name nobody declared.
    #[error("Unknown page master: {0}")]
    UnknownMaster(String),

    /// Normal-flow content was placed on a page whose master has no body.
    #[error("Page master '{master}' has no region-body; normal flow content cannot be placed")]
    MissingBody { master: String },

    /// JSON input failed to parse as a valid Folio document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {hint}")
    }
}

impl LayoutError {
    /// Whether this error aborts the page sequence it occurred in.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LayoutError::Parse { .. })
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the Folio document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        LayoutError::Parse { source: e, hint }
    }
}
