use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConversionError;

// ============================================================================
// Conversion Mode
// ============================================================================

/// Direction of a conversion. Each mode also names one conversion slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    PdfToDocx,
    DocxToPdf,
}

impl ConversionMode {
    pub fn input_extension(self) -> &'static str {
        match self {
            ConversionMode::PdfToDocx => "pdf",
            ConversionMode::DocxToPdf => "docx",
        }
    }

    pub fn output_extension(self) -> &'static str {
        match self {
            ConversionMode::PdfToDocx => "docx",
            ConversionMode::DocxToPdf => "pdf",
        }
    }

    /// Human name of the input format, as shown in dialogs.
    pub fn input_kind(self) -> &'static str {
        match self {
            ConversionMode::PdfToDocx => "PDF",
            ConversionMode::DocxToPdf => "DOCX",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConversionMode::PdfToDocx => "PDF → DOCX",
            ConversionMode::DocxToPdf => "DOCX → PDF",
        }
    }

    /// File dialog filter name for the input side.
    pub fn input_filter_name(self) -> &'static str {
        match self {
            ConversionMode::PdfToDocx => "PDF Files",
            ConversionMode::DocxToPdf => "Word Files",
        }
    }

    /// File dialog filter name for the output side.
    pub fn output_filter_name(self) -> &'static str {
        match self {
            ConversionMode::PdfToDocx => "DOCX Files",
            ConversionMode::DocxToPdf => "PDF Files",
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Request and Events
// ============================================================================

/// One conversion job. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    mode: ConversionMode,
    input_path: PathBuf,
    output_path: PathBuf,
}

impl ConversionRequest {
    pub fn new(mode: ConversionMode, input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

pub const SUCCESS_MESSAGE: &str = "Conversion completed successfully.";
pub const FAILURE_PREFIX: &str = "Conversion failed: ";

/// Terminal outcome of a request. Exactly one is emitted per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEvent {
    pub success: bool,
    pub message: String,
}

impl ResultEvent {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failed(err: &ConversionError) -> Self {
        Self {
            success: false,
            message: format!("{}{}", FAILURE_PREFIX, err),
        }
    }

    /// Value the progress bar settles on once the result arrives.
    pub fn final_progress(&self) -> u8 {
        if self.success {
            100
        } else {
            0
        }
    }
}

/// Items sent from the worker thread to the controller, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Progress(u8),
    Finished(ResultEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serializes_snake_case() {
        let json = serde_json::to_string(&ConversionMode::PdfToDocx).unwrap();
        assert_eq!(json, "\"pdf_to_docx\"");
        let mode: ConversionMode = serde_json::from_str("\"docx_to_pdf\"").unwrap();
        assert_eq!(mode, ConversionMode::DocxToPdf);
    }

    #[test]
    fn test_extensions_are_swapped() {
        for mode in [ConversionMode::PdfToDocx, ConversionMode::DocxToPdf] {
            assert_ne!(mode.input_extension(), mode.output_extension());
        }
        assert_eq!(ConversionMode::PdfToDocx.output_extension(), ConversionMode::DocxToPdf.input_extension());
    }

    #[test]
    fn test_failed_result_carries_prefix() {
        let result = ResultEvent::failed(&ConversionError::Render(3));
        assert!(!result.success);
        assert!(result.message.starts_with("Conversion failed:"));
        assert!(result.message.contains('3'));
        assert_eq!(result.final_progress(), 0);
        assert_eq!(ResultEvent::succeeded().final_progress(), 100);
    }
}
