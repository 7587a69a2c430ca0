use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::docx_html::DocxHtmlConverter;
use crate::error::ConversionError;
use crate::tools::{Pdf2DocxCli, WkhtmltopdfRenderer};

/// Converts a PDF file into a DOCX file.
///
/// `on_page(current, total)` is called after each processed page. `total` is
/// `None` when the converter cannot tell how many pages remain.
pub trait PdfToDocxBackend: Send + Sync {
    fn convert(
        &self,
        pdf_path: &Path,
        docx_path: &Path,
        on_page: &mut dyn FnMut(u32, Option<u32>),
    ) -> Result<(), ConversionError>;
}

/// HTML fragment produced from a DOCX document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlOutput {
    pub html: String,
    /// Non-fatal messages about content that could not be carried over.
    pub warnings: Vec<String>,
}

/// Converts raw DOCX bytes into an HTML fragment.
pub trait DocxToHtmlBackend: Send + Sync {
    fn convert(&self, docx: &[u8]) -> Result<HtmlOutput, ConversionError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub errors: usize,
}

/// Renders a complete HTML document as PDF into `dest`.
pub trait HtmlToPdfRenderer: Send + Sync {
    fn render(&self, html: &str, dest: &mut dyn Write) -> Result<RenderReport, ConversionError>;
}

/// The collaborators a worker needs, one per conversion step.
#[derive(Clone)]
pub struct Converters {
    pub pdf_to_docx: Arc<dyn PdfToDocxBackend>,
    pub docx_to_html: Arc<dyn DocxToHtmlBackend>,
    pub html_to_pdf: Arc<dyn HtmlToPdfRenderer>,
}

impl Converters {
    /// pdf2docx and wkhtmltopdf as found next to the executable or on PATH,
    /// plus the built-in DOCX reader.
    pub fn system() -> Self {
        Self {
            pdf_to_docx: Arc::new(Pdf2DocxCli::default()),
            docx_to_html: Arc::new(DocxHtmlConverter),
            html_to_pdf: Arc::new(WkhtmltopdfRenderer::default()),
        }
    }
}
