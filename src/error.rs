use thiserror::Error;

use crate::docx_html::DocxError;
use crate::model::ConversionMode;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Select a valid {} file first.", .mode.input_kind())]
    InvalidInputPath { mode: ConversionMode, path: String },
    #[error("{0}")]
    Library(String),
    #[error(transparent)]
    Docx(#[from] DocxError),
    #[error("HTML renderer failed with {0} errors.")]
    Render(usize),
    #[error("A {0} conversion is already running.")]
    SlotBusy(ConversionMode),
    #[error("converter panicked: {0}")]
    Panicked(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
