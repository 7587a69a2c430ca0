use log::{debug, error, info};
use std::any::Any;
use std::fs::File;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::backend::{Converters, HtmlOutput};
use crate::error::ConversionError;
use crate::html;
use crate::model::{ConversionMode, ConversionRequest, ResultEvent, WorkerEvent};

/// Progress reported once the HTML render step starts.
pub const RENDER_STARTED_PERCENT: u8 = 20;

/// Percent for a processed page. With a known total this is
/// `floor(current / total * 100)`; without one, `min(99, current % 100)`,
/// which is only a rough hint.
pub fn page_percent(current: u32, total: Option<u32>) -> u8 {
    match total {
        Some(total) if total > 0 => (u64::from(current) * 100 / u64::from(total)).min(100) as u8,
        _ => (current % 100).min(99) as u8,
    }
}

// ============================================================================
// Progress Reporting
// ============================================================================

/// Sends events in order and keeps progress non-decreasing.
struct ProgressReporter {
    events: UnboundedSender<WorkerEvent>,
    last: Option<u8>,
}

impl ProgressReporter {
    fn new(events: UnboundedSender<WorkerEvent>) -> Self {
        Self { events, last: None }
    }

    fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        // A dropped receiver only means nobody is watching any more.
        let _ = self.events.send(WorkerEvent::Progress(percent));
    }

    fn finish(self, result: ResultEvent) {
        let _ = self.events.send(WorkerEvent::Finished(result));
    }
}

// ============================================================================
// Worker
// ============================================================================

/// Runs one conversion request to completion on the current thread.
pub struct ConversionWorker {
    request: ConversionRequest,
    converters: Converters,
    progress: ProgressReporter,
}

impl ConversionWorker {
    pub fn new(request: ConversionRequest, converters: Converters, events: UnboundedSender<WorkerEvent>) -> Self {
        Self {
            request,
            converters,
            progress: ProgressReporter::new(events),
        }
    }

    /// Perform the conversion and emit exactly one terminal result. Errors
    /// and panics raised by the converters are reported, never propagated.
    pub fn run(mut self) {
        info!(
            "Converting {}: {} -> {}",
            self.request.mode(),
            self.request.input_path().display(),
            self.request.output_path().display()
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match self.request.mode() {
            ConversionMode::PdfToDocx => self.pdf_to_docx(),
            ConversionMode::DocxToPdf => self.docx_to_pdf(),
        }))
        .unwrap_or_else(|payload| Err(ConversionError::Panicked(panic_message(payload.as_ref()))));

        let result = match outcome {
            Ok(()) => {
                info!("{} finished: {}", self.request.mode(), self.request.output_path().display());
                ResultEvent::succeeded()
            }
            Err(e) => {
                error!("{} failed: {}", self.request.mode(), e);
                ResultEvent::failed(&e)
            }
        };
        self.progress.finish(result);
    }

    fn pdf_to_docx(&mut self) -> Result<(), ConversionError> {
        let backend = self.converters.pdf_to_docx.clone();
        let progress = &mut self.progress;
        backend.convert(
            self.request.input_path(),
            self.request.output_path(),
            &mut |current, total| progress.report(page_percent(current, total)),
        )?;
        self.progress.report(100);
        Ok(())
    }

    fn docx_to_pdf(&mut self) -> Result<(), ConversionError> {
        let docx = std::fs::read(self.request.input_path())?;

        let HtmlOutput { html: fragment, warnings } = self.converters.docx_to_html.convert(&docx)?;
        for warning in &warnings {
            debug!("DOCX conversion warning: {}", warning);
        }
        let document = html::wrap_document(&fragment);

        let mut out_file = File::create(self.request.output_path())?;
        self.progress.report(RENDER_STARTED_PERCENT);
        let report = self.converters.html_to_pdf.render(&document, &mut out_file)?;
        if report.errors > 0 {
            return Err(ConversionError::Render(report.errors));
        }
        out_file.flush()?;

        self.progress.report(100);
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Start a worker on a blocking thread. The receiver yields the progress
/// events and then the single result, after which it closes.
pub fn spawn(request: ConversionRequest, converters: Converters) -> (JoinHandle<()>, UnboundedReceiver<WorkerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = ConversionWorker::new(request, converters, tx);
    let handle = tokio::task::spawn_blocking(move || worker.run());
    (handle, rx)
}
