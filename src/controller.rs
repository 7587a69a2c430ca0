use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::backend::Converters;
use crate::error::ConversionError;
use crate::model::{ConversionMode, ConversionRequest, ResultEvent, WorkerEvent};
use crate::worker;

// ============================================================================
// Input Handling
// ============================================================================

/// Trimmed path of an existing regular file, or `InvalidInputPath`.
pub fn validate_input(mode: ConversionMode, raw_path: &str) -> Result<PathBuf, ConversionError> {
    let trimmed = raw_path.trim();
    let path = PathBuf::from(trimmed);
    if trimmed.is_empty() || !path.is_file() {
        return Err(ConversionError::InvalidInputPath {
            mode,
            path: trimmed.to_string(),
        });
    }
    Ok(path)
}

/// Same path with the extension swapped for the mode's output format.
pub fn default_output_path(input: &Path, mode: ConversionMode) -> PathBuf {
    input.with_extension(mode.output_extension())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

pub fn start_log_line(request: &ConversionRequest) -> String {
    format!(
        "Starting {}: {} → {}",
        request.mode(),
        file_name(request.input_path()),
        file_name(request.output_path())
    )
}

pub fn result_log_line(result: &ResultEvent) -> String {
    if result.success {
        format!("✅ {}", result.message)
    } else {
        format!("❌ {}", result.message)
    }
}

// ============================================================================
// Slots
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Per-mode state machine: Idle → Running → (Succeeded | Failed) → Idle.
#[derive(Debug, Default)]
pub struct ConversionSlots {
    states: Mutex<HashMap<ConversionMode, SlotState>>,
}

impl ConversionSlots {
    pub fn state(&self, mode: ConversionMode) -> SlotState {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(&mode).copied().unwrap_or(SlotState::Idle)
    }

    /// Claim the slot. A slot still showing a result may be restarted; a
    /// running one may not.
    pub fn begin(&self, mode: ConversionMode) -> Result<(), ConversionError> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states.entry(mode).or_insert(SlotState::Idle);
        if *state == SlotState::Running {
            return Err(ConversionError::SlotBusy(mode));
        }
        *state = SlotState::Running;
        Ok(())
    }

    pub fn finish(&self, mode: ConversionMode, success: bool) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let next = if success { SlotState::Succeeded } else { SlotState::Failed };
        let state = states.entry(mode).or_insert(SlotState::Idle);
        if *state != SlotState::Running {
            warn!("{} slot finished while {:?}", mode, state);
        }
        *state = next;
    }

    /// Back to Idle once the user has seen the result. Running slots are
    /// left alone.
    pub fn dismiss(&self, mode: ConversionMode) -> SlotState {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states.entry(mode).or_insert(SlotState::Idle);
        if matches!(*state, SlotState::Succeeded | SlotState::Failed) {
            *state = SlotState::Idle;
        }
        *state
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Receives a request's notifications, in order, on the controller side.
pub trait ConversionObserver: Send + Sync + 'static {
    fn on_started(&self, request: &ConversionRequest);
    fn on_progress(&self, mode: ConversionMode, percent: u8);
    fn on_finished(&self, mode: ConversionMode, result: &ResultEvent);
}

pub struct Controller {
    slots: ConversionSlots,
    converters: Converters,
}

impl Controller {
    pub fn new(converters: Converters) -> Self {
        Self {
            slots: ConversionSlots::default(),
            converters,
        }
    }

    pub fn state(&self, mode: ConversionMode) -> SlotState {
        self.slots.state(mode)
    }

    pub fn dismiss(&self, mode: ConversionMode) -> SlotState {
        self.slots.dismiss(mode)
    }

    /// Start `request` in its slot. The returned task relays worker events
    /// to `observer`, records the outcome and joins the worker; it completes
    /// once the result has been delivered.
    pub fn start<O: ConversionObserver>(
        self: &Arc<Self>,
        request: ConversionRequest,
        observer: O,
    ) -> Result<JoinHandle<()>, ConversionError> {
        let mode = request.mode();
        self.slots.begin(mode)?;
        info!("{} slot running", mode);
        observer.on_started(&request);

        let (worker_handle, mut events) = worker::spawn(request, self.converters.clone());
        let controller = Arc::clone(self);

        Ok(tokio::spawn(async move {
            let mut delivered = false;
            while let Some(event) = events.recv().await {
                match event {
                    WorkerEvent::Progress(percent) => observer.on_progress(mode, percent),
                    WorkerEvent::Finished(result) => {
                        controller.slots.finish(mode, result.success);
                        observer.on_finished(mode, &result);
                        delivered = true;
                    }
                }
            }

            if let Err(e) = worker_handle.await {
                warn!("{} worker did not finish cleanly: {}", mode, e);
            }
            if !delivered {
                let result = ResultEvent::failed(&ConversionError::Library("worker stopped without a result".into()));
                controller.slots.finish(mode, false);
                observer.on_finished(mode, &result);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DocxToHtmlBackend, HtmlOutput, HtmlToPdfRenderer, PdfToDocxBackend, RenderReport};
    use std::io::Write;
    use std::sync::mpsc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Seen {
        Started(String),
        Progress(ConversionMode, u8),
        Finished(ConversionMode, ResultEvent),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Seen>>>);

    impl Recorder {
        fn seen(&self) -> Vec<Seen> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ConversionObserver for Recorder {
        fn on_started(&self, request: &ConversionRequest) {
            self.0.lock().unwrap().push(Seen::Started(start_log_line(request)));
        }
        fn on_progress(&self, mode: ConversionMode, percent: u8) {
            self.0.lock().unwrap().push(Seen::Progress(mode, percent));
        }
        fn on_finished(&self, mode: ConversionMode, result: &ResultEvent) {
            self.0.lock().unwrap().push(Seen::Finished(mode, result.clone()));
        }
    }

    /// Blocks inside `convert` until the test releases it.
    struct GatedPdf {
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl PdfToDocxBackend for GatedPdf {
        fn convert(&self, _: &Path, docx: &Path, on_page: &mut dyn FnMut(u32, Option<u32>)) -> Result<(), ConversionError> {
            on_page(1, Some(2));
            self.gate.lock().unwrap().recv().ok();
            on_page(2, Some(2));
            std::fs::write(docx, b"docx")?;
            Ok(())
        }
    }

    struct NoHtml;

    impl DocxToHtmlBackend for NoHtml {
        fn convert(&self, _: &[u8]) -> Result<HtmlOutput, ConversionError> {
            Err(ConversionError::Library("unreadable".into()))
        }
    }

    struct NoRender;

    impl HtmlToPdfRenderer for NoRender {
        fn render(&self, _: &str, _: &mut dyn Write) -> Result<RenderReport, ConversionError> {
            Ok(RenderReport { errors: 1 })
        }
    }

    fn gated_controller() -> (Arc<Controller>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let converters = Converters {
            pdf_to_docx: Arc::new(GatedPdf { gate: Mutex::new(rx) }),
            docx_to_html: Arc::new(NoHtml),
            html_to_pdf: Arc::new(NoRender),
        };
        (Arc::new(Controller::new(converters)), tx)
    }

    #[test]
    fn test_validate_input() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.pdf");
        std::fs::write(&pdf, b"%PDF").unwrap();

        let raw = format!("  {}  ", pdf.display());
        assert_eq!(validate_input(ConversionMode::PdfToDocx, &raw).unwrap(), pdf);

        let err = validate_input(ConversionMode::PdfToDocx, "   ").unwrap_err();
        assert_eq!(err.to_string(), "Select a valid PDF file first.");

        let missing = dir.path().join("missing.docx");
        let err = validate_input(ConversionMode::DocxToPdf, &missing.to_string_lossy()).unwrap_err();
        assert_eq!(err.to_string(), "Select a valid DOCX file first.");

        let err = validate_input(ConversionMode::DocxToPdf, &dir.path().to_string_lossy()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInputPath { .. }));
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/docs/report.pdf"), ConversionMode::PdfToDocx),
            PathBuf::from("/docs/report.docx")
        );
        assert_eq!(
            default_output_path(Path::new("/docs/letter.v2.docx"), ConversionMode::DocxToPdf),
            PathBuf::from("/docs/letter.v2.pdf")
        );
    }

    #[test]
    fn test_log_lines() {
        let request = ConversionRequest::new(ConversionMode::PdfToDocx, "/a/report.pdf", "/b/out.docx");
        assert_eq!(start_log_line(&request), "Starting PDF → DOCX: report.pdf → out.docx");
        assert_eq!(result_log_line(&ResultEvent::succeeded()), "✅ Conversion completed successfully.");
        let failed = ResultEvent::failed(&ConversionError::Render(2));
        assert_eq!(result_log_line(&failed), "❌ Conversion failed: HTML renderer failed with 2 errors.");
    }

    #[test]
    fn test_slot_transitions() {
        let slots = ConversionSlots::default();
        let mode = ConversionMode::DocxToPdf;
        assert_eq!(slots.state(mode), SlotState::Idle);
        assert_eq!(slots.dismiss(mode), SlotState::Idle);

        slots.begin(mode).unwrap();
        assert_eq!(slots.state(mode), SlotState::Running);
        assert!(matches!(slots.begin(mode), Err(ConversionError::SlotBusy(ConversionMode::DocxToPdf))));
        assert_eq!(slots.dismiss(mode), SlotState::Running);
        assert_eq!(slots.state(ConversionMode::PdfToDocx), SlotState::Idle);

        slots.finish(mode, false);
        assert_eq!(slots.state(mode), SlotState::Failed);
        assert_eq!(slots.dismiss(mode), SlotState::Idle);

        slots.begin(mode).unwrap();
        slots.finish(mode, true);
        assert_eq!(slots.state(mode), SlotState::Succeeded);
        slots.begin(mode).unwrap();
        assert_eq!(slots.state(mode), SlotState::Running);
    }

    #[tokio::test]
    async fn test_running_slot_rejects_second_start() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, release) = gated_controller();
        let recorder = Recorder::default();

        let request = ConversionRequest::new(ConversionMode::PdfToDocx, dir.path().join("a.pdf"), dir.path().join("a.docx"));
        let task = controller.start(request.clone(), recorder.clone()).unwrap();
        assert_eq!(controller.state(ConversionMode::PdfToDocx), SlotState::Running);

        let err = controller.start(request, recorder.clone()).unwrap_err();
        assert_eq!(err.to_string(), "A PDF → DOCX conversion is already running.");

        release.send(()).unwrap();
        task.await.unwrap();

        assert_eq!(controller.state(ConversionMode::PdfToDocx), SlotState::Succeeded);
        assert_eq!(
            recorder.seen(),
            vec![
                Seen::Started("Starting PDF → DOCX: a.pdf → a.docx".into()),
                Seen::Progress(ConversionMode::PdfToDocx, 50),
                Seen::Progress(ConversionMode::PdfToDocx, 100),
                Seen::Finished(ConversionMode::PdfToDocx, ResultEvent::succeeded()),
            ]
        );
        assert_eq!(controller.dismiss(ConversionMode::PdfToDocx), SlotState::Idle);
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, release) = gated_controller();
        let recorder = Recorder::default();

        let pdf = ConversionRequest::new(ConversionMode::PdfToDocx, dir.path().join("a.pdf"), dir.path().join("a.docx"));
        let pdf_task = controller.start(pdf, recorder.clone()).unwrap();

        let docx_in = dir.path().join("b.docx");
        std::fs::write(&docx_in, b"whatever").unwrap();
        let docx = ConversionRequest::new(ConversionMode::DocxToPdf, &docx_in, dir.path().join("b.pdf"));
        controller.start(docx, recorder.clone()).unwrap().await.unwrap();

        assert_eq!(controller.state(ConversionMode::DocxToPdf), SlotState::Failed);
        assert_eq!(controller.state(ConversionMode::PdfToDocx), SlotState::Running);
        assert!(recorder.seen().contains(&Seen::Finished(
            ConversionMode::DocxToPdf,
            ResultEvent {
                success: false,
                message: "Conversion failed: unreadable".into()
            }
        )));

        release.send(()).unwrap();
        pdf_task.await.unwrap();
        assert_eq!(controller.state(ConversionMode::PdfToDocx), SlotState::Succeeded);
    }
}
