use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use doc_converter::backend::{Converters, HtmlToPdfRenderer, PdfToDocxBackend, RenderReport};
use doc_converter::controller::{self, ConversionObserver, Controller, SlotState};
use doc_converter::docx_html::DocxHtmlConverter;
use doc_converter::error::ConversionError;
use doc_converter::model::{ConversionMode, ConversionRequest, ResultEvent};
use zip::write::SimpleFileOptions;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Started(ConversionMode),
    Progress(u8),
    Finished(ResultEvent),
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    fn progress(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn result(&self) -> ResultEvent {
        self.events()
            .into_iter()
            .find_map(|e| match e {
                Event::Finished(r) => Some(r),
                _ => None,
            })
            .expect("no result delivered")
    }
}

impl ConversionObserver for Recorder {
    fn on_started(&self, request: &ConversionRequest) {
        self.0.lock().unwrap().push(Event::Started(request.mode()));
    }

    fn on_progress(&self, _mode: ConversionMode, percent: u8) {
        self.0.lock().unwrap().push(Event::Progress(percent));
    }

    fn on_finished(&self, _mode: ConversionMode, result: &ResultEvent) {
        self.0.lock().unwrap().push(Event::Finished(result.clone()));
    }
}

/// Writes a stub DOCX after reporting each page of a fixed-length PDF.
struct StubPdf {
    pages: u32,
}

impl PdfToDocxBackend for StubPdf {
    fn convert(
        &self,
        _pdf_path: &Path,
        docx_path: &Path,
        on_page: &mut dyn FnMut(u32, Option<u32>),
    ) -> Result<(), ConversionError> {
        for page in 1..=self.pages {
            on_page(page, Some(self.pages));
        }
        std::fs::write(docx_path, b"PK stub docx")?;
        Ok(())
    }
}

/// Emits a fake PDF and keeps the HTML it was given.
#[derive(Default)]
struct CapturingRenderer {
    html: Mutex<Option<String>>,
}

impl HtmlToPdfRenderer for CapturingRenderer {
    fn render(&self, html: &str, dest: &mut dyn Write) -> Result<RenderReport, ConversionError> {
        *self.html.lock().unwrap() = Some(html.to_string());
        dest.write_all(b"%PDF-1.4 stub")?;
        Ok(RenderReport { errors: 0 })
    }
}

fn controller_with(renderer: Arc<CapturingRenderer>) -> Arc<Controller> {
    Arc::new(Controller::new(Converters {
        pdf_to_docx: Arc::new(StubPdf { pages: 3 }),
        docx_to_html: Arc::new(DocxHtmlConverter),
        html_to_pdf: renderer,
    }))
}

fn letter_docx() -> Vec<u8> {
    let document = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" \
        xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
        xmlns:wp=\"http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing\" \
        xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\"><w:body>\
        <w:p><w:r><w:t>Dear reader,</w:t></w:r></w:p>\
        <w:p><w:r><w:drawing><wp:inline><wp:docPr id=\"1\" name=\"Picture 1\" descr=\"Logo\"/>\
        <a:graphic><a:graphicData><a:blip r:embed=\"rId7\"/></a:graphicData></a:graphic>\
        </wp:inline></w:drawing></w:r></w:p>\
        </w:body></w:document>";
    let rels = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
        <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
        <Relationship Id=\"rId7\" Type=\"image\" Target=\"media/logo.png\"/></Relationships>";

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.start_file("word/_rels/document.xml.rels", options).unwrap();
    writer.write_all(rels.as_bytes()).unwrap();
    writer.start_file("word/media/logo.png", options).unwrap();
    writer.write_all(b"\x89PNG\r\n\x1a\n").unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn pdf_report_converts_with_page_progress() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("report.pdf");
    std::fs::write(&input, b"%PDF-1.4").unwrap();

    let controller = controller_with(Arc::default());
    let input = controller::validate_input(ConversionMode::PdfToDocx, &input.to_string_lossy()).unwrap();
    let output = controller::default_output_path(&input, ConversionMode::PdfToDocx);
    assert_eq!(output, dir.path().join("report.docx"));

    let recorder = Recorder::default();
    let task = controller
        .start(ConversionRequest::new(ConversionMode::PdfToDocx, &input, &output), recorder.clone())
        .unwrap();
    task.await.unwrap();

    assert_eq!(recorder.events().first(), Some(&Event::Started(ConversionMode::PdfToDocx)));
    let progress = recorder.progress();
    assert!(progress.iter().any(|p| *p > 0 && *p < 100), "{:?}", progress);
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));

    let result = recorder.result();
    assert!(result.success);
    assert_eq!(result.message, "Conversion completed successfully.");
    assert!(std::fs::metadata(&output).unwrap().len() > 0);

    assert_eq!(controller.state(ConversionMode::PdfToDocx), SlotState::Succeeded);
    assert_eq!(controller.dismiss(ConversionMode::PdfToDocx), SlotState::Idle);
}

#[tokio::test]
async fn docx_letter_reaches_renderer_as_styled_html() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("letter.docx");
    let output = dir.path().join("letter.pdf");
    std::fs::write(&input, letter_docx()).unwrap();

    let renderer = Arc::new(CapturingRenderer::default());
    let controller = controller_with(renderer.clone());
    let recorder = Recorder::default();
    controller
        .start(ConversionRequest::new(ConversionMode::DocxToPdf, &input, &output), recorder.clone())
        .unwrap()
        .await
        .unwrap();

    let result = recorder.result();
    assert!(result.success, "{}", result.message);
    assert_eq!(recorder.progress().last(), Some(&100));
    assert!(std::fs::metadata(&output).unwrap().len() > 0);

    let html = renderer.html.lock().unwrap().clone().unwrap();
    assert!(html.contains("<meta charset=\"utf-8\" />"));
    assert!(html.contains("<p>Dear reader,</p>"));
    assert!(html.contains("<img src=\"data:image/png;base64,"));
    assert!(html.contains("alt=\"Logo\""));
    assert!(html.contains("max-width: 100%"));
}

#[tokio::test]
async fn corrupt_docx_fails_and_slot_can_be_dismissed() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.docx");
    let output = dir.path().join("broken.pdf");
    std::fs::write(&input, b"this is not a zip archive").unwrap();

    let renderer = Arc::new(CapturingRenderer::default());
    let controller = controller_with(renderer.clone());
    let recorder = Recorder::default();
    controller
        .start(ConversionRequest::new(ConversionMode::DocxToPdf, &input, &output), recorder.clone())
        .unwrap()
        .await
        .unwrap();

    let result = recorder.result();
    assert!(!result.success);
    assert!(result.message.starts_with("Conversion failed: "), "{}", result.message);
    assert_eq!(result.final_progress(), 0);
    assert!(renderer.html.lock().unwrap().is_none());
    assert!(!output.exists());

    assert_eq!(controller.state(ConversionMode::DocxToPdf), SlotState::Failed);
    assert_eq!(controller.dismiss(ConversionMode::DocxToPdf), SlotState::Idle);
    assert_eq!(controller.state(ConversionMode::PdfToDocx), SlotState::Idle);
}

#[test]
fn missing_input_never_starts() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pdf");
    let err = controller::validate_input(ConversionMode::PdfToDocx, &missing.to_string_lossy()).unwrap_err();
    assert_eq!(err.to_string(), "Select a valid PDF file first.");
    assert!(!dir.path().join("missing.docx").exists());
}
