use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::backend::{HtmlToPdfRenderer, PdfToDocxBackend, RenderReport};
use crate::error::ConversionError;

// ============================================================================
// Tool Lookup
// ============================================================================

/// Bundled `bin/<name>` next to the executable, otherwise the bare name so
/// the OS resolves it through PATH.
pub fn resolve_tool(name: &str) -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe() {
        let file_name = format!("{}{}", name, std::env::consts::EXE_SUFFIX);
        let bin_path = exe_path.parent().map(|p| p.join("bin").join(file_name));
        if let Some(path) = bin_path {
            if path.exists() {
                return path;
            }
        }
    }
    PathBuf::from(name)
}

fn new_command(program: &Path) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(0x08000000);
    }
    cmd
}

/// Async command without a console window on Windows.
pub fn new_async_command(program: impl AsRef<OsStr>) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(0x08000000);
    cmd
}

/// First line of `<program> --version`, or `None` if it cannot be run.
pub async fn tool_version(program: &Path) -> Option<String> {
    let output = new_async_command(program).arg("--version").output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

// ============================================================================
// pdf2docx
// ============================================================================

static PAGE_WITH_TOTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)/(\d+)\)\s*Page\s+\d+").unwrap());
static PAGE_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bPage\s+(\d+)\b").unwrap());
static CREATING_PAGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"Creating pages").unwrap());
static ERROR_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[ERROR\]\s*(.+)$").unwrap());

/// Turns pdf2docx log lines into page callbacks.
///
/// pdf2docx walks every page twice: once while parsing, once after logging
/// `Creating pages`. Both passes are folded into one count of `2 * n` steps.
#[derive(Debug, Default)]
pub struct PageTracker {
    creating: bool,
    last_error: Option<String>,
}

impl PageTracker {
    pub fn on_line(&mut self, line: &str) -> Option<(u32, Option<u32>)> {
        let line = line.trim();
        if let Some(cap) = ERROR_LINE.captures(line) {
            self.last_error = cap.get(1).map(|m| m.as_str().to_string());
            return None;
        }
        if CREATING_PAGES.is_match(line) {
            self.creating = true;
            return None;
        }
        if let Some(cap) = PAGE_WITH_TOTAL.captures(line) {
            let current: u32 = cap.get(1).and_then(|m| m.as_str().parse().ok())?;
            let total: u32 = cap.get(2).and_then(|m| m.as_str().parse().ok())?;
            let step = if self.creating { total.saturating_add(current) } else { current };
            return Some((step, Some(total.saturating_mul(2))));
        }
        if let Some(cap) = PAGE_ONLY.captures(line) {
            let page: u32 = cap.get(1).and_then(|m| m.as_str().parse().ok())?;
            return Some((page, None));
        }
        None
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Runs the `pdf2docx` command line tool.
pub struct Pdf2DocxCli {
    program: PathBuf,
}

impl Pdf2DocxCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for Pdf2DocxCli {
    fn default() -> Self {
        Self::new(resolve_tool("pdf2docx"))
    }
}

impl PdfToDocxBackend for Pdf2DocxCli {
    fn convert(
        &self,
        pdf_path: &Path,
        docx_path: &Path,
        on_page: &mut dyn FnMut(u32, Option<u32>),
    ) -> Result<(), ConversionError> {
        info!("Running pdf2docx: {} -> {}", pdf_path.display(), docx_path.display());

        let mut child = new_command(&self.program)
            .arg("convert")
            .arg(pdf_path)
            .arg(docx_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConversionError::Library(format!("Failed to spawn pdf2docx: {}", e)))?;

        let mut tracker = PageTracker::default();
        if let Some(stderr) = child.stderr.take() {
            for line in BufReader::new(stderr).lines() {
                let Ok(line) = line else { break };
                debug!("pdf2docx: {}", line);
                if let Some((current, total)) = tracker.on_line(&line) {
                    on_page(current, total);
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| ConversionError::Library(format!("pdf2docx process error: {}", e)))?;

        if !status.success() {
            let detail = tracker.last_error().map(|e| format!(": {}", e)).unwrap_or_default();
            return Err(ConversionError::Library(format!(
                "pdf2docx exited with code {:?}{}",
                status.code(),
                detail
            )));
        }

        let written = std::fs::metadata(docx_path).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            let detail = tracker.last_error().map(|e| format!(": {}", e)).unwrap_or_default();
            return Err(ConversionError::Library(format!(
                "pdf2docx did not produce {}{}",
                docx_path.display(),
                detail
            )));
        }

        Ok(())
    }
}

// ============================================================================
// wkhtmltopdf
// ============================================================================

/// Error count from renderer stderr. A failed exit or empty output counts
/// as at least one error.
pub fn count_render_errors(stderr: &str, exit_ok: bool, produced_output: bool) -> usize {
    let errors = stderr
        .lines()
        .filter(|l| l.trim_start().starts_with("Error:"))
        .count();
    if errors == 0 && (!exit_ok || !produced_output) {
        1
    } else {
        errors
    }
}

/// Runs `wkhtmltopdf`, streaming HTML through stdin and PDF out of stdout.
pub struct WkhtmltopdfRenderer {
    program: PathBuf,
}

impl WkhtmltopdfRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for WkhtmltopdfRenderer {
    fn default() -> Self {
        Self::new(resolve_tool("wkhtmltopdf"))
    }
}

impl HtmlToPdfRenderer for WkhtmltopdfRenderer {
    fn render(&self, html: &str, dest: &mut dyn Write) -> Result<RenderReport, ConversionError> {
        let mut child = new_command(&self.program)
            .args(["--log-level", "warn", "--encoding", "utf-8", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConversionError::Library(format!("Failed to spawn wkhtmltopdf: {}", e)))?;

        // Feed stdin from its own thread so a full stdout pipe cannot stall us.
        let feeder = child.stdin.take().map(|mut stdin| {
            let input = html.to_owned();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| ConversionError::Library(format!("wkhtmltopdf process error: {}", e)))?;

        if let Some(handle) = feeder {
            match handle.join() {
                Ok(Err(e)) => warn!("Failed to write HTML to wkhtmltopdf: {}", e),
                Err(_) => warn!("wkhtmltopdf input thread panicked"),
                Ok(Ok(())) => {}
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| l.trim_start().starts_with("Warning:")) {
            warn!("wkhtmltopdf: {}", line.trim());
        }

        let errors = count_render_errors(&stderr, output.status.success(), !output.stdout.is_empty());
        dest.write_all(&output.stdout)?;

        Ok(RenderReport { errors })
    }
}
