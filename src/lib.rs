use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tauri::{Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

pub mod backend;
pub mod controller;
pub mod docx_html;
pub mod error;
pub mod html;
pub mod model;
pub mod tools;
pub mod worker;

use backend::Converters;
use controller::{ConversionObserver, Controller, SlotState};
use model::{ConversionMode, ConversionRequest, ResultEvent};
use tools::new_async_command;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedPayload {
    pub mode: ConversionMode,
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressPayload {
    pub mode: ConversionMode,
    pub percent: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinishedPayload {
    pub mode: ConversionMode,
    pub success: bool,
    pub message: String,
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogPayload {
    pub mode: ConversionMode,
    pub line: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStatus {
    pub pdf2docx: Option<String>,
    pub wkhtmltopdf: Option<String>,
}

const MAIN_WINDOW: &str = "main";

// ============================================================================
// Global State
// ============================================================================

struct AppState {
    controller: Arc<Controller>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            controller: Arc::new(Controller::new(Converters::system())),
        }
    }
}

// ============================================================================
// Event Bridge
// ============================================================================

/// Forwards a conversion's notifications to the window and shows the
/// result dialog.
struct WindowObserver {
    app: tauri::AppHandle,
}

impl ConversionObserver for WindowObserver {
    fn on_started(&self, request: &ConversionRequest) {
        let mode = request.mode();
        let _ = self.app.emit(
            "conversion-started",
            StartedPayload {
                mode,
                output_path: request.output_path().to_string_lossy().to_string(),
            },
        );
        let _ = self.app.emit("conversion-log", LogPayload { mode, line: controller::start_log_line(request) });
    }

    fn on_progress(&self, mode: ConversionMode, percent: u8) {
        let _ = self.app.emit("conversion-progress", ProgressPayload { mode, percent });
    }

    fn on_finished(&self, mode: ConversionMode, result: &ResultEvent) {
        let _ = self.app.emit(
            "conversion-finished",
            FinishedPayload {
                mode,
                success: result.success,
                message: result.message.clone(),
                progress: result.final_progress(),
            },
        );
        let _ = self.app.emit("conversion-log", LogPayload { mode, line: controller::result_log_line(result) });

        let (title, kind) = if result.success {
            ("Done", MessageDialogKind::Info)
        } else {
            ("Error", MessageDialogKind::Error)
        };
        let app = self.app.clone();
        let mut dialog = self.app.dialog().message(result.message.clone()).title(title).kind(kind);
        if let Some(window) = dialog_parent(&self.app) {
            dialog = dialog.parent(&window);
        }
        dialog.show(move |_| {
            let state = app.state::<Arc<AppState>>();
            let next = state.controller.dismiss(mode);
            debug!("{} result dismissed, slot {:?}", mode, next);
        });
    }
}

/// Window that dialogs are made modal to.
fn dialog_parent<R: tauri::Runtime>(app: &tauri::AppHandle<R>) -> Option<tauri::WebviewWindow<R>> {
    let window = app.get_webview_window(MAIN_WINDOW);
    if window.is_none() {
        warn!("No {} window to attach dialogs to", MAIN_WINDOW);
    }
    window
}

fn show_warning(app: &tauri::AppHandle, title: &str, message: &str) {
    let mut dialog = app.dialog().message(message).title(title).kind(MessageDialogKind::Warning);
    if let Some(window) = dialog_parent(app) {
        dialog = dialog.parent(&window);
    }
    dialog.show(|_| {});
}

// ============================================================================
// Dialog Commands
// ============================================================================

#[tauri::command]
async fn select_input(app: tauri::AppHandle, mode: ConversionMode) -> Result<Option<String>, String> {
    info!("select_input called for {}", mode);

    let mut builder = app
        .dialog()
        .file()
        .set_title(format!("Select {} file", mode.input_kind()))
        .add_filter(mode.input_filter_name(), &[mode.input_extension()]);
    if let Some(window) = dialog_parent(&app) {
        builder = builder.set_parent(&window);
    }
    let result = builder.blocking_pick_file();

    Ok(result.map(|p| p.to_string()))
}

/// Save dialog seeded with the input's name and directory.
fn choose_output(app: &tauri::AppHandle, mode: ConversionMode, input: &Path) -> Option<PathBuf> {
    let suggested = controller::default_output_path(input, mode);
    let file_name = suggested
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("output.{}", mode.output_extension()));
    let directory = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(dirs::document_dir);

    let mut builder = app
        .dialog()
        .file()
        .set_title(format!("Save {} as", mode.output_extension().to_uppercase()))
        .add_filter(mode.output_filter_name(), &[mode.output_extension()])
        .set_file_name(file_name);
    if let Some(dir) = directory {
        builder = builder.set_directory(dir);
    }
    if let Some(window) = dialog_parent(app) {
        builder = builder.set_parent(&window);
    }

    builder.blocking_save_file().map(|p| PathBuf::from(p.to_string()))
}

// ============================================================================
// Conversion Commands
// ============================================================================

/// Validate the input, ask where to save, and start the slot's worker.
/// Returns whether a conversion was started.
#[tauri::command]
async fn convert(app: tauri::AppHandle, mode: ConversionMode, input_path: String) -> Result<bool, String> {
    info!("convert called for {} with input: {}", mode, input_path);

    let input = match controller::validate_input(mode, &input_path) {
        Ok(path) => path,
        Err(e) => {
            warn!("Rejected {} input {:?}: {}", mode, input_path, e);
            show_warning(&app, "Missing file", &e.to_string());
            return Ok(false);
        }
    };

    let Some(output) = choose_output(&app, mode, &input) else {
        info!("Save dialog cancelled for {}", mode);
        return Ok(false);
    };

    let state = app.state::<Arc<AppState>>();
    let request = ConversionRequest::new(mode, input, output);
    let observer = WindowObserver { app: app.clone() };

    match state.controller.start(request, observer) {
        Ok(_task) => Ok(true),
        Err(e) => {
            warn!("Could not start {}: {}", mode, e);
            show_warning(&app, "Busy", &e.to_string());
            Err(e.to_string())
        }
    }
}

#[tauri::command]
async fn slot_state(app: tauri::AppHandle, mode: ConversionMode) -> Result<SlotState, String> {
    let state = app.state::<Arc<AppState>>();
    Ok(state.controller.state(mode))
}

#[tauri::command]
async fn dismiss_result(app: tauri::AppHandle, mode: ConversionMode) -> Result<SlotState, String> {
    info!("dismiss_result called for {}", mode);
    let state = app.state::<Arc<AppState>>();
    Ok(state.controller.dismiss(mode))
}

// ============================================================================
// Utility Commands
// ============================================================================

#[tauri::command]
async fn get_app_version(app: tauri::AppHandle) -> Result<String, String> {
    info!("get_app_version called");
    Ok(app.package_info().version.to_string())
}

#[tauri::command]
async fn get_tool_status() -> Result<ToolStatus, String> {
    info!("get_tool_status called");

    let status = ToolStatus {
        pdf2docx: tools::tool_version(&tools::resolve_tool("pdf2docx")).await,
        wkhtmltopdf: tools::tool_version(&tools::resolve_tool("wkhtmltopdf")).await,
    };
    if status.pdf2docx.is_none() {
        warn!("pdf2docx not found; PDF → DOCX conversions will fail");
    }
    if status.wkhtmltopdf.is_none() {
        warn!("wkhtmltopdf not found; DOCX → PDF conversions will fail");
    }

    Ok(status)
}

// ============================================================================
// Shell Commands
// ============================================================================

fn existing_path(path: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path);
    if path.as_os_str().is_empty() || !path.exists() {
        return Err("File does not exist".to_string());
    }
    Ok(path)
}

#[tauri::command]
async fn open_file(file_path: String) -> Result<(), String> {
    info!("open_file called for: {}", file_path);
    let path = existing_path(&file_path)?;

    #[cfg(target_os = "windows")]
    {
        new_async_command("cmd")
            .args(["/C", "start", ""])
            .arg(&path)
            .spawn()
            .map_err(|e| format!("Failed to open file: {}", e))?;
    }

    #[cfg(target_os = "macos")]
    {
        new_async_command("open")
            .arg(&path)
            .spawn()
            .map_err(|e| format!("Failed to open file: {}", e))?;
    }

    #[cfg(target_os = "linux")]
    {
        new_async_command("xdg-open")
            .arg(&path)
            .spawn()
            .map_err(|e| format!("Failed to open file: {}", e))?;
    }

    Ok(())
}

/// Show the converted file in the platform file manager.
#[tauri::command]
async fn open_folder(file_path: String) -> Result<(), String> {
    info!("open_folder called for: {}", file_path);
    let path = existing_path(&file_path)?;

    #[cfg(target_os = "windows")]
    {
        new_async_command("explorer")
            .arg(format!("/select,{}", path.display()))
            .spawn()
            .map_err(|e| format!("Failed to open folder: {}", e))?;
    }

    #[cfg(target_os = "macos")]
    {
        new_async_command("open")
            .arg("-R")
            .arg(&path)
            .spawn()
            .map_err(|e| format!("Failed to open folder: {}", e))?;
    }

    #[cfg(target_os = "linux")]
    {
        let folder = if path.is_dir() {
            path.clone()
        } else {
            path.parent().map(Path::to_path_buf).unwrap_or_else(|| path.clone())
        };
        new_async_command("xdg-open")
            .arg(&folder)
            .spawn()
            .map_err(|e| format!("Failed to open folder: {}", e))?;
    }

    Ok(())
}

// ============================================================================
// Application Entry Point
// ============================================================================

pub fn run() {
    tauri::Builder::default()
        .manage(Arc::new(AppState::default()))
        .plugin(
            tauri_plugin_log::Builder::new()
                .target(tauri_plugin_log::Target::new(
                    tauri_plugin_log::TargetKind::LogDir { file_name: Some("doc-converter".into()) },
                ))
                .level(log::LevelFilter::Info)
                .build(),
        )
        .plugin(tauri_plugin_dialog::init())
        .setup(|_app| {
            info!("Doc Converter starting up...");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Dialog commands
            select_input,
            // Conversion commands
            convert,
            slot_state,
            dismiss_result,
            // Utility commands
            get_app_version,
            get_tool_status,
            // Shell commands
            open_file,
            open_folder,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
