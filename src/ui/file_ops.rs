//! File operations for saving and loading the program.
//!
//! This module handles all file I/O: native file dialogs, reading and
//! writing the project file, and merging the program's XML section into
//! a project without disturbing sections written by other tools.

use super::state::{
    FileOperationResult, PendingConfirmAction, PendingLoadOperation, PendingSaveOperation,
    RobocardsApp,
};
use crate::codec;
use eframe::egui;

/// Extension of project files this editor reads and writes.
const PROJECT_EXTENSION: &str = "rcp";

impl RobocardsApp {
    /// Handles pending file operations.
    ///
    /// This method processes completed async file operations from the
    /// channel and initiates new ones. Dialogs run on the tokio runtime
    /// so the UI thread never blocks on the file picker.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for requesting repaints
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        // First, process any completed file operations from the channel
        if let Some(receiver) = &self.file.file_operation_receiver {
            let mut completed = Vec::new();
            while let Ok(result) = receiver.try_recv() {
                completed.push(result);
            }
            for result in completed {
                match result {
                    FileOperationResult::SaveCompleted(path) => {
                        self.file.current_path = Some(path);
                        println!("Project saved successfully");
                        if let Some(action) = self.dialogs.after_save_action.take() {
                            self.run_confirmed_action(ctx, action);
                        }
                    }
                    FileOperationResult::SaveCancelled => {
                        // A deferred "save, then…" action must not fire
                        // later off an unrelated save
                        self.dialogs.after_save_action = None;
                    }
                    FileOperationResult::LoadCompleted(path, content) => {
                        self.apply_loaded_project(path, &content);
                    }
                    FileOperationResult::OperationFailed(error) => {
                        eprintln!("File operation failed: {error}");
                        self.dialogs.after_save_action = None;
                    }
                }
            }
        }

        // Handle pending save operations
        if let Some(save_op) = self.file.pending_save_operation.take() {
            // The empty program is the virgin state; there is nothing to
            // write and the file must stay untouched.
            let Some(fragment) = codec::encode(&mut self.program) else {
                println!("Nothing to save, the program is empty");
                if let Some(action) = self.dialogs.after_save_action.take() {
                    self.run_confirmed_action(ctx, action);
                }
                return;
            };

            let ctx = ctx.clone();
            let sender = self.file.file_operation_sender.clone();

            match save_op {
                PendingSaveOperation::SaveAs => {
                    tokio::spawn(async move {
                        let result = match rfd::AsyncFileDialog::new()
                            .add_filter("Robot card program", &[PROJECT_EXTENSION])
                            .set_file_name("program.rcp")
                            .save_file()
                            .await
                        {
                            Some(handle) => write_project(handle.path(), &fragment),
                            None => FileOperationResult::SaveCancelled,
                        };
                        if let Some(tx) = sender {
                            let _ = tx.send(result);
                        }
                        ctx.request_repaint();
                    });
                }
                PendingSaveOperation::Save => {
                    if let Some(path) = self.file.current_path.clone() {
                        tokio::spawn(async move {
                            let result = write_project(std::path::Path::new(&path), &fragment);
                            if let Some(tx) = sender {
                                let _ = tx.send(result);
                            }
                            ctx.request_repaint();
                        });
                    } else {
                        self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
                    }
                }
            }
        }

        // Handle pending load operations
        if let Some(PendingLoadOperation::Load) = self.file.pending_load_operation.take() {
            let ctx = ctx.clone();
            let sender = self.file.file_operation_sender.clone();

            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("Robot card program", &[PROJECT_EXTENSION])
                    .pick_file()
                    .await
                {
                    let path = handle.path();
                    match std::fs::read_to_string(path) {
                        Ok(content) => {
                            if let Some(tx) = sender {
                                let _ = tx.send(FileOperationResult::LoadCompleted(
                                    path.display().to_string(),
                                    content,
                                ));
                            }
                        }
                        Err(e) => {
                            if let Some(tx) = sender {
                                let _ = tx.send(FileOperationResult::OperationFailed(format!(
                                    "Failed to read file: {e}"
                                )));
                            }
                        }
                    }
                }
                ctx.request_repaint();
            });
        }
    }

    /// Applies a freshly read project file to the editor.
    ///
    /// A project without a section for this tool yields an empty
    /// program. A fragment that fails to decode leaves the partially
    /// applied rows visible and raises the load-error dialog naming the
    /// offending card.
    fn apply_loaded_project(&mut self, path: String, content: &str) {
        self.interaction.selected_pair = None;
        match codec::extract_fragment(content) {
            Ok(Some(fragment)) => match codec::decode_into(&mut self.program, &fragment, true) {
                Ok(()) => {
                    self.file.current_path = Some(path);
                    println!("Project loaded successfully");
                }
                Err(err) => {
                    self.dialogs.load_error = Some(err.to_string());
                    eprintln!("Failed to load program: {err}");
                }
            },
            Ok(None) => {
                self.program.reset();
                self.file.current_path = Some(path);
                println!("Project loaded, no card program section present");
            }
            Err(err) => {
                self.dialogs.load_error = Some(err.to_string());
                eprintln!("Failed to parse project file: {err}");
            }
        }
    }

    /// Runs an action the user has confirmed (directly or by saving
    /// first).
    pub(super) fn run_confirmed_action(&mut self, ctx: &egui::Context, action: PendingConfirmAction) {
        match action {
            PendingConfirmAction::New => self.new_program(),
            PendingConfirmAction::Open => self.load_project(),
            PendingConfirmAction::Quit => {
                // Allow one close request to pass without interception
                self.dialogs.allow_close_on_next_request = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    /// Opens a file dialog to save the program with a new name.
    pub fn save_project_as(&mut self) {
        self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
    }

    /// Saves the program to the current project path, or triggers
    /// "Save As" if no path is set.
    pub fn save_project(&mut self) {
        if self.file.current_path.is_some() {
            self.file.pending_save_operation = Some(PendingSaveOperation::Save);
        } else {
            self.save_project_as();
        }
    }

    /// Opens a file dialog to load a project from disk.
    pub fn load_project(&mut self) {
        self.file.pending_load_operation = Some(PendingLoadOperation::Load);
    }

    /// Resets the editor to a fresh, untitled program.
    ///
    /// Document settings (advanced mode, color scheme) are kept; only
    /// the pair list and the file binding are dropped.
    pub fn new_program(&mut self) {
        self.program.reset();
        self.file.current_path = None;
        self.interaction.selected_pair = None;
        self.interaction.dragging_kind = None;
    }
}

/// Writes the fragment into the project file at `path`, preserving any
/// sections other tools have stored there.
fn write_project(path: &std::path::Path, fragment: &str) -> FileOperationResult {
    let existing = std::fs::read_to_string(path).ok();
    match codec::embed_in_project(existing.as_deref(), fragment) {
        Ok(project) => match std::fs::write(path, project) {
            Ok(()) => FileOperationResult::SaveCompleted(path.display().to_string()),
            Err(e) => FileOperationResult::OperationFailed(format!("Failed to save file: {e}")),
        },
        Err(e) => FileOperationResult::OperationFailed(format!(
            "Failed to merge into existing project: {e}"
        )),
    }
}
