//! User interface components and rendering logic for the card editor.
//!
//! This module contains all the UI-related code including the main
//! application struct, the pair-row canvas, the card palettes, the
//! properties panel, and dialog handling.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main RobocardsApp
//! - `file_ops` - Project save/load operations and dialogs
//! - `canvas` - Pair rows, palettes, selection, and drag-and-drop
//! - `rendering` - Drawing card slots, glyphs, and palette entries

mod canvas;
mod file_ops;
mod rendering;
mod state;

pub use state::RobocardsApp;

use self::state::PendingConfirmAction;
use crate::cards::{CardRole, CardSpec};
use crate::constants::{COLOR_SCHEMES, PALETTE_ICON_SIZE};
use eframe::egui;

impl eframe::App for RobocardsApp {
    /// Persist entire app state between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => {
                storage.set_string("app_state", json);
            }
            Err(err) => {
                eprintln!("Failed to serialize app state: {err}");
            }
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// This method handles the overall UI layout: the toolbar, the two
    /// palette side panels, the properties panel, the central pair-row
    /// canvas, and the modal dialogs layered on top.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `_frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme visuals
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        // Handle pending file operations
        self.handle_pending_operations(ctx);

        // Handle file-related keyboard shortcuts (New/Open/Save/Quit)
        self.handle_file_shortcuts(ctx);

        // Handle delete key for removing the selected row
        self.handle_delete_key(ctx);

        // Intercept native window close requests (titlebar X)
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.program.is_modified() && !self.dialogs.allow_close_on_next_request {
                // Abort close and show confirmation dialog
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                if !self.dialogs.show_unsaved_dialog {
                    self.dialogs.show_unsaved_dialog = true;
                    self.dialogs.pending_confirm_action = Some(PendingConfirmAction::Quit);
                }
            } else {
                self.dialogs.allow_close_on_next_request = false;
            }
        }

        // Restore native window size once per session
        if !self.applied_viewport_restore {
            if let Some((w, h)) = self.window_inner_size {
                ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(w, h)));
            }
            self.applied_viewport_restore = true;
        }
        // Capture current window inner size to persist on save
        let size = ctx.input(|i| i.screen_rect().size());
        self.window_inner_size = Some((size.x, size.y));

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ctx, ui);
        });

        egui::TopBottomPanel::bottom("properties_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.draw_properties_panel(ui);
            });

        egui::SidePanel::left("event_palette")
            .resizable(false)
            .default_width(PALETTE_ICON_SIZE + 24.0)
            .show(ctx, |ui| {
                self.draw_event_palette(ui);
            });

        egui::SidePanel::right("action_palette")
            .resizable(false)
            .default_width(PALETTE_ICON_SIZE + 24.0)
            .show(ctx, |ui| {
                self.draw_action_palette(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        // Ghost card under the pointer while a palette drag is in
        // flight; repaint continuously so it tracks smoothly.
        if let Some(kind) = self.interaction.dragging_kind {
            self.draw_drag_ghost(ctx, kind);
            ctx.request_repaint();
        }

        self.draw_unsaved_dialog(ctx);
        self.draw_downgrade_dialog(ctx);
        self.draw_load_error_dialog(ctx);
        self.draw_help_window(ctx);
    }
}

impl RobocardsApp {
    /// Handles file-related keyboard shortcuts: New, Open, Save, Save
    /// As, and Quit. Uses the platform-standard Command (macOS) or
    /// Control (Windows/Linux) modifier.
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (save, save_as, open, new, quit) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            (
                i.key_pressed(egui::Key::S) && cmd && !i.modifiers.shift,
                i.key_pressed(egui::Key::S) && cmd && i.modifiers.shift,
                i.key_pressed(egui::Key::O) && cmd,
                i.key_pressed(egui::Key::N) && cmd,
                i.key_pressed(egui::Key::Q) && cmd,
            )
        });
        if save_as {
            self.save_project_as();
        } else if save {
            self.save_project();
        }
        if open {
            self.request_with_unsaved_check(ctx, PendingConfirmAction::Open);
        }
        if new {
            self.request_with_unsaved_check(ctx, PendingConfirmAction::New);
        }
        if quit {
            self.request_with_unsaved_check(ctx, PendingConfirmAction::Quit);
        }
    }

    /// Runs a destructive action directly, or raises the unsaved-changes
    /// dialog first when the program has unsaved edits.
    fn request_with_unsaved_check(&mut self, ctx: &egui::Context, action: PendingConfirmAction) {
        if self.program.is_modified() {
            self.dialogs.show_unsaved_dialog = true;
            self.dialogs.pending_confirm_action = Some(action);
        } else {
            self.run_confirmed_action(ctx, action);
        }
    }

    /// Handles delete key presses to remove the selected row.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            if let Some(id) = self.interaction.selected_pair.take() {
                self.program.remove_pair(id);
                if !self.program.is_empty() {
                    self.program.ensure_trailing_blank_pair();
                }
            }
        }
    }

    /// Renders the toolbar with file operations, robot controls, and
    /// document settings.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context, needed to forward confirmed actions
    /// * `ui` - The egui UI context
    fn draw_toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // File operations
            if ui.button("New").clicked() {
                self.request_with_unsaved_check(ctx, PendingConfirmAction::New);
            }
            if ui.button("Open").clicked() {
                self.request_with_unsaved_check(ctx, PendingConfirmAction::Open);
            }
            if ui.button("Save").clicked() {
                self.save_project();
            }
            if ui.button("Save As").clicked() {
                self.save_project_as();
            }

            ui.separator();

            // Robot controls
            if ui.button("Run").clicked() {
                if let Err(err) = self.robot.load_and_run(&self.program) {
                    eprintln!("Failed to run program: {err}");
                }
            }
            if ui.button("Stop").clicked() {
                if let Err(err) = self.robot.stop() {
                    eprintln!("Failed to stop robot: {err}");
                }
                // Stop alone leaves the last motor targets set
                for motor in ["motor.left.target", "motor.right.target"] {
                    if let Err(err) = self.robot.set_variable(motor, &[0]) {
                        eprintln!("Failed to reset {motor}: {err}");
                    }
                }
            }

            ui.separator();

            // Color scheme selector with painted previews
            let mut scheme_idx = self.program.color_scheme();
            egui::ComboBox::from_id_source("color_scheme_combo")
                .selected_text(format!("Colors {}", scheme_idx + 1))
                .show_ui(ui, |ui| {
                    for idx in 0..COLOR_SCHEMES.len() {
                        ui.horizontal(|ui| {
                            let (rect, _) = ui.allocate_exact_size(
                                egui::vec2(28.0, 14.0),
                                egui::Sense::hover(),
                            );
                            rendering::draw_scheme_preview(ui.painter(), rect, COLOR_SCHEMES[idx]);
                            ui.selectable_value(&mut scheme_idx, idx, format!("Colors {}", idx + 1));
                        });
                    }
                });
            if scheme_idx != self.program.color_scheme() {
                self.program.set_color_scheme(scheme_idx);
                self.program.set_modified(true);
            }

            ui.separator();

            // Advanced mode; leaving it while state data is in use
            // needs confirmation first
            let mut advanced = self.program.advanced();
            if ui.checkbox(&mut advanced, "Advanced").changed() {
                if !advanced && self.program.any_state_filter() {
                    self.dialogs.show_downgrade_dialog = true;
                } else {
                    self.program.set_advanced(advanced);
                    self.program.set_modified(true);
                }
            }

            ui.separator();
            ui.checkbox(&mut self.dark_mode, "Dark Mode");
            ui.separator();

            if ui.button("Help").clicked() {
                self.dialogs.show_help = true;
            }

            // Show current file and unsaved changes indicator
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let status = if self.program.is_modified() { "*" } else { "" };
                match &self.file.current_path {
                    Some(path) => ui.label(format!("{path}{status}")),
                    None => ui.label(format!("Untitled{status}")),
                };
            });
        });
    }

    /// Renders the properties panel for the selected row's cards.
    ///
    /// Each card exposes one drag-value editor per parameter slot,
    /// clamped to the kind's value range. Event cards additionally
    /// expose their state filter in advanced mode.
    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Card parameters");
        ui.separator();

        let Some(id) = self.interaction.selected_pair else {
            ui.label("Select a row to edit its card parameters.");
            return;
        };
        let advanced = self.program.advanced();
        let mut changed = false;

        match self.program.pair_mut(id) {
            Some(pair) => {
                ui.columns(2, |columns| {
                    columns[0].label("Event");
                    match pair.event.as_mut() {
                        Some(card) => changed |= card_editor(&mut columns[0], card, advanced),
                        None => {
                            columns[0].label("(empty)");
                        }
                    }
                    columns[1].label("Action");
                    match pair.action.as_mut() {
                        Some(card) => changed |= card_editor(&mut columns[1], card, false),
                        None => {
                            columns[1].label("(empty)");
                        }
                    }
                });
            }
            None => {
                // Stale selection, the row was deleted this frame
                self.interaction.selected_pair = None;
            }
        }

        if changed {
            self.program.set_modified(true);
        }
    }

    /// Unsaved changes confirmation dialog with Save / Discard / Cancel.
    fn draw_unsaved_dialog(&mut self, ctx: &egui::Context) {
        if !self.dialogs.show_unsaved_dialog {
            return;
        }
        let title = match self.dialogs.pending_confirm_action {
            Some(PendingConfirmAction::Quit) => "Quit without saving?",
            Some(PendingConfirmAction::New) => "Start a new program?",
            Some(PendingConfirmAction::Open) => "Open another project?",
            None => "Unsaved changes",
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("The program has unsaved changes.");
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        if let Some(action) = self.dialogs.pending_confirm_action.take() {
                            if self.program.is_empty() {
                                // Nothing will be written for an empty
                                // program, run the action right away
                                self.program.set_modified(false);
                                self.run_confirmed_action(ctx, action);
                            } else {
                                self.dialogs.after_save_action = Some(action);
                                self.save_project();
                            }
                        }
                        self.dialogs.show_unsaved_dialog = false;
                    }
                    if ui.button("Discard").clicked() {
                        if let Some(action) = self.dialogs.pending_confirm_action.take() {
                            self.program.set_modified(false);
                            self.run_confirmed_action(ctx, action);
                        }
                        self.dialogs.show_unsaved_dialog = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.dialogs.show_unsaved_dialog = false;
                        self.dialogs.pending_confirm_action = None;
                    }
                });
            });
    }

    /// Confirmation shown before leaving advanced mode while state
    /// filters or state cards are in use.
    fn draw_downgrade_dialog(&mut self, ctx: &egui::Context) {
        if !self.dialogs.show_downgrade_dialog {
            return;
        }
        egui::Window::new("Leave advanced mode?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(
                    "State filters or state cards are in use. Leaving advanced mode \
                     hides them in the editor but keeps their data.",
                );
                ui.horizontal(|ui| {
                    if ui.button("Leave advanced mode").clicked() {
                        self.program.set_advanced(false);
                        self.program.set_modified(true);
                        self.dialogs.show_downgrade_dialog = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.dialogs.show_downgrade_dialog = false;
                    }
                });
            });
    }

    /// Error window shown when a project file failed to load.
    fn draw_load_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(error) = self.dialogs.load_error.clone() else {
            return;
        };
        egui::Window::new("Load error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(error);
                if ui.button("Close").clicked() {
                    self.dialogs.load_error = None;
                }
            });
    }

    /// In-app usage guide.
    fn draw_help_window(&mut self, ctx: &egui::Context) {
        let mut open = self.dialogs.show_help;
        egui::Window::new("Help")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Build a program out of event → action rows:");
                ui.label("• Click a palette card to add it to the bottom row.");
                ui.label("• Drag a palette card onto a row to fill or replace a slot.");
                ui.label("• Click a row to select it, then tune values below.");
                ui.label("• Delete removes the selected row.");
                ui.separator();
                ui.label("Rows run top to bottom on the robot: when an event fires,");
                ui.label("its action runs. Advanced mode adds state filters so rows");
                ui.label("can be gated on the robot's memory state.");
            });
        self.dialogs.show_help = open;
    }
}

/// Draws the editors for one card's parameter slots.
///
/// # Arguments
///
/// * `ui` - The egui UI context
/// * `card` - The card being edited
/// * `show_state` - Whether to expose the state filter (event cards in
///   advanced mode)
///
/// # Returns
///
/// `true` if any value was changed this frame.
fn card_editor(ui: &mut egui::Ui, card: &mut CardSpec, show_state: bool) -> bool {
    let mut changed = false;
    ui.label(card.kind().label());

    let (min, max) = card.kind().value_range();
    ui.horizontal_wrapped(|ui| {
        for slot in 0..card.values().len() {
            let mut value = card.value(slot);
            if ui
                .add(egui::DragValue::new(&mut value).range(min..=max))
                .changed()
            {
                card.set_value(slot, value);
                changed = true;
            }
        }
    });

    if show_state && card.role() == CardRole::Event {
        ui.horizontal(|ui| {
            ui.label("State filter");
            let mut filter = card.state_filter();
            if ui
                .add(egui::DragValue::new(&mut filter).range(0..=15))
                .changed()
            {
                card.set_state_filter(filter);
                changed = true;
            }
        });
    }
    changed
}

#[cfg(test)]
mod tests;
