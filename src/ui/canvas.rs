//! Canvas interaction: pair rows, palette placement, and drops.
//!
//! This module owns hit testing and program mutation for the editing
//! surface: selecting rows, deleting them, appending cards from the
//! palettes, and resolving drag-and-drop onto row slots. The actual
//! painting lives in the rendering module.

use super::state::RobocardsApp;
use crate::cards::{CardKind, CardRole, CardSpec, ACTION_KINDS, EVENT_KINDS};
use crate::constants::{
    ARROW_WIDTH, CARD_CORNER_RADIUS, CARD_SIZE, IDEAL_VISIBLE_ROWS, MAX_SCALE, MIN_SCALE,
    PALETTE_ICON_SIZE, PALETTE_SPACING, ROW_PADDING, ROW_SPACING,
};
use crate::program::PairId;
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Computes the scale factor applied to rows and palette icons.
///
/// The canvas aims to keep [`IDEAL_VISIBLE_ROWS`] rows visible without
/// scrolling and the full row width in view, shrinking cards on small
/// windows. The result is clamped so cards never become unreadably
/// small nor grow past their ideal size.
pub fn compute_scale(available: egui::Vec2) -> f32 {
    let ideal_row_width = 2.0 * CARD_SIZE + ARROW_WIDTH + 2.0 * ROW_PADDING;
    let ideal_row_height = CARD_SIZE + 2.0 * ROW_PADDING + ROW_SPACING;
    let height_scale = available.y / (IDEAL_VISIBLE_ROWS * ideal_row_height);
    let width_scale = available.x / ideal_row_width;
    height_scale.min(width_scale).clamp(MIN_SCALE, MAX_SCALE)
}

impl RobocardsApp {
    /// Draws the pair-row canvas and resolves row interactions.
    ///
    /// Rows are drawn top to bottom in program order inside a vertical
    /// scroll area. Clicking a row selects it; the selected row shows a
    /// delete button. While a palette drag is in flight the row under
    /// the pointer is tracked as the drop target and highlighted, and
    /// the drop is resolved here on release.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let scale = compute_scale(ui.available_size());
        self.interaction.canvas_scale = scale;

        let row_width = scale * (2.0 * CARD_SIZE + ARROW_WIDTH + 2.0 * ROW_PADDING);
        let row_height = scale * (CARD_SIZE + 2.0 * ROW_PADDING);
        let released = ui.input(|i| i.pointer.any_released());
        let pointer = ui.ctx().pointer_latest_pos();

        self.interaction.drop_target = None;
        let mut hovering_virtual_row = false;
        let mut pending_delete: Option<PairId> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(ROW_SPACING * scale);
                ui.vertical_centered(|ui| {
                    if self.program.is_empty() {
                        // The virgin program stores no rows at all, so
                        // offer one virtual placeholder row to drop the
                        // first card onto.
                        let (rect, _response) = ui.allocate_exact_size(
                            egui::vec2(row_width, row_height),
                            egui::Sense::hover(),
                        );
                        let under_pointer = pointer.is_some_and(|p| rect.contains(p));
                        if self.interaction.dragging_kind.is_some() && under_pointer {
                            hovering_virtual_row = true;
                        }
                        self.draw_pair_row(ui, rect, None, scale, hovering_virtual_row);
                        return;
                    }

                    let ids: Vec<PairId> = self.program.pairs().iter().map(|p| p.id).collect();
                    for id in ids {
                        // Rows can disappear mid-frame (delete button),
                        // so re-check before each draw.
                        if self.program.pair(id).is_none() {
                            continue;
                        }

                        let (rect, response) = ui.allocate_exact_size(
                            egui::vec2(row_width, row_height),
                            egui::Sense::click(),
                        );
                        if response.clicked() {
                            self.interaction.selected_pair = Some(id);
                        }

                        let under_pointer = pointer.is_some_and(|p| rect.contains(p));
                        let is_drop_target =
                            self.interaction.dragging_kind.is_some() && under_pointer;
                        if is_drop_target {
                            self.interaction.drop_target = Some(id);
                        }

                        self.draw_pair_row(ui, rect, Some(id), scale, is_drop_target);

                        if self.interaction.selected_pair == Some(id) {
                            let button_size = egui::vec2(20.0, 20.0);
                            let button_rect = egui::Rect::from_min_size(
                                egui::pos2(rect.max.x - 24.0, rect.min.y + 4.0),
                                button_size,
                            );
                            if ui.put(button_rect, egui::Button::new("✕").small()).clicked() {
                                pending_delete = Some(id);
                            }
                        }

                        ui.add_space(ROW_SPACING * scale);
                    }
                });
            });

        if let Some(id) = pending_delete {
            self.program.remove_pair(id);
            if self.interaction.selected_pair == Some(id) {
                self.interaction.selected_pair = None;
            }
            if !self.program.is_empty() {
                self.program.ensure_trailing_blank_pair();
            }
        }

        // Resolve the palette drag on release, whether or not a row was
        // hit; a miss simply cancels the drag.
        if released {
            if let Some(kind) = self.interaction.dragging_kind.take() {
                let card = CardSpec::new(kind);
                if let Some(target) = self.interaction.drop_target.take() {
                    if self.program.place_card(target, card) {
                        self.interaction.selected_pair = Some(target);
                        self.program.ensure_trailing_blank_pair();
                    }
                } else if hovering_virtual_row {
                    self.append_card(card);
                }
            }
            self.interaction.drop_target = None;
        }
    }

    /// Draws one pair row: background, both card slots, and the arrow.
    fn draw_pair_row(
        &self,
        ui: &egui::Ui,
        rect: egui::Rect,
        id: Option<PairId>,
        scale: f32,
        is_drop_target: bool,
    ) {
        let painter = ui.painter();
        let selected = id.is_some() && self.interaction.selected_pair == id;

        let background = if self.dark_mode {
            egui::Color32::from_gray(45)
        } else {
            egui::Color32::from_gray(230)
        };
        painter.rect_filled(rect, CARD_CORNER_RADIUS * scale, background);
        if selected {
            painter.rect_stroke(
                rect,
                CARD_CORNER_RADIUS * scale,
                egui::Stroke::new(2.0, egui::Color32::from_rgb(100, 150, 255)),
                StrokeKind::Inside,
            );
        } else if is_drop_target {
            painter.rect_stroke(
                rect,
                CARD_CORNER_RADIUS * scale,
                egui::Stroke::new(2.0, egui::Color32::from_rgb(120, 220, 120)),
                StrokeKind::Inside,
            );
        }

        let card_size = CARD_SIZE * scale;
        let padding = ROW_PADDING * scale;
        let event_rect = egui::Rect::from_min_size(
            egui::pos2(rect.min.x + padding, rect.min.y + padding),
            egui::vec2(card_size, card_size),
        );
        let arrow_rect = egui::Rect::from_min_size(
            egui::pos2(event_rect.max.x, rect.min.y + padding),
            egui::vec2(ARROW_WIDTH * scale, card_size),
        );
        let action_rect = egui::Rect::from_min_size(
            egui::pos2(arrow_rect.max.x, rect.min.y + padding),
            egui::vec2(card_size, card_size),
        );

        let pair = id.and_then(|id| self.program.pair(id));
        let event = pair.and_then(|p| p.event.as_ref());
        let action = pair.and_then(|p| p.action.as_ref());

        self.draw_card_slot(painter, event_rect, event, CardRole::Event, scale);
        self.draw_row_arrow(painter, arrow_rect, scale);
        self.draw_card_slot(painter, action_rect, action, CardRole::Action, scale);
    }

    /// Draws the event palette column (left panel).
    pub fn draw_event_palette(&mut self, ui: &mut egui::Ui) {
        ui.heading("Events");
        ui.separator();
        self.draw_palette_column(ui, &EVENT_KINDS);
    }

    /// Draws the action palette column (right panel).
    ///
    /// The state-setting card is only offered in advanced mode.
    pub fn draw_action_palette(&mut self, ui: &mut egui::Ui) {
        ui.heading("Actions");
        ui.separator();
        self.draw_palette_column(ui, &ACTION_KINDS);
    }

    /// Draws one palette column and handles its clicks and drag starts.
    fn draw_palette_column(&mut self, ui: &mut egui::Ui, kinds: &[CardKind]) {
        // The canvas scale from the previous frame keeps palette icons
        // in step with row cards; 1.0 on the very first frame.
        let scale = self.interaction.canvas_scale;
        let size = PALETTE_ICON_SIZE * scale;

        for kind in kinds {
            if *kind == CardKind::StateFilter && !self.program.advanced() {
                continue;
            }
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(size, size),
                egui::Sense::click_and_drag(),
            );
            self.draw_palette_entry(ui.painter(), rect, *kind, response.hovered(), scale);

            if response.drag_started() {
                self.interaction.dragging_kind = Some(*kind);
            }
            if response.clicked() {
                self.append_card(CardSpec::new(*kind));
            }
            ui.add_space(PALETTE_SPACING * scale);
        }
    }

    /// Appends a palette card to the program.
    ///
    /// The card prefers the selected row when its matching slot is
    /// free, so clicking an event and then an action palette entry
    /// builds up one row rather than two. Otherwise it lands in the
    /// trailing blank row, or a new row when the program is empty. The
    /// receiving row is selected and a fresh blank row is kept below.
    pub(super) fn append_card(&mut self, card: CardSpec) {
        let role = card.role();
        let selected_free_slot = self.interaction.selected_pair.filter(|id| {
            self.program.pair(*id).is_some_and(|p| match role {
                CardRole::Event => p.event.is_none(),
                CardRole::Action => p.action.is_none(),
            })
        });
        let target = selected_free_slot.or_else(|| {
            self.program
                .pairs()
                .last()
                .filter(|p| p.is_blank())
                .map(|p| p.id)
        });
        let id = match target {
            Some(id) => {
                self.program.place_card(id, card);
                id
            }
            None => match role {
                CardRole::Event => self.program.add_event_card(card),
                CardRole::Action => self.program.add_action_card(card),
            },
        };
        self.program.ensure_trailing_blank_pair();
        self.interaction.selected_pair = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_scale_is_one_on_large_windows() {
        let scale = compute_scale(egui::vec2(1600.0, 1200.0));
        assert_eq!(scale, MAX_SCALE);
    }

    #[test]
    fn test_compute_scale_shrinks_on_short_windows() {
        let tall = compute_scale(egui::vec2(1600.0, 1200.0));
        let short = compute_scale(egui::vec2(1600.0, 300.0));
        assert!(short < tall);
        assert!(short >= MIN_SCALE);
    }

    #[test]
    fn test_compute_scale_shrinks_on_narrow_windows() {
        let narrow = compute_scale(egui::vec2(180.0, 1200.0));
        assert!(narrow < MAX_SCALE);
        assert!(narrow >= MIN_SCALE);
    }

    #[test]
    fn test_compute_scale_never_leaves_bounds() {
        assert_eq!(compute_scale(egui::vec2(1.0, 1.0)), MIN_SCALE);
        assert_eq!(compute_scale(egui::vec2(100000.0, 100000.0)), MAX_SCALE);
    }
}
