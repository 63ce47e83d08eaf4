//! Drawing primitives for card slots, palette entries, and row arrows.
//!
//! This module contains the pure painting side of the editor: given a
//! rect and a card (or the lack of one), draw it. Hit testing and state
//! changes live in the canvas module; nothing here mutates the program.

use super::state::RobocardsApp;
use crate::cards::{CardKind, CardRole, CardSpec};
use crate::constants::{ColorScheme, CARD_CORNER_RADIUS, COLOR_SCHEMES};
use eframe::egui;
use eframe::epaint::StrokeKind;

impl RobocardsApp {
    /// The color scheme currently selected on the document.
    ///
    /// Out-of-range indices fall back to the first scheme, matching the
    /// load-time clamping, so rendering never panics on odd state.
    pub fn active_scheme(&self) -> ColorScheme {
        COLOR_SCHEMES
            .get(self.program.color_scheme())
            .copied()
            .unwrap_or(COLOR_SCHEMES[0])
    }

    /// Draws one side of a pair row: either a card or an empty slot.
    ///
    /// Empty slots render as a faint placeholder in the role's color so
    /// the user can see where a palette card may be dropped.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `rect` - The screen-space rectangle of the slot
    /// * `card` - The card occupying the slot, if any
    /// * `role` - Which side of the row this slot is
    /// * `scale` - Current canvas scale factor
    pub fn draw_card_slot(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        card: Option<&CardSpec>,
        role: CardRole,
        scale: f32,
    ) {
        let scheme = self.active_scheme();
        let fill = match role {
            CardRole::Event => scheme.event,
            CardRole::Action => scheme.action,
        };
        let corner = CARD_CORNER_RADIUS * scale;

        match card {
            Some(card) => {
                painter.rect_filled(rect, corner, fill);
                painter.rect_stroke(
                    rect,
                    corner,
                    egui::Stroke::new(1.5 * scale, fill.gamma_multiply(0.6)),
                    StrokeKind::Inside,
                );
                draw_card_glyph(painter, rect, card.kind(), scale);

                let label_pos = egui::pos2(rect.center().x, rect.min.y + 14.0 * scale);
                painter.text(
                    label_pos,
                    egui::Align2::CENTER_CENTER,
                    card.kind().label(),
                    egui::FontId::proportional((13.0 * scale).max(8.0)),
                    egui::Color32::BLACK,
                );

                if !card.values().is_empty() {
                    let summary = card
                        .values()
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(" ");
                    let value_pos = egui::pos2(rect.center().x, rect.max.y - 12.0 * scale);
                    painter.text(
                        value_pos,
                        egui::Align2::CENTER_CENTER,
                        summary,
                        egui::FontId::monospace((10.0 * scale).max(7.0)),
                        egui::Color32::from_black_alpha(200),
                    );
                }

                // State badge on filtered event cards, advanced mode only
                if self.program.advanced() && role == CardRole::Event && card.state_filter() != 0 {
                    let badge_pos =
                        egui::pos2(rect.max.x - 12.0 * scale, rect.min.y + 12.0 * scale);
                    painter.circle_filled(badge_pos, 8.0 * scale, egui::Color32::from_gray(40));
                    painter.text(
                        badge_pos,
                        egui::Align2::CENTER_CENTER,
                        card.state_filter().to_string(),
                        egui::FontId::proportional((10.0 * scale).max(7.0)),
                        egui::Color32::WHITE,
                    );
                }
            }
            None => {
                let faint = fill.gamma_multiply(0.15);
                painter.rect_filled(rect, corner, faint);
                painter.rect_stroke(
                    rect,
                    corner,
                    egui::Stroke::new(1.0, fill.gamma_multiply(0.5)),
                    StrokeKind::Inside,
                );
            }
        }
    }

    /// Draws the arrow connecting the event slot to the action slot.
    pub fn draw_row_arrow(&self, painter: &egui::Painter, rect: egui::Rect, scale: f32) {
        let color = if self.dark_mode {
            egui::Color32::from_gray(180)
        } else {
            egui::Color32::from_gray(90)
        };
        let stroke = egui::Stroke::new(3.0 * scale, color);
        let mid_y = rect.center().y;
        let head_len = 10.0 * scale;
        let shaft_end = egui::pos2(rect.max.x - head_len, mid_y);

        painter.line_segment([egui::pos2(rect.min.x, mid_y), shaft_end], stroke);
        painter.add(egui::Shape::convex_polygon(
            vec![
                egui::pos2(rect.max.x, mid_y),
                egui::pos2(rect.max.x - head_len, mid_y - 7.0 * scale),
                egui::pos2(rect.max.x - head_len, mid_y + 7.0 * scale),
            ],
            color,
            egui::Stroke::NONE,
        ));
    }

    /// Draws one palette entry: a small card in the role's color with
    /// its glyph and label.
    pub fn draw_palette_entry(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        kind: CardKind,
        hovered: bool,
        scale: f32,
    ) {
        let scheme = self.active_scheme();
        let fill = match kind.role() {
            CardRole::Event => scheme.event,
            CardRole::Action => scheme.action,
        };
        let fill = if hovered {
            fill
        } else {
            fill.gamma_multiply(0.85)
        };
        let corner = CARD_CORNER_RADIUS * 0.75 * scale;

        painter.rect_filled(rect, corner, fill);
        if hovered {
            painter.rect_stroke(
                rect,
                corner,
                egui::Stroke::new(2.0, egui::Color32::WHITE),
                StrokeKind::Inside,
            );
        }
        draw_card_glyph(painter, rect, kind, scale * 0.6);
        painter.text(
            egui::pos2(rect.center().x, rect.max.y - 9.0 * scale),
            egui::Align2::CENTER_CENTER,
            kind.label(),
            egui::FontId::proportional((10.0 * scale).max(7.0)),
            egui::Color32::BLACK,
        );
    }

    /// Draws the translucent card that follows the pointer during a
    /// palette drag.
    pub fn draw_drag_ghost(&self, ctx: &egui::Context, kind: CardKind) {
        let Some(pos) = ctx.pointer_latest_pos() else {
            return;
        };
        let scale = self.interaction.canvas_scale;
        let size = crate::constants::PALETTE_ICON_SIZE * scale;
        let rect = egui::Rect::from_center_size(pos, egui::vec2(size, size));

        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("palette_drag_ghost"),
        ));
        let scheme = self.active_scheme();
        let fill = match kind.role() {
            CardRole::Event => scheme.event,
            CardRole::Action => scheme.action,
        };
        painter.rect_filled(
            rect,
            CARD_CORNER_RADIUS * 0.75 * scale,
            fill.gamma_multiply(0.7),
        );
        draw_card_glyph(&painter, rect, kind, scale * 0.6);
    }
}

/// Paints the per-kind pictogram centered in `rect`.
///
/// These are deliberately simple painter primitives, enough to tell the
/// kinds apart at palette size without shipping image assets.
fn draw_card_glyph(painter: &egui::Painter, rect: egui::Rect, kind: CardKind, scale: f32) {
    let center = rect.center();
    let ink = egui::Color32::from_black_alpha(160);
    let stroke = egui::Stroke::new(2.0 * scale.max(0.5), ink);
    let r = 18.0 * scale;

    match kind {
        CardKind::Button => {
            // Four arrow pads around a center pad
            painter.circle_filled(center, 5.0 * scale, ink);
            for offset in [
                egui::vec2(0.0, -r),
                egui::vec2(0.0, r),
                egui::vec2(-r, 0.0),
                egui::vec2(r, 0.0),
            ] {
                painter.circle_stroke(center + offset, 5.0 * scale, stroke);
            }
        }
        CardKind::Prox => {
            // Rays fanning forward from a baseline
            let base = egui::pos2(center.x, center.y + r * 0.6);
            painter.line_segment(
                [base + egui::vec2(-r, 0.0), base + egui::vec2(r, 0.0)],
                stroke,
            );
            for dx in [-0.8_f32, -0.4, 0.0, 0.4, 0.8] {
                let tip = egui::pos2(center.x + r * dx, center.y - r * 0.9);
                painter.line_segment([base, tip], stroke);
            }
        }
        CardKind::ProxGround => {
            // Two short rays pointing down at the ground line
            let ground = egui::pos2(center.x, center.y + r * 0.9);
            painter.line_segment(
                [ground + egui::vec2(-r, 0.0), ground + egui::vec2(r, 0.0)],
                stroke,
            );
            for dx in [-0.4_f32, 0.4] {
                let top = egui::pos2(center.x + r * dx, center.y - r * 0.6);
                let bottom = egui::pos2(center.x + r * dx, ground.y - 4.0 * scale);
                painter.line_segment([top, bottom], stroke);
            }
        }
        CardKind::Tap => {
            // Tap ripple
            painter.circle_stroke(center, r * 0.45, stroke);
            painter.circle_stroke(center, r * 0.9, stroke);
        }
        CardKind::Clap => {
            // Sound burst radiating from the center
            for angle in 0..8 {
                let a = angle as f32 * std::f32::consts::FRAC_PI_4;
                let dir = egui::vec2(a.cos(), a.sin());
                painter.line_segment([center + dir * (r * 0.4), center + dir * r], stroke);
            }
        }
        CardKind::Move => {
            // Two wheels under a chassis line
            let y = center.y + r * 0.4;
            painter.circle_stroke(egui::pos2(center.x - r * 0.6, y), 6.0 * scale, stroke);
            painter.circle_stroke(egui::pos2(center.x + r * 0.6, y), 6.0 * scale, stroke);
            painter.line_segment(
                [
                    egui::pos2(center.x - r * 0.6, y - 8.0 * scale),
                    egui::pos2(center.x + r * 0.6, y - 8.0 * scale),
                ],
                stroke,
            );
        }
        CardKind::ColorTop => {
            // Lamp above a body line
            painter.circle_filled(egui::pos2(center.x, center.y - r * 0.5), 7.0 * scale, ink);
            painter.line_segment(
                [
                    egui::pos2(center.x - r, center.y + r * 0.5),
                    egui::pos2(center.x + r, center.y + r * 0.5),
                ],
                stroke,
            );
        }
        CardKind::ColorBottom => {
            // Lamp below a body line
            painter.line_segment(
                [
                    egui::pos2(center.x - r, center.y - r * 0.5),
                    egui::pos2(center.x + r, center.y - r * 0.5),
                ],
                stroke,
            );
            painter.circle_filled(egui::pos2(center.x, center.y + r * 0.5), 7.0 * scale, ink);
        }
        CardKind::Sound => {
            // Note head with a stem
            let head = egui::pos2(center.x - r * 0.3, center.y + r * 0.5);
            painter.circle_filled(head, 5.0 * scale, ink);
            painter.line_segment(
                [
                    egui::pos2(head.x + 5.0 * scale, head.y),
                    egui::pos2(head.x + 5.0 * scale, center.y - r * 0.8),
                ],
                stroke,
            );
        }
        CardKind::StateFilter => {
            // Four state quadrants
            let half = r * 0.8;
            for (dx, dy) in [(-1.0_f32, -1.0_f32), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
                let quad = egui::Rect::from_center_size(
                    center + egui::vec2(dx * half * 0.55, dy * half * 0.55),
                    egui::vec2(half * 0.8, half * 0.8),
                );
                painter.rect_stroke(quad, 2.0 * scale, stroke, StrokeKind::Inside);
            }
        }
    }
}

/// Paints a two-swatch preview of a color scheme, used by the toolbar's
/// scheme selector.
pub fn draw_scheme_preview(painter: &egui::Painter, rect: egui::Rect, scheme: ColorScheme) {
    let half_width = rect.width() / 2.0 - 1.0;
    let left = egui::Rect::from_min_size(rect.min, egui::vec2(half_width, rect.height()));
    let right = egui::Rect::from_min_size(
        egui::pos2(rect.min.x + half_width + 2.0, rect.min.y),
        egui::vec2(half_width, rect.height()),
    );
    painter.rect_filled(left, 3.0, scheme.event);
    painter.rect_filled(right, 3.0, scheme.action);
}
