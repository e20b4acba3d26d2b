//! Palette and egui style for the kiosk.

use eframe::egui;
use egui::Color32;

pub const BACKGROUND: Color32 = Color32::from_rgb(243, 244, 246);
pub const HEADER_FILL: Color32 = Color32::from_rgb(185, 28, 28);
pub const HEADER_MUTED_TEXT: Color32 = Color32::from_rgb(254, 202, 202);
pub const ACCENT: Color32 = Color32::from_rgb(220, 38, 38);
pub const ACCENT_HOVER: Color32 = Color32::from_rgb(185, 28, 28);
pub const DISABLED: Color32 = Color32::from_rgb(156, 163, 175);
pub const CARD_FILL: Color32 = Color32::from_rgba_premultiplied(250, 250, 250, 242);
pub const CARD_STROKE: Color32 = Color32::from_rgb(229, 231, 235);
pub const FOOTER_FILL: Color32 = Color32::from_rgb(31, 41, 55);
pub const FOOTER_TEXT: Color32 = Color32::from_rgb(156, 163, 175);
pub const TEXT_STRONG: Color32 = Color32::from_rgb(17, 24, 39);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(75, 85, 99);
pub const SUCCESS_FILL: Color32 = Color32::from_rgb(220, 252, 231);
pub const SUCCESS_ICON: Color32 = Color32::from_rgb(22, 163, 74);
pub const NOTICE_FILL: Color32 = Color32::from_rgb(254, 249, 195);
pub const NOTICE_TEXT: Color32 = Color32::from_rgb(133, 77, 14);

/// Background and text colors for a category badge.
pub fn category_badge_colors(category: &str) -> (Color32, Color32) {
    match category {
        "Dinas" => (
            Color32::from_rgb(243, 232, 255),
            Color32::from_rgb(107, 33, 168),
        ),
        "Wali Murid" => (
            Color32::from_rgb(219, 234, 254),
            Color32::from_rgb(30, 64, 175),
        ),
        "Paket/Kurir" => (
            Color32::from_rgb(254, 249, 195),
            Color32::from_rgb(133, 77, 14),
        ),
        _ => (
            Color32::from_rgb(243, 244, 246),
            Color32::from_rgb(31, 41, 55),
        ),
    }
}

pub fn apply(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = egui::Visuals::light();
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = Color32::WHITE;
    visuals.hyperlink_color = ACCENT;
    visuals.selection.bg_fill = ACCENT.gamma_multiply(0.35);
    visuals.selection.stroke = egui::Stroke::new(1.0, ACCENT);
    visuals.window_corner_radius = egui::CornerRadius::same(16);
    visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(8);
    visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(8);
    visuals.widgets.active.corner_radius = egui::CornerRadius::same(8);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, CARD_STROKE);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ACCENT.gamma_multiply(0.6));
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.2, ACCENT);
    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 8.0);
    style.spacing.interact_size = egui::vec2(40.0, 32.0);
    ctx.set_style(style);
}
