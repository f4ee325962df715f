use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::model::TaskColor;

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(24, 24, 32);
pub const BG_PANEL: Color32 = Color32::from_rgb(30, 30, 40);
pub const BG_HEADER: Color32 = Color32::from_rgb(34, 37, 48);
pub const BG_LANE_HEADER: Color32 = Color32::from_rgb(38, 40, 52);
pub const BG_SELECTED: Color32 = Color32::from_rgba_premultiplied(80, 140, 220, 45);
pub const BG_STATUS_BAR: Color32 = Color32::from_rgb(22, 22, 30);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(50, 52, 64);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(90, 140, 220);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(155, 160, 178);
pub const TEXT_DIM: Color32 = Color32::from_rgb(100, 105, 120);
pub const TEXT_ON_BAR: Color32 = Color32::from_rgb(255, 255, 255);

pub const ACCENT: Color32 = Color32::from_rgb(80, 140, 220);
pub const GRID_LINE: Color32 = Color32::from_rgb(44, 46, 58);
pub const SLOT_LINE: Color32 = Color32::from_rgb(36, 38, 48);
pub const MILESTONE: Color32 = Color32::from_rgb(255, 165, 0);
pub const DEP_ARROW: Color32 = Color32::from_rgba_premultiplied(120, 130, 160, 140);
/// Outline for a bar pushed out of its requested slot during a drag.
pub const OVERLAP_WARNING: Color32 = Color32::from_rgb(240, 75, 75);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const HEADER_HEIGHT: f32 = 44.0;
pub const LANE_HEADER_HEIGHT: f32 = 26.0;
pub const LANE_LABEL_WIDTH: f32 = 150.0;
pub const BAR_ROUNDING: f32 = 5.0;
pub const BAR_INSET: f32 = 4.0; // vertical inset so bars don't touch slot edges
pub const STATUS_BAR_HEIGHT: f32 = 22.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

// ── Task colors ──────────────────────────────────────────────────────────────

pub fn task_color(color: TaskColor) -> Color32 {
    match color {
        TaskColor::Blue => Color32::from_rgb(66, 133, 244),
        TaskColor::Green => Color32::from_rgb(52, 168, 83),
        TaskColor::Red => Color32::from_rgb(229, 57, 53),
        TaskColor::Purple => Color32::from_rgb(171, 71, 188),
        TaskColor::Yellow => Color32::from_rgb(255, 193, 7),
        TaskColor::Indigo => Color32::from_rgb(92, 107, 192),
        TaskColor::Pink => Color32::from_rgb(236, 64, 122),
        TaskColor::Gray => Color32::from_rgb(117, 117, 117),
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = Color32::from_rgb(20, 20, 28); // TextEdit bg

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(42, 44, 56);
    visuals.widgets.hovered.bg_fill = Color32::from_rgb(52, 54, 68);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);

    visuals.selection.bg_fill = BG_SELECTED;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);

    ctx.set_visuals(visuals);
}
