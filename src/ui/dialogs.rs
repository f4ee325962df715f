use crate::app::TimelineApp;
use crate::ui::theme;
use egui::{Context, RichText, Window};

const SHORTCUTS: &[(&str, &str)] = &[
    ("Drag bar", "Move task (group if selected)"),
    ("Ctrl/Cmd+Click", "Toggle selection"),
    ("Shift+Click", "Select range in lane"),
    ("Double-click", "Rename"),
    ("Ctrl+A", "Select all"),
    ("Del / Backspace", "Delete selected"),
    ("Esc", "Clear selection / cancel drag"),
    ("Ctrl+Scroll", "Zoom"),
];

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 0.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Swimlane Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
            });

            egui::Grid::new("shortcut_grid")
                .num_columns(2)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for (keys, what) in SHORTCUTS {
                        ui.label(RichText::new(*keys).strong());
                        ui.label(RichText::new(*what).color(theme::TEXT_SECONDARY));
                        ui.end_row();
                    }
                });

            ui.add_space(14.0);
            ui.vertical_centered(|ui| {
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
