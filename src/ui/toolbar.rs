use crate::app::TimelineApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

fn menu_title(text: &str) -> RichText {
    RichText::new(format!("  {text}  ")).size(13.0)
}

/// Render the top menu bar and quick-action buttons.
pub fn show_toolbar(app: &mut TimelineApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(menu_title("Timeline"), |ui| {
            if ui.button(format!("{} Add Lane", icons::ROWS)).clicked() {
                app.add_lane();
                ui.close_menu();
            }
            if ui.button(format!("{} Add Milestone", icons::FLAG)).clicked() {
                app.add_milestone();
                ui.close_menu();
            }
        });

        ui.menu_button(menu_title("Edit"), |ui| {
            if ui.button("  Select All        Ctrl+A").clicked() {
                app.select_all();
                ui.close_menu();
            }
            if ui.button("  Clear Selection   Esc").clicked() {
                app.clear_selection();
                ui.close_menu();
            }
            ui.separator();
            let delete = ui.add_enabled(
                !app.selection.is_empty(),
                egui::Button::new("  Delete Selected   Del"),
            );
            if delete.clicked() {
                app.delete_selected();
                ui.close_menu();
            }
        });

        ui.menu_button(menu_title("View"), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.zoom_out();
                ui.close_menu();
            }
        });

        ui.menu_button(menu_title("Help"), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .button(format!("{} Lane", icons::PLUS))
            .on_hover_text("Add a swim lane")
            .clicked()
        {
            app.add_lane();
        }
        if ui
            .button(format!("{} Milestone", icons::FLAG))
            .on_hover_text("Add a milestone")
            .clicked()
        {
            app.add_milestone();
        }
        if !app.selection.is_empty() {
            let label = RichText::new(format!("{} Delete ({})", icons::TRASH, app.selection.len()))
                .color(theme::OVERLAP_WARNING);
            if ui.button(label).clicked() {
                app.delete_selected();
            }
            if ui.button("Clear Selection").clicked() {
                app.clear_selection();
            }
        }

        // Right-aligned project name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(&app.project.name).size(11.0).weak());
        });
    });
}
