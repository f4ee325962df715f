#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod engine;
mod error;
mod model;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    let settings_path = config::Settings::default_path();
    let loaded = settings_path
        .as_ref()
        .ok()
        .map(|path| config::Settings::load(path));
    let settings = match &loaded {
        Some(Ok(settings)) => settings.clone(),
        _ => config::Settings::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = &settings_path {
        tracing::warn!("{e}; settings will not be saved");
    }
    if let Some(Err(e)) = &loaded {
        tracing::warn!("{e}; using default settings");
    }
    tracing::info!(path = ?settings_path.as_ref().ok(), "starting swimlane timeline");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Swimlane Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Swimlane Timeline",
        options,
        Box::new(|cc| Ok(Box::new(app::TimelineApp::new(cc, settings, settings_path.ok())))),
    )
}
