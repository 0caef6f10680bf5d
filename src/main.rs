use anyhow::{anyhow, Context};
use eframe::egui;
use sketch_calc::gui::SketchApp;
use sketch_calc::recognize::HttpRecognitionService;
use sketch_calc::settings::{resolve_settings_path, Settings};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings_path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => resolve_settings_path()?,
    };
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("load settings from {}", settings_path.display()))?;

    sketch_calc::logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::info!(
        endpoint = %settings.endpoint,
        settings = %settings_path.display(),
        "starting sketch_calc"
    );

    let service = Arc::new(HttpRecognitionService::from_settings(&settings)?);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                settings.canvas_width as f32 + 200.0,
                settings.canvas_height as f32,
            ])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sketch Calc",
        native_options,
        Box::new(move |cc| Box::new(SketchApp::new(cc, settings, service))),
    )
    .map_err(|e| anyhow!("run gui: {e}"))
}
