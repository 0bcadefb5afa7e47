mod app;
mod color;
mod ui;

use app::AutodashApp;
use autodash::Settings;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Autodash – Data Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(AutodashApp::new(settings)))),
    )
}
