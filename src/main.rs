//! Interactive Data Visualizer - CSV exploration with filtering and charts
//!
//! Load a CSV file, inspect its summary statistics, filter rows on one
//! column and chart the result.

mod charts;
mod config;
mod data;
mod gui;
mod session;
mod stats;

use config::AppConfig;
use eframe::egui;
use gui::VisualizerApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = AppConfig::load();
    log::info!("Starting with {:?}", config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Interactive Data Visualizer"),
        ..Default::default()
    };

    eframe::run_native(
        "Interactive Data Visualizer",
        options,
        Box::new(|cc| Ok(Box::new(VisualizerApp::new(cc, config)))),
    )
}
