//! Visualizer Main Application
//! Main window with the control panel on the left and the data view in the centre.

use crate::charts::{ChartData, StaticChartRenderer};
use crate::config::AppConfig;
use crate::data::{CsvExporter, DataLoader, EXPORT_FILE_NAME};
use crate::gui::{ControlPanel, ControlPanelAction, DataView, StatusKind};
use crate::session::Session;
use anyhow::{Context, Result};
use egui::SidePanel;
use std::path::{Path, PathBuf};

const PNG_FILE_NAME: &str = "chart.png";

/// Main application window.
pub struct VisualizerApp {
    config: AppConfig,
    session: Session,
    control_panel: ControlPanel,
    data_view: DataView,
}

impl VisualizerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            session: Session::new(DataLoader::new(config.infer_schema_rows)),
            config,
            control_panel: ControlPanel::new(),
            data_view: DataView::new(),
        }
    }

    /// Handle CSV file selection. Loading runs to completion before the next frame.
    fn handle_browse_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        match self.session.load_file(&path) {
            Ok(()) => {
                self.control_panel.csv_path = Some(path);
                self.control_panel.saved_path = None;
                self.data_view.refresh(&self.session, self.config.preview_rows);
                if let Some(data) = self.session.data() {
                    self.control_panel.set_status(
                        StatusKind::Success,
                        format!(
                            "Loaded {} rows, {} columns",
                            data.dataset.row_count(),
                            data.dataset.column_count()
                        ),
                    );
                }
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                self.control_panel
                    .set_status(StatusKind::Error, format!("Error: {}", e));
            }
        }
    }

    fn handle_download_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        else {
            return; // User cancelled
        };

        let result = self
            .session
            .data()
            .context("No data loaded")
            .and_then(|data| CsvExporter::save(&data.filtered, &path));
        self.finish_save(result, path, "Filtered data");
    }

    fn handle_save_png(&mut self) {
        let Some(chart) = self.data_view.chart() else {
            self.control_panel
                .set_status(StatusKind::Error, "No chart to save");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(PNG_FILE_NAME)
            .save_file()
        else {
            return;
        };

        let result = Self::write_png(chart, &path, &self.config);
        self.finish_save(result, path, "Chart");
    }

    fn write_png(chart: &ChartData, path: &Path, config: &AppConfig) -> Result<()> {
        let bytes = StaticChartRenderer::render_png(chart, config.png_width, config.png_height)
            .context("Failed to render chart")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn finish_save(&mut self, result: Result<()>, path: PathBuf, what: &str) {
        match result {
            Ok(()) => {
                log::info!("{} saved to {}", what, path.display());
                self.control_panel.set_status(
                    StatusKind::Success,
                    format!("{} saved to {}", what, path.display()),
                );
                self.control_panel.saved_path = Some(path);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.control_panel
                    .set_status(StatusKind::Error, format!("Error: {e:#}"));
            }
        }
    }

    fn handle_copy_summary(&mut self, ctx: &egui::Context) {
        let Some(data) = self.session.data() else {
            return;
        };
        match data.summary.to_json() {
            Ok(json) => {
                ctx.copy_text(json);
                self.control_panel
                    .set_status(StatusKind::Success, "Summary copied to clipboard");
            }
            Err(e) => {
                log::error!("Failed to serialize summary: {}", e);
                self.control_panel
                    .set_status(StatusKind::Error, format!("Error: {}", e));
            }
        }
    }

    fn handle_open_saved(&mut self) {
        let Some(path) = &self.control_panel.saved_path else {
            return;
        };
        if let Err(e) = open::that(path) {
            log::error!("Failed to open {}: {}", path.display(), e);
            self.control_panel
                .set_status(StatusKind::Error, format!("Error: {}", e));
        }
    }

    fn handle_action(&mut self, action: ControlPanelAction, ctx: &egui::Context) {
        let preview_rows = self.config.preview_rows;
        match action {
            ControlPanelAction::None => {}
            ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
            ControlPanelAction::FilterColumnChanged(column) => {
                self.session.select_filter_column(&column);
                self.data_view.refresh_filtered(&self.session, preview_rows);
            }
            ControlPanelAction::PredicateChanged(predicate) => {
                self.session.set_predicate(predicate);
                self.data_view.refresh_filtered(&self.session, preview_rows);
            }
            ControlPanelAction::ChartKindChanged(kind) => {
                self.session.set_chart_kind(kind);
                self.data_view.refresh_chart(&self.session);
            }
            ControlPanelAction::ChartSpecChanged(spec) => {
                self.session.set_chart_spec(spec);
                self.data_view.refresh_chart(&self.session);
            }
            ControlPanelAction::DownloadCsv => self.handle_download_csv(),
            ControlPanelAction::SavePng => self.handle_save_png(),
            ControlPanelAction::CopySummary => self.handle_copy_summary(ctx),
            ControlPanelAction::OpenSaved => self.handle_open_saved(),
        }
    }
}

impl eframe::App for VisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(320.0)
            .max_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, &self.session);
                    self.handle_action(action, ctx);
                });
            });

        // Central panel - Data View
        egui::CentralPanel::default().show(ctx, |ui| {
            self.data_view.show(ui);
        });
    }
}
