//! Data View Widget
//! Central scrollable panel: dataset preview, metrics, summary statistics,
//! the filtered rows and the current chart.

use crate::charts::{ChartData, ChartInputError, ChartPlotter};
use crate::data::TablePreview;
use crate::session::Session;
use crate::stats::SummaryStats;
use egui::{Color32, RichText, ScrollArea};

const TABLE_HEIGHT: f32 = 240.0;
const SECTION_SPACING: f32 = 18.0;

/// Everything the central panel shows, recomputed whenever the session changes.
#[derive(Default)]
pub struct DataView {
    preview: Option<TablePreview>,
    filtered: Option<TablePreview>,
    summary: Option<SummaryStats>,
    chart: Option<Result<ChartData, ChartInputError>>,
}

impl DataView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every view from the session.
    pub fn refresh(&mut self, session: &Session, preview_rows: usize) {
        let Some(data) = session.data() else {
            *self = Self::default();
            return;
        };

        self.preview = Some(data.dataset.preview(preview_rows));
        self.summary = Some(data.summary.clone());
        self.refresh_filtered(session, preview_rows);
    }

    /// Rebuild the filtered table and the chart only.
    pub fn refresh_filtered(&mut self, session: &Session, preview_rows: usize) {
        self.filtered = session.data().map(|d| d.filtered.preview(preview_rows));
        self.refresh_chart(session);
    }

    pub fn refresh_chart(&mut self, session: &Session) {
        self.chart = session.data().map(|_| session.chart());
    }

    pub fn chart(&self) -> Option<&ChartData> {
        self.chart.as_ref().and_then(|c| c.as_ref().ok())
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let (Some(preview), Some(summary)) = (&self.preview, &self.summary) else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new("Upload a CSV file to get started")
                        .size(20.0)
                        .color(Color32::GRAY),
                );
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::section_title(ui, "Data Preview");
                Self::draw_table(ui, "preview_table", preview);
                ui.add_space(SECTION_SPACING);

                Self::section_title(ui, "Data Summary");
                ui.horizontal(|ui| {
                    Self::metric(ui, "Rows", summary.row_count);
                    ui.add_space(40.0);
                    Self::metric(ui, "Columns", summary.column_count);
                });
                ui.add_space(6.0);
                ui.label(RichText::new("Column Names:").strong());
                ui.label(summary.column_names.join(", "));
                ui.add_space(10.0);

                ui.label(RichText::new("Statistical Summary").size(15.0).strong());
                Self::draw_stats_table(ui, summary);
                ui.add_space(SECTION_SPACING);

                if let Some(filtered) = &self.filtered {
                    Self::section_title(ui, "Filtered Data");
                    Self::draw_table(ui, "filtered_table", filtered);
                    ui.add_space(SECTION_SPACING);
                }

                if let Some(chart) = &self.chart {
                    Self::section_title(ui, "Data Visualization");
                    match chart {
                        Ok(data) => ChartPlotter::draw(ui, data),
                        Err(e) => {
                            ui.label(
                                RichText::new(e.user_message())
                                    .size(14.0)
                                    .color(Color32::from_rgb(220, 53, 69)),
                            );
                        }
                    }
                }
            });
    }

    fn section_title(ui: &mut egui::Ui, title: &str) {
        ui.label(RichText::new(title).size(18.0).strong());
        ui.add_space(6.0);
    }

    fn metric(ui: &mut egui::Ui, label: &str, value: usize) {
        ui.vertical(|ui| {
            ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
            ui.label(RichText::new(value.to_string()).size(26.0));
        });
    }

    fn draw_table(ui: &mut egui::Ui, id: &str, table: &TablePreview) {
        if table.rows.len() < table.total_rows {
            ui.label(
                RichText::new(format!(
                    "Showing first {} of {} rows",
                    table.rows.len(),
                    table.total_rows
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::both()
                    .id_salt(id)
                    .max_height(TABLE_HEIGHT)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        egui::Grid::new(id)
                            .striped(true)
                            .spacing([16.0, 4.0])
                            .show(ui, |ui| {
                                ui.label("");
                                for header in &table.headers {
                                    ui.label(RichText::new(header).strong());
                                }
                                ui.end_row();

                                for (id, row) in table.row_ids.iter().zip(&table.rows) {
                                    ui.label(RichText::new(id.to_string()).color(Color32::GRAY));
                                    for cell in row {
                                        ui.label(cell);
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }

    fn draw_stats_table(ui: &mut egui::Ui, summary: &SummaryStats) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::horizontal().id_salt("stats_table").show(ui, |ui| {
                    egui::Grid::new("stats_grid")
                        .striped(true)
                        .spacing([20.0, 4.0])
                        .show(ui, |ui| {
                            ui.label("");
                            for name in &summary.column_names {
                                ui.label(RichText::new(name).strong());
                            }
                            ui.end_row();

                            for (label, cells) in summary.table_rows() {
                                ui.label(RichText::new(label).strong());
                                for cell in cells {
                                    ui.label(cell);
                                }
                                ui.end_row();
                            }
                        });
                });
            });
    }
}
