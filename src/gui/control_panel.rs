//! Control Panel Widget
//! Left side panel: data source, row filter, chart selection and exports.

use crate::charts::{ChartKind, ChartSpec, HistogramBins};
use crate::data::FilterPredicate;
use crate::session::{LoadedData, Session};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::collections::BTreeSet;
use std::path::PathBuf;

const LABEL_WIDTH: f32 = 120.0;
const COMBO_WIDTH: f32 = 160.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Left side control panel. Holds only presentation state; the data lives in the session.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub status: String,
    pub status_kind: StatusKind,
    /// Last file written by a save action, offered for opening.
    pub saved_path: Option<PathBuf>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            status: "Upload a CSV file to get started".to_string(),
            status_kind: StatusKind::Info,
            saved_path: None,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, kind: StatusKind, status: impl Into<String>) {
        self.status_kind = kind;
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, session: &Session) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Interactive Data Visualizer")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        if let Some(data) = session.data() {
            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
            Self::show_filter(ui, data, &mut action);

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
            Self::show_chart_selection(ui, data, session.chart_spec(), &mut action);

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
            self.show_exports(ui, &mut action);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = match self.status_kind {
            StatusKind::Error => Color32::from_rgb(220, 53, 69),
            StatusKind::Success => Color32::from_rgb(40, 167, 69),
            StatusKind::Info => Color32::GRAY,
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    fn show_filter(ui: &mut egui::Ui, data: &LoadedData, action: &mut ControlPanelAction) {
        ui.label(RichText::new("🔎 Filter Data").size(14.0).strong());
        ui.add_space(8.0);

        let current = data.filter_column.clone().unwrap_or_default();
        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Filter column:"));
            ComboBox::from_id_salt("filter_column")
                .width(COMBO_WIDTH)
                .selected_text(&current)
                .show_ui(ui, |ui| {
                    for info in data.dataset.columns() {
                        let text = format!("{} ({})", info.name, info.kind.label());
                        if ui.selectable_label(current == info.name, text).clicked()
                            && current != info.name
                        {
                            *action = ControlPanelAction::FilterColumnChanged(info.name.clone());
                        }
                    }
                });
        });
        ui.add_space(5.0);

        let Some(predicate) = &data.predicate else {
            return;
        };
        let show_missing = data.dataset.has_missing(&current);

        match predicate {
            FilterPredicate::Categories {
                allowed,
                include_missing,
            } => {
                let mut allowed = allowed.clone();
                let mut include_missing = *include_missing;
                let mut changed = false;
                let values = data.dataset.distinct_values(&current);

                ui.label(format!("Select values for {}:", current));
                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(5.0)
                    .inner_margin(5.0)
                    .show(ui, |ui| {
                        ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                            for value in &values {
                                let mut checked = allowed.contains(value);
                                if ui.checkbox(&mut checked, value).changed() {
                                    changed = true;
                                    if checked {
                                        allowed.insert(value.clone());
                                    } else {
                                        allowed.remove(value);
                                    }
                                }
                            }
                            if show_missing
                                && ui.checkbox(&mut include_missing, "(missing)").changed()
                            {
                                changed = true;
                            }
                        });
                    });

                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    if ui.small_button("Select All").clicked() {
                        allowed = values.iter().cloned().collect();
                        include_missing = true;
                        changed = true;
                    }
                    if ui.small_button("Clear All").clicked() {
                        allowed = BTreeSet::new();
                        include_missing = false;
                        changed = true;
                    }
                });

                if changed {
                    *action = ControlPanelAction::PredicateChanged(FilterPredicate::Categories {
                        allowed,
                        include_missing,
                    });
                }
            }
            FilterPredicate::Range {
                lo,
                hi,
                include_missing,
            } => {
                let Some((min, max)) = data.dataset.value_range(&current) else {
                    ui.label(RichText::new("Column has no values").color(Color32::GRAY));
                    return;
                };
                let (mut lo, mut hi, mut include_missing) = (*lo, *hi, *include_missing);
                let mut changed = false;

                ui.label(format!("Select range for {}:", current));
                ui.horizontal(|ui| {
                    ui.add_sized([40.0, 20.0], egui::Label::new("Min"));
                    changed |= ui.add(egui::Slider::new(&mut lo, min..=max)).changed();
                });
                ui.horizontal(|ui| {
                    ui.add_sized([40.0, 20.0], egui::Label::new("Max"));
                    changed |= ui.add(egui::Slider::new(&mut hi, min..=max)).changed();
                });
                if show_missing {
                    changed |= ui.checkbox(&mut include_missing, "(missing)").changed();
                }

                if changed {
                    *action = ControlPanelAction::PredicateChanged(FilterPredicate::Range {
                        lo,
                        hi,
                        include_missing,
                    });
                }
            }
        }

        ui.add_space(5.0);
        ui.label(
            RichText::new(format!(
                "{} of {} rows match",
                data.filtered.row_count(),
                data.dataset.row_count()
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );
    }

    fn show_chart_selection(
        ui: &mut egui::Ui,
        data: &LoadedData,
        spec: &ChartSpec,
        action: &mut ControlPanelAction,
    ) {
        ui.label(RichText::new("📈 Data Visualization").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Chart type:"));
            ComboBox::from_id_salt("chart_kind")
                .width(COMBO_WIDTH)
                .selected_text(spec.kind.label())
                .show_ui(ui, |ui| {
                    for kind in ChartKind::ALL {
                        if ui.selectable_label(spec.kind == kind, kind.label()).clicked()
                            && spec.kind != kind
                        {
                            *action = ControlPanelAction::ChartKindChanged(kind);
                        }
                    }
                });
        });
        ui.add_space(5.0);

        let mut edited = spec.clone();
        let mut changed = false;

        if spec.kind.uses_x() {
            let candidates = spec.kind.x_candidates(&data.dataset);
            changed |= Self::column_combo(
                ui,
                "chart_x",
                spec.kind.x_label(),
                &mut edited.x,
                &candidates,
            );
            ui.add_space(5.0);
        }

        let candidates = spec.kind.y_candidates(&data.dataset);
        changed |= Self::column_combo(
            ui,
            "chart_y",
            spec.kind.y_label(),
            &mut edited.y,
            &candidates,
        );

        if spec.kind == ChartKind::Histogram {
            ui.add_space(5.0);
            let mut bins = spec.bins.get();
            ui.horizontal(|ui| {
                ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Number of bins:"));
                if ui
                    .add(egui::Slider::new(
                        &mut bins,
                        HistogramBins::MIN..=HistogramBins::MAX,
                    ))
                    .changed()
                {
                    edited.bins = HistogramBins::new(bins);
                    changed = true;
                }
            });
        }

        if changed {
            *action = ControlPanelAction::ChartSpecChanged(edited);
        }
    }

    /// Combo box over `candidates`; returns true when the selection changed.
    fn column_combo(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        selection: &mut Option<String>,
        candidates: &[String],
    ) -> bool {
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new(format!("{}:", label)));
            let selected = selection.clone().unwrap_or_else(|| "(none)".to_string());
            ComboBox::from_id_salt(id)
                .width(COMBO_WIDTH)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for col in candidates {
                        let is_selected = selection.as_deref() == Some(col.as_str());
                        if ui.selectable_label(is_selected, col).clicked() && !is_selected {
                            *selection = Some(col.clone());
                            changed = true;
                        }
                    }
                });
        });
        changed
    }

    fn show_exports(&self, ui: &mut egui::Ui, action: &mut ControlPanelAction) {
        ui.label(RichText::new("💾 Export").size(14.0).strong());
        ui.add_space(8.0);

        ui.vertical_centered(|ui| {
            let csv_button =
                egui::Button::new(RichText::new("⬇ Download Filtered Data as CSV").size(14.0))
                    .min_size(egui::vec2(240.0, 30.0));
            if ui.add(csv_button).clicked() {
                *action = ControlPanelAction::DownloadCsv;
            }
            ui.add_space(6.0);

            let png_button = egui::Button::new(RichText::new("🖼 Save chart as PNG").size(14.0))
                .min_size(egui::vec2(240.0, 30.0));
            if ui.add(png_button).clicked() {
                *action = ControlPanelAction::SavePng;
            }
            ui.add_space(6.0);

            if ui.button("📋 Copy summary as JSON").clicked() {
                *action = ControlPanelAction::CopySummary;
            }

            if let Some(path) = &self.saved_path {
                ui.add_space(6.0);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                if ui.button(format!("📂 Open {}", name)).clicked() {
                    *action = ControlPanelAction::OpenSaved;
                }
            }
        });
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FilterColumnChanged(String),
    PredicateChanged(FilterPredicate),
    ChartKindChanged(ChartKind),
    ChartSpecChanged(ChartSpec),
    DownloadCsv,
    SavePng,
    CopySummary,
    OpenSaved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_updates_kind_and_text() {
        let mut panel = ControlPanel::new();
        assert_eq!(panel.status_kind, StatusKind::Info);
        panel.set_status(StatusKind::Error, "Failed to parse CSV");
        assert_eq!(panel.status_kind, StatusKind::Error);
        assert_eq!(panel.status, "Failed to parse CSV");
    }
}
