//! GUI module - User interface components

mod app;
mod control_panel;
mod data_view;

pub use app::VisualizerApp;
pub use control_panel::{ControlPanel, ControlPanelAction, StatusKind};
pub use data_view::DataView;
