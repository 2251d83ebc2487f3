use eframe::egui;

use super::app::AppModel;

/// Trait every tab/page implements.
/// Keeping per-tab state inside each struct makes it easy to add tabs.
pub trait TabPage {
    /// Unique, stable ID for the tab.
    fn id(&self) -> &'static str;

    /// Human-readable label shown in the sidebar.
    fn label(&self) -> &'static str;

    /// Draw the main content for this tab (right side).
    fn ui(&mut self, ui: &mut egui::Ui, model: &mut AppModel);

    /// Called every frame for every tab, visible or not.
    fn poll(&mut self, _ctx: &egui::Context, _model: &mut AppModel) {}
}
