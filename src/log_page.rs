use eframe::egui::{ScrollArea, Ui};
use super::ui::TabPage;
use super::app::{AppModel, APP_HEADER_PADDING};

/// The “Activity” tab: what happened this session.
#[derive(Default)]
pub struct LogPage;

impl TabPage for LogPage {
    fn id(&self) -> &'static str { "log" }
    fn label(&self) -> &'static str { "Activity" }

    fn ui(&mut self, ui: &mut Ui, model: &mut AppModel) {
        ui.horizontal(|ui| {
            ui.heading("Activity");
            if ui.button("Clear").clicked() {
                model.activity.clear();
            }
        });

        ui.add_space(APP_HEADER_PADDING);

        if model.activity.is_empty() {
            ui.weak("Nothing yet.");
            return;
        }

        ScrollArea::vertical()
            .id_salt("activity_scroll")
            .auto_shrink([false; 2])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &model.activity {
                    ui.label(line);
                }
            });
    }
}
