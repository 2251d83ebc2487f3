use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use eframe::egui::*;
use log::info;

use super::ui::TabPage;
use super::app::{AppModel, APP_HEADER_PADDING};
use super::backend::{BackendClient, SearchReply, UploadReply};
use super::panel::{render_record, PanelState, SearchCriteria, SelectedFile};
use super::settings_page::Config;

const ERROR_COLOR : Color32 = Color32::from_rgb(0xff, 0x4d, 0x4d);
const SUCCESS_COLOR : Color32 = Color32::from_rgb(0x4c, 0xaf, 0x50);
const FIELD_SPACING : f32 = 10.0;

/// A finished request, handed back from its worker thread.
enum Completion {
    Upload { file: String, reply: UploadReply },
    Search { criteria: SearchCriteria, reply: SearchReply },
}

/// The “Upload & Search” tab. Requests run on worker threads; their replies
/// are applied to the panel state in the order they arrive.
pub struct UploadSearchPage {
    state: PanelState,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Default for UploadSearchPage {
    fn default() -> Self {
        let (tx, rx) = channel();
        Self { state: PanelState::default(), tx, rx }
    }
}

impl UploadSearchPage {
    fn pick_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Log archive", &["tgz"])
            .set_directory(".")
            .pick_file()
        {
            self.state.select_file(SelectedFile::from_path(path));
        }
    }

    fn start_upload(&mut self, ctx: &Context, config: &Config) {
        let Some(file) = self.state.begin_upload() else { return };
        let config = config.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let reply = match BackendClient::new(&config) {
                Ok(client) => client.upload(&file),
                Err(e) => UploadReply::Transport(e.to_string()),
            };
            let _ = tx.send(Completion::Upload { file: file.name, reply });
            ctx.request_repaint();
        });
    }

    fn start_search(&mut self, ctx: &Context, config: &Config) {
        let criteria = self.state.criteria.clone();
        let config = config.clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let reply = match BackendClient::new(&config) {
                Ok(client) => client.search(&criteria),
                Err(e) => SearchReply::Transport(e.to_string()),
            };
            let _ = tx.send(Completion::Search { criteria, reply });
            ctx.request_repaint();
        });
    }

    fn apply(&mut self, completion: Completion, model: &mut AppModel) {
        match completion {
            Completion::Upload { file, reply } => {
                self.state.finish_upload(reply);
                model.record(format!("upload: {} -> {}", file, self.state.status));
            }
            Completion::Search { criteria, reply } => {
                self.state.finish_search(reply);
                let query = criteria.query_pairs().iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&");
                model.record(format!("search: [{}] -> {} ({} results)",
                    query, self.state.status, self.state.results.len()));
            }
        }
    }

    fn status_banner(&self, ui: &mut Ui) {
        let fill = if self.state.status_is_error() { ERROR_COLOR } else { SUCCESS_COLOR };
        Frame::new()
            .fill(fill)
            .corner_radius(CornerRadius::same(5))
            .inner_margin(Margin::same(10))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.colored_label(Color32::WHITE, &self.state.status);
                });
            });
    }

    fn search_field(ui: &mut Ui, value: &mut String, hint: &str) {
        ui.add(TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(f32::INFINITY));
        ui.add_space(FIELD_SPACING);
    }
}

impl TabPage for UploadSearchPage {
    fn id(&self) -> &'static str { "upload_search" }
    fn label(&self) -> &'static str { "Upload & Search" }

    fn poll(&mut self, _ctx: &Context, model: &mut AppModel) {
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion, model);
        }
    }

    fn ui(&mut self, ui: &mut Ui, model: &mut AppModel) {
        ui.heading("Upload .tgz File");

        ui.add_space(APP_HEADER_PADDING);

        ui.horizontal(|ui| {
            if ui.button("📂 Choose file").clicked() {
                self.pick_file();
            }
            match &self.state.selected_file {
                Some(file) => ui.label(&file.name),
                None => ui.weak("No file chosen"),
            };
        });
        ui.add_space(FIELD_SPACING);
        if ui.button("Upload").clicked() {
            self.start_upload(ui.ctx(), &model.config);
        }

        ui.add_space(APP_HEADER_PADDING);

        if self.state.loading {
            ui.horizontal(|ui| {
                ui.add(Spinner::new());
                ui.label("Uploading…");
            });
            ui.add_space(APP_HEADER_PADDING);
        }

        if !self.state.status.is_empty() {
            self.status_banner(ui);
            ui.add_space(APP_HEADER_PADDING);
        }

        let criteria = &mut self.state.criteria;
        Self::search_field(ui, &mut criteria.search_string, "Search (e.g., account_id=264684)");
        Self::search_field(ui, &mut criteria.earliest_time, "Earliest Time (Epoch)");
        Self::search_field(ui, &mut criteria.latest_time, "Latest Time (Epoch)");
        if ui.button("Search Logs").clicked() {
            info!("Searching {}", model.config.backend_url);
            self.start_search(ui.ctx(), &model.config);
        }

        if !self.state.results.is_empty() {
            ui.add_space(APP_HEADER_PADDING);
            ui.heading("Search Results:");
            ScrollArea::vertical()
                .id_salt("results_scroll")
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for record in &self.state.results {
                        ui.monospace(render_record(record));
                        ui.separator();
                    }
                });
        }
    }
}
