use eframe::{egui::{*}, Frame};
use log::info;

use super::ui::*;
use super::upload_search_page::*;
use super::log_page::*;
use super::settings_page::*;

pub const APP_NAME : &str = "Log Panel";

const APP_SIDEBAR_WIDTH : f32 = 180.0;
const APP_TITLE_PADDING : f32 = 12.0;
pub const APP_HEADER_PADDING : f32 = 20.0;

/// State every tab can see.
#[derive(Default)]
pub struct AppModel {
    pub config: Config,
    /// One line per finished operation, oldest first.
    pub activity: Vec<String>,
}
impl AppModel {
    pub fn new(config: Config) -> Self {
        Self { config, activity: Vec::new() }
    }

    pub fn record(&mut self, line: String) {
        info!("{}", line);
        self.activity.push(line);
    }
}

/// Application root: holds the tabs, the active tab index and the shared model.
pub struct App {
    pages: Vec<Box<dyn TabPage>>,
    active: usize,

    // To make it so the tabs have global information access
    model : AppModel,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let pages: Vec<Box<dyn TabPage>> = vec![
            Box::new(UploadSearchPage::default()),
            Box::new(SettingsPage::new(&config)),
            Box::new(LogPage::default()),
        ];

        let mut model = AppModel::new(config);
        model.record(format!("Welcome to {} ver. {}, backend at {}",
            APP_NAME, env!("CARGO_PKG_VERSION"), model.config.backend_url));

        Self {
            pages,
            active: 0,
            model,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        ctx.set_pixels_per_point(self.model.config.pixels_per_point);

        for page in self.pages.iter_mut() {
            page.poll(ctx, &mut self.model);
        }

        // LEFT SIDEBAR
        SidePanel::left("sidebar")
            .exact_width(APP_SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(APP_NAME);
                });

                ui.add_space(APP_TITLE_PADDING);

                ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    for i in 0..self.pages.len() {
                        let label = self.pages[i].label();
                        let resp = ui.selectable_label(self.active == i, label);
                        if resp.clicked() {
                            self.active = i;
                        }
                    }
                });
            });

        // RIGHT CONTENT
        CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);

            if let Some(page) = self.pages.get_mut(self.active) {
                page.ui(ui, &mut self.model);
            } else {
                ui.label("No page selected.");
            }
        });
    }
}
