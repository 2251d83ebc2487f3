mod app;
mod backend;
mod error;
mod log_page;
mod panel;
mod settings_page;
mod ui;
mod upload_search_page;

use eframe::egui;

use crate::app::{App, APP_NAME};
use crate::settings_page::Config;

fn main() -> eframe::Result {
  env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

  let config = Config::load();

  let options = eframe::NativeOptions {
      viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 760.0]),
      ..Default::default()
  };
  eframe::run_native(
    format!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION")).as_str(),
    options,
    Box::new(|cc| Ok(Box::new(App::new(cc, config)))),
  )
}
