use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Serialize, Deserialize};
use log::{debug, error, info};
use super::ui::TabPage;
use super::app::{AppModel, APP_HEADER_PADDING};
use super::backend::validate_base_url;
use super::error::ConfigError;

pub const DEFAULT_BACKEND_URL : &str = "http://127.0.0.1:8000";
pub const ENV_BACKEND_URL : &str = "LOGPANEL_BACKEND_URL";

const CONFIG_DIR_NAME : &str = "logpanel";
const CONFIG_FILE_NAME : &str = "config.toml";

// ---------- Settings model ----------
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    /// `None` keeps the HTTP client's own default.
    pub request_timeout_secs: Option<u64>,
    pub pixels_per_point: f32,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: None,
            pixels_per_point: 1.2,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn with_env_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            debug!("Backend url overridden by {ENV_BACKEND_URL}");
            self.backend_url = url.trim().to_string();
        }
        self
    }

    /// Defaults, then the config file, then the environment. Problems with the
    /// file are logged and never stop the app from starting.
    pub fn load() -> Self {
        let from_file = Self::default_path().and_then(|p| Self::load_from(&p));
        let config = match from_file {
            Ok(c) => c,
            Err(e) => {
                error!("Couldn't load config, using defaults: {e}");
                Self::default()
            }
        };
        config.with_env_override(std::env::var(ENV_BACKEND_URL).ok())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// The “Settings” tab. Edits happen on a draft and only reach the model on Apply/Save.
pub struct SettingsPage {
    backend_url: String,
    timeout_secs: String,
}

impl SettingsPage {
    pub fn new(config: &Config) -> Self {
        let mut page = Self { backend_url: String::new(), timeout_secs: String::new() };
        page.load_draft(config);
        page
    }

    fn load_draft(&mut self, config: &Config) {
        self.backend_url = config.backend_url.clone();
        self.timeout_secs = config.request_timeout_secs
            .map(|t| t.to_string())
            .unwrap_or_default();
    }

    /// Builds the config the draft describes, or says what is wrong with it.
    fn draft_config(&self, current: &Config) -> Result<Config, String> {
        let backend_url = self.backend_url.trim().to_string();
        validate_base_url(&backend_url).map_err(|e| e.to_string())?;

        let timeout = self.timeout_secs.trim();
        let request_timeout_secs = if timeout.is_empty() {
            None
        } else {
            match timeout.parse::<u64>() {
                Ok(0) | Err(_) => return Err(format!("invalid request timeout '{timeout}'")),
                Ok(t) => Some(t),
            }
        };

        Ok(Config { backend_url, request_timeout_secs, ..current.clone() })
    }

    fn apply(&mut self, model: &mut AppModel, persist: bool) {
        match self.draft_config(&model.config) {
            Ok(config) => {
                model.config = config;
                model.record(format!("settings: backend is {}", model.config.backend_url));
                if persist {
                    if let Err(e) = model.config.save() {
                        let msg = format!("settings: couldn't save config! {e}");
                        error!("{}", &msg);
                        model.record(msg);
                    }
                }
            }
            Err(e) => {
                let msg = format!("settings: rejected, {e}");
                error!("{}", &msg);
                model.record(msg);
                self.load_draft(&model.config);
            }
        }
    }
}

impl TabPage for SettingsPage {
    fn id(&self) -> &'static str { "settings" }
    fn label(&self) -> &'static str { "Settings" }

    fn ui(&mut self, ui: &mut eframe::egui::Ui, model: &mut AppModel) {
        ui.heading("Settings");

        ui.add_space(APP_HEADER_PADDING);

        ui.horizontal(|ui| {
            let name_label = ui.label("Backend URL:");
            ui.text_edit_singleline(&mut self.backend_url)
                .labelled_by(name_label.id);
        });

        ui.horizontal(|ui| {
            let name_label = ui.label("Request timeout (seconds, empty for default):");
            ui.text_edit_singleline(&mut self.timeout_secs)
                .labelled_by(name_label.id);
        });

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                self.apply(model, false);
            }
            if ui.button("💾 Save").clicked() {
                self.apply(model, true);
            }
            if ui.button("Reset").clicked() {
                let defaults = Config::default();
                self.load_draft(&defaults);
                model.config = defaults;
                model.record("settings: restored defaults".to_string());
            }
        });
    }
}
