//! View state of the upload & search panel and the pure transitions that
//! apply an operation's outcome to it.

use std::path::PathBuf;
use serde_json::Value;

use super::backend::{SearchReply, UploadReply};

pub const NO_FILE_PROMPT : &str = "Please select a .tgz file to upload.";
pub const SEARCH_COMPLETED : &str = "Search completed successfully.";
pub const NO_RESULTS : &str = "No results found.";
const UPLOAD_FALLBACK : &str = "An error occurred while processing the file.";
const SEARCH_FALLBACK : &str = "An error occurred during the search.";

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}
impl SelectedFile {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, name }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub search_string: String,
    pub earliest_time: String,
    pub latest_time: String,
}
impl SearchCriteria {
    /// Query parameters for the search endpoint, skipping empty fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("searchstring", self.search_string.as_str()),
            ("EarliestTime", self.earliest_time.as_str()),
            ("LatestTime", self.latest_time.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

#[derive(Debug, Default)]
pub struct PanelState {
    pub selected_file: Option<SelectedFile>,
    pub status: String,
    /// Only ever raised by uploads.
    pub loading: bool,
    pub criteria: SearchCriteria,
    pub results: Vec<Value>,
}

impl PanelState {
    pub fn select_file(&mut self, file: SelectedFile) {
        self.selected_file = Some(file);
    }

    /// Returns the file to send, or `None` after prompting for one.
    pub fn begin_upload(&mut self) -> Option<SelectedFile> {
        match &self.selected_file {
            Some(file) => {
                self.loading = true;
                Some(file.clone())
            }
            None => {
                self.status = NO_FILE_PROMPT.to_string();
                None
            }
        }
    }

    pub fn finish_upload(&mut self, reply: UploadReply) {
        match reply {
            UploadReply::Processed { files_processed, results } => {
                self.status = format!("Files processed successfully: {files_processed}");
                self.results = results;
            }
            // Results from an earlier operation stay on screen here.
            UploadReply::Rejected { error } => {
                self.status = error_status(error.as_deref().unwrap_or(UPLOAD_FALLBACK));
            }
            UploadReply::Transport(message) => {
                self.status = error_status(&message);
            }
        }
        self.loading = false;
    }

    pub fn finish_search(&mut self, reply: SearchReply) {
        match reply {
            SearchReply::Found(records) if records.is_empty() => {
                self.status = NO_RESULTS.to_string();
                self.results.clear();
            }
            SearchReply::Found(records) => {
                self.status = SEARCH_COMPLETED.to_string();
                self.results = records;
            }
            SearchReply::Invalid(groups) => {
                let joined = groups.iter()
                    .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.status = if joined.is_empty() {
                    error_status(SEARCH_FALLBACK)
                } else {
                    error_status(&joined)
                };
                self.results.clear();
            }
            SearchReply::Rejected { error } => {
                self.status = error_status(error.as_deref().unwrap_or(SEARCH_FALLBACK));
                self.results.clear();
            }
            SearchReply::Transport(message) => {
                self.status = error_status(&message);
                self.results.clear();
            }
        }
    }

    pub fn status_is_error(&self) -> bool {
        self.status.contains("Error")
    }
}

fn error_status(message: &str) -> String {
    format!("Error: {message}")
}

/// Two-space indented JSON, as shown in the results list.
pub fn render_record(record: &Value) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string())
}
