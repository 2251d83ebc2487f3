use std::fs;
use log::{debug, info, warn};
use reqwest::blocking::{multipart, Client};
use reqwest::Url;
use serde_json::Value;

use super::error::ClientError;
use super::panel::{SearchCriteria, SelectedFile};
use super::settings_page::Config;

pub const UPLOAD_PATH : &str = "/upload/process-tgz/";
pub const SEARCH_PATH : &str = "/upload/search-logs/";
const UPLOAD_FIELD : &str = "file";

/// What came back from `POST /upload/process-tgz/`.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadReply {
    Processed { files_processed: String, results: Vec<Value> },
    Rejected { error: Option<String> },
    Transport(String),
}

/// What came back from `GET /upload/search-logs/`.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchReply {
    /// Empty when the backend had nothing to return.
    Found(Vec<Value>),
    /// Field name to messages, in the order the backend listed them.
    Invalid(Vec<(String, Vec<String>)>),
    Rejected { error: Option<String> },
    Transport(String),
}

impl UploadReply {
    pub fn from_body(success: bool, body: &Value) -> Self {
        if success {
            UploadReply::Processed {
                files_processed: match body.get("files_processed") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => "unknown".to_string(),
                },
                results: results_of(body),
            }
        } else {
            UploadReply::Rejected { error: value_text(body.get("error")) }
        }
    }
}

impl SearchReply {
    pub fn from_body(success: bool, body: &Value) -> Self {
        if success {
            return SearchReply::Found(results_of(body));
        }

        let is_error = body.get("status").and_then(Value::as_str) == Some("error");
        if let (true, Some(Value::Object(fields))) = (is_error, body.get("message")) {
            let groups = fields.iter()
                .map(|(field, messages)| (field.clone(), message_list(messages)))
                .collect();
            return SearchReply::Invalid(groups);
        }

        SearchReply::Rejected {
            error: value_text(body.get("error")).or_else(|| value_text(body.get("message"))),
        }
    }
}

/// `results` when it is an array, otherwise nothing.
fn results_of(body: &Value) -> Vec<Value> {
    match body.get("results") {
        Some(Value::Array(records)) => records.clone(),
        _ => Vec::new(),
    }
}

fn message_list(messages: &Value) -> Vec<String> {
    match messages {
        Value::Array(items) => items.iter().filter_map(|m| value_text(Some(m))).collect(),
        other => value_text(Some(other)).into_iter().collect(),
    }
}

/// Text for a JSON field, treating null, false, 0 and "" as absent.
fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

pub fn validate_base_url(base_url: &str) -> Result<Url, ClientError> {
    let url = Url::parse(base_url)
        .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(url)
}

/// Blocking client for the log backend. Meant to be driven from a worker
/// thread, never from the UI thread.
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        validate_base_url(&config.backend_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let joined = format!("{}{}", self.base_url, path);
        Url::parse(&joined).map_err(|_| ClientError::InvalidBaseUrl(joined))
    }

    pub fn upload(&self, file: &SelectedFile) -> UploadReply {
        match self.try_upload(file) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Upload of {} failed: {e}", file.name);
                UploadReply::Transport(e.to_string())
            }
        }
    }

    pub fn search(&self, criteria: &SearchCriteria) -> SearchReply {
        match self.try_search(criteria) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Search failed: {e}");
                SearchReply::Transport(e.to_string())
            }
        }
    }

    fn try_upload(&self, file: &SelectedFile) -> Result<UploadReply, ClientError> {
        let bytes = fs::read(&file.path).map_err(|source| ClientError::ReadFile {
            path: file.path.clone(),
            source,
        })?;
        let part = multipart::Part::bytes(bytes).file_name(file.name.clone());
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let url = self.endpoint(UPLOAD_PATH)?;
        debug!("POST {url} ({})", file.name);
        let response = self.http.post(url).multipart(form).send()?;
        let status = response.status();
        let body: Value = serde_json::from_slice(&response.bytes()?)?;
        info!("Upload of {} answered {status}", file.name);

        Ok(UploadReply::from_body(status.is_success(), &body))
    }

    fn try_search(&self, criteria: &SearchCriteria) -> Result<SearchReply, ClientError> {
        let mut url = self.endpoint(SEARCH_PATH)?;
        let params = criteria.query_pairs();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        debug!("GET {url}");
        let response = self.http.get(url).send()?;
        let status = response.status();
        let body: Value = serde_json::from_slice(&response.bytes()?)?;
        info!("Search answered {status}");

        Ok(SearchReply::from_body(status.is_success(), &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::thread::{self, JoinHandle};
    use tiny_http::{Header, Response, Server};

    struct Seen {
        method: String,
        url: String,
        body: String,
    }

    /// Answers exactly one request with `status` and `body`, then reports what it saw.
    fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Seen>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = thread::spawn(move || {
            let mut request = server.recv().unwrap();
            let mut raw = Vec::new();
            request.as_reader().read_to_end(&mut raw).unwrap();
            let seen = Seen {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: String::from_utf8_lossy(&raw).into_owned(),
            };
            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(body).with_status_code(status).with_header(header);
            request.respond(response).unwrap();
            seen
        });
        (format!("http://127.0.0.1:{port}"), handle)
    }

    fn client(base_url: &str) -> BackendClient {
        let config = Config {
            backend_url: base_url.to_string(),
            request_timeout_secs: Some(5),
            ..Config::default()
        };
        BackendClient::new(&config).unwrap()
    }

    fn archive(contents: &[u8]) -> (tempfile::TempDir, SelectedFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flows.tgz");
        fs::write(&path, contents).unwrap();
        (dir, SelectedFile::from_path(path))
    }

    #[test]
    fn upload_success_reports_count_and_results() {
        let body = json!({"files_processed": 3, "results": [{"a": 1}]});
        assert_eq!(
            UploadReply::from_body(true, &body),
            UploadReply::Processed { files_processed: "3".to_string(), results: vec![json!({"a": 1})] }
        );
    }

    #[test]
    fn upload_success_without_results_is_empty() {
        let body = json!({"files_processed": 2, "valid_entries": 10, "errors": []});
        assert_eq!(
            UploadReply::from_body(true, &body),
            UploadReply::Processed { files_processed: "2".to_string(), results: vec![] }
        );
    }

    #[test]
    fn upload_error_uses_error_field_when_set() {
        let body = json!({"error": "Please upload a .tgz file"});
        assert_eq!(
            UploadReply::from_body(false, &body),
            UploadReply::Rejected { error: Some("Please upload a .tgz file".to_string()) }
        );
        assert_eq!(
            UploadReply::from_body(false, &json!({"error": ""})),
            UploadReply::Rejected { error: None }
        );
    }

    #[test]
    fn search_validation_body_keeps_field_order() {
        let body = json!({
            "status": "error",
            "message": {"time": ["bad"], "search_params": ["missing", "short"]}
        });
        assert_eq!(
            SearchReply::from_body(false, &body),
            SearchReply::Invalid(vec![
                ("time".to_string(), vec!["bad".to_string()]),
                ("search_params".to_string(), vec!["missing".to_string(), "short".to_string()]),
            ])
        );
    }

    #[test]
    fn search_generic_error_prefers_error_then_message() {
        let both = json!({"error": "boom", "message": "ignored"});
        assert_eq!(
            SearchReply::from_body(false, &both),
            SearchReply::Rejected { error: Some("boom".to_string()) }
        );
        let message_only = json!({"status": "error", "message": "database unavailable"});
        assert_eq!(
            SearchReply::from_body(false, &message_only),
            SearchReply::Rejected { error: Some("database unavailable".to_string()) }
        );
        assert_eq!(
            SearchReply::from_body(false, &json!({})),
            SearchReply::Rejected { error: None }
        );
    }

    #[test]
    fn search_success_without_results_is_empty() {
        let body = json!({"status": "success", "message": "No results found"});
        assert_eq!(SearchReply::from_body(true, &body), SearchReply::Found(vec![]));
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(validate_base_url("http://127.0.0.1:8000").is_ok());
        assert!(validate_base_url("https://logs.example.com").is_ok());
        assert!(validate_base_url("ftp://127.0.0.1").is_err());
        assert!(validate_base_url("127.0.0.1:8000").is_err());
    }

    #[test]
    fn upload_posts_multipart_file_field() {
        let (base, server) = serve_once(201, r#"{"files_processed": 1, "results": []}"#);
        let (_dir, file) = archive(b"tgz-bytes");

        let reply = client(&base).upload(&file);
        let seen = server.join().unwrap();

        assert_eq!(seen.method, "POST");
        assert_eq!(seen.url, UPLOAD_PATH);
        assert!(seen.body.contains("name=\"file\""));
        assert!(seen.body.contains("filename=\"flows.tgz\""));
        assert!(seen.body.contains("tgz-bytes"));
        assert_eq!(reply, UploadReply::Processed { files_processed: "1".to_string(), results: vec![] });
    }

    #[test]
    fn upload_partial_success_counts_as_success() {
        let (base, server) = serve_once(206, r#"{"files_processed": 4, "ignored_lines": [{"filename": "x"}]}"#);
        let (_dir, file) = archive(b"x");

        let reply = client(&base).upload(&file);
        server.join().unwrap();
        assert_eq!(reply, UploadReply::Processed { files_processed: "4".to_string(), results: vec![] });
    }

    #[test]
    fn upload_of_missing_file_is_transport_error() {
        let reply = client("http://127.0.0.1:9").upload(&SelectedFile::from_path(PathBuf::from("/definitely/not/here.tgz")));
        match reply {
            UploadReply::Transport(msg) => assert!(msg.contains("could not read")),
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn search_sends_only_filled_params() {
        let (base, server) = serve_once(200, r#"{"status": "success", "results": [{"account_id": 264684}]}"#);
        let criteria = SearchCriteria {
            search_string: "account_id=264684".to_string(),
            earliest_time: String::new(),
            latest_time: "1700000000".to_string(),
        };

        let reply = client(&base).search(&criteria);
        let seen = server.join().unwrap();

        assert_eq!(seen.method, "GET");
        assert_eq!(seen.url, "/upload/search-logs/?searchstring=account_id%3D264684&LatestTime=1700000000");
        assert_eq!(reply, SearchReply::Found(vec![json!({"account_id": 264684})]));
    }

    #[test]
    fn search_without_criteria_has_no_query() {
        let (base, server) = serve_once(200, r#"{"results": []}"#);
        let reply = client(&base).search(&SearchCriteria::default());
        let seen = server.join().unwrap();
        assert_eq!(seen.url, SEARCH_PATH);
        assert_eq!(reply, SearchReply::Found(vec![]));
    }

    #[test]
    fn search_400_with_field_errors_is_invalid() {
        let (base, server) = serve_once(400, r#"{"status": "error", "message": {"time": ["Start time must be before end time."]}}"#);
        let reply = client(&base).search(&SearchCriteria::default());
        server.join().unwrap();
        assert_eq!(
            reply,
            SearchReply::Invalid(vec![("time".to_string(), vec!["Start time must be before end time.".to_string()])])
        );
    }

    #[test]
    fn non_json_body_is_transport_error() {
        let (base, server) = serve_once(500, "<html>Server Error</html>");
        let reply = client(&base).search(&SearchCriteria::default());
        server.join().unwrap();
        match reply {
            SearchReply::Transport(msg) => assert!(msg.starts_with("malformed response")),
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let reply = client(&format!("http://127.0.0.1:{port}")).search(&SearchCriteria::default());
        assert!(matches!(reply, SearchReply::Transport(_)));
    }
}
