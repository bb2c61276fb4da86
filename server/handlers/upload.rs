use serde_json::{json, Value};
use sightline::ServiceError;
use tiny_http::Request;

use crate::handlers::{header_value, log_failure, read_body};
use crate::state::AppState;
use crate::util::multipart::{extract_boundary, MultipartForm};

// ---------------------------------------------------------------------------
// POST /upload
// ---------------------------------------------------------------------------

pub fn handle(request: &mut Request, state: &AppState) -> (u16, Value) {
    let content_type = header_value(request, "Content-Type");
    match read_body(request, state.max_upload_bytes) {
        Ok(body) => upload_reply(&content_type, &body, state),
        Err(e) => failure(&e),
    }
}

/// `{"result": ...}` on success, `{"error": ...}` with the error's status otherwise.
pub fn upload_reply(content_type: &str, body: &[u8], state: &AppState) -> (u16, Value) {
    match process(content_type, body, state) {
        Ok(result) => (200, json!({ "result": result })),
        Err(e) => failure(&e),
    }
}

fn process(content_type: &str, body: &[u8], state: &AppState) -> Result<String, ServiceError> {
    let form = extract_boundary(content_type)
        .map(|boundary| MultipartForm::parse(body, &boundary))
        .unwrap_or_default();
    state.assistant.handle_upload(form.file("file"), form.text("mode").as_deref())
}

fn failure(err: &ServiceError) -> (u16, Value) {
    log_failure("upload", err);
    (err.status_code(), json!({ "error": err.to_string() }))
}
