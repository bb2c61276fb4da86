use std::io::Cursor;
use std::time::Instant;

use log::{info, warn};
use serde_json::Value;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

const INDEX_PAGE: &str = include_str!("assets/index.html");

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn content_type(value: &str) -> Vec<Header> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).into_iter().collect()
}

fn bytes_response(status: u16, mime: &str, bytes: Vec<u8>) -> HttpResponse {
    let len = bytes.len();
    Response::new(StatusCode(status), content_type(mime), Cursor::new(bytes), Some(len), None)
}

pub fn html_response(body: &str) -> HttpResponse {
    bytes_response(200, "text/html; charset=utf-8", body.as_bytes().to_vec())
}

pub fn json_response(status: u16, body: &Value) -> HttpResponse {
    bytes_response(status, "application/json", body.to_string().into_bytes())
}

pub fn not_found() -> HttpResponse {
    bytes_response(404, "text/plain", b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Routes one request, responds, and logs method, path, status and latency.
pub fn dispatch(mut request: Request, state: SharedState) {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.url().split('?').next().unwrap_or("/").to_owned();

    let (status, response) = match (&method, path.as_str()) {
        (Method::Get, "/") => (200, html_response(INDEX_PAGE)),
        (Method::Post, "/upload") => {
            let (status, body) = handlers::upload::handle(&mut request, &state);
            (status, json_response(status, &body))
        }
        (Method::Post, "/speak") => {
            let (status, body) = handlers::speak::handle(&mut request, &state);
            (status, json_response(status, &body))
        }
        _ => (404, not_found()),
    };

    if let Err(e) = request.respond(response) {
        warn!("{} {}: failed to send response: {}", method, path, e);
    }
    info!("{} {} {} {:.2?}", method, path, status, started.elapsed());
}
