pub mod upload;
pub mod speak;

use std::io::Read;

use log::{error, warn};
use sightline::ServiceError;
use tiny_http::Request;

/// Value of the first header named `name`, or an empty string.
pub fn header_value(request: &Request, name: &'static str) -> String {
    request.headers().iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default()
}

/// Reads the whole body, refusing anything larger than `limit` bytes.
pub fn read_body(request: &mut Request, limit: usize) -> Result<Vec<u8>, ServiceError> {
    if request.body_length().is_some_and(|len| len > limit) {
        return Err(ServiceError::PayloadTooLarge(limit));
    }
    let mut body = Vec::new();
    request.as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| ServiceError::InvalidBody(e.to_string()))?;
    if body.len() > limit {
        return Err(ServiceError::PayloadTooLarge(limit));
    }
    Ok(body)
}

/// Logs a failed request at a level matching its status.
pub fn log_failure(route: &str, err: &ServiceError) {
    let status = err.status_code();
    if status >= 500 {
        error!("{} failed ({}): {}", route, status, err);
    } else {
        warn!("{} rejected ({}): {}", route, status, err);
    }
}
