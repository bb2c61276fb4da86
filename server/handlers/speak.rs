use serde::Deserialize;
use serde_json::{json, Value};
use sightline::service::SpeechQueue;
use sightline::ServiceError;
use tiny_http::Request;

use crate::handlers::{log_failure, read_body};
use crate::state::AppState;

/// Largest accepted `/speak` body.
const MAX_SPEAK_BODY: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
struct SpeakRequest {
    #[serde(default)]
    text: String,
}

// ---------------------------------------------------------------------------
// POST /speak
// ---------------------------------------------------------------------------

pub fn handle(request: &mut Request, state: &AppState) -> (u16, Value) {
    let reply = read_body(request, MAX_SPEAK_BODY).and_then(|body| enqueue(&body, &state.speech));
    to_reply(reply)
}

/// Parses `{"text": ...}` and hands the text to the speech queue.
pub fn speak_reply(body: &[u8], speech: &SpeechQueue) -> (u16, Value) {
    to_reply(enqueue(body, speech))
}

fn enqueue(body: &[u8], speech: &SpeechQueue) -> Result<(), ServiceError> {
    let request: SpeakRequest = serde_json::from_slice(body).map_err(|e| ServiceError::InvalidBody(e.to_string()))?;
    speech.enqueue(&request.text)
}

fn to_reply(result: Result<(), ServiceError>) -> (u16, Value) {
    match result {
        Ok(()) => (200, json!({ "status": "success" })),
        Err(e) => {
            log_failure("speak", &e);
            (e.status_code(), json!({ "status": "error", "message": e.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightline::vision::SpeechEngine;
    use sightline::EngineError;
    use std::sync::mpsc::{self, Sender};
    use std::sync::Mutex;
    use std::time::Duration;

    struct Recorder(Mutex<Sender<String>>);
    impl SpeechEngine for Recorder {
        fn speak(&self, text: &str) -> Result<(), EngineError> {
            self.0.lock().unwrap().send(text.to_owned()).unwrap();
            Ok(())
        }
    }

    fn queue() -> (SpeechQueue, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (SpeechQueue::spawn(Box::new(Recorder(Mutex::new(tx))), 4).unwrap(), rx)
    }

    #[test]
    fn text_is_queued_for_speech() {
        let (speech, spoken) = queue();
        let (status, body) = speak_reply(br#"{"text": "I see: usd_20."}"#, &speech);
        assert_eq!((status, body), (200, json!({ "status": "success" })));
        assert_eq!(spoken.recv_timeout(Duration::from_secs(5)).unwrap(), "I see: usd_20.");
    }

    #[test]
    fn empty_text_never_reaches_the_engine() {
        let (speech, spoken) = queue();
        let (status, body) = speak_reply(br#"{"text": ""}"#, &speech);
        assert_eq!(status, 400);
        assert_eq!(body, json!({ "status": "error", "message": "No text provided" }));

        let (status, _) = speak_reply(b"{}", &speech);
        assert_eq!(status, 400);
        assert!(spoken.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn malformed_json_is_a_400() {
        let (speech, _spoken) = queue();
        let (status, body) = speak_reply(b"text=hello", &speech);
        assert_eq!(status, 400);
        assert_eq!(body["status"], "error");
    }
}
