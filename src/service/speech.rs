use std::io;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread;

use log::{debug, error};

use crate::error::ServiceError;
use crate::vision::SpeechEngine;

/// Bounded queue in front of a single speech worker.
///
/// Utterances are spoken one at a time in arrival order. `enqueue` never
/// blocks: when `capacity` utterances are already waiting it fails with
/// `ServiceError::SpeechQueueFull`.
#[derive(Debug)]
pub struct SpeechQueue {
    sender: SyncSender<String>,
}

impl SpeechQueue {
    /// Starts the worker thread. It exits once the queue is dropped.
    pub fn spawn(engine: Box<dyn SpeechEngine>, capacity: usize) -> io::Result<SpeechQueue> {
        let (sender, receiver) = mpsc::sync_channel(capacity.max(1));
        thread::Builder::new()
            .name("speech".into())
            .spawn(move || speak_all(engine, receiver))?;
        Ok(SpeechQueue { sender })
    }

    pub fn enqueue(&self, text: &str) -> Result<(), ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyText);
        }
        match self.sender.try_send(text.to_owned()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ServiceError::SpeechQueueFull),
            Err(TrySendError::Disconnected(_)) => Err(ServiceError::SpeechUnavailable),
        }
    }
}

fn speak_all(engine: Box<dyn SpeechEngine>, receiver: Receiver<String>) {
    for text in receiver {
        debug!("speaking {} chars", text.len());
        if let Err(e) = engine.speak(&text) {
            error!("speech failed: {}", e);
        }
    }
    debug!("speech worker stopped");
}
