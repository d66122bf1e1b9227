//! Optional capture of raw streamed increments for debugging.

use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use gembridge_types::StreamDebugConfig;

/// Collects the raw provider increments of one streamed call and writes them
/// to `<dir>/<unix_millis>-<request_id>.json` as `{"chunks": [...]}`.
#[derive(Debug)]
pub struct StreamRecorder {
    dir: Option<PathBuf>,
    request_id: String,
    chunks: Vec<Value>,
}

impl StreamRecorder {
    pub fn new(config: &StreamDebugConfig, request_id: &str) -> Self {
        Self {
            dir: config.log.then(|| config.dir.clone()),
            request_id: request_id.to_string(),
            chunks: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None, request_id: String::new(), chunks: Vec::new() }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn record<T: Serialize>(&mut self, increment: &T) {
        if self.dir.is_none() {
            return;
        }
        match serde_json::to_value(increment) {
            Ok(value) => self.chunks.push(value),
            Err(e) => tracing::warn!("Failed to capture stream increment: {}", e),
        }
    }

    /// Write the capture. Failures are logged, never returned.
    pub async fn persist(self) -> Option<PathBuf> {
        let dir = self.dir?;
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::warn!("Failed to create stream log dir {}: {}", dir.display(), e);
            return None;
        }

        // Same-millisecond streams differ by request id.
        let path = dir.join(format!(
            "{}-{}.json",
            chrono::Utc::now().timestamp_millis(),
            self.request_id
        ));
        let body = match serde_json::to_vec_pretty(&json!({ "chunks": self.chunks })) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to serialize stream log: {}", e);
                return None;
            },
        };
        match tokio::fs::write(&path, body).await {
            Ok(()) => {
                tracing::debug!("Stream log written to {}", path.display());
                Some(path)
            },
            Err(e) => {
                tracing::warn!("Failed to write stream log {}: {}", path.display(), e);
                None
            },
        }
    }
}
