//! JSON-lines record of every intercepted call

use crate::error::Result;
use ocg_core::OcgCore;
use ocg_event::{CallEvent, OcgCoreEmitter};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One line of the trace file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub method: String,
    pub args: Vec<String>,
    pub timestamp: u64,
    /// `ok` or `error`
    pub outcome: String,
    /// Debug form of the result, or the error message
    pub detail: String,
}

impl TraceRecord {
    fn new(call: &CallEvent, outcome: &str, detail: String) -> Self {
        Self {
            method: call.method.name().to_string(),
            args: call.args.iter().map(ToString::to_string).collect(),
            timestamp: call.timestamp,
            outcome: outcome.to_string(),
            detail,
        }
    }
}

/// Appends a [`TraceRecord`] per completed call
pub struct CallTrace {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl CallTrace {
    /// Open (or create) the trace file for appending
    pub fn create(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("Tracing calls to {}", path.display());

        Ok(Arc::new(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        }))
    }

    /// Subscribe to the emitter's after and error topics
    pub fn attach<C: OcgCore>(self: &Arc<Self>, emitter: &OcgCoreEmitter<C>) {
        let on_ok = Arc::clone(self);
        let on_err = Arc::clone(self);

        emitter
            .on_after_call(move |event| {
                on_ok.record(TraceRecord::new(event.call, "ok", format!("{:?}", event.result)));
            })
            .on_error(move |event| {
                on_err.record(TraceRecord::new(event.call, "error", event.error.to_string()));
            });
    }

    /// Write one record; failures are logged, never raised into the call
    pub fn record(&self, record: TraceRecord) {
        if let Err(e) = self.write_line(&record) {
            log::error!("Failed to write call trace to {}: {}", self.path.display(), e);
        }
    }

    fn write_line(&self, record: &TraceRecord) -> std::io::Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}
