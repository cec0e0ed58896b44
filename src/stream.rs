//! Theme Stream
//!
//! Packs an artifact on a worker thread and hands the archive to the caller
//! in bounded chunks. Dropping the stream cancels the worker.

use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::package::{pack_into, CompiledArtifact, PackageError};
use crate::pipeline::ExportReceipt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bytes per chunk handed to the consumer.
    pub chunk_size: usize,
    /// Chunks buffered before the worker waits on the consumer.
    pub buffer_chunks: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16 * 1024,
            buffer_chunks: 4,
        }
    }
}

/// How the packaging worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome {
    Completed { bytes: usize },
    Aborted { bytes_sent: usize },
    Failed(String),
}

type Chunk = io::Result<Vec<u8>>;

/// Archive byte stream for one export.
pub struct ThemeStream {
    receipt: ExportReceipt,
    receiver: Option<Receiver<Chunk>>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<PackOutcome>>,
    pending: Vec<u8>,
    offset: usize,
}

impl ThemeStream {
    pub(crate) fn spawn(
        artifact: CompiledArtifact,
        receipt: ExportReceipt,
        config: &StreamConfig,
    ) -> io::Result<Self> {
        let (sender, receiver) = mpsc::sync_channel(config.buffer_chunks.max(1));
        let cancel = Arc::new(AtomicBool::new(false));
        let chunk_size = config.chunk_size.max(1);
        let export_id = receipt.export_id.to_string();

        let worker = {
            let cancel = Arc::clone(&cancel);
            thread::Builder::new()
                .name("theme-pack".to_string())
                .spawn(move || run_worker(&artifact, &sender, &cancel, chunk_size, &export_id))?
        };

        Ok(Self {
            receipt,
            receiver: Some(receiver),
            cancel,
            worker: Some(worker),
            pending: Vec::new(),
            offset: 0,
        })
    }

    pub fn receipt(&self) -> &ExportReceipt {
        &self.receipt
    }

    /// Stop packaging and discard anything not yet read.
    pub fn abort(mut self) -> PackOutcome {
        self.shutdown()
    }

    /// Drain the rest of the stream into memory.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn shutdown(&mut self) -> PackOutcome {
        self.cancel.store(true, Ordering::Release);
        self.receiver.take();
        match self.worker.take().map(JoinHandle::join) {
            Some(Ok(outcome)) => outcome,
            Some(Err(_)) => PackOutcome::Failed("packaging worker panicked".to_string()),
            None => PackOutcome::Aborted { bytes_sent: 0 },
        }
    }
}

fn run_worker(
    artifact: &CompiledArtifact,
    sender: &SyncSender<Chunk>,
    cancel: &AtomicBool,
    chunk_size: usize,
    export_id: &str,
) -> PackOutcome {
    let mut sent = 0;
    let mut carry = Vec::with_capacity(chunk_size);
    let send = |chunk: Vec<u8>, sent: &mut usize| -> Result<(), PackageError> {
        if cancel.load(Ordering::Acquire) {
            return Err(PackageError::Aborted);
        }
        let len = chunk.len();
        sender.send(Ok(chunk)).map_err(|_| PackageError::Aborted)?;
        *sent += len;
        Ok(())
    };

    // Every chunk but the last is exactly `chunk_size` bytes.
    let result = pack_into(artifact, |bytes| {
        carry.extend_from_slice(&bytes);
        while carry.len() >= chunk_size {
            let rest = carry.split_off(chunk_size);
            send(std::mem::replace(&mut carry, rest), &mut sent)?;
        }
        Ok(())
    })
    .and_then(|bytes| {
        if !carry.is_empty() {
            send(std::mem::take(&mut carry), &mut sent)?;
        }
        Ok(bytes)
    });

    match result {
        Ok(bytes) => {
            info!(export_id, bytes, "theme archive streamed");
            PackOutcome::Completed { bytes }
        }
        Err(PackageError::Aborted) => {
            debug!(export_id, bytes_sent = sent, "theme stream aborted by consumer");
            PackOutcome::Aborted { bytes_sent: sent }
        }
        Err(e) => {
            warn!(export_id, error = %e, "theme packaging failed");
            let _ = sender.send(Err(io::Error::new(io::ErrorKind::Other, e.to_string())));
            PackOutcome::Failed(e.to_string())
        }
    }
}

impl Iterator for ThemeStream {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset < self.pending.len() {
            let rest = self.pending.split_off(self.offset);
            self.pending.clear();
            self.offset = 0;
            return Some(Ok(rest));
        }
        self.receiver.as_ref()?.recv().ok()
    }
}

impl Read for ThemeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.offset >= self.pending.len() {
            let next = match self.receiver.as_ref() {
                Some(receiver) => receiver.recv().ok(),
                None => None,
            };
            match next {
                Some(Ok(chunk)) => {
                    self.pending = chunk;
                    self.offset = 0;
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(0),
            }
        }

        let available = &self.pending[self.offset..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.offset += count;
        Ok(count)
    }
}

impl Drop for ThemeStream {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.shutdown();
        }
    }
}
