pub mod content_type;
pub mod jar;

pub use content_type::{ContentSniffer, ContentTypeResolver, MagicSniffer, OCTET_STREAM};

use bytes::Bytes;
use futures::Stream;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::error::{DocsError, Result};

/// Entry served when the request names no file inside the archive
pub const DEFAULT_ENTRY: &str = "index.html";

/// Chunks buffered between the archive worker and the response body
const CHANNEL_DEPTH: usize = 4;

/// Reads single entries out of cached archives without extracting them
#[derive(Clone, Default)]
pub struct ArchiveReader {
    types: Arc<ContentTypeResolver>,
}

impl ArchiveReader {
    pub fn new(types: ContentTypeResolver) -> Self {
        ArchiveReader {
            types: Arc::new(types),
        }
    }

    /// Open `entry` inside `archive` as a stream.
    ///
    /// An empty `entry` means [`DEFAULT_ENTRY`]. Fails with `NotFound` when
    /// the entry is missing or the archive cannot be read.
    pub async fn open_entry(&self, archive: &Path, entry: &str) -> Result<EntryStream> {
        let name = if entry.is_empty() { DEFAULT_ENTRY } else { entry }.to_string();

        let (head_tx, head_rx) = oneshot::channel();
        let (chunk_tx, chunk_rx) = mpsc::channel(CHANNEL_DEPTH);
        let archive = archive.to_path_buf();
        let types = Arc::clone(&self.types);
        let worker_name = name.clone();

        tokio::task::spawn_blocking(move || {
            let mut head = Some(head_tx);
            if let Err(err) = jar::pump_entry(&archive, &worker_name, &types, &mut head, &chunk_tx) {
                if let Some(sender) = head.take() {
                    let _ = sender.send(Err(err));
                }
            }
        });

        let head = head_rx
            .await
            .map_err(|_| DocsError::Io(io::Error::other("archive worker stopped unexpectedly")))??;

        Ok(EntryStream {
            name,
            content_length: head.size,
            content_type: head.content_type,
            chunks: chunk_rx,
        })
    }
}

/// A single archive entry being read.
///
/// Dropping it stops the background reader and closes the archive.
#[derive(Debug)]
pub struct EntryStream {
    name: String,
    content_length: u64,
    content_type: String,
    chunks: mpsc::Receiver<io::Result<Bytes>>,
}

impl EntryStream {
    /// Entry name inside the archive
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uncompressed size of the entry
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        futures::stream::unfold(self.chunks, |mut chunks| async move {
            chunks.recv().await.map(|chunk| (chunk, chunks))
        })
    }

    /// Drain the whole entry into memory
    pub async fn read_to_end(mut self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.content_length as usize);
        while let Some(chunk) = self.chunks.recv().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}
