use bytes::Bytes;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use super::content_type::ContentTypeResolver;
use crate::error::{DocsError, Result};

/// Bytes inspected for content sniffing before the body starts flowing
pub const SNIFF_LEN: usize = 8 * 1024;

const CHUNK_SIZE: usize = 64 * 1024;

/// What the caller needs before the first body byte
#[derive(Debug)]
pub struct EntryHead {
    pub size: u64,
    pub content_type: String,
}

pub type HeadSender = oneshot::Sender<Result<EntryHead>>;
pub type ChunkSender = mpsc::Sender<io::Result<Bytes>>;

/// Open `name` inside the jar at `archive` and push it through `chunks`.
///
/// Runs on a blocking thread. Errors that happen before the head is sent
/// are returned (the head sender is still in `head`); errors after that go
/// down the chunk channel. Stops early once the receiver is gone.
pub fn pump_entry(
    archive: &Path,
    name: &str,
    types: &ContentTypeResolver,
    head: &mut Option<HeadSender>,
    chunks: &ChunkSender,
) -> Result<()> {
    let file = File::open(archive).map_err(|e| unreadable(archive, e))?;
    let mut jar = ZipArchive::new(BufReader::new(file)).map_err(|e| unreadable(archive, e))?;

    let mut entry = match jar.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(DocsError::not_found(format!(
                "entry {name} in {}",
                archive.display()
            )));
        }
        Err(err) => return Err(unreadable(archive, err)),
    };
    if entry.is_dir() {
        return Err(DocsError::not_found(format!(
            "entry {name} in {} is a directory",
            archive.display()
        )));
    }

    let size = entry.size();
    let mut first = Vec::with_capacity(SNIFF_LEN);
    (&mut entry)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut first)
        .map_err(|e| unreadable(archive, e))?;
    let content_type = types.resolve(name, &first);

    if let Some(sender) = head.take() {
        if sender.send(Ok(EntryHead { size, content_type })).is_err() {
            return Ok(());
        }
    }
    if !first.is_empty() && chunks.blocking_send(Ok(Bytes::from(first))).is_err() {
        return Ok(());
    }

    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                let _ = chunks.blocking_send(Err(err));
                break;
            }
        };
        if chunks
            .blocking_send(Ok(Bytes::copy_from_slice(&buf[..n])))
            .is_err()
        {
            debug!(entry = name, "entry reader dropped before end of body");
            break;
        }
    }

    Ok(())
}

/// A corrupt or unreadable archive is reported as not found.
fn unreadable(archive: &Path, err: impl std::fmt::Display) -> DocsError {
    DocsError::not_found(format!("unreadable archive {}: {err}", archive.display()))
}
