//! Content type resolution for archive entries.
//!
//! Two tiers: a fixed table for the types javadoc pages are made of, then a
//! pluggable [`ContentSniffer`] for everything else.

use std::sync::Arc;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Text after the last `.` of the final path segment
pub fn extension(name: &str) -> Option<&str> {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

fn fixed_type(ext: &str) -> Option<&'static str> {
    match ext {
        "js" => Some("application/javascript"),
        "xml" => Some("application/xml"),
        "json" => Some("application/json"),
        "txt" => Some("text/plain"),
        "html" => Some("text/html"),
        "css" => Some("text/css"),
        _ => None,
    }
}

/// Guesses a type for entries the fixed table does not cover
pub trait ContentSniffer: Send + Sync {
    /// `head` holds the first bytes of the entry (possibly all of it)
    fn sniff(&self, name: &str, head: &[u8]) -> Option<String>;
}

/// Fixed table first, sniffer second, `application/octet-stream` last.
#[derive(Clone)]
pub struct ContentTypeResolver {
    sniffer: Arc<dyn ContentSniffer>,
}

impl ContentTypeResolver {
    pub fn new(sniffer: Arc<dyn ContentSniffer>) -> Self {
        ContentTypeResolver { sniffer }
    }

    pub fn resolve(&self, name: &str, head: &[u8]) -> String {
        let Some(ext) = extension(name) else {
            return OCTET_STREAM.to_string();
        };
        let ext = ext.to_ascii_lowercase();
        if let Some(content_type) = fixed_type(&ext) {
            return content_type.to_string();
        }
        self.sniffer
            .sniff(name, head)
            .unwrap_or_else(|| OCTET_STREAM.to_string())
    }
}

impl Default for ContentTypeResolver {
    fn default() -> Self {
        Self::new(Arc::new(MagicSniffer))
    }
}

/// Extension table for common documentation assets, then magic bytes
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicSniffer;

impl MagicSniffer {
    fn by_extension(ext: &str) -> Option<&'static str> {
        Some(match ext {
            "htm" | "xhtml" => "text/html",
            "mjs" => "application/javascript",
            "map" => "application/json",
            "png" => "image/png",
            "gif" => "image/gif",
            "jpg" | "jpeg" => "image/jpeg",
            "svg" => "image/svg+xml",
            "ico" => "image/x-icon",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "pdf" => "application/pdf",
            "woff" => "font/woff",
            "woff2" => "font/woff2",
            "ttf" => "font/ttf",
            "otf" => "font/otf",
            "eot" => "application/vnd.ms-fontobject",
            "zip" => "application/zip",
            "jar" => "application/java-archive",
            "gz" => "application/gzip",
            "wasm" => "application/wasm",
            "md" => "text/markdown",
            "csv" => "text/csv",
            "properties" | "java" | "kt" | "groovy" | "list" | "mf" => "text/plain",
            "yaml" | "yml" => "application/yaml",
            _ => return None,
        })
    }

    fn by_magic(head: &[u8]) -> Option<&'static str> {
        const SIGNATURES: &[(&[u8], &str)] = &[
            (b"\x89PNG\r\n\x1a\n", "image/png"),
            (b"GIF87a", "image/gif"),
            (b"GIF89a", "image/gif"),
            (b"\xff\xd8\xff", "image/jpeg"),
            (b"%PDF-", "application/pdf"),
            (b"PK\x03\x04", "application/zip"),
            (b"\x1f\x8b", "application/gzip"),
            (b"wOFF", "font/woff"),
            (b"wOF2", "font/woff2"),
            (b"\0asm", "application/wasm"),
        ];

        if let Some((_, content_type)) = SIGNATURES.iter().find(|(magic, _)| head.starts_with(magic)) {
            return Some(*content_type);
        }
        if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
            return Some("image/webp");
        }

        let text = match std::str::from_utf8(head) {
            Ok(text) => text,
            // the head may end in the middle of a multi-byte character
            Err(err) if err.error_len().is_none() => std::str::from_utf8(&head[..err.valid_up_to()]).ok()?,
            Err(_) => return None,
        };
        if text.is_empty() || text.contains('\0') {
            return None;
        }
        let start = text.trim_start().to_ascii_lowercase();
        if start.starts_with("<!doctype html") || start.starts_with("<html") {
            Some("text/html")
        } else if start.starts_with("<svg") {
            Some("image/svg+xml")
        } else if start.starts_with("<?xml") {
            Some("application/xml")
        } else {
            Some("text/plain")
        }
    }
}

impl ContentSniffer for MagicSniffer {
    fn sniff(&self, name: &str, head: &[u8]) -> Option<String> {
        extension(name)
            .and_then(|ext| Self::by_extension(&ext.to_ascii_lowercase()))
            .or_else(|| Self::by_magic(head))
            .map(str::to_string)
    }
}
