//! Static resource resolution with pre-compressed variant negotiation.
//!
//! For a requested path, registered encoding suffixes (gzip/.gz, br/.br) are
//! tried against the Accept-Encoding header before the identity file. The
//! freshness token is a weak ETag built from file size, a hash of the
//! request path, and the modification time; failing to compute it still
//! serves the resource, just without a validator.

use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use twox_hash::XxHash64;

pub struct StaticResolver {
    webroot: PathBuf,
    // (Accept-Encoding token, file suffix), tried in order
    encodings: Vec<(&'static str, &'static str)>,
}

/// A resolved file ready to serve.
pub struct ResolvedFile {
    pub path: PathBuf,
    /// Content-Encoding token if a pre-compressed variant was picked.
    pub encoding: Option<&'static str>,
    /// Content-Type derived from the logical (unsuffixed) path.
    pub content_type: &'static str,
    /// Weak validator, None if metadata could not be read.
    pub etag: Option<String>,
}

impl StaticResolver {
    pub fn new(webroot: impl Into<PathBuf>) -> Self {
        Self {
            webroot: webroot.into(),
            encodings: vec![("gzip", ".gz"), ("br", ".br")],
        }
    }

    /// Map a request path to a file under the webroot, or None when nothing
    /// matches (the not-found fallback takes over). Rejects traversal.
    pub fn resolve(&self, request_path: &str, accept_encoding: &str) -> Option<ResolvedFile> {
        let rel = sanitize(request_path)?;
        let mut base = self.webroot.join(&rel);
        if base.is_dir() {
            base = base.join("index.html");
        }

        for (token, suffix) in &self.encodings {
            if !accepts(accept_encoding, token) {
                continue;
            }
            let candidate = PathBuf::from(format!("{}{}", base.display(), suffix));
            if candidate.is_file() {
                return Some(ResolvedFile {
                    etag: calculate_etag(&candidate, request_path),
                    path: candidate,
                    encoding: Some(token),
                    content_type: content_type_for(&base),
                });
            }
        }

        if base.is_file() {
            return Some(ResolvedFile {
                etag: calculate_etag(&base, request_path),
                content_type: content_type_for(&base),
                path: base,
                encoding: None,
            });
        }
        None
    }
}

fn sanitize(request_path: &str) -> Option<PathBuf> {
    // Decode before splitting, so an encoded ".." lands in a segment and is
    // rejected like a literal one.
    let decoded = percent_decode(request_path)?;
    let mut out = PathBuf::new();
    for seg in decoded.split('/') {
        match seg {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => out.push(s),
        }
    }
    Some(out)
}

fn percent_decode(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return None;
            }
            let hi = hex_val(bytes[i + 1])?;
            let lo = hex_val(bytes[i + 2])?;
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn accepts(accept_encoding: &str, token: &str) -> bool {
    accept_encoding
        .split(',')
        .map(|part| part.split(';').next().unwrap_or("").trim())
        .any(|t| t.eq_ignore_ascii_case(token))
}

/// Weak validator: hex(size) + hex(xxh64(request path)) + hex(mtime millis).
fn calculate_etag(file: &Path, request_path: &str) -> Option<String> {
    let meta = std::fs::metadata(file).ok()?;
    let size = meta.len();
    let mtime = meta
        .modified()
        .ok()?
        .duration_since(UNIX_EPOCH)
        .ok()?
        .as_millis() as u64;

    let mut hasher = XxHash64::with_seed(0);
    hasher.write(request_path.as_bytes());
    let path_hash = hasher.finish();

    Some(format!("W/\"{:x}{:x}{:x}\"", size, path_hash, mtime))
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
