//! Retrieval of source content into temporary files.
//!
//! Remote sources (`http://` / `https://`) go through a [`Transport`]; local
//! sources are read from disk. Either way the content lands in a
//! caller-owned [`NamedTempFile`] that [`crate::sync`] later moves into place
//! or discards.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{APP_NAME, http_timeout_secs};

/// How fetched bytes are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
  /// Line endings are normalised to `\n`.
  Text,
  /// Bytes are kept verbatim.
  Binary,
}

/// Errors that can occur while retrieving content.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("request to {uri} failed: {message}")]
  Request { uri: String, message: String },

  #[error("{uri} returned HTTP {status}")]
  Status { uri: String, status: u16 },

  #[error("unable to read '{path}': {source}")]
  Local {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("nothing available at {0}")]
  NotFound(String),

  #[error("failed to create HTTP client: {0}")]
  Client(String),

  #[error("failed to write temporary file: {0}")]
  Temp(#[source] std::io::Error),
}

/// Byte fetcher for remote URIs.
pub trait Transport {
  fn fetch(&self, uri: &str) -> Result<Vec<u8>, TransportError>;
}

/// Whether `source` names a network resource rather than a local path.
pub fn is_remote(source: &str) -> bool {
  source.starts_with("http://") || source.starts_with("https://")
}

/// Normalise `\r\n` and a line's trailing `\r` to `\n`.
///
/// A final line without any terminator is left unterminated.
pub fn normalize_line_endings(bytes: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(bytes.len());
  for line in bytes.split_inclusive(|&b| b == b'\n') {
    let content_len = line.iter().rposition(|&b| b != b'\r' && b != b'\n').map_or(0, |p| p + 1);
    out.extend_from_slice(&line[..content_len]);
    if content_len < line.len() {
      out.push(b'\n');
    }
  }
  out
}

/// Retrieve the content of `source`.
///
/// Remote sources are fetched through `transport` and, in text mode, have
/// their line endings normalised. Local sources resolve against `root` and are
/// always read byte-for-byte.
pub fn retrieve_bytes(
  transport: &dyn Transport,
  root: &Path,
  source: &str,
  mode: FetchMode,
) -> Result<Vec<u8>, TransportError> {
  if is_remote(source) {
    let bytes = transport.fetch(source)?;
    return Ok(match mode {
      FetchMode::Text => normalize_line_endings(&bytes),
      FetchMode::Binary => bytes,
    });
  }

  let path = root.join(source);
  debug!(path = %path.display(), "reading local source");
  std::fs::read(&path).map_err(|source| TransportError::Local { path, source })
}

/// [`retrieve_bytes`] into a temporary file.
pub fn retrieve_to_temp(
  transport: &dyn Transport,
  root: &Path,
  source: &str,
  mode: FetchMode,
) -> Result<NamedTempFile, TransportError> {
  stage(&retrieve_bytes(transport, root, source, mode)?)
}

/// Write `content` to a fresh temporary file.
pub fn stage(content: &[u8]) -> Result<NamedTempFile, TransportError> {
  let mut temp = NamedTempFile::new().map_err(TransportError::Temp)?;
  temp.write_all(content).map_err(TransportError::Temp)?;
  temp.flush().map_err(TransportError::Temp)?;
  Ok(temp)
}

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: reqwest::blocking::Client,
}

impl HttpTransport {
  /// Client using the configured timeout, see [`crate::consts::HTTP_TIMEOUT_ENV`].
  pub fn new() -> Result<Self, TransportError> {
    Self::with_timeout(Duration::from_secs(http_timeout_secs()))
  }

  pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
    let client = reqwest::blocking::Client::builder()
      .timeout(timeout)
      .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| TransportError::Client(e.to_string()))?;
    Ok(Self { client })
  }
}

impl Transport for HttpTransport {
  fn fetch(&self, uri: &str) -> Result<Vec<u8>, TransportError> {
    info!(uri = %uri, "fetching");

    let response = self.client.get(uri).send().map_err(|e| TransportError::Request {
      uri: uri.to_string(),
      message: e.to_string(),
    })?;

    if !response.status().is_success() {
      return Err(TransportError::Status {
        uri: uri.to_string(),
        status: response.status().as_u16(),
      });
    }

    let bytes = response.bytes().map_err(|e| TransportError::Request {
      uri: uri.to_string(),
      message: e.to_string(),
    })?;

    debug!(uri = %uri, size = bytes.len(), "download complete");
    Ok(bytes.to_vec())
  }
}

/// Transport serving documents from memory.
///
/// Useful for offline runs and tests. Clones share documents and the request
/// log.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
  documents: Rc<RefCell<HashMap<String, Vec<u8>>>>,
  requests: Rc<RefCell<Vec<String>>>,
}

impl MemoryTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Serve `content` at `uri`, replacing anything already there.
  pub fn insert(&self, uri: &str, content: impl Into<Vec<u8>>) {
    self.documents.borrow_mut().insert(uri.to_string(), content.into());
  }

  pub fn with(self, uri: &str, content: impl Into<Vec<u8>>) -> Self {
    self.insert(uri, content);
    self
  }

  /// Every URI requested so far, in order.
  pub fn requests(&self) -> Vec<String> {
    self.requests.borrow().clone()
  }
}

impl Transport for MemoryTransport {
  fn fetch(&self, uri: &str) -> Result<Vec<u8>, TransportError> {
    self.requests.borrow_mut().push(uri.to_string());
    self
      .documents
      .borrow()
      .get(uri)
      .cloned()
      .ok_or_else(|| TransportError::NotFound(uri.to_string()))
  }
}
