//! Engine snapshot serialization using `MessagePack`.
//!
//! Snapshots are plain data. Turning one back into a working engine goes
//! through [`IntentEngine::from_snapshot`](parley_engine::IntentEngine::from_snapshot),
//! which re-validates everything.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use parley_engine::EngineSnapshot;
use parley_foundation::{Error, ErrorKind, Result};

fn io_error(action: &str, path: &Path, e: &io::Error) -> Error {
    Error::new(ErrorKind::IoError(format!(
        "cannot {action} snapshot '{}': {e}",
        path.display()
    )))
}

fn codec_error(e: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::SerializationError(format!("snapshot: {e}")))
}

/// Encodes a snapshot as `MessagePack`, keeping field names so that older
/// snapshots still decode after fields are added.
///
/// # Errors
///
/// Returns `SerializationError` if encoding fails.
pub fn to_bytes(snapshot: &EngineSnapshot) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(snapshot).map_err(codec_error)
}

/// Decodes a snapshot. The result is not validated until it is restored.
///
/// # Errors
///
/// Returns `SerializationError` if the bytes are not a snapshot.
pub fn from_bytes(bytes: &[u8]) -> Result<EngineSnapshot> {
    rmp_serde::from_slice(bytes).map_err(codec_error)
}

/// Writes a snapshot to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be written, or
/// `SerializationError` if encoding fails.
pub fn save_to_file<P: AsRef<Path>>(snapshot: &EngineSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(snapshot)?;

    let file = File::create(path).map_err(|e| io_error("create", path, &e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .and_then(|()| writer.flush())
        .map_err(|e| io_error("write", path, &e))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved snapshot");
    Ok(())
}

/// Reads a snapshot written by [`save_to_file`].
///
/// # Errors
///
/// Returns `IoError` if the file cannot be read, or `SerializationError` if
/// it does not hold a snapshot.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<EngineSnapshot> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error("open", path, &e))?;

    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("read", path, &e))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded snapshot");
    from_bytes(&bytes)
}
