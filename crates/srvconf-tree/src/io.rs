//! Loading and atomic saving of configuration documents

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Document, Error, Result};

/// Read and parse a configuration document.
pub fn load(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let doc = Document::parse(&source)?;
    tracing::debug!(path = %path.display(), "Loaded configuration document");
    Ok(doc)
}

/// Render a document and write it atomically to `path`.
pub fn save(path: &Path, doc: &Document) -> Result<()> {
    let content = doc.render()?;
    write_atomic(path, content.as_bytes())?;
    tracing::debug!(path = %path.display(), "Saved configuration document");
    Ok(())
}

/// Replace `path` with `content` without ever exposing a half-written file.
///
/// The content goes to a locked temp file beside the target, which is then
/// renamed over it. An existing target's permissions carry over to the new
/// file. On any failure the temp file is removed and the target is left as
/// it was.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let result = write_temp(&temp_path, path, content)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

    if result.is_err() {
        if let Err(e) = fs::remove_file(&temp_path) {
            tracing::warn!(path = %temp_path.display(), error = %e, "Could not remove temp file");
        }
    }
    result
}

/// Hidden sibling of `path`, unique per process.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

fn write_temp(temp_path: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    file.write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    if let Ok(existing) = fs::metadata(target) {
        file.set_permissions(existing.permissions())
            .map_err(|e| Error::io(temp_path, e))?;
    }
    file.sync_all().map_err(|e| Error::io(temp_path, e))?;

    FileExt::unlock(&file).map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })
}
