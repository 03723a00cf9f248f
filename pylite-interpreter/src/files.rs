//! File access behind [`FileHandle`]. Handles hold no OS resource, so each
//! operation opens the path, does its transfer and closes it again.

use std::fs::{self, OpenOptions};
use std::io::Write;

use crate::value::{EvaluationError, FileHandle};

fn io_error(handle: &FileHandle, error: std::io::Error) -> EvaluationError {
    EvaluationError::Io {
        path: handle.path.clone(),
        message: error.to_string(),
    }
}

fn ensure_open(handle: &FileHandle) -> Result<(), EvaluationError> {
    if handle.open {
        Ok(())
    } else {
        Err(EvaluationError::ClosedFile(handle.path.clone()))
    }
}

/// Reads the whole file. Binary handles decode the bytes lossily.
pub fn read(handle: &FileHandle) -> Result<String, EvaluationError> {
    ensure_open(handle)?;
    tracing::debug!(path = %handle.path, binary = handle.binary, "reading file");

    if handle.binary {
        let bytes = fs::read(&handle.path).map_err(|err| io_error(handle, err))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    } else {
        fs::read_to_string(&handle.path).map_err(|err| io_error(handle, err))
    }
}

/// Writes `payload`, appending when the mode contains `a` and truncating
/// otherwise. Returns the number of characters written.
pub fn write(handle: &FileHandle, payload: &str) -> Result<usize, EvaluationError> {
    ensure_open(handle)?;
    let append = handle.mode.contains('a');
    tracing::debug!(path = %handle.path, append, "writing file");

    let mut options = OpenOptions::new();
    options.write(true).create(true);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }

    let mut file = options
        .open(&handle.path)
        .map_err(|err| io_error(handle, err))?;
    file.write_all(payload.as_bytes())
        .map_err(|err| io_error(handle, err))?;

    Ok(payload.chars().count())
}
