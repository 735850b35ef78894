//! Non-seekable inputs are spilled to a temporary file.
//!
//! The buffer core requires a seekable source. Regular files qualify as-is;
//! stdin and named pipes are copied into a temp file by a background thread
//! while the viewer reads the (growing, seekable) copy. With `--follow` the
//! spill file behaves exactly like a live log.

use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, warn};

/// A seekable source for the buffer. Keeps the temp file alive for spilled
/// inputs; it is removed when the source is dropped.
pub struct Source {
    path: PathBuf,
    _spill: Option<tempfile::NamedTempFile>,
}

impl Source {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolve the CLI input into a seekable source.
///
/// A named file that supports seeking is used directly. Everything else —
/// stdin, pipes, other special files — is spilled.
pub fn prepare(file: Option<&Path>) -> io::Result<Source> {
    match file {
        Some(path) if path != Path::new("-") => {
            let mut probe = File::open(path)?;
            if probe.stream_position().is_ok() {
                return Ok(Source {
                    path: path.to_path_buf(),
                    _spill: None,
                });
            }
            debug!(?path, "input is not seekable, spilling to a temporary file");
            spill(probe)
        }
        _ => spill(io::stdin()),
    }
}

/// Copy `input` into a temp file on a background thread and hand back the
/// seekable side.
fn spill(input: impl Read + Send + 'static) -> io::Result<Source> {
    let file = tempfile::NamedTempFile::new()?;
    let mut writer = file.reopen()?;

    thread::Builder::new().name("lurk-spill".into()).spawn(move || {
        let mut input = input;
        match io::copy(&mut input, &mut writer) {
            Ok(bytes) => debug!(bytes, "input closed"),
            Err(e) => warn!("stopped copying input: {e}"),
        }
    })?;

    Ok(Source {
        path: file.path().to_path_buf(),
        _spill: Some(file),
    })
}
