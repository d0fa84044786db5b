//! Raw file output stream
//!
//! `RawFdOStream` holds an open file, or standard output for the path `-`,
//! until `close` or drop. A stream that failed to open is inert: writes are
//! discarded and `close` does nothing.

use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::mem;
use std::path::{Path, PathBuf};

use irf_common::{OpenFlags, StreamError};

#[derive(Debug)]
enum Sink {
    Stdout(io::Stdout),
    File(File),
    Closed,
}

/// Write-only stream over a file descriptor
#[derive(Debug)]
pub struct RawFdOStream {
    path: PathBuf,
    sink: Sink,
    failed: bool,
}

impl RawFdOStream {
    /// Open `path` for writing. Without `EXCL` an existing file is truncated,
    /// or appended to with `APPEND`.
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self, StreamError> {
        let path = path.as_ref();
        if path == Path::new("-") {
            debug!("opened standard output");
            return Ok(Self {
                path: path.to_path_buf(),
                sink: Sink::Stdout(io::stdout()),
                failed: false,
            });
        }

        let file = open_options(flags).open(path).map_err(|source| StreamError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened '{}' with flags {:?}", path.display(), flags);
        Ok(Self {
            path: path.to_path_buf(),
            sink: Sink::File(file),
            failed: false,
        })
    }

    /// Open `path`, reporting failure through `error_info` instead of a
    /// `Result`. On failure the returned stream is inert.
    pub fn new(path: impl AsRef<Path>, error_info: &mut Option<String>, flags: OpenFlags) -> Self {
        let path = path.as_ref();
        match Self::open(path, flags) {
            Ok(stream) => {
                *error_info = None;
                stream
            }
            Err(err) => {
                warn!("{err}");
                *error_info = Some(err.to_string());
                Self {
                    path: path.to_path_buf(),
                    sink: Sink::Closed,
                    failed: true,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.sink, Sink::Closed)
    }

    /// True once opening, writing or flushing has failed
    pub fn has_error(&self) -> bool {
        self.failed
    }

    /// Flush and release the file. Safe to call any number of times.
    pub fn close(&mut self) {
        let result = match mem::replace(&mut self.sink, Sink::Closed) {
            Sink::Closed => return,
            Sink::Stdout(mut out) => out.flush(),
            Sink::File(mut file) => file.flush(),
        };
        match result {
            Ok(()) => debug!("closed '{}'", self.path.display()),
            Err(err) => {
                warn!("error closing '{}': {err}", self.path.display());
                self.failed = true;
            }
        }
    }
}

fn open_options(flags: OpenFlags) -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true);
    if flags.contains(OpenFlags::RW) {
        options.read(true);
    }
    if flags.contains(OpenFlags::EXCL) {
        options.create_new(true);
    } else {
        options.create(true);
    }
    if flags.contains(OpenFlags::APPEND) {
        options.append(true);
    } else {
        options.truncate(true);
    }
    // TEXT only matters where the OS translates line endings
    options
}

impl Write for RawFdOStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = match &mut self.sink {
            Sink::Stdout(out) => out.write(buf),
            Sink::File(file) => file.write(buf),
            Sink::Closed if self.failed => return Ok(buf.len()),
            Sink::Closed => {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    format!("write to closed stream '{}'", self.path.display()),
                ))
            }
        };
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.sink {
            Sink::Stdout(out) => out.flush(),
            Sink::File(file) => file.flush(),
            Sink::Closed => Ok(()),
        }
    }
}

impl Drop for RawFdOStream {
    fn drop(&mut self) {
        self.close();
    }
}
