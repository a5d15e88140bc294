//! Open modes and mode-checked file streams
//!
//! A [`FileStream`] pairs an open file with the direction it was opened in.
//! Reads against a write stream (and vice versa) fail with
//! `InvalidOperation` here; genuine I/O failures carry the system error
//! text. The reader side keeps a one-byte pushback slot for the line
//! reader's `\r` lookahead.

use crate::error::{Result, UtlFileError};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(unix)]
const EBADF: i32 = 9;

/// Open mode for a file handle: read, write (truncate), or append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}

impl OpenMode {
    /// Parse the one-letter mode string, case-insensitive.
    ///
    /// # Errors
    ///
    /// `ValueError` for an empty string, `InvalidMode` for anything that
    /// is not exactly one of `R`, `W`, `A`.
    pub fn parse(mode: &str) -> Result<Self> {
        if mode.is_empty() {
            return Err(UtlFileError::ValueError(
                "empty string isn't allowed".to_string(),
            ));
        }
        if mode.len() != 1 {
            return Err(UtlFileError::InvalidMode);
        }
        match mode.as_bytes()[0] {
            b'r' | b'R' => Ok(OpenMode::Read),
            b'w' | b'W' => Ok(OpenMode::Write),
            b'a' | b'A' => Ok(OpenMode::Append),
            _ => Err(UtlFileError::InvalidMode),
        }
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, OpenMode::Read)
    }
}

#[derive(Debug)]
enum StreamInner {
    Reader {
        reader: BufReader<File>,
        pushback: Option<u8>,
    },
    Writer {
        writer: BufWriter<File>,
    },
}

/// An open file stream owned by exactly one handle slot.
#[derive(Debug)]
pub struct FileStream {
    mode: OpenMode,
    inner: StreamInner,
}

impl FileStream {
    /// Open `path` in the given mode. Write truncates, append creates if
    /// missing. The raw `io::Error` is returned for the caller to classify.
    pub fn open(path: &Path, mode: OpenMode) -> io::Result<Self> {
        let inner = match mode {
            OpenMode::Read => {
                let file = OpenOptions::new().read(true).open(path)?;
                StreamInner::Reader {
                    reader: BufReader::new(file),
                    pushback: None,
                }
            }
            OpenMode::Write => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?;
                StreamInner::Writer {
                    writer: BufWriter::new(file),
                }
            }
            OpenMode::Append => {
                let file = OpenOptions::new().append(true).create(true).open(path)?;
                StreamInner::Writer {
                    writer: BufWriter::new(file),
                }
            }
        };
        Ok(Self { mode, inner })
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Read one byte. `Ok(None)` is end-of-stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        match &mut self.inner {
            StreamInner::Reader { reader, pushback } => {
                if let Some(byte) = pushback.take() {
                    return Ok(Some(byte));
                }
                let mut buf = [0u8; 1];
                loop {
                    return match reader.read(&mut buf) {
                        Ok(0) => Ok(None),
                        Ok(_) => Ok(Some(buf[0])),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => Err(UtlFileError::ReadError(e.to_string())),
                    };
                }
            }
            StreamInner::Writer { .. } => Err(UtlFileError::InvalidOperation(
                "file descriptor isn't valid for reading".to_string(),
            )),
        }
    }

    /// Return one byte to the stream; the next read yields it again.
    /// Only one byte of pushback is held at a time.
    pub(crate) fn push_back(&mut self, byte: u8) {
        if let StreamInner::Reader { pushback, .. } = &mut self.inner {
            *pushback = Some(byte);
        }
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.inner {
            StreamInner::Writer { writer } => writer
                .write_all(bytes)
                .map_err(|e| UtlFileError::WriteError(e.to_string())),
            StreamInner::Reader { .. } => Err(UtlFileError::InvalidOperation(
                "file descriptor isn't valid for writing".to_string(),
            )),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match &mut self.inner {
            StreamInner::Writer { writer } => writer
                .flush()
                .map_err(|e| UtlFileError::WriteError(e.to_string())),
            StreamInner::Reader { .. } => Err(UtlFileError::InvalidOperation(
                "file is not open for writing".to_string(),
            )),
        }
    }

    /// Close the stream, flushing any buffered writes first. A stale
    /// descriptor maps to `InvalidFileHandle`; any other flush failure is
    /// a `WriteError`. Read streams close without error.
    pub fn close(self) -> Result<()> {
        match self.inner {
            StreamInner::Writer { mut writer } => {
                writer.flush().map_err(classify_close_error)
            }
            StreamInner::Reader { .. } => Ok(()),
        }
    }
}

fn classify_close_error(e: io::Error) -> UtlFileError {
    #[cfg(unix)]
    if e.raw_os_error() == Some(EBADF) {
        return UtlFileError::InvalidFileHandle;
    }
    UtlFileError::WriteError(e.to_string())
}
