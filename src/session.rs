//! Session-level file operations
//!
//! [`FileSession`] is the callable surface of the crate: one handle table
//! plus one path sandbox, owned by the session (never process-global), with
//! an operation per Oracle UTL_FILE entry point. All state lives here, so a
//! session is exactly the capacity domain for the 50-handle ceiling.

use crate::allowlist::AllowListProvider;
use crate::error::{Result, UtlFileError};
use crate::handle::HandleTable;
use crate::line;
use crate::sandbox::{canonicalize, PathSandbox, SafePath};
use crate::stream::{FileStream, OpenMode};
use std::fs;
use std::io;
use std::sync::Arc;

/// Default maximum line size when callers don't pick one.
pub const DEFAULT_MAX_LINESIZE: i32 = 1024;

#[cfg(windows)]
const NTFS_BLOCK_SIZE: i32 = 512;

/// Result of a [`FileSession::get_attributes`] probe. Size and block size
/// are only present when the file exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    pub exists: bool,
    pub size: Option<i64>,
    pub block_size: Option<i32>,
}

impl FileAttributes {
    fn absent() -> Self {
        Self {
            exists: false,
            size: None,
            block_size: None,
        }
    }
}

/// Map a filesystem error the way every path operation here does:
/// access, name, existence, and directory-type failures are `InvalidPath`;
/// everything else is `InvalidOperation`.
fn classify_io_error(e: io::Error) -> UtlFileError {
    use io::ErrorKind;
    match e.kind() {
        ErrorKind::NotFound
        | ErrorKind::PermissionDenied
        | ErrorKind::NotADirectory
        | ErrorKind::IsADirectory
        | ErrorKind::InvalidFilename => UtlFileError::InvalidPath(e.to_string()),
        _ => UtlFileError::InvalidOperation(e.to_string()),
    }
}

/// A session's worth of sandboxed file access.
pub struct FileSession {
    sandbox: PathSandbox,
    table: HandleTable,
}

impl FileSession {
    pub fn new(provider: Arc<dyn AllowListProvider>) -> Self {
        Self {
            sandbox: PathSandbox::new(provider),
            table: HandleTable::new(),
        }
    }

    /// Validate a (directory, filename) pair without opening anything.
    pub fn resolve(&self, directory: &str, filename: &str) -> Result<SafePath> {
        self.sandbox.resolve(directory, filename)
    }

    /// Open a file and return its handle.
    ///
    /// `mode` is the one-letter mode string (`R`, `W`, `A`, case-insensitive);
    /// `max_linesize` bounds every later read and write on this handle.
    ///
    /// # Errors
    ///
    /// `InvalidMode`, `InvalidMaxLineSize`, `InvalidPath`,
    /// `InvalidOperation`, or `ProgramLimitExceeded` when all 50 slots are
    /// taken (the just-opened stream is closed first, nothing leaks).
    pub fn open(
        &mut self,
        directory: &str,
        filename: &str,
        mode: &str,
        max_linesize: i32,
    ) -> Result<i32> {
        if mode.is_empty() {
            return Err(UtlFileError::ValueError(
                "empty string isn't allowed".to_string(),
            ));
        }
        line::check_linesize(max_linesize)?;
        let mode = OpenMode::parse(mode)?;

        let path = self.sandbox.resolve(directory, filename)?;
        let stream = FileStream::open(path.as_path(), mode).map_err(classify_io_error)?;

        match self.table.allocate(stream, max_linesize) {
            Some(handle) => Ok(handle),
            None => Err(UtlFileError::ProgramLimitExceeded),
        }
    }

    /// Whether `handle` is currently open. Never fails.
    pub fn is_open(&self, handle: i32) -> bool {
        self.table.is_open(handle)
    }

    /// Read one line, failing with `NoDataFound` at end-of-stream.
    ///
    /// `len` optionally shrinks (never grows) the handle's maximum line
    /// size for this call, and is itself bounds-checked.
    pub fn get_line(&mut self, handle: i32, len: Option<i32>) -> Result<String> {
        let (stream, mut max_linesize) = self.table.resolve(handle)?;
        if let Some(len) = len {
            line::check_linesize(len)?;
            max_linesize = max_linesize.min(len);
        }
        line::read_line(stream, max_linesize)?.ok_or(UtlFileError::NoDataFound)
    }

    /// Read one line, returning `None` at end-of-stream.
    pub fn get_nextline(&mut self, handle: i32) -> Result<Option<String>> {
        let (stream, max_linesize) = self.table.resolve(handle)?;
        line::read_line(stream, max_linesize)
    }

    /// Write `text` with no line terminator.
    pub fn put(&mut self, handle: i32, text: &str) -> Result<()> {
        let (stream, max_linesize) = self.table.resolve(handle)?;
        line::write_buffer(stream, text, max_linesize)
    }

    /// Write `text` plus one line terminator; `autoflush` defaults to off.
    pub fn put_line(&mut self, handle: i32, text: &str, autoflush: Option<bool>) -> Result<()> {
        let (stream, max_linesize) = self.table.resolve(handle)?;
        line::write_line(stream, text, max_linesize, autoflush.unwrap_or(false))
    }

    /// Write `count` line terminators (default 1).
    pub fn new_line(&mut self, handle: i32, count: Option<i32>) -> Result<()> {
        let (stream, _) = self.table.resolve(handle)?;
        line::write_newlines(stream, count.unwrap_or(1))
    }

    /// Formatted write; see [`line::write_formatted`] for the template
    /// rules and the partial-output caveat.
    pub fn putf(&mut self, handle: i32, format: &str, args: &[Option<&str>; 5]) -> Result<()> {
        let (stream, max_linesize) = self.table.resolve(handle)?;
        line::write_formatted(stream, format, args, max_linesize)
    }

    /// Flush pending writes on `handle` to the filesystem.
    pub fn flush(&mut self, handle: i32) -> Result<()> {
        let (stream, _) = self.table.resolve(handle)?;
        stream.flush()
    }

    /// Close `handle`. Closing an unknown or already-closed handle is an
    /// `InvalidFileHandle` error.
    pub fn close(&mut self, handle: i32) -> Result<()> {
        self.table.close(handle)
    }

    /// Close every open handle; the sweep reclaims all slots even when
    /// individual closes fail.
    pub fn close_all(&mut self) -> Result<()> {
        self.table.close_all()
    }

    /// Number of handles this session has open.
    pub fn open_count(&self) -> usize {
        self.table.open_count()
    }

    /// Delete a file under an approved directory.
    pub fn remove(&mut self, directory: &str, filename: &str) -> Result<()> {
        let path = self.sandbox.resolve(directory, filename)?;
        fs::remove_file(path.as_path()).map_err(classify_io_error)
    }

    /// Rename `src` to `dst`, both validated. Without `overwrite`, an
    /// existing destination fails with `WriteError` ("file exists"); a
    /// destination probe failure other than not-found is an I/O error, not
    /// an existence conflict. The rename itself replaces an existing
    /// destination atomically on the same filesystem.
    pub fn rename(
        &mut self,
        src_directory: &str,
        src_filename: &str,
        dst_directory: &str,
        dst_filename: &str,
        overwrite: bool,
    ) -> Result<()> {
        let src = self.sandbox.resolve(src_directory, src_filename)?;
        let dst = self.sandbox.resolve(dst_directory, dst_filename)?;

        if !overwrite {
            match fs::metadata(dst.as_path()) {
                Ok(_) => {
                    return Err(UtlFileError::WriteError("file exists".to_string()));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(classify_io_error(e)),
            }
        }

        fs::rename(src.as_path(), dst.as_path()).map_err(classify_io_error)
    }

    /// Stat a file under an approved directory. A missing file reports
    /// `exists: false` with size and block size absent; any other probe
    /// failure is classified as an I/O error.
    pub fn get_attributes(&self, directory: &str, filename: &str) -> Result<FileAttributes> {
        let path = self.sandbox.resolve(directory, filename)?;

        match fs::metadata(path.as_path()) {
            Ok(meta) => Ok(FileAttributes {
                exists: true,
                size: Some(meta.len() as i64),
                block_size: Some(block_size_of(&meta)),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileAttributes::absent()),
            Err(e) => Err(classify_io_error(e)),
        }
    }

    /// The platform temp directory, canonicalized. Informational only;
    /// deliberately not subject to the allow-list.
    pub fn temp_dir(&self) -> String {
        canonicalize(&std::env::temp_dir().to_string_lossy())
    }
}

#[cfg(unix)]
fn block_size_of(meta: &fs::Metadata) -> i32 {
    use std::os::unix::fs::MetadataExt;
    meta.blksize() as i32
}

#[cfg(windows)]
fn block_size_of(_meta: &fs::Metadata) -> i32 {
    NTFS_BLOCK_SIZE
}
