//! File handle table
//!
//! Fixed-capacity registry mapping small integer handles to open streams.
//! Ids come from a monotonically increasing counter that wraps and skips the
//! reserved invalid value 0, so a live id is unique among occupied slots.
//! The table carries no internal locking; callers needing concurrency wrap
//! the owning session (see the crate docs).

use crate::error::{Result, UtlFileError};
use crate::stream::FileStream;

/// Hard ceiling on concurrently open handles per table.
pub const MAX_SLOTS: usize = 50;

const INVALID_SLOT_ID: i32 = 0;

struct FileSlot {
    id: i32,
    stream: Option<FileStream>,
    max_linesize: i32,
}

impl FileSlot {
    const fn free() -> Self {
        Self {
            id: INVALID_SLOT_ID,
            stream: None,
            max_linesize: 0,
        }
    }
}

/// Fixed-size table of open file handles.
pub struct HandleTable {
    slots: Vec<FileSlot>,
    next_id: i32,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_SLOTS).map(|_| FileSlot::free()).collect(),
            next_id: INVALID_SLOT_ID,
        }
    }

    /// Store `stream` in a free slot and return its handle id. When all
    /// slots are occupied the stream is dropped (closing the file) and
    /// `None` is returned; the caller reports `ProgramLimitExceeded`.
    pub fn allocate(&mut self, stream: FileStream, max_linesize: i32) -> Option<i32> {
        let slot = self.slots.iter_mut().find(|s| s.id == INVALID_SLOT_ID)?;

        self.next_id = self.next_id.wrapping_add(1);
        if self.next_id == INVALID_SLOT_ID {
            self.next_id = self.next_id.wrapping_add(1);
        }

        slot.id = self.next_id;
        slot.stream = Some(stream);
        slot.max_linesize = max_linesize;
        Some(slot.id)
    }

    /// Look up an occupied slot, yielding the stream and its configured
    /// maximum line size.
    pub fn resolve(&mut self, handle: i32) -> Result<(&mut FileStream, i32)> {
        if handle == INVALID_SLOT_ID {
            return Err(UtlFileError::InvalidFileHandle);
        }
        for slot in &mut self.slots {
            if slot.id == handle {
                let max_linesize = slot.max_linesize;
                match slot.stream.as_mut() {
                    Some(stream) => return Ok((stream, max_linesize)),
                    None => return Err(UtlFileError::InvalidFileHandle),
                }
            }
        }
        Err(UtlFileError::InvalidFileHandle)
    }

    /// Whether `handle` names a currently open slot. Never fails.
    pub fn is_open(&self, handle: i32) -> bool {
        handle != INVALID_SLOT_ID
            && self
                .slots
                .iter()
                .any(|s| s.id == handle && s.stream.is_some())
    }

    /// Close the stream behind `handle`. The slot is reclaimed even when
    /// the close itself fails.
    pub fn close(&mut self, handle: i32) -> Result<()> {
        if handle == INVALID_SLOT_ID {
            return Err(UtlFileError::InvalidFileHandle);
        }
        for slot in &mut self.slots {
            if slot.id == handle {
                let stream = slot.stream.take();
                *slot = FileSlot::free();
                if let Some(stream) = stream {
                    stream.close()?;
                }
                return Ok(());
            }
        }
        Err(UtlFileError::InvalidFileHandle)
    }

    /// Close every occupied slot. The sweep never stops early: every slot
    /// is reclaimed, and the first close failure is reported afterwards.
    pub fn close_all(&mut self) -> Result<()> {
        let mut first_err = None;

        for slot in &mut self.slots {
            if slot.id == INVALID_SLOT_ID {
                continue;
            }
            let stream = slot.stream.take();
            *slot = FileSlot::free();
            if let Some(stream) = stream {
                if let Err(e) = stream.close() {
                    tracing::warn!(error = %e, "close failure during close_all sweep");
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of occupied slots.
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|s| s.id != INVALID_SLOT_ID).count()
    }
}
