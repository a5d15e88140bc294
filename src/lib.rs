//! Oracle UTL_FILE-compatible sandboxed file access
//!
//! Handle-based, line-oriented access to a confined set of server-side
//! directories. Every path goes through the sandbox gate before the
//! filesystem is touched, every read and write is bounded by the handle's
//! configured maximum line size, and at most 50 handles are open per
//! session.
//!
//! - [`allowlist`] - approved-directory providers (the external boundary)
//! - [`sandbox`] - path canonicalization and the allow-list gate
//! - [`handle`] - the fixed-capacity handle table
//! - [`stream`] - open modes and mode-checked file streams
//! - [`line`] - bounded line read/write and formatted output
//! - [`session`] - the callable operation surface
//! - [`config`] - TOML loading of the approved-directory list
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use utlfile::{DirAllowList, FileSession};
//!
//! let dirs = DirAllowList::from_dirs(["/srv/reports"]);
//! let mut session = FileSession::new(Arc::new(dirs));
//!
//! let h = session.open("/srv/reports", "daily.txt", "w", 1024)?;
//! session.put_line(h, "total: 42", None)?;
//! session.putf(h, "%s of %s\\n", &[Some("3"), Some("9"), None, None, None])?;
//! session.close(h)?;
//!
//! let h = session.open("/srv/reports", "daily.txt", "r", 1024)?;
//! while let Some(line) = session.get_nextline(h)? {
//!     println!("{line}");
//! }
//! session.close_all()?;
//! # Ok::<(), utlfile::UtlFileError>(())
//! ```
//!
//! ## Concurrency
//!
//! A [`FileSession`] assumes one logical thread of control, matching a
//! single database session issuing one call at a time. Wrap the whole
//! session in a mutex if it must be shared; the handle table carries no
//! internal locking. The allow-list providers are `Send + Sync` and may be
//! shared freely.

pub mod allowlist;
pub mod config;
pub mod error;
pub mod handle;
pub mod line;
pub mod sandbox;
pub mod session;
pub mod stream;

pub use allowlist::{AllowListProvider, AllowListUnavailable, DirAllowList};
pub use config::UtlFileConfig;
pub use error::{Result, UtlFileError};
pub use handle::{HandleTable, MAX_SLOTS};
pub use line::MAX_LINESIZE;
pub use sandbox::{PathSandbox, SafePath};
pub use session::{FileAttributes, FileSession, DEFAULT_MAX_LINESIZE};
pub use stream::{FileStream, OpenMode};
