//! End-to-end tests for the session operation surface

use std::sync::Arc;
use tempfile::TempDir;
use utlfile::{
    DirAllowList, FileSession, UtlFileConfig, UtlFileError, DEFAULT_MAX_LINESIZE, MAX_SLOTS,
};

/// Session sandboxed to a scratch directory, plus the directory string
/// operations are called with.
fn scratch_session() -> (TempDir, FileSession, String) {
    let dir = TempDir::new().unwrap();
    let d = dir.path().to_str().unwrap().to_string();
    let session = FileSession::new(Arc::new(DirAllowList::from_dirs([d.as_str()])));
    (dir, session, d)
}

#[test]
fn test_round_trip_line() {
    let (_dir, mut session, d) = scratch_session();

    let h = session.open(&d, "hello.txt", "W", DEFAULT_MAX_LINESIZE).unwrap();
    session.put_line(h, "hello", None).unwrap();
    session.close(h).unwrap();

    let h = session.open(&d, "hello.txt", "R", DEFAULT_MAX_LINESIZE).unwrap();
    assert_eq!(session.get_line(h, None).unwrap(), "hello");
    assert_eq!(session.get_nextline(h).unwrap(), None);
    assert!(matches!(
        session.get_line(h, None).unwrap_err(),
        UtlFileError::NoDataFound
    ));
    session.close(h).unwrap();
}

#[test]
fn test_handle_capacity_ceiling() {
    let (_dir, mut session, d) = scratch_session();

    let mut handles = Vec::new();
    for i in 0..MAX_SLOTS {
        handles.push(session.open(&d, &format!("f{i}.txt"), "w", 100).unwrap());
    }
    assert_eq!(session.open_count(), MAX_SLOTS);

    let err = session.open(&d, "one-too-many.txt", "w", 100).unwrap_err();
    assert!(matches!(err, UtlFileError::ProgramLimitExceeded));
    assert_eq!(session.open_count(), MAX_SLOTS);

    // Closing one slot makes room again
    session.close(handles[0]).unwrap();
    session.open(&d, "one-too-many.txt", "w", 100).unwrap();
    assert_eq!(session.open_count(), MAX_SLOTS);

    session.close_all().unwrap();
    assert_eq!(session.open_count(), 0);
}

#[test]
fn test_max_linesize_write_boundary() {
    let (_dir, mut session, d) = scratch_session();

    let h = session.open(&d, "bound.txt", "w", 8).unwrap();
    session.put(h, "12345678").unwrap();
    let err = session.put(h, "123456789").unwrap_err();
    assert!(matches!(err, UtlFileError::ValueError(_)));
    session.close(h).unwrap();
}

#[test]
fn test_putf_byte_sequence() {
    let (dir, mut session, d) = scratch_session();

    let h = session.open(&d, "fmt.txt", "w", 100).unwrap();
    session
        .putf(h, "a%sb\\nc", &[Some("X"), None, None, None, None])
        .unwrap();
    session.close(h).unwrap();
    assert_eq!(std::fs::read(dir.path().join("fmt.txt")).unwrap(), b"aXb\nc");

    let h = session.open(&d, "pct.txt", "w", 100).unwrap();
    session.putf(h, "%%", &[None; 5]).unwrap();
    session.close(h).unwrap();
    assert_eq!(std::fs::read(dir.path().join("pct.txt")).unwrap(), b"%");
}

#[test]
fn test_append_mode() {
    let (dir, mut session, d) = scratch_session();

    let h = session.open(&d, "log.txt", "w", 100).unwrap();
    session.put_line(h, "first", None).unwrap();
    session.close(h).unwrap();

    let h = session.open(&d, "log.txt", "a", 100).unwrap();
    session.put_line(h, "second", None).unwrap();
    session.close(h).unwrap();

    let text = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
    assert!(text.contains("first"));
    assert!(text.contains("second"));

    let h = session.open(&d, "log.txt", "r", 100).unwrap();
    assert_eq!(session.get_line(h, None).unwrap(), "first");
    assert_eq!(session.get_line(h, None).unwrap(), "second");
    session.close(h).unwrap();
}

#[test]
fn test_flush_makes_writes_visible() {
    let (dir, mut session, d) = scratch_session();

    let h = session.open(&d, "flush.txt", "w", 100).unwrap();
    session.put(h, "pending").unwrap();
    session.flush(h).unwrap();
    assert_eq!(
        std::fs::read(dir.path().join("flush.txt")).unwrap(),
        b"pending"
    );
    session.close(h).unwrap();

    // put_line with autoflush behaves like an explicit flush
    let h = session.open(&d, "auto.txt", "w", 100).unwrap();
    session.put_line(h, "now", Some(true)).unwrap();
    assert!(std::fs::read_to_string(dir.path().join("auto.txt"))
        .unwrap()
        .starts_with("now"));
    session.close(h).unwrap();
}

#[test]
fn test_handle_lifecycle() {
    let (_dir, mut session, d) = scratch_session();

    assert!(!session.is_open(1));
    let h = session.open(&d, "life.txt", "w", 100).unwrap();
    assert!(session.is_open(h));
    session.close(h).unwrap();
    assert!(!session.is_open(h));

    assert!(matches!(
        session.close(h).unwrap_err(),
        UtlFileError::InvalidFileHandle
    ));
    assert!(matches!(
        session.close(0).unwrap_err(),
        UtlFileError::InvalidFileHandle
    ));
}

#[test]
fn test_remove() {
    let (dir, mut session, d) = scratch_session();
    std::fs::write(dir.path().join("junk.txt"), b"x").unwrap();

    session.remove(&d, "junk.txt").unwrap();
    assert!(!dir.path().join("junk.txt").exists());

    let err = session.remove(&d, "junk.txt").unwrap_err();
    assert!(matches!(err, UtlFileError::InvalidPath(_)));
}

#[test]
fn test_rename_overwrite_protection() {
    let (dir, mut session, d) = scratch_session();
    std::fs::write(dir.path().join("src.txt"), b"new contents").unwrap();
    std::fs::write(dir.path().join("dst.txt"), b"old contents").unwrap();

    let err = session
        .rename(&d, "src.txt", &d, "dst.txt", false)
        .unwrap_err();
    assert!(matches!(err, UtlFileError::WriteError(_)));
    // Nothing moved
    assert!(dir.path().join("src.txt").exists());

    session.rename(&d, "src.txt", &d, "dst.txt", true).unwrap();
    assert!(!dir.path().join("src.txt").exists());
    assert_eq!(
        std::fs::read(dir.path().join("dst.txt")).unwrap(),
        b"new contents"
    );
}

#[test]
fn test_rename_to_fresh_destination() {
    let (dir, mut session, d) = scratch_session();
    std::fs::write(dir.path().join("a.txt"), b"payload").unwrap();

    session.rename(&d, "a.txt", &d, "b.txt", false).unwrap();
    assert_eq!(std::fs::read(dir.path().join("b.txt")).unwrap(), b"payload");
}

#[test]
fn test_get_attributes() {
    let (dir, session, d) = scratch_session();

    let attrs = session.get_attributes(&d, "ghost.txt").unwrap();
    assert!(!attrs.exists);
    assert_eq!(attrs.size, None);
    assert_eq!(attrs.block_size, None);

    std::fs::write(dir.path().join("real.txt"), b"12345").unwrap();
    let attrs = session.get_attributes(&d, "real.txt").unwrap();
    assert!(attrs.exists);
    assert_eq!(attrs.size, Some(5));
    assert!(attrs.block_size.unwrap() > 0);
}

#[test]
fn test_sandbox_blocks_traversal_everywhere() {
    let (_dir, mut session, d) = scratch_session();

    let escape = "../../etc/passwd";
    assert!(matches!(
        session.open(&d, escape, "r", 100).unwrap_err(),
        UtlFileError::InvalidPath(_)
    ));
    assert!(matches!(
        session.remove(&d, escape).unwrap_err(),
        UtlFileError::InvalidPath(_)
    ));
    assert!(matches!(
        session.get_attributes(&d, escape).unwrap_err(),
        UtlFileError::InvalidPath(_)
    ));
    assert!(matches!(
        session.rename("/etc", "passwd", &d, "stolen", true).unwrap_err(),
        UtlFileError::InvalidPath(_)
    ));
}

#[test]
fn test_session_from_toml_config() {
    let dir = TempDir::new().unwrap();
    let d = dir.path().to_str().unwrap().to_string();

    let toml = format!("directories = [{:?}]", d);
    let config = UtlFileConfig::from_toml_str(&toml).unwrap();
    let mut session = FileSession::new(Arc::new(config.into_allow_list()));

    let h = session.open(&d, "cfg.txt", "w", 100).unwrap();
    session.put_line(h, "configured", None).unwrap();
    session.close(h).unwrap();

    assert!(matches!(
        session.open("/etc", "passwd", "r", 100).unwrap_err(),
        UtlFileError::InvalidPath(_)
    ));
}

#[test]
fn test_resolved_path_starts_with_prefix() {
    let (_dir, session, d) = scratch_session();

    let path = session.resolve(&d, "sub/../file.txt").unwrap();
    assert_eq!(path.as_str(), format!("{d}/file.txt"));
    assert!(path.as_str().starts_with(&format!("{d}/")));
}
