//! Bounded line-oriented I/O
//!
//! Reads and writes over a [`FileStream`], every one enforcing the handle's
//! configured maximum line size. Line-ending handling follows the Oracle
//! convention: `\r\n`, a lone `\n`, or a lone `\r` all terminate a line, and
//! the terminator is never part of the returned text.

use crate::error::{Result, UtlFileError};
use crate::stream::FileStream;

/// Upper bound for any line-size value.
pub const MAX_LINESIZE: i32 = 32767;

/// Native line terminator appended by [`write_line`] and [`write_newlines`].
#[cfg(windows)]
pub const LINE_TERMINATOR: &[u8] = b"\r\n";
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Bounds-check a line-size value (1..=32767).
pub fn check_linesize(max_linesize: i32) -> Result<()> {
    if !(1..=MAX_LINESIZE).contains(&max_linesize) {
        return Err(UtlFileError::InvalidMaxLineSize);
    }
    Ok(())
}

fn check_length(len: usize, max_linesize: i32) -> Result<()> {
    if len > max_linesize as usize {
        return Err(UtlFileError::ValueError("buffer is too short".to_string()));
    }
    Ok(())
}

/// Read one line of at most `max_linesize` bytes.
///
/// Returns `Ok(None)` only when end-of-stream is reached before any byte
/// was read; a partial line at end-of-stream is still a line. A line that
/// hits `max_linesize` is returned without consuming a terminator, so the
/// next read continues where this one stopped. After a lone `\r` the
/// following byte is pushed back unless it is `\n`.
///
/// # Errors
///
/// `InvalidOperation` if the stream is not open for reading, `ReadError`
/// for any other read failure or if the line is not well-formed UTF-8.
pub fn read_line(stream: &mut FileStream, max_linesize: i32) -> Result<Option<String>> {
    let max = max_linesize as usize;
    let mut buf: Vec<u8> = Vec::new();
    let mut got_any = false;

    while buf.len() < max {
        let byte = match stream.read_byte()? {
            Some(b) => b,
            None => break,
        };
        got_any = true;

        if byte == b'\r' {
            // Look ahead for \n; anything else is read again next time
            match stream.read_byte()? {
                None | Some(b'\n') => {}
                Some(other) => stream.push_back(other),
            }
            break;
        }
        if byte == b'\n' {
            break;
        }
        buf.push(byte);
    }

    if !got_any {
        return Ok(None);
    }

    let line = String::from_utf8(buf)
        .map_err(|_| UtlFileError::ReadError("invalid byte sequence in line".to_string()))?;
    Ok(Some(line))
}

/// Write `text` without a terminator. Fails with `ValueError` if the text
/// is longer than `max_linesize`.
pub fn write_buffer(stream: &mut FileStream, text: &str, max_linesize: i32) -> Result<()> {
    check_length(text.len(), max_linesize)?;
    stream.write_all(text.as_bytes())
}

/// Write `text` followed by one native line terminator, flushing if
/// `autoflush` is set.
pub fn write_line(
    stream: &mut FileStream,
    text: &str,
    max_linesize: i32,
    autoflush: bool,
) -> Result<()> {
    write_buffer(stream, text, max_linesize)?;
    write_newlines(stream, 1)?;
    if autoflush {
        stream.flush()?;
    }
    Ok(())
}

/// Write `count` native line terminators.
pub fn write_newlines(stream: &mut FileStream, count: i32) -> Result<()> {
    for _ in 0..count {
        stream.write_all(LINE_TERMINATOR)?;
    }
    Ok(())
}

/// Constrained template substitution, processed left to right:
///
/// - `\n` (two characters) emits one newline
/// - `%%` emits a literal `%`
/// - `%s` emits the next positional argument; an absent argument emits
///   nothing but still consumes the position, as does any occurrence past
///   the fifth
/// - any other `%` escape emits nothing
/// - a lone `%` or `\` as the final character is emitted literally
///
/// The running output length is checked against `max_linesize` before each
/// emission. On overflow the call fails with `ValueError` after earlier
/// output may already have reached the stream; output is not transactional.
pub fn write_formatted(
    stream: &mut FileStream,
    format: &str,
    args: &[Option<&str>; 5],
    max_linesize: i32,
) -> Result<()> {
    let bytes = format.as_bytes();
    let mut cur_len: usize = 0;
    let mut cur_arg: usize = 0;
    let mut i = 0;

    while i < bytes.len() {
        if i + 1 == bytes.len() {
            // Final byte is always literal, even '%' or '\'
            cur_len += 1;
            check_length(cur_len, max_linesize)?;
            stream.write_all(&bytes[i..i + 1])?;
            break;
        }

        if bytes[i] == b'\\' && bytes[i + 1] == b'n' {
            cur_len += 1;
            check_length(cur_len, max_linesize)?;
            stream.write_all(b"\n")?;
            i += 2;
            continue;
        }

        if bytes[i] == b'%' {
            if bytes[i + 1] == b'%' {
                cur_len += 1;
                check_length(cur_len, max_linesize)?;
                stream.write_all(b"%")?;
            } else if bytes[i + 1] == b's' {
                cur_arg += 1;
                if cur_arg <= args.len() {
                    if let Some(arg) = args[cur_arg - 1] {
                        cur_len += arg.len();
                        check_length(cur_len, max_linesize)?;
                        stream.write_all(arg.as_bytes())?;
                    }
                }
            }
            i += 2;
            continue;
        }

        cur_len += 1;
        check_length(cur_len, max_linesize)?;
        stream.write_all(&bytes[i..i + 1])?;
        i += 1;
    }

    Ok(())
}
