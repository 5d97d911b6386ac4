//! Append-only record log
//!
//! Owns the entries file. Existing bytes are never rewritten: new records
//! are written through an append-mode handle and synced before the append
//! is reported as successful. A write that fails part way is rolled back
//! by truncating the file to its previous length, so the file only ever
//! holds whole records.
//!
//! A file whose last record is missing its terminator (left by a crashed
//! writer or a hand edit) gets the terminator written in front of the
//! next record, so the two never run together.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::codec::{CodecError, RECORD_SEPARATOR};
use super::error::{StoreError, StoreResult};

/// `RECORD_SEPARATOR` as its single UTF-8 byte
const SEPARATOR_BYTE: u8 = RECORD_SEPARATOR as u8;

/// Append handle on the entries file
#[derive(Debug)]
pub struct RecordLog {
    path: PathBuf,
    file: File,
    /// Length of the file in bytes; the rollback point for a failed append
    len: u64,
    /// Whether the file is empty or ends with `RECORD_SEPARATOR`
    terminated: bool,
}

impl RecordLog {
    /// Read the whole entries file as text
    ///
    /// Returns `None` if the file does not exist. Bytes that are not valid
    /// UTF-8 are reported as a `MalformedRecord` naming the record they
    /// fall in.
    pub fn read_contents(path: &Path) -> StoreResult<Option<String>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::from_read(e, path.to_path_buf())),
        };

        String::from_utf8(bytes).map(Some).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            StoreError::MalformedRecord {
                path: path.to_path_buf(),
                record: complete_records(valid),
                source: CodecError::InvalidUtf8,
            }
        })
    }

    /// Split file contents into the non-empty record segments
    pub fn segments(contents: &str) -> impl Iterator<Item = &str> {
        contents
            .split(RECORD_SEPARATOR)
            .filter(|segment| !segment.is_empty())
    }

    /// Open the entries file for appending, creating it and its parent
    /// directory if needed
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| StoreError::from_write(e, path.to_path_buf()))?;

        let len = file
            .metadata()
            .map_err(|e| StoreError::from_read(e, path.to_path_buf()))?
            .len();

        let terminated = ends_with_separator(&mut file, len)
            .map_err(|e| StoreError::from_read(e, path.to_path_buf()))?;
        if !terminated {
            warn!(
                "Last record in {:?} is unterminated; terminating it on next append",
                path
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
            terminated,
        })
    }

    /// Path of the entries file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length of the entries file in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the entries file is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one encoded record followed by the record separator
    ///
    /// The record and its terminator go out in a single write and are
    /// synced to disk. On failure the file is truncated back to its
    /// previous length.
    pub fn append(&mut self, record: &str) -> StoreResult<()> {
        let mut buf = String::with_capacity(record.len() + 2 * RECORD_SEPARATOR.len_utf8());
        if !self.terminated {
            buf.push(RECORD_SEPARATOR);
        }
        buf.push_str(record);
        buf.push(RECORD_SEPARATOR);

        let result = self
            .file
            .write_all(buf.as_bytes())
            .and_then(|_| self.file.sync_data());

        match result {
            Ok(()) => {
                self.len += buf.len() as u64;
                self.terminated = true;
                Ok(())
            }
            Err(e) => {
                self.rollback();
                Err(StoreError::from_write(e, self.path.clone()))
            }
        }
    }

    /// Discard any partially written bytes past the last record boundary
    fn rollback(&mut self) {
        if let Err(e) = self.file.set_len(self.len) {
            warn!(
                "Failed to roll back partial append to {:?} at {} bytes: {}",
                self.path, self.len, e
            );
        } else {
            warn!("Rolled back partial append to {:?}", self.path);
        }
    }
}

/// Whether the last of `len` bytes in `file` is the record separator
fn ends_with_separator(file: &mut File, len: u64) -> io::Result<bool> {
    if len == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == SEPARATOR_BYTE)
}

/// Number of non-empty, terminated records in `bytes`
fn complete_records(bytes: &[u8]) -> usize {
    let end = bytes
        .iter()
        .rposition(|b| *b == SEPARATOR_BYTE)
        .map_or(0, |pos| pos + 1);

    bytes[..end]
        .split(|b| *b == SEPARATOR_BYTE)
        .filter(|segment| !segment.is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entries.txt");

        assert!(RecordLog::read_contents(&path).unwrap().is_none());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("entries.txt");

        let log = RecordLog::open(&path).unwrap();
        assert!(path.exists());
        assert!(log.is_empty());
        assert_eq!(log.path(), path.as_path());
    }

    #[test]
    fn test_append_writes_terminated_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entries.txt");

        let mut log = RecordLog::open(&path).unwrap();
        log.append("1\u{1F}one").unwrap();
        log.append("2\u{1F}two").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1\u{1F}one\u{1D}2\u{1F}two\u{1D}");
        assert_eq!(log.len(), contents.len() as u64);
    }

    #[test]
    fn test_append_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entries.txt");
        fs::write(&path, "1\u{1F}existing\u{1D}").unwrap();

        let mut log = RecordLog::open(&path).unwrap();
        assert_eq!(log.len(), "1\u{1F}existing\u{1D}".len() as u64);
        log.append("2\u{1F}new").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1\u{1F}existing\u{1D}2\u{1F}new\u{1D}");
    }

    #[test]
    fn test_segments_skip_empty() {
        let contents = "\u{1D}1\u{1F}a\u{1D}\u{1D}2\u{1F}b\u{1D}";
        let segments: Vec<&str> = RecordLog::segments(contents).collect();
        assert_eq!(segments, vec!["1\u{1F}a", "2\u{1F}b"]);
    }

    #[test]
    fn test_segments_keep_unterminated_tail() {
        let segments: Vec<&str> = RecordLog::segments("1\u{1F}a\u{1D}2\u{1F}b").collect();
        assert_eq!(segments, vec!["1\u{1F}a", "2\u{1F}b"]);
    }

    #[test]
    fn test_append_after_unterminated_tail() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entries.txt");
        fs::write(&path, "1\u{1F}one\u{1D}2\u{1F}two").unwrap();

        let mut log = RecordLog::open(&path).unwrap();
        log.append("3\u{1F}three").unwrap();
        log.append("4\u{1F}four").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "1\u{1F}one\u{1D}2\u{1F}two\u{1D}3\u{1F}three\u{1D}4\u{1F}four\u{1D}"
        );
        assert_eq!(log.len(), contents.len() as u64);
        assert_eq!(RecordLog::segments(&contents).count(), 4);
    }

    #[test]
    fn test_invalid_utf8_is_malformed_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entries.txt");
        let mut bytes = b"1\x1Fok\x1D\x1D2\x1Fstill ok\x1D3\x1Fbad ".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.extend_from_slice(b"\x1D");
        fs::write(&path, bytes).unwrap();

        match RecordLog::read_contents(&path).unwrap_err() {
            StoreError::MalformedRecord { record, source, .. } => {
                assert_eq!(record, 2);
                assert_eq!(source, CodecError::InvalidUtf8);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
