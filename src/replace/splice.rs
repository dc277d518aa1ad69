//! In-place application of a single edit to a seekable byte stream.

use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use super::ReplaceError;
use super::edit::Edit;

/// A byte stream an edit can be spliced into.
pub trait SpliceTarget: Read + Write + Seek {
    /// Cut the stream down to `len` bytes.
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl SpliceTarget for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl SpliceTarget for Cursor<Vec<u8>> {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(io::Error::other)?;
        self.get_mut().truncate(len);
        Ok(())
    }
}

/// A file opened for read/write under an exclusive advisory lock.
///
/// The lock is released when the guard is dropped.
pub struct LockedFile {
    file: File,
    path: PathBuf,
}

impl LockedFile {
    /// Open `path` for in-place editing, blocking until the lock is held.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be opened or locked.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        FileExt::lock_exclusive(&file)?;
        tracing::trace!(path = %path.display(), "locked for editing");
        Ok(Self {
            file,
            path: path.to_owned(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release file lock");
        }
    }
}

impl Read for LockedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for LockedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for LockedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl SpliceTarget for LockedFile {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)
    }
}

/// Replace `edit.length` bytes at `edit.offset` with `edit.content`,
/// shifting the tail of the stream and truncating any leftover bytes.
///
/// Returns the change in stream length. The edit's coordinates must already
/// refer to the stream's current content.
///
/// # Errors
/// Fails with [`ReplaceError::OutOfBounds`] if the range extends past the end
/// of the stream, or with an I/O error from the target.
pub fn apply_edit<T: SpliceTarget + ?Sized>(
    target: &mut T,
    edit: &Edit,
) -> Result<isize, ReplaceError> {
    let size = target.seek(SeekFrom::End(0))?;
    let end = edit.end() as u64;
    if end > size {
        return Err(ReplaceError::OutOfBounds {
            offset: edit.offset,
            length: edit.length,
            size,
        });
    }

    let mut tail = Vec::new();
    target.seek(SeekFrom::Start(end))?;
    target.read_to_end(&mut tail)?;

    target.seek(SeekFrom::Start(edit.offset as u64))?;
    target.write_all(&edit.content)?;
    target.write_all(&tail)?;
    let new_len = target.stream_position()?;
    target.truncate_to(new_len)?;
    target.flush()?;

    Ok(edit.size_delta())
}
