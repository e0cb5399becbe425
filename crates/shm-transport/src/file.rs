use crate::{RecordSource, RegionInfo, Result, TransportError};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Where POSIX named shared memory shows up as files.
pub const DEFAULT_SHM_DIR: &str = "/dev/shm";

/// A region backed by a file: a POSIX shm object, a tmpfs file, or a dump.
///
/// The file is opened read-only and re-read from offset 0 on every cycle.
pub struct FileRegion {
    path: PathBuf,
    file: File,
    buf: Vec<u8>,
}

impl FileRegion {
    /// Open `name` inside `dir`.
    pub fn open_in(dir: impl AsRef<Path>, name: &str, size: usize) -> Result<Self> {
        Self::open_path(dir.as_ref().join(name), size)
    }

    /// Open an explicit path.
    pub fn open_path(path: impl AsRef<Path>, size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TransportError::RegionNotFound(path.display().to_string()),
            _ => TransportError::Io(e.to_string()),
        })?;
        let actual = file
            .metadata()
            .map_err(|e| TransportError::Io(e.to_string()))?
            .len();
        // Mappings may be rounded up to a page; anything shorter cannot hold a record.
        if actual < size as u64 {
            return Err(TransportError::SizeMismatch {
                expected: size,
                actual: actual as usize,
            });
        }
        tracing::debug!(path = %path.display(), size, actual, "opened file region");
        Ok(Self {
            path,
            file,
            buf: vec![0u8; size],
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List regular files in `dir` as candidate regions.
    pub fn list_in(dir: impl AsRef<Path>) -> Result<Vec<RegionInfo>> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TransportError::RegionNotFound(dir.display().to_string()),
            _ => TransportError::Io(e.to_string()),
        })?;
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TransportError::Io(e.to_string()))?;
            let meta = match entry.metadata() {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            out.push(RegionInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                driver: "file".to_string(),
                size: Some(meta.len()),
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

impl RecordSource for FileRegion {
    fn open(name: &str, size: usize) -> Result<Self> {
        Self::open_in(DEFAULT_SHM_DIR, name, size)
    }

    fn list() -> Result<Vec<RegionInfo>> {
        Self::list_in(DEFAULT_SHM_DIR)
    }

    fn size(&self) -> usize {
        self.buf.len()
    }

    fn read_record(&mut self) -> Result<&[u8]> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| TransportError::Io(e.to_string()))?;
        if let Err(e) = self.file.read_exact(&mut self.buf) {
            if e.kind() == ErrorKind::UnexpectedEof {
                // The producer shrank or recreated the region under us.
                let actual = self.file.metadata().map(|m| m.len() as usize).unwrap_or(0);
                return Err(TransportError::SizeMismatch {
                    expected: self.buf.len(),
                    actual,
                });
            }
            return Err(TransportError::Io(e.to_string()));
        }
        Ok(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shm-transport-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_reads_current_contents_each_cycle() -> anyhow::Result<()> {
        let dir = scratch_dir("reread");
        let path = dir.join("region");
        fs::write(&path, [1u8, 2, 3, 4])?;
        let mut region = FileRegion::open_path(&path, 4)?;
        assert_eq!(region.read_record()?, &[1, 2, 3, 4]);

        let mut f = fs::OpenOptions::new().write(true).open(&path)?;
        f.write_all(&[9, 9])?;
        f.flush()?;
        assert_eq!(region.read_record()?, &[9, 9, 3, 4]);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_larger_file_reads_prefix() -> anyhow::Result<()> {
        let dir = scratch_dir("prefix");
        let path = dir.join("region");
        fs::write(&path, [5u8; 4096])?;
        let mut region = FileRegion::open_path(&path, 10)?;
        assert_eq!(region.size(), 10);
        assert_eq!(region.read_record()?.len(), 10);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_short_file_is_rejected() -> anyhow::Result<()> {
        let dir = scratch_dir("short");
        let path = dir.join("region");
        fs::write(&path, [0u8; 3])?;
        let err = FileRegion::open_path(&path, 4).err();
        assert!(matches!(
            err,
            Some(TransportError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_missing_region() {
        let dir = scratch_dir("missing");
        let err = FileRegion::open_in(&dir, "nope", 4).err();
        assert!(matches!(err, Some(TransportError::RegionNotFound(_))));
    }

    #[test]
    fn test_list_in_sorted() -> anyhow::Result<()> {
        let dir = scratch_dir("list");
        fs::write(dir.join("b"), [0u8; 2])?;
        fs::write(dir.join("a"), [0u8; 1])?;
        fs::create_dir(dir.join("sub"))?;
        let found = FileRegion::list_in(&dir)?;
        let names: Vec<_> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(found[1].size, Some(2));
        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
