//! Staged output for one run.
//!
//! Each file is first written to a temp file next to its target. Targets are
//! replaced only after every file of the run is staged. If staging or any
//! replacement fails, the files already replaced get their previous contents
//! back and the directories the batch created are removed.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::generator::{GeneratorError, WriteStatus};

struct StagedFile {
    path: PathBuf,
    file: NamedTempFile,
    /// Contents before the run, `None` if the file did not exist.
    previous: Option<Vec<u8>>,
}

/// Files of one run, committed together or not at all.
#[derive(Default)]
pub(crate) struct OutputBatch {
    staged: Vec<StagedFile>,
    /// Topmost directories created while staging, removed on rollback.
    created_dirs: Vec<PathBuf>,
    committed: bool,
}

fn io_error(path: &Path) -> impl Fn(io::Error) -> GeneratorError + '_ {
    move |source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl OutputBatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stage `text` for `path`. A file with identical contents is not staged.
    pub(crate) fn stage(
        &mut self,
        path: &Path,
        text: &str,
    ) -> Result<WriteStatus, GeneratorError> {
        let previous = match fs::read(path) {
            Ok(existing) if existing == text.as_bytes() => return Ok(WriteStatus::Unchanged),
            Ok(existing) => Some(existing),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(io_error(path)(err)),
        };

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let missing = dir
            .ancestors()
            .take_while(|d| !d.as_os_str().is_empty() && !d.exists());
        if let Some(topmost) = missing.last() {
            self.created_dirs.push(topmost.to_path_buf());
        }
        fs::create_dir_all(dir).map_err(io_error(dir))?;

        let mut file = NamedTempFile::new_in(dir).map_err(io_error(path))?;
        file.write_all(text.as_bytes()).map_err(io_error(path))?;
        file.flush().map_err(io_error(path))?;

        self.staged.push(StagedFile {
            path: path.to_path_buf(),
            file,
            previous,
        });
        Ok(WriteStatus::Written)
    }

    /// Replace every staged target.
    pub(crate) fn commit(mut self) -> Result<(), GeneratorError> {
        let mut replaced: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::new();
        for staged in self.staged.drain(..) {
            let StagedFile {
                path,
                file,
                previous,
            } = staged;
            if let Err(err) = file.persist(&path) {
                for (path, previous) in replaced.iter().rev() {
                    restore(path, previous.as_deref());
                }
                return Err(io_error(&path)(err.error));
            }
            replaced.push((path, previous));
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for OutputBatch {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Temp files go first so the created directories can be removed.
        self.staged.clear();
        for dir in self.created_dirs.iter().rev() {
            if let Err(err) = fs::remove_dir_all(dir) {
                tracing::warn!(
                    dir = %dir.display(),
                    error = %err,
                    "cannot remove output directory"
                );
            }
        }
    }
}

fn restore(path: &Path, previous: Option<&[u8]>) {
    let result = match previous {
        Some(bytes) => fs::write(path, bytes),
        None => fs::remove_file(path),
    };
    if let Err(err) = result {
        tracing::warn!(
            path = %path.display(),
            error = %err,
            "cannot roll back generated file"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("io/example/Client.java");
        let text = "package io.example;\n";

        let mut batch = OutputBatch::new();
        assert_eq!(batch.stage(&path, text).unwrap(), WriteStatus::Written);
        assert!(!path.exists());
        batch.commit().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);

        let mut batch = OutputBatch::new();
        assert_eq!(batch.stage(&path, text).unwrap(), WriteStatus::Unchanged);
        let changed = "package io.example;\n\nclass Client {}\n";
        assert_eq!(batch.stage(&path, changed).unwrap(), WriteStatus::Written);
        batch.commit().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), changed);
    }

    #[test]
    fn test_failed_staging_removes_created_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();

        let mut batch = OutputBatch::new();
        batch.stage(&dir.path().join("io/example/One.java"), "one").unwrap();
        let err = batch.stage(&dir.path().join("blocker/Two.java"), "two").unwrap_err();
        assert!(matches!(err, GeneratorError::Io { .. }));
        drop(batch);

        assert!(!dir.path().join("io").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_commit_restores_replaced_files() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("Existing.java");
        let fresh = dir.path().join("Fresh.java");
        let blocked = dir.path().join("Blocked.java");
        fs::write(&existing, "old").unwrap();

        let mut batch = OutputBatch::new();
        batch.stage(&existing, "new").unwrap();
        batch.stage(&fresh, "fresh").unwrap();
        batch.stage(&blocked, "blocked").unwrap();
        // A directory at the target makes the last replacement fail.
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), "").unwrap();

        let err = batch.commit().unwrap_err();
        match err {
            GeneratorError::Io { path, .. } => assert_eq!(path, blocked),
            other => panic!("expected io error, got {}", other),
        }
        assert_eq!(fs::read_to_string(&existing).unwrap(), "old");
        assert!(!fresh.exists());
        assert!(blocked.join("keep").exists());
        // Only the seeded file and the blocking directory remain.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
