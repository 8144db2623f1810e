//! Archive source: lists `.tar.gz` snapshots and streams matching files out of them.

use crate::error::{EngineError, Result};
use crate::record::ContentRecord;
use crate::stage::{Emitter, Stage};
use flate2::read::GzDecoder;
use hashbrown::HashSet;
use log::{debug, warn};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz"];

/// One archive on disk; `name` is its identity in the result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub path: PathBuf,
}

/// List the archives of `dir` sorted by name, skipping the excluded ones.
///
/// # Errors
/// Any failure to read the directory is fatal for the run.
pub fn list_archives(dir: &Path, excluded: &HashSet<String>) -> Result<Vec<ArchiveEntry>> {
    let dir_err = |source| EngineError::ArchiveDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut archives = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        if !entry.file_type().map_err(dir_err)?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !ARCHIVE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        if excluded.contains(&name) {
            warn!("Skipping excluded archive {name}");
            continue;
        }
        archives.push(ArchiveEntry {
            name,
            path: entry.path(),
        });
    }
    archives.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(archives)
}

/// Dotted extension of an inner file name (`src/A.java` -> `.java`).
pub fn dotted_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

/// Extraction worker. Reads each archive front to back and emits one record
/// per regular file whose extension is allowed.
pub struct ArchiveExtractor {
    allowed: Arc<HashSet<String>>,
}

impl ArchiveExtractor {
    pub fn new(allowed: Arc<HashSet<String>>) -> Self {
        Self { allowed }
    }

    fn is_allowed(&self, inner: &str) -> bool {
        dotted_extension(inner).is_some_and(|ext| self.allowed.contains(&ext))
    }
}

impl Stage for ArchiveExtractor {
    type Input = ArchiveEntry;
    type Output = ContentRecord;
    const NAME: &'static str = "extract";

    fn process(&mut self, archive: ArchiveEntry, out: &Emitter<ContentRecord>) -> Result<()> {
        debug!("Extracting {}", archive.name);
        let file = File::open(&archive.path).map_err(|source| EngineError::ArchiveOpen {
            path: archive.path.clone(),
            source,
        })?;
        let read_err = |source| EngineError::ArchiveRead {
            archive: archive.name.clone(),
            source,
        };

        let mut tar = tar::Archive::new(GzDecoder::new(file));
        for entry in tar.entries().map_err(read_err)? {
            let mut entry = entry.map_err(read_err)?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let inner = entry.path().map_err(read_err)?.to_string_lossy().into_owned();
            if !self.is_allowed(&inner) {
                continue;
            }

            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|source| EngineError::EntryRead {
                    archive: archive.name.clone(),
                    inner: inner.clone(),
                    source,
                })?;
            let content = String::from_utf8_lossy(&bytes).into_owned();
            out.emit(ContentRecord::new(archive.name.clone(), inner, content))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::tempdir;

    fn write_archive(path: &Path, files: &[(&str, &str)]) {
        let gz = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(gz);
        for (name, body) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, body.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension("repo/src/A.java").as_deref(), Some(".java"));
        assert_eq!(dotted_extension("Makefile"), None);
        assert_eq!(dotted_extension("a/b.test.ts").as_deref(), Some(".ts"));
    }

    #[test]
    fn test_list_archives_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in ["b.tar.gz", "a.tgz", "notes.txt", "skip.tar.gz"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.tar.gz")).unwrap();
        let excluded: HashSet<String> = ["skip.tar.gz".to_string()].into_iter().collect();

        let names: Vec<_> = list_archives(dir.path(), &excluded)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["a.tgz", "b.tar.gz"]);
    }

    #[test]
    fn test_list_archives_missing_dir_is_fatal() {
        let dir = tempdir().unwrap();
        let err = list_archives(&dir.path().join("absent"), &HashSet::new()).unwrap_err();
        assert!(matches!(err, EngineError::ArchiveDir { .. }));
    }

    #[test]
    fn test_extractor_emits_allowed_files_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo.tar.gz");
        write_archive(
            &path,
            &[
                ("repo/A.java", "class A {}"),
                ("repo/README.md", "# readme"),
                ("repo/sub/B.java", "class B {}"),
            ],
        );

        let allowed: HashSet<String> = [".java".to_string()].into_iter().collect();
        let mut extractor = ArchiveExtractor::new(Arc::new(allowed));
        let (tx, rx) = crossbeam_channel::unbounded();
        let entry = ArchiveEntry {
            name: "repo.tar.gz".into(),
            path,
        };
        extractor.process(entry, &Emitter::new(tx, "extract")).unwrap();

        let records: Vec<ContentRecord> = rx.try_iter().collect();
        assert_eq!(
            records,
            vec![
                ContentRecord::new("repo.tar.gz", "repo/A.java", "class A {}"),
                ContentRecord::new("repo.tar.gz", "repo/sub/B.java", "class B {}"),
            ]
        );
    }

    #[test]
    fn test_extractor_rejects_corrupt_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.tar.gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();

        let mut extractor = ArchiveExtractor::new(Arc::new(HashSet::new()));
        let (tx, _rx) = crossbeam_channel::unbounded();
        let entry = ArchiveEntry {
            name: "broken.tar.gz".into(),
            path,
        };
        let err = extractor
            .process(entry, &Emitter::new(tx, "extract"))
            .unwrap_err();
        assert!(matches!(err, EngineError::ArchiveRead { .. }));
    }
}
