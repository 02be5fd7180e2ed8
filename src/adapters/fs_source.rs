//! Filesystem template source rooted at a template directory.
//!
//! A path without an extension is tried as given, then with `.jet`, then
//! with the legacy `.tmpl` extension.

use crate::domain::error::LoadError;
use crate::domain::template::TemplateSource;
use crate::ports::source_port::SourcePort;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

const EXTENSIONS: [&str; 2] = ["jet", "tmpl"];

#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, path: &str) -> Result<Vec<PathBuf>, LoadError> {
        let rel = Path::new(path);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(LoadError::InvalidPath {
                path: path.to_string(),
            });
        }

        let full = self.root.join(rel);
        let mut candidates = vec![full.clone()];
        if rel.extension().is_none() {
            candidates.extend(EXTENSIONS.iter().map(|ext| full.with_extension(ext)));
        }
        Ok(candidates)
    }
}

impl SourcePort for FileSystemSource {
    fn read(&self, path: &str) -> Result<TemplateSource, LoadError> {
        for candidate in self.candidates(path)? {
            trace!(candidate = %candidate.display(), "FileSystemSource: trying");
            match fs::read(&candidate) {
                Ok(bytes) => return Ok(TemplateSource::new(path, bytes)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                // A directory where a file was expected behaves like a miss.
                Err(_) if candidate.is_dir() => continue,
                Err(e) => {
                    return Err(LoadError::Read {
                        path: path.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Err(LoadError::NotFound {
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, text) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, text).unwrap();
        }
        dir
    }

    #[test]
    fn reads_exact_path() {
        let dir = dir_with(&[("system.jet", "hello")]);
        let source = FileSystemSource::new(dir.path());
        let src = source.read("system.jet").unwrap();
        assert_eq!(src.path, "system.jet");
        assert_eq!(src.bytes, b"hello");
        assert_eq!(src.hash.len(), 64);
    }

    #[test]
    fn resolves_missing_extension() {
        let dir = dir_with(&[("user.jet", "jet"), ("legacy.tmpl", "tmpl")]);
        let source = FileSystemSource::new(dir.path());
        assert_eq!(source.read("user").unwrap().bytes, b"jet");
        assert_eq!(source.read("legacy").unwrap().bytes, b"tmpl");
    }

    #[test]
    fn jet_preferred_over_tmpl() {
        let dir = dir_with(&[("both.jet", "new"), ("both.tmpl", "old")]);
        let source = FileSystemSource::new(dir.path());
        assert_eq!(source.read("both").unwrap().bytes, b"new");
    }

    #[test]
    fn nested_paths() {
        let dir = dir_with(&[("prompts/system.jet", "nested")]);
        let source = FileSystemSource::new(dir.path());
        assert_eq!(source.read("prompts/system.jet").unwrap().bytes, b"nested");
        assert_eq!(source.read("./prompts/system").unwrap().bytes, b"nested");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = dir_with(&[]);
        let source = FileSystemSource::new(dir.path());
        assert_eq!(
            source.read("nope.jet").unwrap_err(),
            LoadError::NotFound {
                path: "nope.jet".into()
            }
        );
    }

    #[test]
    fn rejects_escaping_paths() {
        let dir = dir_with(&[]);
        let source = FileSystemSource::new(dir.path());
        for bad in ["../secret.jet", "a/../../b.jet", "/etc/passwd", ""] {
            assert!(
                matches!(source.read(bad), Err(LoadError::InvalidPath { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn directory_is_not_a_template() {
        let dir = dir_with(&[("sub/x.jet", "x")]);
        let source = FileSystemSource::new(dir.path());
        assert!(matches!(
            source.read("sub"),
            Err(LoadError::NotFound { .. })
        ));
    }
}
