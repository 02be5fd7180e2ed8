//! In-memory template source for embedding and tests.

use crate::domain::error::LoadError;
use crate::domain::template::TemplateSource;
use crate::ports::source_port::SourcePort;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into().into_bytes());
    }
}

impl SourcePort for InMemorySource {
    fn read(&self, path: &str) -> Result<TemplateSource, LoadError> {
        self.files
            .get(path)
            .map(|bytes| TemplateSource::new(path, bytes.clone()))
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_inserted_text() {
        let source = InMemorySource::new().with("a.jet", "{{.A}}");
        let src = source.read("a.jet").unwrap();
        assert_eq!(src.bytes, b"{{.A}}");
        assert!(matches!(
            source.read("b.jet"),
            Err(LoadError::NotFound { .. })
        ));
    }
}
