//! Template source port.
//!
//! Resolves a logical template path to raw source bytes. The engine never
//! touches the filesystem directly.

use crate::domain::error::LoadError;
use crate::domain::template::TemplateSource;

pub trait SourcePort {
    /// Read the current bytes for `path`. Called on every cache miss, every
    /// load in development mode and every explicit reload.
    fn read(&self, path: &str) -> Result<TemplateSource, LoadError>;
}
