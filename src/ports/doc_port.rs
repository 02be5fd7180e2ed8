//! Schema presentation port.

use crate::domain::schema::TypeManifest;

/// Renders a type manifest as text.
pub trait DocFormatter {
    fn format(&self, manifest: &TypeManifest) -> String;
}
