//! Named registry of describable types, populated explicitly at startup.

use crate::domain::error::TmplError;
use crate::domain::schema::TypeDescriptor;
use std::collections::BTreeMap;

pub type DescriptorFn = fn() -> TypeDescriptor;

/// Summary row for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,
    pub type_name: String,
    pub field_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, DescriptorFn>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`; a later registration under the same name wins.
    pub fn register(&mut self, name: impl Into<String>, descriptor: DescriptorFn) {
        self.types.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Result<TypeDescriptor, TmplError> {
        self.types
            .get(name)
            .map(|f| f())
            .ok_or_else(|| TmplError::UnknownType {
                name: name.to_string(),
                available: self.available(),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    pub fn entries(&self) -> Vec<TypeEntry> {
        self.types
            .iter()
            .map(|(name, f)| {
                let desc = f();
                TypeEntry {
                    name: name.clone(),
                    field_count: desc.exported_field_count(),
                    type_name: desc.name,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn available(&self) -> String {
        self.entries()
            .iter()
            .map(|e| format!("  - {} ({})\n", e.name, e.type_name))
            .collect()
    }
}
