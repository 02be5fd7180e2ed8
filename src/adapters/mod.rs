//! Concrete adapter implementations for ports.

pub mod doc_format;
pub mod file_config_adapter;
pub mod fs_source;
pub mod memory_source;
