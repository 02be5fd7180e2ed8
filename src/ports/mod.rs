//! Port traits at the I/O seams: template sources, configuration and
//! schema presentation.

pub mod config_port;
pub mod doc_port;
pub mod source_port;
