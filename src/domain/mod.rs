//! Core domain types and logic.

pub mod engine;
pub mod error;
pub mod funcs;
pub mod prompt_types;
pub mod registry;
pub mod schema;
pub mod template;
pub mod template_eval;
pub mod template_parser;
pub mod type_registry;
