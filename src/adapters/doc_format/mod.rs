//! Type manifest presentation.
//!
//! Three renderings of the same manifest:
//! - `markdown`: schema document with a template-variable column
//! - `table`: aligned terminal table
//! - `simple`: one indented block per field

pub mod markdown;
pub mod simple;
pub mod table;

use std::fmt;
use std::str::FromStr;

use crate::domain::error::UnsupportedFormatError;
use crate::ports::doc_port::DocFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Table,
    Simple,
}

const ALL: [OutputFormat; 3] = [OutputFormat::Markdown, OutputFormat::Table, OutputFormat::Simple];

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Table => "table",
            OutputFormat::Simple => "simple",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OutputFormat {
    type Err = UnsupportedFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "table" => Ok(OutputFormat::Table),
            "simple" => Ok(OutputFormat::Simple),
            other => Err(unsupported(other, &ALL)),
        }
    }
}

impl OutputFormat {
    /// Parse `s` and require it to be one of `allowed`.
    pub fn parse_for(s: &str, allowed: &[OutputFormat]) -> Result<Self, UnsupportedFormatError> {
        match s.parse::<OutputFormat>() {
            Ok(format) if allowed.contains(&format) => Ok(format),
            _ => Err(unsupported(s, allowed)),
        }
    }

    pub fn formatter(self) -> Box<dyn DocFormatter> {
        match self {
            OutputFormat::Markdown => Box::new(markdown::MarkdownFormatter),
            OutputFormat::Table => Box::new(table::TableFormatter),
            OutputFormat::Simple => Box::new(simple::SimpleFormatter),
        }
    }
}

fn unsupported(format: &str, allowed: &[OutputFormat]) -> UnsupportedFormatError {
    UnsupportedFormatError {
        format: format.to_string(),
        supported: allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// `Type: <name>` plus optional description, then a blank line.
pub(crate) fn header(type_name: &str, description: &str) -> String {
    let mut out = format!("Type: {}\n", type_name);
    if !description.is_empty() {
        out.push_str(&format!("Description: {}\n", description));
    }
    out.push('\n');
    out
}
