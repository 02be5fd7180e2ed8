//! Domain error types.
//!
//! Each operation has its own error so callers can report precisely;
//! [`TmplError`] gathers them for the command layer.

/// A parse error with position information for template markup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with the offending line and a caret under the error
    /// column.
    pub fn display_with_context(&self, input: &str) -> String {
        let pos = self.position.min(input.len());
        let line_start = input[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = input[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(input.len());
        let line_no = input[..line_start].matches('\n').count() + 1;
        let column = input[line_start..pos].chars().count();
        let caret = " ".repeat(column) + "^";
        format!(
            "{line}\n{caret}\nline {line_no}: {err}",
            line = &input[line_start..line_end],
            caret = caret,
            line_no = line_no,
            err = self
        )
    }
}

/// Failure to obtain a compiled template for a path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("load template {path:?}: not found")]
    NotFound { path: String },

    #[error("load template {path:?}: {reason}")]
    Read { path: String, reason: String },

    #[error("load template {path:?}: path must be relative and stay inside the template root")]
    InvalidPath { path: String },

    #[error("load template {path:?}: {source}")]
    Compile { path: String, source: ParseError },
}

impl LoadError {
    pub fn path(&self) -> &str {
        match self {
            LoadError::NotFound { path }
            | LoadError::Read { path, .. }
            | LoadError::InvalidPath { path }
            | LoadError::Compile { path, .. } => path,
        }
    }
}

/// What went wrong while executing a compiled template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderCause {
    #[error("unknown variable {0}")]
    UnknownVariable(String),

    #[error("unknown function {0:?}")]
    UnknownFunction(String),

    #[error("{function}: {reason}")]
    ArgumentMismatch { function: String, reason: String },

    #[error("{function} failed: {reason}")]
    FunctionFailed { function: String, reason: String },

    #[error("data context: {0}")]
    Context(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("render template {path:?}: {cause}")]
pub struct RenderError {
    pub path: String,
    pub cause: RenderCause,
}

/// `generate` was asked to describe something that is not a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected record, got {kind} ({type_name})")]
pub struct ExtractError {
    pub type_name: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported format: {format} (expected one of: {supported})")]
pub struct UnsupportedFormatError {
    pub format: String,
    pub supported: String,
}

/// Top-level error type for tmpldoc.
#[derive(Debug, thiserror::Error)]
pub enum TmplError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    #[error("unknown type: {name}\n\nAvailable types:\n{available}")]
    UnknownType { name: String, available: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("failed to parse data file {file}: {reason}")]
    DataParse { file: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TmplError> for std::process::ExitCode {
    fn from(err: &TmplError) -> Self {
        let code: u8 = match err {
            TmplError::Io(_) => 1,
            TmplError::ConfigParse { .. }
            | TmplError::DataParse { .. }
            | TmplError::UnknownType { .. } => 2,
            TmplError::Load(_) => 3,
            TmplError::Render(_) => 4,
            TmplError::Extract(_) | TmplError::UnsupportedFormat(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
