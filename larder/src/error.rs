use std::path::PathBuf;

use thiserror::Error;

/// The primary error type that can be produced by larder.
#[derive(Debug, Error)]
pub enum Error {
    #[error("input not found: {0}")]
    MissingInput(String),
    #[error("malformed input {0}: {1}")]
    MalformedInput(String, String),
    #[error("template not found: {0}")]
    MissingTemplate(PathBuf),
    #[error("template does not contain expected tag: {0}")]
    TagNotFound(String),
    #[error("unsupported template syntax: {0}")]
    TemplateSyntaxUnsupported(String),
    #[error("unclosed for-block opened by {0}: missing {{% endfor %}}")]
    UnclosedBlock(String),
    #[error("template engine \"{0}\" is not available in this build")]
    EngineUnavailable(&'static str),
    #[error("failed to render template: {0}")]
    RenderingFailure(String),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),
    #[error("unknown page \"{0}\"")]
    UnknownPage(String),
    #[error("unknown template engine \"{0}\"")]
    UnknownEngine(String),
    #[error("path has no parent directory: {0}")]
    PathMissingParent(PathBuf),
    #[error("I/O error {0}: {1}")]
    Io(String, std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Broad failure categories, each of which maps to a distinct process exit
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    MissingInput,
    MalformedInput,
    MissingTemplate,
    Rendering,
    Other,
}

impl Category {
    /// The process exit status associated with this category.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Other => 1,
            Self::MissingInput => 3,
            Self::MalformedInput => 4,
            Self::MissingTemplate => 5,
            Self::Rendering => 6,
        }
    }
}

impl Error {
    /// Classify this error for reporting at the process boundary.
    pub fn category(&self) -> Category {
        match self {
            Self::MissingInput(_) => Category::MissingInput,
            Self::MalformedInput(_, _) | Self::Json(_) => Category::MalformedInput,
            Self::MissingTemplate(_) => Category::MissingTemplate,
            Self::TagNotFound(_)
            | Self::TemplateSyntaxUnsupported(_)
            | Self::UnclosedBlock(_)
            | Self::RenderingFailure(_) => Category::Rendering,
            _ => Category::Other,
        }
    }

    /// Whether this error signals that a template engine could not be set up
    /// at all, as opposed to failing on a particular template.
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, Self::EngineUnavailable(_))
    }
}
