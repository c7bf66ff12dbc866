use thiserror::Error;

/// Main error type for the server
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("server error: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("route error: {0}")]
    Route(#[from] RouteError),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("cannot write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),
}

/// Errors raised while registering a route.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("handler for `{template}` expects {expected:?} but the template declares {declared:?}")]
    ParamMismatch {
        template: String,
        expected: Vec<String>,
        declared: Vec<String>,
    },
}

/// A malformed route template.
///
/// Positions are byte offsets into the template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder at byte {position} in `{template}`")]
    UnclosedPlaceholder { template: String, position: usize },

    #[error("unexpected `>` at byte {position} in `{template}`")]
    UnexpectedClose { template: String, position: usize },

    #[error("unbalanced parentheses at byte {position} in `{template}`")]
    UnbalancedParens { template: String, position: usize },

    #[error("invalid variable name `{name}` in `{template}`")]
    InvalidVariable { template: String, name: String },

    #[error("variable `{name}` declared twice in `{template}`")]
    DuplicateVariable { template: String, name: String },

    #[error("`{name}` captures the rest of the path and must be the last placeholder in `{template}`")]
    PathNotLast { template: String, name: String },

    #[error("`any` converter for `{name}` has no alternatives in `{template}`")]
    EmptyChoice { template: String, name: String },

    #[error("cannot build matcher for `{template}`: {message}")]
    Pattern { template: String, message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
