//! Error types for the Qricambi MCP gateway

use thiserror::Error;

/// Main error type for gateway operations.
///
/// Every variant here is scoped to a single tool invocation: the router
/// converts them into error results on the stream, none of them tears down
/// a session or the process.
#[derive(Error, Debug)]
pub enum Error {
    /// The bearer credential was not configured. Fatal to the one call that
    /// needed it, nothing else.
    #[error("missing QRICAMBI_BEARER credential")]
    MissingCredential,

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unrecognized document id: {0}")]
    UnknownDocument(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Error::Upstream(msg.into())
    }

    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Error::MalformedResponse(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Error::UnknownTool(name.into())
    }

    pub fn unknown_document(id: impl Into<String>) -> Self {
        Error::UnknownDocument(id.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_display_names_the_tool() {
        let e = Error::unknown_tool("qricambi.doesNotExist");
        assert_eq!(e.to_string(), "unknown tool: qricambi.doesNotExist");
    }

    #[test]
    fn missing_credential_names_the_variable() {
        assert!(Error::MissingCredential.to_string().contains("QRICAMBI_BEARER"));
    }
}
