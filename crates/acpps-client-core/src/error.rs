//! Errors shared by every request and validation path.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// Caught before any request was sent.
    Validation,
    /// Well-formed error body from the server.
    Server,
    Transport,
    Decode,
}

impl ClientErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Server => "server",
            Self::Transport => "transport",
            Self::Decode => "decode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    #[must_use]
    pub fn kind(&self) -> ClientErrorKind {
        match self {
            Self::Validation(_) => ClientErrorKind::Validation,
            Self::Server { .. } => ClientErrorKind::Server,
            Self::Transport(_) => ClientErrorKind::Transport,
            Self::Decode(_) => ClientErrorKind::Decode,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transport(error: impl std::fmt::Display) -> Self {
        Self::Transport(error.to_string())
    }

    pub(crate) fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Self::Server { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_falls_back_to_status_message() {
        let error = ClientError::server(502, Some("   ".to_string()));
        assert_eq!(error.to_string(), "request failed with status 502");
        assert_eq!(error.status_code(), Some(502));
        assert_eq!(error.kind(), ClientErrorKind::Server);
    }

    #[test]
    fn transport_error_keeps_source_text() {
        let error = ClientError::transport("Failed to fetch");
        assert_eq!(error.to_string(), "network error: Failed to fetch");
        assert_eq!(error.kind().as_str(), "transport");
    }
}
